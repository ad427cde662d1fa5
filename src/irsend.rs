use std::io::Write;

use rxremote_shared::session::{parse, Request};
use rxremote_shared::{IrLine, Session};

/// Handle a single command and return
pub fn transmit<L: IrLine, W: Write>(session: &mut Session<L, W>, token: &str) -> anyhow::Result<()> {
    let request = parse(session.table(), token)?
        .ok_or_else(|| anyhow::anyhow!("no command given"))?;

    if request == Request::Quit {
        anyhow::bail!("nothing to quit");
    }

    log::info!("Sending {:?}", request);
    session.dispatch(request)?;

    Ok(())
}
