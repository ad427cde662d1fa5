use std::path::Path;

use rxremote_shared::nec;
use rxremote_shared::Button;

use crate::vcdutils::{edges_to_spans, vcdfile_to_vec};

/// Print every frame found in a vcd trace
pub fn command_decode(path: &Path) -> anyhow::Result<()> {
    let (samplerate, edges) = vcdfile_to_vec(path)?;
    log::info!("{} edges at {} Hz", edges.len(), samplerate);

    let spans = edges_to_spans(samplerate, &edges);
    let frames = nec::frames_in(&spans);

    if frames.is_empty() {
        println!("No command decoded");
    }

    for frame in frames {
        match frame {
            Ok(cmd) => {
                let label = Button::from_code(cmd.cmd)
                    .map(Button::label)
                    .unwrap_or("?");
                println!("Addr: {:#04X}\tCmd: {:#04X}\t{}", cmd.addr, cmd.cmd, label);
            }
            Err(err) => log::warn!("Undecodable frame: {}", err),
        }
    }

    Ok(())
}
