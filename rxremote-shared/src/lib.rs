pub mod commands;
pub mod nec;
pub mod protocol;
pub mod remote;
pub mod session;

#[cfg(feature = "utils")]
mod link;

pub use commands::{Button, CommandTable, CUSTOM_CODE};
pub use remote::{IrLine, Transmitter};
pub use session::{Flow, Session};

#[cfg(feature = "utils")]
pub use link::SerialLink;
