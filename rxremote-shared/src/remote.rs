use std::io;

use crate::commands::Button;
use crate::nec::{NecCommand, PulseFrame};

/// Settle time after an ordinary send
pub const SETTLE_MS: u32 = 100;
/// Gap between the two power frames
pub const POWER_REPEAT_MS: u32 = 100;
/// Settle time after the second power frame
pub const POWER_SETTLE_MS: u32 = 500;

/// Where frames go. Implemented by the device link, the vcd trace and by
/// recorders in tests.
pub trait IrLine {
    /// Put one frame on the air
    fn emit(&mut self, frame: &PulseFrame) -> io::Result<()>;
    /// Block for `ms` milliseconds
    fn sleep_ms(&mut self, ms: u32);
}

impl<L: IrLine + ?Sized> IrLine for &mut L {
    fn emit(&mut self, frame: &PulseFrame) -> io::Result<()> {
        (**self).emit(frame)
    }

    fn sleep_ms(&mut self, ms: u32) {
        (**self).sleep_ms(ms)
    }
}

impl<L: IrLine + ?Sized> IrLine for Box<L> {
    fn emit(&mut self, frame: &PulseFrame) -> io::Result<()> {
        (**self).emit(frame)
    }

    fn sleep_ms(&mut self, ms: u32) {
        (**self).sleep_ms(ms)
    }
}

pub struct Transmitter<L> {
    line: L,
    address: u8,
}

impl<L: IrLine> Transmitter<L> {
    pub fn new(line: L, address: u8) -> Self {
        Transmitter { line, address }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Emit one frame. Nothing reports back from the receiver, so a failed
    /// emit is only logged.
    pub fn transmit(&mut self, cmd: u8) {
        let frame = NecCommand::new(self.address, cmd).encode();

        log::debug!(
            "Frame {:#04X}/{:#04X}: {} pulses, {} us",
            self.address,
            cmd,
            frame.pulses().len(),
            frame.duration_us()
        );

        if let Err(err) = self.line.emit(&frame) {
            log::warn!("Failed to emit {:#04X}: {}", cmd, err);
        }
    }

    /// Transmit and let the receiver settle
    pub fn send(&mut self, cmd: u8) {
        self.transmit(cmd);
        self.line.sleep_ms(SETTLE_MS);
    }

    /// The receiver only toggles power reliably when it sees the code twice.
    /// No other key gets this treatment.
    pub fn send_power(&mut self) {
        let power = Button::Power.code();

        self.transmit(power);
        self.line.sleep_ms(POWER_REPEAT_MS);
        self.transmit(power);
        self.line.sleep_ms(POWER_SETTLE_MS);
    }

    pub fn pause(&mut self, ms: u32) {
        self.line.sleep_ms(ms);
    }
}
