use std::fs::File;
use std::io;
use std::path::Path;
use std::thread;
use std::time::Duration;

use rxremote_shared::nec::PulseFrame;
use rxremote_shared::protocol::{Command, PulseData, RemoteControlCmd};
use rxremote_shared::{IrLine, SerialLink};

use crate::vcdutils::VcdWriter;

/// Frames go to a blipper device over the serial link
pub struct DeviceLine {
    link: SerialLink,
    /// Send the pulse timings instead of address and command
    raw: bool,
}

impl DeviceLine {
    pub fn new(link: SerialLink, raw: bool) -> Self {
        DeviceLine { link, raw }
    }

    fn command(&self, frame: &PulseFrame) -> Command {
        if self.raw {
            Command::Transmit(PulseData::from_frame(frame))
        } else {
            let nec = frame.command();
            Command::RemoteControlSend(RemoteControlCmd::nec(nec.addr, nec.cmd))
        }
    }
}

impl IrLine for DeviceLine {
    fn emit(&mut self, frame: &PulseFrame) -> io::Result<()> {
        let cmd = self.command(frame);

        log::debug!("Sending command: {:?}", frame);

        self.link.send_command(cmd)?;
        self.link.reply_ok()?;
        log::debug!("Got ok");

        Ok(())
    }

    fn sleep_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}

/// Frames are only logged
pub struct LogLine;

impl IrLine for LogLine {
    fn emit(&mut self, frame: &PulseFrame) -> io::Result<()> {
        log::info!("Dry run: {:?}", frame);
        Ok(())
    }

    fn sleep_ms(&mut self, ms: u32) {
        log::debug!("Dry run: pause {} ms", ms);
    }
}

/// Frames and pauses are written to a vcd trace in simulated time
pub struct VcdLine {
    writer: VcdWriter,
}

impl VcdLine {
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = File::create(path)?;
        let mut writer = VcdWriter::new(file);
        writer.init()?;

        Ok(VcdLine { writer })
    }
}

impl IrLine for VcdLine {
    fn emit(&mut self, frame: &PulseFrame) -> io::Result<()> {
        log::debug!("Trace {:?} at {} us", frame, self.writer.timestamp());
        self.writer.write_pulses(frame.pulses())
    }

    fn sleep_ms(&mut self, ms: u32) {
        self.writer.add_offset(u64::from(ms) * 1_000);
    }
}
