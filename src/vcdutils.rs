use std::fs::File;
use std::io;
use std::io::ErrorKind::InvalidInput;
use std::path::Path;

use vcd::{self, SimulationCommand, TimescaleUnit, Value};

pub struct VcdWriter {
    vcd: vcd::Writer<File>,
    timestamp: u64,
    wire_id: vcd::IdCode,
}

impl VcdWriter {
    /// Create a new vcd writer, one tick per microsecond
    pub fn new(file: File) -> Self {
        let vcd = vcd::Writer::new(file);

        Self {
            vcd,
            timestamp: 0,
            wire_id: vcd::IdCode::FIRST,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        let writer = &mut self.vcd;

        // Write the header
        writer.timescale(1, TimescaleUnit::US)?;
        writer.add_module("top")?;

        let id = writer.add_wire(1, "ir")?;
        self.wire_id = id;

        writer.upscope()?;
        writer.enddefinitions()?;

        // Write the initial values
        writer.timestamp(0)?;
        writer.begin(SimulationCommand::Dumpvars)?;
        writer.change_scalar(id, Value::V0)?;
        writer.end()?;

        Ok(())
    }

    /// Write mark/space durations starting with a mark, and move the offset
    /// past them
    pub fn write_pulses(&mut self, pulses: &[u16]) -> io::Result<()> {
        let mut ts = 0;
        let mut level = true;

        for &dt in pulses {
            self.write_value(ts, level)?;
            ts += u64::from(dt);
            level = !level;
        }

        // Back to idle after the last mark
        if !pulses.is_empty() {
            self.write_value(ts, false)?;
        }

        self.add_offset(ts);

        Ok(())
    }

    pub fn write_value(&mut self, ts: u64, high: bool) -> io::Result<()> {
        let offseted_ts = self.timestamp + ts;

        self.vcd.timestamp(offseted_ts)?;
        let value = if high { Value::V1 } else { Value::V0 };
        self.vcd.change_scalar(self.wire_id, value)?;

        Ok(())
    }

    pub fn add_offset(&mut self, offset: u64) {
        self.timestamp += offset;
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }
}

pub fn vcdfile_to_vec(path: &Path) -> io::Result<(u32, Vec<(u64, bool)>)> {
    let file = File::open(path)?;
    let mut parser = vcd::Parser::new(&file);

    // Parse the header and find the wires
    let header = parser.parse_header()?;
    let data = header
        .find_var(&["top", "ir"])
        .ok_or_else(|| io::Error::new(InvalidInput, "no wire top.ir"))?
        .code;

    let samplerate = samplerate(header.timescale)?;

    log::debug!("samplerate: {}", samplerate);

    // Iterate through the remainder of the file and decode the data
    let mut current_ts = 0;
    let mut res: Vec<(u64, bool)> = Vec::new();

    for command_result in parser {
        use vcd::Command::*;
        let command = command_result?;
        match command {
            ChangeScalar(i, v) if i == data => {
                let one = v == Value::V1;
                res.push((current_ts, one));
            }
            Timestamp(ts) => current_ts = ts,
            _ => (),
        }
    }

    Ok((samplerate, res))
}

/// Ticks per second of a vcd timescale
fn samplerate(timescale: Option<(u32, TimescaleUnit)>) -> io::Result<u32> {
    let rate = match timescale {
        Some((ts, TimescaleUnit::MS)) => 1_000u32.checked_div(ts),
        Some((ts, TimescaleUnit::US)) => 1_000_000u32.checked_div(ts),
        Some((ts, TimescaleUnit::NS)) => 1_000_000_000u32.checked_div(ts),
        _ => None,
    };

    rate.filter(|&rate| rate > 0).ok_or_else(|| {
        io::Error::new(
            InvalidInput,
            format!("unsupported timescale {:?}", timescale),
        )
    })
}

/// Turn level changes into `(level, duration_us)` spans. Edges going back in
/// time are skipped.
pub fn edges_to_spans(samplerate: u32, edges: &[(u64, bool)]) -> Vec<(bool, u32)> {
    let samplerate = u64::from(samplerate.max(1));

    edges
        .windows(2)
        .filter_map(|w| {
            let (t0, level) = w[0];
            let (t1, _) = w[1];

            let dt = t1.checked_sub(t0).or_else(|| {
                log::warn!("Timestamp {} before {}, edge skipped", t1, t0);
                None
            })?;

            let us = dt.saturating_mul(1_000_000) / samplerate;
            Some((level, us.min(u64::from(u32::MAX)) as u32))
        })
        .collect()
}
