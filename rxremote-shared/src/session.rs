//! Operator console: one input line in, status lines and frames out.

use std::error::Error;
use std::fmt;
use std::io::{self, Write};

use crate::commands::{normalize, Button, CommandTable};
use crate::nec::NecCommand;
use crate::remote::{IrLine, Transmitter};

/// Wait after a trigger before the input line is looked at again
pub const DEBOUNCE_MS: u32 = 500;

const TEST_STEP_MS: u32 = 1000;
const TEST_END_MS: u32 = 2000;

/// Pulses shown by DEBUG
const DEBUG_PULSES: usize = 20;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Request {
    Help,
    /// DEBUG without a command
    DebugUsage,
    Test,
    Quit,
    Debug(Button),
    Press(Button),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnrecognizedCommand(pub String);

impl fmt::Display for UnrecognizedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown command: {}", self.0)
    }
}

impl Error for UnrecognizedCommand {}

/// Parse one input line. Blank lines give `Ok(None)`.
pub fn parse(table: &CommandTable, line: &str) -> Result<Option<Request>, UnrecognizedCommand> {
    let line = normalize(line);
    let words: Vec<&str> = line.split_whitespace().collect();

    let request = match words.as_slice() {
        [] => return Ok(None),
        ["HELP"] => Request::Help,
        ["TEST"] => Request::Test,
        ["QUIT"] | ["EXIT"] | ["Q"] => Request::Quit,
        ["DEBUG"] => Request::DebugUsage,
        ["DEBUG", token] => table
            .resolve(token)
            .map(Request::Debug)
            .ok_or_else(|| UnrecognizedCommand(token.to_string()))?,
        [token] => table
            .resolve(token)
            .map(Request::Press)
            .ok_or_else(|| UnrecognizedCommand(token.to_string()))?,
        _ => return Err(UnrecognizedCommand(line.clone())),
    };

    Ok(Some(request))
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Session<L, W> {
    table: CommandTable,
    remote: Transmitter<L>,
    out: W,
}

impl<L, W> Session<L, W>
where
    L: IrLine,
    W: Write,
{
    pub fn new(remote: Transmitter<L>, out: W) -> Self {
        Session {
            table: CommandTable::new(),
            remote,
            out,
        }
    }

    pub fn table(&self) -> &CommandTable {
        &self.table
    }

    pub fn banner(&mut self) -> io::Result<()> {
        writeln!(self.out, "RX-E600 infrared remote")?;
        writeln!(self.out, "Ready. POWER, VOL+, VOL-, PLAY, PAUSE, STOP, ...")?;
        writeln!(self.out, "Type a command or 'HELP' for the full list")?;
        self.out.flush()
    }

    /// Handle one input line. Unknown commands are reported and the loop
    /// carries on.
    pub fn handle_line(&mut self, line: &str) -> io::Result<Flow> {
        let request = match parse(&self.table, line) {
            Ok(Some(request)) => request,
            Ok(None) => return Ok(Flow::Continue),
            Err(UnrecognizedCommand(token)) => {
                log::info!("Unknown command: {:?}", token);
                writeln!(
                    self.out,
                    "Unknown command: {}. Type 'HELP' to see the commands.",
                    token
                )?;
                self.out.flush()?;
                return Ok(Flow::Continue);
            }
        };

        self.dispatch(request)
    }

    pub fn dispatch(&mut self, request: Request) -> io::Result<Flow> {
        match request {
            Request::Help => self.help()?,
            Request::Test => self.test_sequence()?,
            Request::Quit => return Ok(Flow::Quit),
            Request::DebugUsage => writeln!(self.out, "Usage: DEBUG <command>")?,
            Request::Debug(button) => self.debug(button)?,
            Request::Press(button) => self.press(button)?,
        }

        self.out.flush()?;
        Ok(Flow::Continue)
    }

    pub fn press(&mut self, button: Button) -> io::Result<()> {
        if button == Button::Power {
            return self.power();
        }

        writeln!(self.out, "Sending: {} ({:#04X})", button.label(), button.code())?;
        log::info!("Sending {} ({:#04X})", button.label(), button.code());
        self.remote.send(button.code());

        Ok(())
    }

    pub fn power(&mut self) -> io::Result<()> {
        writeln!(self.out, "Sending: POWER ({:#04X}, double)", Button::Power.code())?;
        log::info!("Sending POWER twice");
        self.remote.send_power();

        Ok(())
    }

    /// The digital input was asserted
    pub fn trigger(&mut self) -> io::Result<()> {
        log::info!("Trigger asserted");
        self.power()?;
        self.remote.pause(DEBOUNCE_MS);
        self.out.flush()
    }

    pub fn test_sequence(&mut self) -> io::Result<()> {
        writeln!(self.out, "=== TEST SEQUENCE ===")?;

        writeln!(self.out, "Testing volume...")?;
        self.press(Button::VolumeUp)?;
        self.remote.pause(TEST_STEP_MS);
        self.press(Button::VolumeDown)?;
        self.remote.pause(TEST_STEP_MS);

        writeln!(self.out, "Testing power...")?;
        self.power()?;
        self.remote.pause(TEST_END_MS);

        writeln!(self.out, "Test done.")
    }

    pub fn help(&mut self) -> io::Result<()> {
        let out = &mut self.out;

        writeln!(out)?;
        writeln!(out, "=== COMMANDS ===")?;
        writeln!(out, "POWER/PWR    - Power on/off")?;
        writeln!(out, "VOL+/VOLUP   - Volume up")?;
        writeln!(out, "VOL-/VOLDOWN - Volume down")?;
        writeln!(out, "PLAY         - Play")?;
        writeln!(out, "PAUSE        - Pause")?;
        writeln!(out, "STOP         - Stop")?;
        writeln!(out, "FF/FORWARD   - Fast forward")?;
        writeln!(out, "REW/REWIND   - Rewind")?;
        writeln!(out, "TUNER/RADIO  - FM tuner")?;
        writeln!(out, "TAPE         - Tape")?;
        writeln!(out, "CD/DISC      - CD")?;
        writeln!(out, "AUX          - Aux input")?;
        writeln!(out, "MD           - MiniDisc")?;
        writeln!(out, "DVD          - DVD")?;
        writeln!(out, "RANDOM       - Random play")?;
        writeln!(out, "REPEAT       - Repeat")?;
        writeln!(out, "DISPLAY      - Display")?;
        writeln!(out, "SLEEP        - Sleep timer")?;
        writeln!(out, "1-9, 0       - Digits")?;
        writeln!(out, "TEST         - Test sequence")?;
        writeln!(out, "DEBUG <cmd>  - Show the frame of a command")?;
        writeln!(out, "HELP         - This help")?;
        writeln!(out, "QUIT/EXIT    - Leave")?;
        writeln!(out, "================")?;
        writeln!(out)
    }

    /// Print the frame for `button` without sending it
    pub fn debug(&mut self, button: Button) -> io::Result<()> {
        let addr = self.remote.address();
        let cmd = button.code();
        let frame = NecCommand::new(addr, cmd).encode();
        let out = &mut self.out;

        writeln!(out, "=== DEBUG: {} ===", button.label())?;
        writeln!(out, "Address:  {:#04X} ({:08b})", addr, addr)?;
        writeln!(out, "Command:  {:#04X} ({:08b})", cmd, cmd)?;
        writeln!(out, "~Address: {:#04X}", !addr)?;
        writeln!(out, "~Command: {:#04X}", !cmd)?;
        writeln!(out, "Pulses:   {}", frame.pulses().len())?;
        writeln!(out, "Duration: {:.1} ms", f64::from(frame.duration_us()) / 1000.0)?;

        for (i, dt) in frame.pulses().iter().take(DEBUG_PULSES).enumerate() {
            let state = if i % 2 == 0 { "ON " } else { "OFF" };
            writeln!(out, "  {:2}: {} {:4} us", i, state, dt)?;
        }
        if frame.pulses().len() > DEBUG_PULSES {
            writeln!(out, "  ...")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nec::PulseFrame;

    struct Silent;

    impl IrLine for Silent {
        fn emit(&mut self, frame: &PulseFrame) -> io::Result<()> {
            panic!("unexpected frame {:?}", frame)
        }

        fn sleep_ms(&mut self, _ms: u32) {}
    }

    #[test]
    fn parse_requests() {
        let table = CommandTable::new();

        assert_eq!(parse(&table, "help"), Ok(Some(Request::Help)));
        assert_eq!(parse(&table, " Test\r\n"), Ok(Some(Request::Test)));
        assert_eq!(parse(&table, "exit"), Ok(Some(Request::Quit)));
        assert_eq!(parse(&table, "pwr"), Ok(Some(Request::Press(Button::Power))));
        assert_eq!(
            parse(&table, "debug vol+"),
            Ok(Some(Request::Debug(Button::VolumeUp)))
        );
        assert_eq!(parse(&table, "   \n"), Ok(None));
    }

    #[test]
    fn parse_unknown() {
        let table = CommandTable::new();

        assert_eq!(
            parse(&table, "xyz"),
            Err(UnrecognizedCommand("XYZ".to_string()))
        );
        assert_eq!(
            parse(&table, "debug nope"),
            Err(UnrecognizedCommand("NOPE".to_string()))
        );
        assert_eq!(
            parse(&table, "play now"),
            Err(UnrecognizedCommand("PLAY NOW".to_string()))
        );
    }

    #[test]
    fn bare_debug_asks_for_a_command() {
        let table = CommandTable::new();
        assert_eq!(parse(&table, " debug "), Ok(Some(Request::DebugUsage)));

        let mut out: Vec<u8> = Vec::new();
        {
            let mut session = Session::new(Transmitter::new(Silent, 0x78), &mut out);
            assert_eq!(session.handle_line("DEBUG").unwrap(), Flow::Continue);
        }
        assert_eq!(String::from_utf8(out).unwrap(), "Usage: DEBUG <command>\n");
    }
}
