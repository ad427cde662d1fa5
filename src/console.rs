use std::io::{self, BufRead, Read};
use std::path::Path;
use std::time::Duration;

use serialport::{SerialPort, SerialPortSettings};

const CONSOLE_BAUD_RATE: u32 = 9600;
/// How often the trigger is polled while no input arrives
const POLL_INTERVAL: Duration = Duration::from_millis(20);
/// Unterminated input longer than this is dropped
const MAX_LINE: usize = 256;

#[derive(Debug, PartialEq, Eq)]
pub enum Event {
    Line(String),
    /// The digital input went active
    Trigger,
    Closed,
}

pub trait Console {
    /// Block until there is something to do
    fn next_event(&mut self) -> io::Result<Event>;
}

pub struct StdinConsole<R> {
    input: R,
}

impl StdinConsole<io::BufReader<io::Stdin>> {
    pub fn new() -> Self {
        StdinConsole {
            input: io::BufReader::new(io::stdin()),
        }
    }
}

impl<R: BufRead> Console for StdinConsole<R> {
    fn next_event(&mut self) -> io::Result<Event> {
        // Line noise is not valid UTF-8, it must not end the loop
        let mut line = Vec::new();
        match self.input.read_until(b'\n', &mut line)? {
            0 => Ok(Event::Closed),
            _ => Ok(Event::Line(String::from_utf8_lossy(&line).into_owned())),
        }
    }
}

/// Operator on a serial port. The trigger button, when enabled, is wired to
/// the CTS line.
pub struct SerialConsole<P> {
    port: P,
    pending: Vec<u8>,
    trigger: bool,
    cts: bool,
}

impl SerialConsole<Box<dyn SerialPort>> {
    pub fn open(path: &Path, trigger: bool) -> io::Result<Self> {
        let settings = SerialPortSettings {
            baud_rate: CONSOLE_BAUD_RATE,
            timeout: POLL_INTERVAL,
            ..Default::default()
        };

        let port = serialport::open_with_settings(path, &settings)?;
        let mut console = SerialConsole::new(port, trigger);
        if trigger {
            console.cts = console.port.read_clear_to_send()?;
        }

        Ok(console)
    }

    /// Writer for the status lines, sharing the port
    pub fn writer(&self) -> io::Result<Box<dyn SerialPort>> {
        Ok(self.port.try_clone()?)
    }
}

impl<P> SerialConsole<P>
where
    P: Trigger + Read,
{
    pub fn new(port: P, trigger: bool) -> Self {
        SerialConsole {
            port,
            pending: Vec::new(),
            trigger,
            cts: false,
        }
    }

    fn take_line(&mut self) -> Option<String> {
        let end = self.pending.iter().position(|&b| b == b'\n' || b == b'\r')?;
        let line: Vec<u8> = self.pending.drain(..=end).collect();

        Some(String::from_utf8_lossy(&line).into_owned())
    }

    /// True on an inactive to active edge
    fn poll_trigger(&mut self) -> io::Result<bool> {
        if !self.trigger {
            return Ok(false);
        }

        let active = self.port.is_active()?;
        let rising = active && !self.cts;
        self.cts = active;

        Ok(rising)
    }
}

impl<P> Console for SerialConsole<P>
where
    P: Trigger + Read,
{
    fn next_event(&mut self) -> io::Result<Event> {
        let mut buf = [0; 64];

        loop {
            if let Some(line) = self.take_line() {
                return Ok(Event::Line(line));
            }

            if self.poll_trigger()? {
                log::debug!("Trigger edge");
                return Ok(Event::Trigger);
            }

            match self.port.read(&mut buf) {
                Ok(0) => return Ok(Event::Closed),
                Ok(readlen) => {
                    self.pending.extend_from_slice(&buf[..readlen]);
                    let unterminated = !self.pending.iter().any(|&b| b == b'\n' || b == b'\r');
                    if unterminated && self.pending.len() > MAX_LINE {
                        log::warn!("Dropping {} bytes without a line end", self.pending.len());
                        self.pending.clear();
                    }
                }
                Err(ref e) if e.kind() == io::ErrorKind::TimedOut => (),
                Err(e) => return Err(e),
            }
        }
    }
}

/// The digital input line
pub trait Trigger {
    fn is_active(&mut self) -> io::Result<bool>;
}

impl Trigger for Box<dyn SerialPort> {
    fn is_active(&mut self) -> io::Result<bool> {
        Ok(self.read_clear_to_send()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Scripted port: each step is either bytes to read, a timeout, or a
    /// CTS level change
    enum Step {
        Bytes(&'static [u8]),
        Timeout,
        Cts(bool),
    }

    struct FakePort {
        steps: VecDeque<Step>,
        cts: bool,
    }

    impl FakePort {
        fn new(steps: Vec<Step>) -> Self {
            FakePort {
                steps: steps.into_iter().collect(),
                cts: false,
            }
        }
    }

    impl Read for FakePort {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.steps.pop_front() {
                Some(Step::Bytes(bytes)) => {
                    buf[..bytes.len()].copy_from_slice(bytes);
                    Ok(bytes.len())
                }
                Some(Step::Timeout) => Err(io::ErrorKind::TimedOut.into()),
                Some(Step::Cts(level)) => {
                    self.cts = level;
                    Err(io::ErrorKind::TimedOut.into())
                }
                None => Ok(0),
            }
        }
    }

    impl Trigger for FakePort {
        fn is_active(&mut self) -> io::Result<bool> {
            Ok(self.cts)
        }
    }

    #[test]
    fn lines_are_split() {
        let port = FakePort::new(vec![
            Step::Bytes(b"vo"),
            Step::Timeout,
            Step::Bytes(b"l+\r\npla"),
            Step::Bytes(b"y\n"),
        ]);
        let mut console = SerialConsole::new(port, false);

        assert_eq!(console.next_event().unwrap(), Event::Line("vol+\r".into()));
        assert_eq!(console.next_event().unwrap(), Event::Line("\n".into()));
        assert_eq!(console.next_event().unwrap(), Event::Line("play\n".into()));
        assert_eq!(console.next_event().unwrap(), Event::Closed);
    }

    #[test]
    fn endless_line_is_dropped() {
        let mut steps: Vec<Step> = (0..5).map(|_| Step::Bytes(&[b'x'; 64])).collect();
        steps.push(Step::Bytes(b"1\n"));
        let mut console = SerialConsole::new(FakePort::new(steps), false);

        assert_eq!(console.next_event().unwrap(), Event::Line("1\n".into()));
        assert!(console.pending.is_empty());
    }

    #[test]
    fn stdin_survives_bad_bytes() {
        let input: &[u8] = b"vol+\n\xff\xfe\nvol-\n";
        let mut console = StdinConsole { input };

        assert_eq!(console.next_event().unwrap(), Event::Line("vol+\n".into()));
        assert_eq!(
            console.next_event().unwrap(),
            Event::Line("\u{FFFD}\u{FFFD}\n".into())
        );
        assert_eq!(console.next_event().unwrap(), Event::Line("vol-\n".into()));
        assert_eq!(console.next_event().unwrap(), Event::Closed);
    }

    #[test]
    fn trigger_fires_once_per_press() {
        let port = FakePort::new(vec![
            Step::Cts(true),
            Step::Timeout,
            Step::Timeout,
            Step::Cts(false),
            Step::Cts(true),
        ]);
        let mut console = SerialConsole::new(port, true);

        assert_eq!(console.next_event().unwrap(), Event::Trigger);
        assert_eq!(console.next_event().unwrap(), Event::Trigger);
        assert_eq!(console.next_event().unwrap(), Event::Closed);
    }

    #[test]
    fn trigger_ignored_when_disabled() {
        let port = FakePort::new(vec![Step::Cts(true), Step::Bytes(b"1\n")]);
        let mut console = SerialConsole::new(port, false);

        assert_eq!(console.next_event().unwrap(), Event::Line("1\n".into()));
    }
}
