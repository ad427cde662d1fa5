use std::io::{self, Read, Write};
use std::path::Path;
use std::time::Duration;

use heapless::consts::U512;
use postcard::{from_bytes, to_vec};
use serialport::{SerialPort, SerialPortInfo, SerialPortSettings};

use crate::protocol::{Command, Reply};

const BAUD_RATE: u32 = 115_200;
const READ_TIMEOUT: Duration = Duration::from_millis(100);
/// Read timeouts tolerated while waiting for a reply
const REPLY_ATTEMPTS: usize = 10;

pub struct SerialLink {
    port: Option<Box<dyn SerialPort>>,
}

impl SerialLink {
    pub fn new() -> Self {
        SerialLink { port: None }
    }

    pub fn list_ports() -> Result<Vec<SerialPortInfo>, serialport::Error> {
        serialport::available_ports()
    }

    pub fn connect<P: AsRef<Path>>(&mut self, path: P) -> Result<(), serialport::Error> {
        let settings = SerialPortSettings {
            baud_rate: BAUD_RATE,
            timeout: READ_TIMEOUT,
            ..Default::default()
        };

        let port = serialport::open_with_settings(path.as_ref(), &settings)?;
        log::debug!("Connected to {:?}", port.name());

        self.port.replace(port);

        Ok(())
    }

    fn port(&mut self) -> io::Result<&mut Box<dyn SerialPort>> {
        self.port
            .as_mut()
            .ok_or_else(|| io::ErrorKind::NotConnected.into())
    }

    pub fn send_command(&mut self, cmd: Command) -> io::Result<()> {
        let req: heapless::Vec<u8, U512> = to_vec(&cmd)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, format!("{:?}", err)))?;

        self.port()?.write_all(&req)
    }

    pub fn read_reply(&mut self) -> io::Result<Reply> {
        let mut recvbuf = [0; 1024];
        let mut offset = 0;
        let mut timeouts = 0;

        let port = self.port()?;

        while offset < recvbuf.len() {
            match port.read(&mut recvbuf[offset..]) {
                Ok(readlen) => offset += readlen,
                Err(ref e) if e.kind() == io::ErrorKind::TimedOut => {
                    timeouts += 1;
                    if timeouts >= REPLY_ATTEMPTS {
                        return Err(io::ErrorKind::TimedOut.into());
                    }
                    continue;
                }
                Err(e) => return Err(e),
            }

            match from_bytes::<Reply>(&recvbuf[..offset]) {
                Ok(reply) => return Ok(reply),
                // Partial reply, keep reading
                Err(postcard::Error::DeserializeUnexpectedEnd) => continue,
                Err(err) => {
                    log::debug!("Bad reply {:?}: {:?}", &recvbuf[..offset], err);
                    break;
                }
            }
        }

        Err(io::ErrorKind::InvalidData.into())
    }

    pub fn reply_ok(&mut self) -> io::Result<()> {
        match self.read_reply()? {
            Reply::Ok => Ok(()),
            reply => {
                log::debug!("Expected Ok, got {:?}", reply);
                Err(io::ErrorKind::InvalidData.into())
            }
        }
    }
}

impl Default for SerialLink {
    fn default() -> Self {
        SerialLink::new()
    }
}
