//! NEC frame encoding and decoding.
//!
//! A frame is a 9 ms leader mark and 4.5 ms space, followed by 32 bits sent
//! least significant bit first: address, inverted address, command, inverted
//! command. Every bit is a short mark followed by a short (0) or long (1)
//! space. A stop mark closes the frame.
//!
//! Frames are built here; decoding goes through the `infrared` NEC receiver.

use std::error::Error;
use std::fmt;

use infrared::protocols::nec::NecRawCommand;
use infrared::protocols::NecDebug;
use infrared::recv::{self, EventReceiver};

/// Carrier frequency in Hz
pub const CARRIER_HZ: u32 = 38_000;
/// Carrier duty cycle in percent
pub const DUTY_PERCENT: u8 = 33;

pub const LEADER_MARK: u16 = 9000;
pub const LEADER_SPACE: u16 = 4500;
pub const BIT_MARK: u16 = 560;
pub const ZERO_SPACE: u16 = 560;
pub const ONE_SPACE: u16 = 1690;
pub const STOP_MARK: u16 = 560;

/// Decoder tick rate. The receiver's tolerance windows overflow a u32 well
/// below 1 MHz, so durations are scaled down to 10 us ticks.
const SAMPLERATE: u32 = 100_000;

/// Number of durations in a frame: leader, 32 mark/space pairs and the stop mark
pub const FRAME_LEN: usize = 2 + 32 * 2 + 1;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct NecCommand {
    pub addr: u8,
    pub cmd: u8,
}

impl NecCommand {
    pub fn new(addr: u8, cmd: u8) -> Self {
        NecCommand { addr, cmd }
    }

    /// The 32 bit payload. Bit 0 is sent first.
    pub fn bits(&self) -> u32 {
        u32::from(self.addr)
            | u32::from(!self.addr) << 8
            | u32::from(self.cmd) << 16
            | u32::from(!self.cmd) << 24
    }

    pub fn from_bits(bits: u32) -> Result<Self, DecodeError> {
        let addr = bits as u8;
        let addr_inv = (bits >> 8) as u8;
        let cmd = (bits >> 16) as u8;
        let cmd_inv = (bits >> 24) as u8;

        if addr_inv != !addr {
            return Err(DecodeError::AddressCheck);
        }
        if cmd_inv != !cmd {
            return Err(DecodeError::CommandCheck);
        }

        Ok(NecCommand { addr, cmd })
    }

    pub fn encode(&self) -> PulseFrame {
        let mut pulses = [0; FRAME_LEN];
        pulses[0] = LEADER_MARK;
        pulses[1] = LEADER_SPACE;

        let bits = self.bits();
        for bit in 0..32 {
            let space = if bits & (1 << bit) != 0 {
                ONE_SPACE
            } else {
                ZERO_SPACE
            };
            pulses[2 + bit * 2] = BIT_MARK;
            pulses[3 + bit * 2] = space;
        }
        pulses[FRAME_LEN - 1] = STOP_MARK;

        PulseFrame {
            command: *self,
            pulses,
        }
    }
}

/// Mark and space durations, in microseconds, of one frame. Even indices are
/// carrier-on marks, odd indices are spaces.
#[derive(Clone, PartialEq, Eq)]
pub struct PulseFrame {
    command: NecCommand,
    pulses: [u16; FRAME_LEN],
}

impl PulseFrame {
    pub fn command(&self) -> NecCommand {
        self.command
    }

    pub fn pulses(&self) -> &[u16] {
        &self.pulses
    }

    /// Time on air in microseconds
    pub fn duration_us(&self) -> u32 {
        self.pulses.iter().map(|&p| u32::from(p)).sum()
    }
}

impl fmt::Debug for PulseFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PulseFrame")
            .field("addr", &format_args!("{:#04X}", self.command.addr))
            .field("cmd", &format_args!("{:#04X}", self.command.cmd))
            .field("duration_us", &self.duration_us())
            .finish()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The durations ended before a whole frame was seen
    Incomplete,
    /// Bit timing the receiver does not accept
    Timing(recv::Error),
    AddressCheck,
    CommandCheck,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Incomplete => write!(f, "incomplete frame"),
            DecodeError::Timing(err) => write!(f, "bad timing ({:?})", err),
            DecodeError::AddressCheck => write!(f, "address does not match its complement"),
            DecodeError::CommandCheck => write!(f, "command does not match its complement"),
        }
    }
}

impl Error for DecodeError {}

/// Edge driven NEC decoder. The receiver state machine hands over the raw
/// 32 bits, the complement bytes are checked here.
pub struct Decoder {
    receiver: EventReceiver<NecDebug>,
}

impl Decoder {
    /// `samplerate` is the unit of the `dt` given to `event`, in Hz
    pub fn new(samplerate: u32) -> Self {
        Decoder {
            receiver: EventReceiver::new(samplerate),
        }
    }

    /// The line went to level `rising`, `dt` samples after the previous edge
    pub fn event(&mut self, rising: bool, dt: u32) -> Result<Option<NecCommand>, DecodeError> {
        match self.receiver.edge_event(rising, dt) {
            Ok(Some(NecRawCommand { bits })) => NecCommand::from_bits(bits).map(Some),
            Ok(None) => Ok(None),
            Err(err) => Err(DecodeError::Timing(err)),
        }
    }
}

fn ticks(us: u32) -> u32 {
    (u64::from(us) * u64::from(SAMPLERATE) / 1_000_000) as u32
}

/// Decode one frame from its mark/space durations in microseconds
pub fn decode<T: Copy + Into<u32>>(pulses: &[T]) -> Result<NecCommand, DecodeError> {
    let mut decoder = Decoder::new(SAMPLERATE);

    for (i, &dt) in pulses.iter().enumerate() {
        // A mark ends on a falling edge, a space on a rising one
        let rising = i % 2 == 1;
        if let Some(cmd) = decoder.event(rising, ticks(dt.into()))? {
            return Ok(cmd);
        }
    }

    Err(DecodeError::Incomplete)
}

/// Find and decode every frame in a trace of `(level, duration_us)` spans
pub fn frames_in(spans: &[(bool, u32)]) -> Vec<Result<NecCommand, DecodeError>> {
    let mut decoder = Decoder::new(SAMPLERATE);

    spans
        .iter()
        .filter_map(|&(high, dt)| decoder.event(!high, ticks(dt)).transpose())
        .collect()
}
