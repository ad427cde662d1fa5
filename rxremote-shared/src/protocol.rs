//! Host to device messages, postcard encoded.
//!
//! Variant tags follow the blipper firmware, so `RemoteControlSend` drives a
//! stock blipper. `Transmit` takes the first free tag after blipper's own.

use serde::{Deserialize, Serialize, Serializer};

use crate::nec::{PulseFrame, CARRIER_HZ, DUTY_PERCENT};

/// Durations a single `PulseData` can carry
pub const PULSE_CAPACITY: usize = 3 * 32;

/// Wire tag of `Command::RemoteControlSend`, as in blipper
pub const TAG_REMOTE_CONTROL_SEND: u32 = 4;
/// Wire tag of `Command::Transmit`
pub const TAG_TRANSMIT: u32 = 5;

#[derive(Debug, Eq, PartialEq)]
pub enum Command {
    /// Let the device encode the frame itself
    RemoteControlSend(RemoteControlCmd),
    /// Modulate and send the durations as given
    Transmit(PulseData),
}

impl Serialize for Command {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Command::RemoteControlSend(cmd) => serializer.serialize_newtype_variant(
                "Command",
                TAG_REMOTE_CONTROL_SEND,
                "RemoteControlSend",
                cmd,
            ),
            Command::Transmit(data) => {
                serializer.serialize_newtype_variant("Command", TAG_TRANSMIT, "Transmit", data)
            }
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Eq, PartialEq)]
pub enum Reply {
    Ok,
}

/// Mark/space durations in microseconds, starting with a mark. Serde only
/// handles arrays up to 32 elements, hence the chunks.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq)]
pub struct PulseData {
    pub carrier_hz: u32,
    pub duty_percent: u8,
    pub len: u32,
    pub bufs: [[u16; 32]; 3],
}

impl PulseData {
    pub fn from_frame(frame: &PulseFrame) -> Self {
        let pulses = frame.pulses();
        let mut data = PulseData {
            carrier_hz: CARRIER_HZ,
            duty_percent: DUTY_PERCENT,
            len: pulses.len() as u32,
            bufs: [[0; 32]; 3],
        };

        for (i, &dt) in pulses.iter().enumerate().take(PULSE_CAPACITY) {
            data.bufs[i / 32][i % 32] = dt;
        }

        data
    }

    pub fn pulses(&self) -> Vec<u16> {
        let len = (self.len as usize).min(PULSE_CAPACITY);
        self.bufs.concat()[..len].to_vec()
    }
}

#[derive(Serialize, Deserialize, Debug, Eq, PartialEq)]
pub struct RemoteControlCmd {
    pub pid: u8,
    pub addr: u16,
    pub cmd: u8,
}

impl RemoteControlCmd {
    pub fn nec(addr: u8, cmd: u8) -> Self {
        RemoteControlCmd {
            pid: infrared::ProtocolId::Nec as u8,
            addr: u16::from(addr),
            cmd,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nec::{self, NecCommand};

    #[test]
    fn pulse_data_holds_a_frame() {
        let frame = NecCommand::new(0x78, 0x57).encode();
        let data = PulseData::from_frame(&frame);

        assert_eq!(data.len, nec::FRAME_LEN as u32);
        assert_eq!(data.carrier_hz, 38_000);
        assert_eq!(data.pulses(), frame.pulses().to_vec());
        assert_eq!(data.bufs[2][nec::FRAME_LEN - 64], 0);
    }

    #[cfg(feature = "utils")]
    #[test]
    fn wire_tags_match_blipper() {
        let mut buf = [0; 256];

        let cmd = Command::RemoteControlSend(RemoteControlCmd::nec(0x78, 0x1E));
        let bytes = postcard::to_slice(&cmd, &mut buf).unwrap();
        assert_eq!(bytes, &[4, 1, 0x78, 0x00, 0x1E]);

        let frame = NecCommand::new(0x78, 0x1E).encode();
        let cmd = Command::Transmit(PulseData::from_frame(&frame));
        let bytes = postcard::to_slice(&cmd, &mut buf).unwrap();
        // tag, carrier_hz, duty_percent, len, then the first duration
        assert_eq!(&bytes[..12], &[5, 0x70, 0x94, 0, 0, 33, 67, 0, 0, 0, 0x28, 0x23]);
    }
}
