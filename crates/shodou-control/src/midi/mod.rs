//! MIDI messages and output

#[cfg(feature = "midi")]
mod hardware;
mod output;

#[cfg(feature = "midi")]
pub use hardware::*;
pub use output::*;

use serde::{Deserialize, Serialize};

/// MIDI message types sent by the installation
///
/// `channel` is the wire nibble (0-15).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MidiMessage {
    NoteOn {
        channel: u8,
        note: u8,
        velocity: u8,
    },
    NoteOff {
        channel: u8,
        note: u8,
    },
    ControlChange {
        channel: u8,
        controller: u8,
        value: u8,
    },
}

impl MidiMessage {
    /// Parse a MIDI message from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 3 {
            return None;
        }

        let status = bytes[0];
        let message_type = status & 0xF0;
        let channel = status & 0x0F;

        match message_type {
            0x90 => {
                let velocity = bytes[2];
                if velocity == 0 {
                    // Note On with velocity 0 is treated as Note Off
                    Some(MidiMessage::NoteOff {
                        channel,
                        note: bytes[1],
                    })
                } else {
                    Some(MidiMessage::NoteOn {
                        channel,
                        note: bytes[1],
                        velocity,
                    })
                }
            }
            0x80 => Some(MidiMessage::NoteOff {
                channel,
                note: bytes[1],
            }),
            0xB0 => Some(MidiMessage::ControlChange {
                channel,
                controller: bytes[1],
                value: bytes[2],
            }),
            _ => None,
        }
    }

    /// Convert to raw MIDI bytes
    pub fn to_bytes(&self) -> [u8; 3] {
        match *self {
            MidiMessage::NoteOn {
                channel,
                note,
                velocity,
            } => [0x90 | (channel & 0x0F), note & 0x7F, velocity & 0x7F],
            MidiMessage::NoteOff { channel, note } => [0x80 | (channel & 0x0F), note & 0x7F, 0],
            MidiMessage::ControlChange {
                channel,
                controller,
                value,
            } => [0xB0 | (channel & 0x0F), controller & 0x7F, value & 0x7F],
        }
    }
}

/// Convert a 1-based channel (1-16) to the wire nibble.
///
/// 0 is treated as channel 1 and values above 16 as channel 16.
pub fn wire_channel(channel: u8) -> u8 {
    channel.clamp(1, 16) - 1
}
