//! MIDI note output
//!
//! [`MidiNoteOutput`] is the engine's note sink for real MIDI. Note-ons and
//! controller changes go out immediately; each note-off is scheduled and sent
//! from `advance` once the note's duration has elapsed.

use super::{wire_channel, MidiMessage};
use crate::error::Result;
use shodou_core::{NoteSink, PendingNotes};
use tracing::warn;

/// Anything that can put raw MIDI bytes on a wire
pub trait MidiTransport {
    /// Send one message
    fn send(&mut self, message: &[u8]) -> Result<()>;
}

/// Transport that keeps every message in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    messages: Vec<MidiMessage>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages sent so far, in order
    pub fn messages(&self) -> &[MidiMessage] {
        &self.messages
    }
}

impl MidiTransport for MemoryTransport {
    fn send(&mut self, message: &[u8]) -> Result<()> {
        if let Some(msg) = MidiMessage::from_bytes(message) {
            self.messages.push(msg);
        }
        Ok(())
    }
}

/// Note sink writing to a [`MidiTransport`]
///
/// Channels arrive 1-based and leave as wire nibbles. Notes still held when
/// the output is dropped are released.
pub struct MidiNoteOutput<T: MidiTransport> {
    transport: T,
    pending: PendingNotes,
    send_failures: usize,
}

impl<T: MidiTransport> MidiNoteOutput<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            pending: PendingNotes::new(),
            send_failures: 0,
        }
    }

    /// The underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Notes waiting for their note-off
    pub fn held_notes(&self) -> usize {
        self.pending.len()
    }

    /// Messages the transport refused
    pub fn send_failures(&self) -> usize {
        self.send_failures
    }

    /// Send note-off for every held note now
    pub fn release_all(&mut self) {
        for note in self.pending.drain() {
            self.send(MidiMessage::NoteOff {
                channel: wire_channel(note.channel),
                note: note.pitch,
            });
        }
    }

    fn send(&mut self, message: MidiMessage) {
        if let Err(e) = self.transport.send(&message.to_bytes()) {
            // Log the first failure only
            if self.send_failures == 0 {
                warn!("MIDI send failed: {}", e);
            }
            self.send_failures += 1;
        }
    }
}

impl<T: MidiTransport> NoteSink for MidiNoteOutput<T> {
    fn note_on(&mut self, pitch: u8, velocity: u8, channel: u8, duration: f32) {
        self.send(MidiMessage::NoteOn {
            channel: wire_channel(channel),
            note: pitch,
            velocity,
        });
        self.pending.hold(channel, pitch, duration);
    }

    fn control_change(&mut self, controller: u8, value: u8, channel: u8) {
        self.send(MidiMessage::ControlChange {
            channel: wire_channel(channel),
            controller,
            value,
        });
    }

    fn advance(&mut self, dt: f32) {
        for note in self.pending.advance(dt) {
            self.send(MidiMessage::NoteOff {
                channel: wire_channel(note.channel),
                note: note.pitch,
            });
        }
    }
}

impl<T: MidiTransport> Drop for MidiNoteOutput<T> {
    fn drop(&mut self) {
        self.release_all();
    }
}
