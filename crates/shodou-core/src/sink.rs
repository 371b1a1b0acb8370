//! Output seams of the engine
//!
//! The engine never talks to a MIDI port or a renderer directly. It is handed
//! a [`NoteSink`] and an [`AnimationSink`] at construction time.

use crate::animation::BlobAnimation;
use serde::{Deserialize, Serialize};

/// Receiver of note and controller messages
///
/// Channels are 1-based (1-16). Implementations must not block.
pub trait NoteSink {
    /// Start a note that should be released after `duration` seconds
    fn note_on(&mut self, pitch: u8, velocity: u8, channel: u8, duration: f32);

    /// Send a controller value
    fn control_change(&mut self, controller: u8, value: u8, channel: u8);

    /// Advance the sink's clock; called once per engine tick
    fn advance(&mut self, _dt: f32) {}
}

/// Receiver of fire-and-forget blob animations
pub trait AnimationSink {
    /// Start an animation
    fn trigger(&mut self, animation: BlobAnimation);

    /// Advance running animations; called once per engine tick
    fn advance(&mut self, _dt: f32) {}
}

/// A message sent to a [`NoteSink`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NoteCommand {
    /// Note-on with its hold time
    NoteOn {
        /// Note number
        pitch: u8,
        /// Velocity
        velocity: u8,
        /// 1-based channel
        channel: u8,
        /// Seconds until note-off
        duration: f32,
    },
    /// Controller change
    ControlChange {
        /// Controller number
        controller: u8,
        /// Value (0-127)
        value: u8,
        /// 1-based channel
        channel: u8,
    },
}

/// A [`NoteSink`] that records everything it receives
#[derive(Debug, Clone, Default)]
pub struct NoteLog {
    commands: Vec<NoteCommand>,
}

impl NoteLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded commands in arrival order
    pub fn commands(&self) -> &[NoteCommand] {
        &self.commands
    }

    /// Only the note-on commands
    pub fn notes(&self) -> impl Iterator<Item = &NoteCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, NoteCommand::NoteOn { .. }))
    }

    /// Number of recorded note-ons
    pub fn note_count(&self) -> usize {
        self.notes().count()
    }

    /// Forget everything recorded so far
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl NoteSink for NoteLog {
    fn note_on(&mut self, pitch: u8, velocity: u8, channel: u8, duration: f32) {
        self.commands.push(NoteCommand::NoteOn {
            pitch,
            velocity,
            channel,
            duration,
        });
    }

    fn control_change(&mut self, controller: u8, value: u8, channel: u8) {
        self.commands.push(NoteCommand::ControlChange {
            controller,
            value,
            channel,
        });
    }
}

/// A note waiting for its note-off
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingNote {
    /// 1-based channel
    pub channel: u8,
    /// Note number
    pub pitch: u8,
    /// Seconds until release
    pub remaining: f32,
}

/// Note-off scheduler for sinks that need explicit releases
#[derive(Debug, Clone, Default)]
pub struct PendingNotes {
    notes: Vec<PendingNote>,
}

impl PendingNotes {
    /// Create an empty scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold a note for `duration` seconds
    pub fn hold(&mut self, channel: u8, pitch: u8, duration: f32) {
        self.notes.push(PendingNote {
            channel,
            pitch,
            remaining: duration.max(0.0),
        });
    }

    /// Advance by `dt` and return the notes whose time ran out
    pub fn advance(&mut self, dt: f32) -> Vec<PendingNote> {
        let mut expired = Vec::new();
        self.notes.retain_mut(|note| {
            note.remaining -= dt;
            if note.remaining <= 0.0 {
                expired.push(*note);
                false
            } else {
                true
            }
        });
        expired
    }

    /// Remove and return every held note
    pub fn drain(&mut self) -> Vec<PendingNote> {
        std::mem::take(&mut self.notes)
    }

    /// Number of held notes
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// True if nothing is held
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_log_records_in_order() {
        let mut log = NoteLog::new();
        log.note_on(60, 100, 1, 0.5);
        log.control_change(10, 64, 1);

        assert_eq!(log.commands().len(), 2);
        assert_eq!(log.note_count(), 1);
        assert!(matches!(
            log.commands()[1],
            NoteCommand::ControlChange { controller: 10, .. }
        ));
    }

    #[test]
    fn test_pending_notes_expire() {
        let mut pending = PendingNotes::new();
        pending.hold(1, 60, 0.5);
        pending.hold(2, 62, 1.0);

        assert!(pending.advance(0.25).is_empty());

        let expired = pending.advance(0.25);
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].pitch, 60);
        assert_eq!(pending.len(), 1);

        let rest = pending.drain();
        assert_eq!(rest[0].channel, 2);
        assert!(pending.is_empty());
    }
}
