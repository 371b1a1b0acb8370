//! Shodou Control - Outputs and Operator Input
//!
//! This crate connects the sequencing core to the outside world:
//! - **MIDI**: note sink with scheduled note-offs over a pluggable transport
//! - **Shortcuts**: key bindings mapped to engine actions
//!
//! ## Feature Flags
//!
//! - `midi`: Enable the hardware MIDI transport (requires `midir`)
//!
//! ## Modules
//!
//! - [`midi`] - MIDI messages and the note output
//! - [`shortcuts`] - Keyboard shortcuts
//! - [`error`] - Error types

#![allow(missing_docs)]

/// Error types
pub mod error;

/// MIDI messages and output
pub mod midi;

/// Keyboard shortcuts
pub mod shortcuts;

// Re-exports
pub use error::{ControlError, Result};
pub use midi::{MemoryTransport, MidiMessage, MidiNoteOutput, MidiTransport};
pub use shortcuts::{Action, Key, KeyBindings, Shortcut};

#[cfg(feature = "midi")]
pub use midi::MidirTransport;
