//! Shodou Core - Blob Sequencing Engine
//!
//! This crate contains the real-time core of the Shodou installation:
//! - Resolution-independent blob model built from raw contours
//! - Note mapping from blob geometry to notes and controller values
//! - Vertical, ordinal and random sequencers walking the blob set
//! - The engine owning the blob collection and ticking the sequencers
//! - Event fan-out and fire-and-forget blob animations
//! - Rig configuration and logging configuration

#![warn(missing_docs)]

pub use glam::Vec2;

pub mod animation;
pub mod blob;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod ingest;
pub mod logging;
pub mod mapping;
pub mod note;
pub mod sequencer;
pub mod sink;

// --- Re-exports grouped by category ---

// Blob model
pub use blob::{Blob, RawBlob, Rect};

// Sequencing
pub use engine::BlobSequencingEngine;
pub use event::{BlobNoteEvent, EventBus};
pub use sequencer::{
    Fire, OrdinalSequencer, Overlay, RandomSequencer, Rgba, Sequence, Sequencer,
    SequencerBase, VerticalSequencer,
};

// Output
pub use animation::{AnimationManager, BlobAnimation};
pub use note::{LengthScaling, NoteMapping, NotePlan};
pub use sink::{AnimationSink, NoteCommand, NoteLog, NoteSink, PendingNote, PendingNotes};

// Ingestion
pub use ingest::{
    ingest_at_point, ingest_frame, ingest_tiled, tile_offsets, tiled_extent, RawFrame, ScanMode,
};

// Configuration & Logging
pub use config::{RigConfig, SequencerConfig};
pub use error::{CoreError, Result};
pub use logging::LogConfig;
