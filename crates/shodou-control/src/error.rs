//! Error types for the control layer
use thiserror::Error;

/// Control errors
#[derive(Error, Debug)]
pub enum ControlError {
    /// Generic MIDI error
    #[error("MIDI error: {0}")]
    MidiError(String),

    /// No output port could be opened
    #[error("MIDI port not found: {0}")]
    PortNotFound(String),

    /// MIDI initialization error
    #[error("MIDI init error: {0}")]
    #[cfg(feature = "midi")]
    MidiInitError(#[from] midir::InitError),

    /// MIDI transmission error
    #[error("MIDI send error: {0}")]
    #[cfg(feature = "midi")]
    MidiSendError(#[from] midir::SendError),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid parameter value
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for control operations
pub type Result<T> = std::result::Result<T, ControlError>;
