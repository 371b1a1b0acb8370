//! Error types for the sequencing core
use thiserror::Error;

/// Core error types
///
/// The per-frame path never produces these; they come from loading and
/// validating configuration.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A configuration value is out of its allowed range
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// File extension is not a known config format
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// RON deserialization error
    #[error("RON parse error: {0}")]
    RonParse(#[from] ron::error::SpannedError),

    /// RON serialization error
    #[error("RON error: {0}")]
    Ron(#[from] ron::Error),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
