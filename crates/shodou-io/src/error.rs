//! Error types for capture files.

/// Result type alias for capture operations.
pub type Result<T> = std::result::Result<T, IoError>;

/// Error type for capture operations.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Generic I/O error
    #[error("I/O error: {0}")]
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

    /// File larger than the allowed limit
    #[error("File too large: {size} bytes (limit {limit} bytes)")]
    FileTooLarge {
        /// Actual file size in bytes
        size: u64,
        /// Maximum accepted size in bytes
        limit: u64,
    },

    /// File extension is not a known capture format
    #[error("Unsupported capture format: {0}")]
    UnsupportedFormat(String),

    /// Capture content is unusable
    #[error("Invalid capture: {0}")]
    InvalidCapture(String),
}
