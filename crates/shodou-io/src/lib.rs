//! Shodou IO - Recorded Detection Captures
//!
//! A capture is a sequence of detected contour frames stored as RON or JSON.
//! Replaying one drives the engine exactly like a live contour finder.

#![warn(missing_docs)]

pub mod capture;
pub mod error;

pub use capture::{Capture, CaptureMetadata, CAPTURE_FILE_VERSION, MAX_CAPTURE_FILE_SIZE};
pub use error::{IoError, Result};
