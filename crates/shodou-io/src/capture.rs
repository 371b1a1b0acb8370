//! Defines the on-disk capture format.
//!
//! A capture stores the contour finder output of a recorded session, one
//! [`RawFrame`] per video frame, together with the frame rate it was recorded
//! at. It is serialized to and from RON or JSON.

use crate::error::{IoError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shodou_core::RawFrame;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::info;

/// The current version of the capture file format.
pub const CAPTURE_FILE_VERSION: &str = "1.0.0";

/// Maximum allowed capture file size (64 MB).
pub const MAX_CAPTURE_FILE_SIZE: u64 = 64 * 1024 * 1024;

/// A recorded sequence of detected frames
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Capture {
    /// The version of the capture file format.
    pub version: String,
    /// Frames per second the capture was recorded at.
    pub fps: f32,
    /// Metadata about the recording.
    #[serde(default)]
    pub metadata: CaptureMetadata,
    /// Detected frames in playback order.
    pub frames: Vec<RawFrame>,
}

/// Metadata associated with a capture file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaptureMetadata {
    /// When the capture was recorded.
    pub recorded_at: DateTime<Utc>,
    /// Free-form description of the source.
    #[serde(default)]
    pub source: String,
}

impl Default for CaptureMetadata {
    fn default() -> Self {
        Self {
            recorded_at: Utc::now(),
            source: String::new(),
        }
    }
}

impl Capture {
    /// Creates an empty capture recorded now.
    pub fn new(fps: f32) -> Self {
        Self {
            version: CAPTURE_FILE_VERSION.to_string(),
            fps,
            metadata: CaptureMetadata::default(),
            frames: Vec::new(),
        }
    }

    /// Appends a frame.
    pub fn push_frame(&mut self, frame: RawFrame) {
        self.frames.push(frame);
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// True if the capture holds no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Seconds between two frames.
    pub fn frame_interval(&self) -> f32 {
        1.0 / self.fps
    }

    /// Rejects captures that cannot be replayed.
    pub fn validate(&self) -> Result<()> {
        if !self.fps.is_finite() || self.fps <= 0.0 {
            return Err(IoError::InvalidCapture(format!(
                "fps {} must be positive",
                self.fps
            )));
        }
        Ok(())
    }

    /// Loads a `Capture` from the given path.
    ///
    /// The format follows the file extension: `.json`, or RON for `.ron` and
    /// files without an extension.
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with_limit(path, MAX_CAPTURE_FILE_SIZE)
    }

    /// Loads a `Capture` with a specific file size limit.
    pub fn load_with_limit(path: &Path, limit: u64) -> Result<Self> {
        // Check file size first
        let size = std::fs::metadata(path)?.len();
        if size > limit {
            return Err(IoError::FileTooLarge { size, limit });
        }

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("ron");

        let mut content = String::new();
        let capture: Capture = match extension {
            "json" => {
                File::open(path)?.read_to_string(&mut content)?;
                serde_json::from_str(&content)?
            }
            "ron" => {
                File::open(path)?.read_to_string(&mut content)?;
                ron::from_str(&content)?
            }
            _ => return Err(IoError::UnsupportedFormat(extension.to_string())),
        };
        capture.validate()?;

        info!(
            "Loaded capture {:?}: {} frames at {} fps",
            path,
            capture.len(),
            capture.fps
        );
        Ok(capture)
    }

    /// Saves the `Capture` to the given path, format chosen by extension.
    pub fn save(&self, path: &Path) -> Result<()> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("ron");

        match extension {
            "json" => {
                let file = File::create(path)?;
                serde_json::to_writer_pretty(file, self)?;
            }
            "ron" => {
                let config = ron::ser::PrettyConfig::default();
                let s = ron::ser::to_string_pretty(self, config)?;
                let mut file = File::create(path)?;
                file.write_all(s.as_bytes())?;
            }
            _ => return Err(IoError::UnsupportedFormat(extension.to_string())),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shodou_core::{RawBlob, Rect, Vec2};
    use tempfile::NamedTempFile;

    fn sample() -> Capture {
        let mut capture = Capture::new(30.0);
        capture.push_frame(RawFrame {
            width: 640.0,
            height: 480.0,
            offset_w: 0.0,
            blobs: vec![RawBlob {
                points: vec![Vec2::new(10.0, 10.0), Vec2::new(20.0, 10.0)],
                bounding_rect: Rect::new(10.0, 10.0, 10.0, 0.0),
                centroid: Vec2::new(15.0, 10.0),
                area: 0.0,
                length: 20.0,
                hole: false,
            }],
        });
        capture
    }

    #[test]
    fn capture_ron_roundtrip() {
        let capture = sample();
        let file = NamedTempFile::new().unwrap();
        let path = file.path().with_extension("ron");

        capture.save(&path).unwrap();
        let loaded = Capture::load(&path).unwrap();
        assert_eq!(capture, loaded);

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn capture_json_roundtrip() {
        let capture = sample();
        let file = NamedTempFile::new().unwrap();
        let path = file.path().with_extension("json");

        capture.save(&path).unwrap();
        let loaded = Capture::load(&path).unwrap();
        assert_eq!(capture, loaded);

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn capture_too_large_is_rejected() {
        let capture = sample();
        let file = NamedTempFile::new().unwrap();
        let path = file.path().with_extension("json");
        capture.save(&path).unwrap();

        let result = Capture::load_with_limit(&path, 10);
        assert!(matches!(result, Err(IoError::FileTooLarge { limit: 10, .. })));

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn capture_unsupported_extension() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().with_extension("mp4");
        std::fs::write(&path, "x").unwrap();

        assert!(matches!(
            Capture::load(&path),
            Err(IoError::UnsupportedFormat(ext)) if ext == "mp4"
        ));
        assert!(matches!(
            sample().save(&path),
            Err(IoError::UnsupportedFormat(_))
        ));

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn capture_with_invalid_fps_is_rejected() {
        let mut capture = sample();
        capture.fps = 0.0;
        let file = NamedTempFile::new().unwrap();
        let path = file.path().with_extension("json");
        capture.save(&path).unwrap();

        assert!(matches!(
            Capture::load(&path),
            Err(IoError::InvalidCapture(_))
        ));

        std::fs::remove_file(path).unwrap();
    }
}
