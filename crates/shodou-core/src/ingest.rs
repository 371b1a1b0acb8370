//! Feeding detected contours into the engine
//!
//! In [`ScanMode::Auto`] the collection is rebuilt from every frame. In
//! [`ScanMode::Manual`] it is only changed by the operator picking blobs at a
//! point or removing them.
//!
//! Several inputs can be tiled side by side; each tile's blobs are normalized
//! against the combined extent with the tile's horizontal offset.

use crate::blob::RawBlob;
use crate::engine::BlobSequencingEngine;
use crate::sink::{AnimationSink, NoteSink};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// How the blob collection follows detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ScanMode {
    /// Rebuild from every detected frame
    #[default]
    Auto,
    /// Only change on operator request
    Manual,
}

impl ScanMode {
    /// The other mode
    pub fn toggled(self) -> Self {
        match self {
            ScanMode::Auto => ScanMode::Manual,
            ScanMode::Manual => ScanMode::Auto,
        }
    }
}

/// Contours of one input for one frame, in source pixels
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawFrame {
    /// Width used for normalization
    pub width: f32,
    /// Height used for normalization
    pub height: f32,
    /// Horizontal tiling offset in pixels
    #[serde(default)]
    pub offset_w: f32,
    /// Detected contours
    pub blobs: Vec<RawBlob>,
}

impl RawFrame {
    fn has_valid_size(&self) -> bool {
        let valid = self.width > 0.0 && self.height > 0.0;
        if !valid {
            warn!(
                "Skipping frame with non-positive size {}x{}",
                self.width, self.height
            );
        }
        valid
    }
}

/// Replace the collection with every blob of `frame`
pub fn ingest_frame<N: NoteSink, A: AnimationSink>(
    engine: &mut BlobSequencingEngine<N, A>,
    frame: &RawFrame,
) {
    ingest_tiled(engine, std::slice::from_ref(frame));
}

/// Replace the collection with every blob of all tiles, in tile order
pub fn ingest_tiled<N: NoteSink, A: AnimationSink>(
    engine: &mut BlobSequencingEngine<N, A>,
    frames: &[RawFrame],
) {
    engine.clear_blobs();
    for frame in frames.iter().filter(|f| f.has_valid_size()) {
        for raw in &frame.blobs {
            engine.add_blob(raw, frame.width, frame.height, frame.offset_w);
        }
    }
}

/// Add the blobs under `(x, y)` and the blobs nested inside them.
///
/// `(x, y)` is in the frame's source pixels. Returns the number of blobs added.
pub fn ingest_at_point<N: NoteSink, A: AnimationSink>(
    engine: &mut BlobSequencingEngine<N, A>,
    frame: &RawFrame,
    x: f32,
    y: f32,
) -> usize {
    if !frame.has_valid_size() {
        return 0;
    }

    let mut added = 0;
    for outer in frame
        .blobs
        .iter()
        .filter(|b| b.bounding_rect.contains(x, y))
    {
        engine.add_blob(outer, frame.width, frame.height, frame.offset_w);
        added += 1;

        for inner in frame.blobs.iter().filter(|b| {
            b.centroid != outer.centroid && outer.bounding_rect.contains_rect(&b.bounding_rect)
        }) {
            engine.add_blob(inner, frame.width, frame.height, frame.offset_w);
            added += 1;
        }
    }

    debug!("Picked {} blobs at ({:.1}, {:.1})", added, x, y);
    added
}

/// Horizontal offset of each tile: the sum of the widths before it
pub fn tile_offsets(widths: &[f32]) -> Vec<f32> {
    widths
        .iter()
        .scan(0.0, |acc, &w| {
            let offset = *acc;
            *acc += w;
            Some(offset)
        })
        .collect()
}

/// Combined frame size of tiles laid out side by side
pub fn tiled_extent(sizes: &[(f32, f32)]) -> (f32, f32) {
    sizes
        .iter()
        .fold((0.0, 0.0), |(w, h), &(tw, th)| (w + tw, f32::max(h, th)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::Rect;
    use glam::Vec2;

    fn raw(x: f32, y: f32, side: f32) -> RawBlob {
        RawBlob {
            points: vec![Vec2::new(x, y)],
            bounding_rect: Rect::new(x, y, side, side),
            centroid: Vec2::new(x + side / 2.0, y + side / 2.0),
            area: side * side,
            length: side * 4.0,
            hole: false,
        }
    }

    fn frame(blobs: Vec<RawBlob>) -> RawFrame {
        RawFrame {
            width: 100.0,
            height: 100.0,
            offset_w: 0.0,
            blobs,
        }
    }

    #[test]
    fn test_ingest_frame_replaces_collection() {
        let mut engine = BlobSequencingEngine::default();
        ingest_frame(&mut engine, &frame(vec![raw(0.0, 0.0, 10.0), raw(50.0, 50.0, 10.0)]));
        assert_eq!(engine.blobs().len(), 2);

        ingest_frame(&mut engine, &frame(vec![raw(20.0, 20.0, 10.0)]));
        assert_eq!(engine.blobs().len(), 1);
        assert_eq!(engine.blobs()[0].centroid, Vec2::new(0.25, 0.25));
    }

    #[test]
    fn test_invalid_frame_is_skipped() {
        let mut engine = BlobSequencingEngine::default();
        let mut bad = frame(vec![raw(0.0, 0.0, 10.0)]);
        bad.width = 0.0;
        ingest_frame(&mut engine, &bad);
        assert!(engine.blobs().is_empty());
        assert_eq!(ingest_at_point(&mut engine, &bad, 5.0, 5.0), 0);
    }

    #[test]
    fn test_ingest_at_point_adds_nested() {
        let mut engine = BlobSequencingEngine::default();
        let mut inner = raw(20.0, 20.0, 10.0);
        inner.hole = true;
        let f = frame(vec![raw(10.0, 10.0, 40.0), inner, raw(70.0, 70.0, 10.0)]);

        assert_eq!(ingest_at_point(&mut engine, &f, 15.0, 15.0), 2);
        assert!(!engine.blobs()[0].hole);
        assert!(engine.blobs()[1].hole);

        // Nothing under the point
        assert_eq!(ingest_at_point(&mut engine, &f, 60.0, 5.0), 0);
        assert_eq!(engine.blobs().len(), 2);
    }

    #[test]
    fn test_tiling() {
        assert_eq!(tile_offsets(&[320.0, 640.0, 320.0]), vec![0.0, 320.0, 960.0]);
        assert!(tile_offsets(&[]).is_empty());
        assert_eq!(tiled_extent(&[(320.0, 240.0), (640.0, 480.0)]), (960.0, 480.0));

        let mut engine = BlobSequencingEngine::default();
        let left = RawFrame {
            width: 200.0,
            height: 100.0,
            offset_w: 0.0,
            blobs: vec![raw(40.0, 40.0, 20.0)],
        };
        let right = RawFrame {
            offset_w: 100.0,
            ..left.clone()
        };
        ingest_tiled(&mut engine, &[left, right]);
        assert_eq!(engine.blobs()[0].centroid.x, 0.25);
        assert_eq!(engine.blobs()[1].centroid.x, 0.75);
    }

    #[test]
    fn test_scan_mode_toggle() {
        assert_eq!(ScanMode::default(), ScanMode::Auto);
        assert_eq!(ScanMode::Auto.toggled(), ScanMode::Manual);
        assert_eq!(ScanMode::Manual.toggled(), ScanMode::Auto);
    }
}
