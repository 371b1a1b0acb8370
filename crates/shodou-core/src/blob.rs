//! Blob model
//!
//! A [`RawBlob`] is what the contour finder reports for one contour, in
//! source-pixel units. [`Blob::from_contour`] turns it into the
//! resolution-independent value every sequencer reads.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check whether a point lies inside (edges excluded)
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x > self.x && y > self.y && x < self.x + self.width && y < self.y + self.height
    }

    /// Check whether another rectangle lies entirely inside this one
    pub fn contains_rect(&self, other: &Rect) -> bool {
        self.contains(other.x, other.y)
            && self.contains(other.x + other.width, other.y + other.height)
    }
}

/// One contour reported by the contour finder, in source-pixel units
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawBlob {
    /// Contour polygon
    pub points: Vec<Vec2>,
    /// Bounding rectangle
    pub bounding_rect: Rect,
    /// Centroid
    pub centroid: Vec2,
    /// Enclosed area in square pixels
    pub area: f32,
    /// Perimeter length in pixels
    pub length: f32,
    /// Interior (nested) contour
    #[serde(default)]
    pub hole: bool,
}

/// A detected contour normalized to the source frame
///
/// Coordinates are divided by the frame size after adding the horizontal
/// tiling offset, so they sit in `[0, 1]` for a single input and may exceed
/// it for tiles to the right. `area` is divided by `width * height`, which
/// makes it depend on the source resolution. `length` is kept in source
/// pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blob {
    /// Contour polygon, normalized
    pub contour: Vec<Vec2>,
    /// Bounding rectangle, normalized
    pub bounding_rect: Rect,
    /// Centroid, normalized
    pub centroid: Vec2,
    /// Area divided by the source frame area
    pub area: f32,
    /// Perimeter in source pixels
    pub length: f32,
    /// Interior (nested) contour
    pub hole: bool,
    /// Source frame width used for normalization
    pub source_width: f32,
    /// Source frame height used for normalization
    pub source_height: f32,
    /// Horizontal offset applied before normalization
    pub offset_w: f32,
}

impl Blob {
    /// Normalize a raw contour against its source frame.
    ///
    /// `w` and `h` must be positive; the result is undefined otherwise.
    pub fn from_contour(raw: &RawBlob, w: f32, h: f32, offset_w: f32) -> Self {
        let normalize = |p: Vec2| Vec2::new((p.x + offset_w) / w, p.y / h);

        Self {
            contour: raw.points.iter().copied().map(normalize).collect(),
            bounding_rect: Rect {
                x: (raw.bounding_rect.x + offset_w) / w,
                y: raw.bounding_rect.y / h,
                width: raw.bounding_rect.width / w,
                height: raw.bounding_rect.height / h,
            },
            centroid: normalize(raw.centroid),
            area: raw.area / (w * h),
            length: raw.length,
            hole: raw.hole,
            source_width: w,
            source_height: h,
            offset_w,
        }
    }

    /// Number of contour points
    pub fn num_points(&self) -> usize {
        self.contour.len()
    }

    /// Return a copy shifted by an extra horizontal offset in source pixels.
    ///
    /// Used when stitching inputs side by side after detection.
    pub fn shifted(&self, extra_offset_w: f32) -> Self {
        let dx = extra_offset_w / self.source_width;
        let mut blob = self.clone();
        for p in &mut blob.contour {
            p.x += dx;
        }
        blob.bounding_rect.x += dx;
        blob.centroid.x += dx;
        blob.offset_w += extra_offset_w;
        blob
    }
}
