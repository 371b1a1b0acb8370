use super::{Fire, Overlay, Rgba, Sequence, SequencerBase};
use crate::blob::Blob;
use crate::mapping::map_range;
use std::sync::Arc;

/// Note duration for every blob crossed by the scan line
const NOTE_DURATION: f32 = 0.5;

/// Fires every blob whose centroid the scan line crosses
///
/// The line sweeps from 0 to `scan_height` once per `loop_time` seconds. The
/// band covered in the last update is `(last_position, position]`; after the
/// position passes `loop_time`, the next update restarts from zero.
#[derive(Debug, Clone)]
pub struct VerticalSequencer {
    base: SequencerBase,
    loop_time: f32,
    scan_height: f32,
    position: f32,
    last_position: f32,
}

impl VerticalSequencer {
    /// Create a stopped sequencer sweeping once per `loop_time` seconds
    pub fn new(loop_time: f32, channel: u8, color: Rgba) -> Self {
        let mut seq = Self {
            base: SequencerBase::new(channel, color, false),
            loop_time,
            scan_height: 1.0,
            position: 0.0,
            last_position: 0.0,
        };
        seq.setup();
        seq
    }

    /// Let interior contours fire too
    pub fn with_holes(mut self, include_holes: bool) -> Self {
        self.base.include_holes = include_holes;
        self
    }

    /// Set the extent the line sweeps over (1.0 for unit-normalized blobs)
    pub fn with_scan_height(mut self, scan_height: f32) -> Self {
        self.scan_height = scan_height;
        self
    }

    /// Seconds per sweep
    pub fn loop_time(&self) -> f32 {
        self.loop_time
    }

    /// Time position within the sweep
    pub fn position(&self) -> f32 {
        self.position
    }

    /// Time position before the last update
    pub fn last_position(&self) -> f32 {
        self.last_position
    }

    fn band(&self) -> (f32, f32) {
        let y1 = map_range(self.last_position, 0.0, self.loop_time, 0.0, self.scan_height, false);
        let y2 = map_range(self.position, 0.0, self.loop_time, 0.0, self.scan_height, false);
        (y1, y2)
    }
}

impl Sequence for VerticalSequencer {
    fn base(&self) -> &SequencerBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut SequencerBase {
        &mut self.base
    }

    fn setup(&mut self) {
        self.position = 0.0;
        self.last_position = 0.0;
    }

    fn update(&mut self, tick: f32) {
        self.last_position = self.position;
        if self.last_position > self.loop_time {
            self.position = 0.0;
            self.last_position = 0.0;
        }
        self.position += tick;
    }

    fn emit(&mut self, blobs: &[Arc<Blob>], fires: &mut Vec<Fire>) {
        let (y1, y2) = self.band();
        for blob in self.base.eligible(blobs) {
            let y = blob.centroid.y;
            if y > y1 && y <= y2 {
                fires.push(Fire {
                    blob: Arc::clone(blob),
                    duration: NOTE_DURATION,
                });
            }
        }
    }

    fn overlay(&self) -> Option<Overlay> {
        let (from, to) = self.band();
        Some(Overlay::ScanBand { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    fn step(seq: &mut VerticalSequencer, tick: f32, blobs: &[Arc<Blob>]) -> Vec<Fire> {
        let mut fires = Vec::new();
        seq.update(tick);
        seq.emit(blobs, &mut fires);
        fires
    }

    #[test]
    fn test_fires_when_band_brackets_centroid() {
        let mut seq = VerticalSequencer::new(1.0, 1, Rgba::WHITE);
        let blobs = vec![blob_at(0.3, 0.5)];

        assert!(step(&mut seq, 0.4, &blobs).is_empty());
        let fires = step(&mut seq, 0.2, &blobs);
        assert_eq!(fires.len(), 1);
        assert!(Arc::ptr_eq(&fires[0].blob, &blobs[0]));
        assert_eq!(fires[0].duration, NOTE_DURATION);
        assert!(step(&mut seq, 0.2, &blobs).is_empty());
    }

    #[test]
    fn test_band_is_open_below_closed_above() {
        let mut seq = VerticalSequencer::new(1.0, 1, Rgba::WHITE);
        let blobs = vec![blob_at(0.5, 0.5)];

        // (0, 0.5] contains 0.5
        assert_eq!(step(&mut seq, 0.5, &blobs).len(), 1);
        // (0.5, 0.75] does not
        assert!(step(&mut seq, 0.25, &blobs).is_empty());
    }

    #[test]
    fn test_multiple_blobs_same_tick() {
        let mut seq = VerticalSequencer::new(1.0, 1, Rgba::WHITE);
        let blobs = vec![blob_at(0.1, 0.2), blob_at(0.9, 0.3), blob_at(0.5, 0.9)];

        let fires = step(&mut seq, 0.5, &blobs);
        assert_eq!(fires.len(), 2);
        assert!(Arc::ptr_eq(&fires[0].blob, &blobs[0]));
        assert!(Arc::ptr_eq(&fires[1].blob, &blobs[1]));
    }

    #[test]
    fn test_holes_skipped_unless_enabled() {
        let blobs = vec![hole_at(0.5, 0.25)];

        let mut seq = VerticalSequencer::new(1.0, 1, Rgba::WHITE);
        assert!(step(&mut seq, 0.5, &blobs).is_empty());

        let mut seq = VerticalSequencer::new(1.0, 1, Rgba::WHITE).with_holes(true);
        assert_eq!(step(&mut seq, 0.5, &blobs).len(), 1);
    }

    #[test]
    fn test_wraps_after_passing_loop_time() {
        let mut seq = VerticalSequencer::new(1.0, 1, Rgba::WHITE);
        let blobs = vec![blob_at(0.5, 0.125), blob_at(0.5, 1.125)];

        // Sweep: (0,.25] (.25,.5] (.5,.75] (.75,1] (1,1.25]
        let mut first_loop = Vec::new();
        for _ in 0..5 {
            first_loop.extend(step(&mut seq, 0.25, &blobs));
        }
        assert_eq!(first_loop.len(), 2);
        assert_eq!(seq.position(), 1.25);

        // Wrapped: the next band starts from zero again
        let fires = step(&mut seq, 0.25, &blobs);
        assert_eq!(seq.last_position(), 0.0);
        assert_eq!(seq.position(), 0.25);
        assert_eq!(fires.len(), 1);
        assert!(Arc::ptr_eq(&fires[0].blob, &blobs[0]));
    }

    #[test]
    fn test_empty_collection_is_quiet() {
        let mut seq = VerticalSequencer::new(1.0, 1, Rgba::WHITE);
        assert!(step(&mut seq, 0.5, &[]).is_empty());
    }

    #[test]
    fn test_scan_height_and_overlay() {
        let mut seq = VerticalSequencer::new(2.0, 1, Rgba::WHITE).with_scan_height(4.0);
        seq.update(0.5);
        seq.update(0.5);
        assert_eq!(seq.overlay(), Some(Overlay::ScanBand { from: 1.0, to: 2.0 }));

        seq.setup();
        assert_eq!(seq.position(), 0.0);
        assert_eq!(seq.last_position(), 0.0);
    }
}
