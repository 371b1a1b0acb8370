use super::{cursor_overlay, Fire, Overlay, Rgba, Sequence, SequencerBase};
use crate::blob::Blob;
use glam::Vec2;
use std::sync::Arc;

/// Steps through the blob collection in index order
///
/// Fires one blob, waits `max_duration_to_next` seconds, fires the next.
/// After the last blob a looping sequencer pauses once more and starts over
/// from index 0; a one-shot sequencer stops itself.
#[derive(Debug, Clone)]
pub struct OrdinalSequencer {
    base: SequencerBase,
    max_duration_to_next: f32,
    looping: bool,
    current_index: usize,
    count: f32,
    duration_to_next: f32,
    armed: bool,
    last_position: Vec2,
    target_position: Vec2,
}

impl OrdinalSequencer {
    /// Create a stopped sequencer
    pub fn new(max_duration_to_next: f32, looping: bool, channel: u8, color: Rgba) -> Self {
        let mut seq = Self {
            base: SequencerBase::new(channel, color, true),
            max_duration_to_next,
            looping,
            current_index: 0,
            count: 0.0,
            duration_to_next: 0.0,
            armed: true,
            last_position: Vec2::ZERO,
            target_position: Vec2::ZERO,
        };
        seq.setup();
        seq
    }

    /// Restrict firing to outer contours
    pub fn with_holes(mut self, include_holes: bool) -> Self {
        self.base.include_holes = include_holes;
        self
    }

    /// Index of the blob fired next
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Ready to fire on the next emit
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Whether the sequence starts over after the last blob
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Wait between fires
    pub fn max_duration_to_next(&self) -> f32 {
        self.max_duration_to_next
    }
}

impl Sequence for OrdinalSequencer {
    fn base(&self) -> &SequencerBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut SequencerBase {
        &mut self.base
    }

    fn setup(&mut self) {
        self.current_index = 0;
        self.count = 0.0;
        self.duration_to_next = 0.0;
        self.armed = true;
        self.last_position = Vec2::ZERO;
        self.target_position = Vec2::ZERO;
    }

    fn update(&mut self, tick: f32) {
        if !self.armed {
            self.count += tick;
            if self.duration_to_next < self.count {
                self.armed = true;
            }
        }
    }

    fn emit(&mut self, blobs: &[Arc<Blob>], fires: &mut Vec<Fire>) {
        if !self.armed {
            return;
        }
        let blobs = self.base.eligible(blobs);
        let Some(&current) = blobs.get(self.current_index) else {
            return;
        };

        fires.push(Fire {
            blob: Arc::clone(current),
            duration: self.max_duration_to_next,
        });

        let Some(next) = blobs.get(self.current_index + 1) else {
            self.setup();
            if self.looping {
                self.duration_to_next = self.max_duration_to_next;
                self.armed = false;
            } else {
                self.base.playing = false;
            }
            return;
        };

        // Distance between the two blobs only drives the cursor, not the timing
        self.last_position = current.centroid;
        self.target_position = next.centroid;
        self.duration_to_next = self.max_duration_to_next;

        self.armed = false;
        self.current_index += 1;
        self.count = 0.0;
    }

    fn overlay(&self) -> Option<Overlay> {
        cursor_overlay(
            self.last_position,
            self.target_position,
            self.count,
            self.duration_to_next,
        )
    }
}
