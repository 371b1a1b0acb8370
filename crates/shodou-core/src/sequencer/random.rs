use super::{cursor_overlay, Fire, Overlay, Rgba, Sequence, SequencerBase};
use crate::blob::Blob;
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// Fires a blob, then jumps to a uniformly drawn index and waits
///
/// Never stops on its own.
#[derive(Debug, Clone)]
pub struct RandomSequencer {
    base: SequencerBase,
    max_duration_to_next: f32,
    current_index: usize,
    count: f32,
    duration_to_next: f32,
    armed: bool,
    last_position: Vec2,
    target_position: Vec2,
    rng: StdRng,
}

impl RandomSequencer {
    /// Create a stopped sequencer seeded from the thread RNG
    pub fn new(max_duration_to_next: f32, channel: u8, color: Rgba) -> Self {
        Self::with_rng(
            max_duration_to_next,
            channel,
            color,
            StdRng::from_rng(&mut rand::rng()),
        )
    }

    /// Create a stopped sequencer with a reproducible index sequence
    pub fn with_seed(max_duration_to_next: f32, channel: u8, color: Rgba, seed: u64) -> Self {
        Self::with_rng(
            max_duration_to_next,
            channel,
            color,
            StdRng::seed_from_u64(seed),
        )
    }

    fn with_rng(max_duration_to_next: f32, channel: u8, color: Rgba, rng: StdRng) -> Self {
        let mut seq = Self {
            base: SequencerBase::new(channel, color, true),
            max_duration_to_next,
            current_index: 0,
            count: 0.0,
            duration_to_next: 0.0,
            armed: true,
            last_position: Vec2::ZERO,
            target_position: Vec2::ZERO,
            rng,
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

    /// Centroid of the blob the cursor travels to
    pub fn target_position(&self) -> Vec2 {
        self.target_position
    }
}

impl Sequence for RandomSequencer {
    fn base(&self) -> &SequencerBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut SequencerBase {
        &mut self.base
    }

    fn setup(&mut self) {
        self.count = 0.0;
        self.current_index = 0;
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
        let next_index = self.rng.random_range(0..blobs.len());

        fires.push(Fire {
            blob: Arc::clone(current),
            duration: self.max_duration_to_next,
        });

        self.last_position = current.centroid;
        self.target_position = blobs[next_index].centroid;
        self.duration_to_next = self.max_duration_to_next;

        self.armed = false;
        self.current_index = next_index;
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
