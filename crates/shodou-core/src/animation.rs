//! Fire-and-forget blob animations
//!
//! Each fired blob starts a short flash that fades out over its duration.
//! The animation holds a shared snapshot of the blob, never an index into the
//! live collection.

use crate::blob::Blob;
use crate::sequencer::Rgba;
use crate::sink::AnimationSink;
use std::sync::Arc;

/// Flash length used for every fire
pub const DEFAULT_FLASH_DURATION: f32 = 0.5;

/// A running blob flash
#[derive(Debug, Clone)]
pub struct BlobAnimation {
    /// Blob snapshot at trigger time
    pub blob: Arc<Blob>,
    /// Color of the sequencer that fired
    pub color: Rgba,
    /// Channel of the sequencer that fired
    pub channel: u8,
    /// Total length in seconds
    pub duration: f32,
    /// Seconds since trigger
    pub elapsed: f32,
}

impl BlobAnimation {
    /// Create a fresh animation
    pub fn new(blob: Arc<Blob>, color: Rgba, channel: u8, duration: f32) -> Self {
        Self {
            blob,
            color,
            channel,
            duration,
            elapsed: 0.0,
        }
    }

    /// Remaining life, from 1 at trigger down to 0 at the end
    pub fn life(&self) -> f32 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        (1.0 - self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    /// True once the duration has elapsed
    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// Owns running animations and ages them every tick
#[derive(Debug, Default)]
pub struct AnimationManager {
    animations: Vec<BlobAnimation>,
}

impl AnimationManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Animations still running, oldest first
    pub fn active(&self) -> &[BlobAnimation] {
        &self.animations
    }

    /// Number of running animations
    pub fn len(&self) -> usize {
        self.animations.len()
    }

    /// True if nothing is running
    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }

    /// Stop everything
    pub fn clear(&mut self) {
        self.animations.clear();
    }
}

impl AnimationSink for AnimationManager {
    fn trigger(&mut self, animation: BlobAnimation) {
        self.animations.push(animation);
    }

    fn advance(&mut self, dt: f32) {
        self.animations.retain_mut(|anim| {
            anim.elapsed += dt;
            !anim.is_finished()
        });
    }
}
