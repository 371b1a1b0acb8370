//! Sequencers - timed state machines walking the blob collection
//!
//! All sequencers share the same transport (`stopped`/`playing`) and the
//! same per-frame contract: the engine calls [`Sequence::update`] with the
//! frame time and then [`Sequence::emit`] with the current blobs. `emit`
//! reports fired blobs through a [`Fire`] buffer; the engine turns those into
//! notes, events and animations.
//!
//! The closed set of kinds is the [`Sequencer`] enum. New kinds only need to
//! implement [`Sequence`] and get a variant.

mod ordinal;
mod random;
mod vertical;

pub use ordinal::OrdinalSequencer;
pub use random::RandomSequencer;
pub use vertical::VerticalSequencer;

use crate::blob::Blob;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 8-bit RGBA color, used by visual consumers only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
    /// Alpha
    pub a: u8,
}

impl Rgba {
    /// Opaque white
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);

    /// Opaque color from components
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::WHITE
    }
}

/// State shared by every sequencer kind
#[derive(Debug, Clone, PartialEq)]
pub struct SequencerBase {
    /// Transport flag; only playing sequencers are ticked
    pub playing: bool,
    /// Fixed 1-based output channel
    pub channel: u8,
    /// Visual color
    pub color: Rgba,
    /// Whether interior contours may fire
    pub include_holes: bool,
}

impl SequencerBase {
    /// Stopped base on `channel`
    pub fn new(channel: u8, color: Rgba, include_holes: bool) -> Self {
        Self {
            playing: false,
            channel,
            color,
            include_holes,
        }
    }

    /// The blobs this sequencer may fire, in collection order
    pub fn eligible<'a>(&self, blobs: &'a [Arc<Blob>]) -> Vec<&'a Arc<Blob>> {
        blobs
            .iter()
            .filter(|b| self.include_holes || !b.hole)
            .collect()
    }
}

/// One fired blob, reported by [`Sequence::emit`]
#[derive(Debug, Clone)]
pub struct Fire {
    /// The blob that fired
    pub blob: Arc<Blob>,
    /// Base note duration before length scaling
    pub duration: f32,
}

/// Render-agnostic visual state of a sequencer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Overlay {
    /// Scan band swept since the previous update, in scan-height units
    ScanBand {
        /// Top of the band
        from: f32,
        /// Bottom of the band
        to: f32,
    },
    /// Cursor travelling from the last fired blob to the next one
    Cursor {
        /// Interpolated normalized position
        position: Vec2,
    },
}

/// Shared capability set of all sequencers
pub trait Sequence {
    /// Shared state
    fn base(&self) -> &SequencerBase;

    /// Shared state, mutable
    fn base_mut(&mut self) -> &mut SequencerBase;

    /// Reset timing to the armed start state; transport is left alone
    fn setup(&mut self);

    /// Advance internal clocks by `tick` seconds
    fn update(&mut self, tick: f32);

    /// Fire zero or more blobs from `blobs` into `fires`
    fn emit(&mut self, blobs: &[Arc<Blob>], fires: &mut Vec<Fire>);

    /// Current visual state, if any
    fn overlay(&self) -> Option<Overlay>;

    /// Start playing
    fn play(&mut self) {
        self.base_mut().playing = true;
    }

    /// Stop playing
    fn stop(&mut self) {
        self.base_mut().playing = false;
    }

    /// Flip between playing and stopped
    fn toggle_play(&mut self) {
        if self.is_playing() {
            self.stop();
        } else {
            self.play();
        }
    }

    /// Transport state
    fn is_playing(&self) -> bool {
        self.base().playing
    }

    /// Output channel
    fn channel(&self) -> u8 {
        self.base().channel
    }

    /// Visual color
    fn color(&self) -> Rgba {
        self.base().color
    }
}

/// The sequencer kinds known to the engine
#[derive(Debug, Clone)]
pub enum Sequencer {
    /// Scan line sweeping top to bottom
    Vertical(VerticalSequencer),
    /// Steps through the collection in order
    Ordinal(OrdinalSequencer),
    /// Jumps to a random blob after every fire
    Random(RandomSequencer),
}

impl Sequencer {
    /// Short name of the kind, for logs
    pub fn kind_name(&self) -> &'static str {
        match self {
            Sequencer::Vertical(_) => "vertical",
            Sequencer::Ordinal(_) => "ordinal",
            Sequencer::Random(_) => "random",
        }
    }

    fn inner(&self) -> &dyn Sequence {
        match self {
            Sequencer::Vertical(s) => s,
            Sequencer::Ordinal(s) => s,
            Sequencer::Random(s) => s,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Sequence {
        match self {
            Sequencer::Vertical(s) => s,
            Sequencer::Ordinal(s) => s,
            Sequencer::Random(s) => s,
        }
    }
}

impl Sequence for Sequencer {
    fn base(&self) -> &SequencerBase {
        self.inner().base()
    }

    fn base_mut(&mut self) -> &mut SequencerBase {
        self.inner_mut().base_mut()
    }

    fn setup(&mut self) {
        self.inner_mut().setup();
    }

    fn update(&mut self, tick: f32) {
        self.inner_mut().update(tick);
    }

    fn emit(&mut self, blobs: &[Arc<Blob>], fires: &mut Vec<Fire>) {
        self.inner_mut().emit(blobs, fires);
    }

    fn overlay(&self) -> Option<Overlay> {
        self.inner().overlay()
    }
}

impl From<VerticalSequencer> for Sequencer {
    fn from(s: VerticalSequencer) -> Self {
        Sequencer::Vertical(s)
    }
}

impl From<OrdinalSequencer> for Sequencer {
    fn from(s: OrdinalSequencer) -> Self {
        Sequencer::Ordinal(s)
    }
}

impl From<RandomSequencer> for Sequencer {
    fn from(s: RandomSequencer) -> Self {
        Sequencer::Random(s)
    }
}

/// Cursor between two fired blobs, shared by the index-walking kinds
pub(crate) fn cursor_overlay(
    last: Vec2,
    target: Vec2,
    count: f32,
    duration_to_next: f32,
) -> Option<Overlay> {
    if last == target || duration_to_next == 0.0 {
        return None;
    }
    let t = crate::mapping::map_range(count, 0.0, duration_to_next, 0.0, 1.0, true);
    Some(Overlay::Cursor {
        position: last.lerp(target, t),
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::blob::{Blob, RawBlob, Rect};
    use glam::Vec2;
    use std::sync::Arc;

    /// A small blob centred at `(x, y)` in unit space
    pub fn blob_at(x: f32, y: f32) -> Arc<Blob> {
        let raw = RawBlob {
            points: vec![Vec2::new(x, y)],
            bounding_rect: Rect::new(x - 0.01, y - 0.01, 0.02, 0.02),
            centroid: Vec2::new(x, y),
            area: 0.0004,
            length: 0.08,
            hole: false,
        };
        Arc::new(Blob::from_contour(&raw, 1.0, 1.0, 0.0))
    }

    pub fn hole_at(x: f32, y: f32) -> Arc<Blob> {
        let mut blob = (*blob_at(x, y)).clone();
        blob.hole = true;
        Arc::new(blob)
    }
}
