//! Blob Sequencing Engine
//!
//! Owns the blob collection for the current frame and the list of
//! sequencers. Once per rendered frame the caller runs `tick`, which updates
//! and emits every playing sequencer and fans each fired blob out to the note
//! sink, the event subscribers and the animation sink.
//!
//! The collection is only mutated between ticks (detection/ingestion) and is
//! read-only while sequencers emit.

use crate::animation::{AnimationManager, BlobAnimation, DEFAULT_FLASH_DURATION};
use crate::blob::{Blob, RawBlob};
use crate::event::{BlobNoteEvent, EventBus};
use crate::note::NoteMapping;
use crate::sequencer::{Fire, Overlay, Rgba, Sequence, Sequencer};
use crate::sink::{AnimationSink, NoteLog, NoteSink};
use crossbeam_channel::Receiver;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tracing::{debug, info, trace};

/// A fire waiting for fan-out, tagged with its sequencer's identity
struct PendingFire {
    channel: u8,
    color: Rgba,
    fire: Fire,
}

/// The blob collection plus the sequencers playing over it
pub struct BlobSequencingEngine<N: NoteSink = NoteLog, A: AnimationSink = AnimationManager> {
    blobs: Vec<Arc<Blob>>,
    sequencers: Vec<Sequencer>,
    note_sink: N,
    animation_sink: A,
    mapping: NoteMapping,
    events: EventBus,
    rng: StdRng,
    scratch: Vec<Fire>,
    pending: Vec<PendingFire>,
}

impl<N: NoteSink, A: AnimationSink> BlobSequencingEngine<N, A> {
    /// Create an engine with no blobs and no sequencers
    pub fn new(note_sink: N, animation_sink: A) -> Self {
        Self {
            blobs: Vec::new(),
            sequencers: Vec::new(),
            note_sink,
            animation_sink,
            mapping: NoteMapping::default(),
            events: EventBus::new(),
            rng: StdRng::from_rng(&mut rand::rng()),
            scratch: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Replace the blob to note mapping
    pub fn with_mapping(mut self, mapping: NoteMapping) -> Self {
        self.mapping = mapping;
        self
    }

    /// Make velocities reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Register a sequencer; returns its index
    pub fn add_sequencer(&mut self, sequencer: impl Into<Sequencer>) -> usize {
        let sequencer = sequencer.into();
        debug!(
            "Added {} sequencer on channel {}",
            sequencer.kind_name(),
            sequencer.channel()
        );
        self.sequencers.push(sequencer);
        self.sequencers.len() - 1
    }

    /// All sequencers in registration order
    pub fn sequencers(&self) -> &[Sequencer] {
        &self.sequencers
    }

    /// Sequencer at `index`, if any
    pub fn sequencer(&self, index: usize) -> Option<&Sequencer> {
        self.sequencers.get(index)
    }

    /// Visual state of every sequencer that has one
    pub fn overlays(&self) -> Vec<(usize, Overlay)> {
        self.sequencers
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.overlay().map(|o| (i, o)))
            .collect()
    }

    // --- Blob collection ---

    /// Normalize a raw contour and append it.
    ///
    /// `frame_w` and `frame_h` must be positive.
    pub fn add_blob(&mut self, raw: &RawBlob, frame_w: f32, frame_h: f32, offset_w: f32) {
        self.insert_blob(Blob::from_contour(raw, frame_w, frame_h, offset_w));
    }

    /// Append an already normalized blob
    pub fn insert_blob(&mut self, blob: Blob) {
        self.blobs.push(Arc::new(blob));
    }

    /// Remove the most recently added blob; `None` if empty
    pub fn remove_last_blob(&mut self) -> Option<Arc<Blob>> {
        self.blobs.pop()
    }

    /// Empty the collection
    pub fn clear_blobs(&mut self) {
        self.blobs.clear();
    }

    /// Current blobs in insertion order
    pub fn blobs(&self) -> &[Arc<Blob>] {
        &self.blobs
    }

    /// Blob at `index`, if any
    pub fn blob(&self, index: usize) -> Option<&Arc<Blob>> {
        self.blobs.get(index)
    }

    // --- Transport ---

    /// Reset and start the sequencer at `index`; out of range is a no-op
    pub fn play(&mut self, index: usize) {
        if let Some(seq) = self.sequencers.get_mut(index) {
            seq.setup();
            seq.play();
            info!("Sequencer {} ({}) playing", index, seq.kind_name());
        }
    }

    /// Reset and stop the sequencer at `index`; out of range is a no-op
    pub fn stop(&mut self, index: usize) {
        if let Some(seq) = self.sequencers.get_mut(index) {
            seq.setup();
            seq.stop();
            info!("Sequencer {} ({}) stopped", index, seq.kind_name());
        }
    }

    /// Reset and flip the sequencer at `index`; out of range is a no-op
    pub fn toggle_play(&mut self, index: usize) {
        if let Some(seq) = self.sequencers.get_mut(index) {
            seq.setup();
            seq.toggle_play();
            info!(
                "Sequencer {} ({}) {}",
                index,
                seq.kind_name(),
                if seq.is_playing() { "playing" } else { "stopped" }
            );
        }
    }

    // --- Events ---

    /// Receive every [`BlobNoteEvent`] fired from now on
    pub fn subscribe(&mut self) -> Receiver<BlobNoteEvent> {
        self.events.subscribe()
    }

    // --- Frame ---

    /// Advance one frame of `dt` seconds.
    ///
    /// Sinks are advanced first. Then every playing sequencer runs `update`
    /// followed by `emit`; stopped ones are skipped. Fired blobs are sent to
    /// the note sink, published to subscribers and animated, in fire order.
    pub fn tick(&mut self, dt: f32) {
        self.note_sink.advance(dt);
        self.animation_sink.advance(dt);

        for seq in self.sequencers.iter_mut() {
            if !seq.is_playing() {
                continue;
            }
            seq.update(dt);
            seq.emit(&self.blobs, &mut self.scratch);

            let channel = seq.channel();
            let color = seq.color();
            self.pending
                .extend(self.scratch.drain(..).map(|fire| PendingFire {
                    channel,
                    color,
                    fire,
                }));
        }

        trace!("tick dt={:.4} fires={}", dt, self.pending.len());

        let pending = std::mem::take(&mut self.pending);
        for PendingFire {
            channel,
            color,
            fire,
        } in pending
        {
            self.dispatch(fire, channel, color);
        }
    }

    fn dispatch(&mut self, fire: Fire, channel: u8, color: Rgba) {
        let plan = self
            .mapping
            .plan(&fire.blob, fire.duration, channel, &mut self.rng);
        debug!(
            "Fire ch={} pitch={} vel={} dur={:.3}",
            channel, plan.pitch, plan.velocity, plan.duration
        );
        plan.send(&mut self.note_sink);

        self.events
            .publish(&BlobNoteEvent::new(Arc::clone(&fire.blob), channel));

        self.animation_sink.trigger(BlobAnimation::new(
            fire.blob,
            color,
            channel,
            DEFAULT_FLASH_DURATION,
        ));
    }

    // --- Collaborators ---

    /// The note sink
    pub fn note_sink(&self) -> &N {
        &self.note_sink
    }

    /// The note sink, mutable
    pub fn note_sink_mut(&mut self) -> &mut N {
        &mut self.note_sink
    }

    /// The animation sink
    pub fn animation_sink(&self) -> &A {
        &self.animation_sink
    }

    /// The animation sink, mutable
    pub fn animation_sink_mut(&mut self) -> &mut A {
        &mut self.animation_sink
    }

    /// The active note mapping
    pub fn mapping(&self) -> &NoteMapping {
        &self.mapping
    }
}

impl Default for BlobSequencingEngine {
    fn default() -> Self {
        Self::new(NoteLog::new(), AnimationManager::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::{OrdinalSequencer, VerticalSequencer};
    use glam::Vec2;

    fn raw_at(x: f32, y: f32) -> RawBlob {
        RawBlob {
            centroid: Vec2::new(x, y),
            ..Default::default()
        }
    }

    #[test]
    fn test_blob_collection_order() {
        let mut engine = BlobSequencingEngine::default();
        for i in 0..4 {
            engine.add_blob(&raw_at(i as f32, 0.0), 10.0, 10.0, 0.0);
        }
        let xs: Vec<f32> = engine.blobs().iter().map(|b| b.centroid.x).collect();
        assert_eq!(xs, vec![0.0, 0.1, 0.2, 0.3]);

        let last = engine.remove_last_blob().unwrap();
        assert_eq!(last.centroid.x, 0.3);
        assert_eq!(engine.blobs().len(), 3);

        engine.clear_blobs();
        assert!(engine.blobs().is_empty());
        assert!(engine.remove_last_blob().is_none());
        assert!(engine.blob(0).is_none());
    }

    #[test]
    fn test_stopped_sequencers_do_not_advance() {
        let mut engine = BlobSequencingEngine::default().with_seed(1);
        engine.add_sequencer(VerticalSequencer::new(1.0, 1, Rgba::WHITE));
        engine.add_blob(&raw_at(5.0, 5.0), 10.0, 10.0, 0.0);

        engine.tick(0.75);
        assert_eq!(engine.note_sink().note_count(), 0);

        engine.play(0);
        engine.tick(0.75);
        assert_eq!(engine.note_sink().note_count(), 1);
        assert_eq!(engine.animation_sink().len(), 1);
    }

    #[test]
    fn test_transport_resets_timing() {
        let mut engine = BlobSequencingEngine::default().with_seed(1);
        engine.add_sequencer(OrdinalSequencer::new(10.0, true, 3, Rgba::WHITE));
        engine.add_blob(&raw_at(1.0, 1.0), 10.0, 10.0, 0.0);
        engine.add_blob(&raw_at(2.0, 2.0), 10.0, 10.0, 0.0);

        engine.play(0);
        engine.tick(0.1);
        assert_eq!(engine.note_sink().note_count(), 1);

        // Waiting for the second blob; restarting fires the first again at once
        engine.stop(0);
        engine.play(0);
        engine.tick(0.1);
        assert_eq!(engine.note_sink().note_count(), 2);
        match engine.sequencer(0) {
            Some(Sequencer::Ordinal(s)) => assert_eq!(s.current_index(), 1),
            _ => panic!("expected ordinal sequencer"),
        }
    }

    #[test]
    fn test_out_of_range_transport_is_noop() {
        let mut engine = BlobSequencingEngine::default();
        engine.add_sequencer(VerticalSequencer::new(1.0, 1, Rgba::WHITE));
        engine.play(1);
        engine.stop(999);
        engine.toggle_play(usize::MAX);
        assert!(!engine.sequencers()[0].is_playing());
    }

    #[test]
    fn test_toggle_play() {
        let mut engine = BlobSequencingEngine::default();
        engine.add_sequencer(VerticalSequencer::new(1.0, 1, Rgba::WHITE));
        engine.toggle_play(0);
        assert!(engine.sequencers()[0].is_playing());
        engine.toggle_play(0);
        assert!(!engine.sequencers()[0].is_playing());
    }

    #[test]
    fn test_overlays_report_playing_and_stopped() {
        let mut engine = BlobSequencingEngine::default();
        engine.add_sequencer(VerticalSequencer::new(1.0, 1, Rgba::WHITE));
        engine.add_sequencer(OrdinalSequencer::new(1.0, true, 2, Rgba::WHITE));
        let overlays = engine.overlays();
        assert_eq!(overlays.len(), 1);
        assert_eq!(overlays[0].0, 0);
    }
}
