//! Blob note events and their fan-out

use crate::blob::Blob;
use crossbeam_channel::{Receiver, Sender};
use std::sync::Arc;

/// Raised once per fired blob
///
/// Holds a shared snapshot of the blob, so a listener may keep it after the
/// engine has cleared its collection.
#[derive(Debug, Clone)]
pub struct BlobNoteEvent {
    /// The blob that fired
    pub blob: Arc<Blob>,
    /// Channel of the sequencer that fired it
    pub channel: u8,
}

impl BlobNoteEvent {
    /// Create a new event
    pub fn new(blob: Arc<Blob>, channel: u8) -> Self {
        Self { blob, channel }
    }
}

/// Publish/subscribe channel for [`BlobNoteEvent`]s
///
/// Every subscriber gets its own unbounded receiver. Dropping the receiver
/// unsubscribes; the sender is pruned on the next publish.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<Sender<BlobNoteEvent>>,
}

impl EventBus {
    /// Create a bus with no subscribers
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new listener
    pub fn subscribe(&mut self) -> Receiver<BlobNoteEvent> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Deliver an event to every live subscriber
    pub fn publish(&mut self, event: &BlobNoteEvent) {
        self.subscribers
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Number of registered subscribers (including ones not yet pruned)
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::RawBlob;

    #[test]
    fn test_publish_reaches_all_subscribers() {
        let mut bus = EventBus::new();
        let a = bus.subscribe();
        let b = bus.subscribe();

        let blob = Arc::new(Blob::from_contour(&RawBlob::default(), 1.0, 1.0, 0.0));
        bus.publish(&BlobNoteEvent::new(blob.clone(), 4));

        let ea = a.try_recv().unwrap();
        let eb = b.try_recv().unwrap();
        assert!(Arc::ptr_eq(&ea.blob, &blob));
        assert!(Arc::ptr_eq(&eb.blob, &blob));
        assert_eq!(ea.channel, 4);
        assert!(a.try_recv().is_err());
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let mut bus = EventBus::new();
        let keep = bus.subscribe();
        drop(bus.subscribe());
        assert_eq!(bus.subscriber_count(), 2);

        let blob = Arc::new(Blob::from_contour(&RawBlob::default(), 1.0, 1.0, 0.0));
        bus.publish(&BlobNoteEvent::new(blob, 1));

        assert_eq!(bus.subscriber_count(), 1);
        assert!(keep.try_recv().is_ok());
    }
}
