use super::state::PlaybackEvent;
use tokio::sync::mpsc;
use tracing::{debug, trace};

const LOG_TARGET: &str = "focus_playback::playback::events";

/// Producer side of the controller's event queue.
///
/// Handed to every collaborator that reports back asynchronously (render
/// engines, the focus service, the unplug source). Posting never blocks,
/// so it is safe to call from a hardware callback thread.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<PlaybackEvent>,
}

/// Consumer side of the event queue.
pub type EventReceiver = mpsc::UnboundedReceiver<PlaybackEvent>;

impl EventSink {
    /// Creates a connected sink/receiver pair.
    pub fn channel() -> (Self, EventReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (EventSink { tx }, rx)
    }

    /// Queues an event for the controller. A closed queue means the
    /// controller is gone; the event is dropped.
    pub fn post(&self, event: PlaybackEvent) {
        trace!(target: LOG_TARGET, "Posting event: {:?}", event);
        if let Err(e) = self.tx.send(event) {
            debug!(target: LOG_TARGET, "Event queue closed, dropping {:?}", e.0);
        }
    }
}
