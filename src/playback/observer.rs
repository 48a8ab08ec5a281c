use super::state::PlaybackState;
use std::sync::{Arc, Weak};
use tokio::sync::broadcast;
use tracing::{debug, trace};

const LOG_TARGET: &str = "focus_playback::playback::observer";

/// Receives the controller's notifications. Registered by the external
/// owner; the controller only keeps a weak reference.
pub trait PlaybackObserver: Send + Sync {
    fn on_playback_status_changed(&self, state: PlaybackState);
    fn on_completion(&self);
    fn on_error(&self, message: &str);
}

/// Updates fanned out by [`BroadcastObserver`].
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackUpdate {
    StatusChanged(PlaybackState),
    Completed,
    Error(String),
}

/// Forwards observer callbacks onto a tokio broadcast channel.
#[derive(Debug)]
pub struct BroadcastObserver {
    tx: broadcast::Sender<PlaybackUpdate>,
}

impl BroadcastObserver {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        BroadcastObserver { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackUpdate> {
        self.tx.subscribe()
    }

    pub fn sender(&self) -> broadcast::Sender<PlaybackUpdate> {
        self.tx.clone()
    }

    fn send(&self, update: PlaybackUpdate) {
        trace!(target: LOG_TARGET, "Broadcasting update: {:?}", update);
        if let Err(e) = self.tx.send(update) {
            // No receivers is normal before anyone subscribes.
            debug!(target: LOG_TARGET, "No active listeners for update: {:?}", e.0);
        }
    }
}

impl PlaybackObserver for BroadcastObserver {
    fn on_playback_status_changed(&self, state: PlaybackState) {
        self.send(PlaybackUpdate::StatusChanged(state));
    }

    fn on_completion(&self) {
        self.send(PlaybackUpdate::Completed);
    }

    fn on_error(&self, message: &str) {
        self.send(PlaybackUpdate::Error(message.to_string()));
    }
}

/// Delivers notifications to the registered observer.
///
/// A status equal to the last one delivered is dropped unless an
/// asynchronous event was dispatched since, or the caller forces it.
#[derive(Default)]
pub(crate) struct StatusNotifier {
    observer: Option<Weak<dyn PlaybackObserver>>,
    last_status: Option<PlaybackState>,
    event_since_last: bool,
}

impl StatusNotifier {
    pub(crate) fn set_observer(&mut self, observer: &Arc<dyn PlaybackObserver>) {
        self.observer = Some(Arc::downgrade(observer));
    }

    pub(crate) fn clear_observer(&mut self) {
        self.observer = None;
    }

    fn upgrade(&self) -> Option<Arc<dyn PlaybackObserver>> {
        self.observer.as_ref().and_then(Weak::upgrade)
    }

    /// Status the observer heard last, if any.
    pub(crate) fn last_status(&self) -> Option<PlaybackState> {
        self.last_status
    }

    /// Marks that an engine, focus or unplug event is being handled.
    pub(crate) fn event_arrived(&mut self) {
        self.event_since_last = true;
    }

    pub(crate) fn status(&mut self, state: PlaybackState, force: bool) {
        let repeat = self.last_status == Some(state) && !self.event_since_last;
        if repeat && !force {
            trace!(target: LOG_TARGET, "Suppressing repeated status {:?}", state);
            return;
        }
        self.last_status = Some(state);
        self.event_since_last = false;
        if let Some(observer) = self.upgrade() {
            observer.on_playback_status_changed(state);
        }
    }

    pub(crate) fn completion(&mut self) {
        if let Some(observer) = self.upgrade() {
            observer.on_completion();
        }
    }

    pub(crate) fn error(&mut self, message: &str) {
        if let Some(observer) = self.upgrade() {
            observer.on_error(message);
        }
    }
}
