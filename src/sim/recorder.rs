use crate::playback::{PlaybackObserver, PlaybackState};
use parking_lot::Mutex;

/// One observer notification, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObserverCall {
    Status(PlaybackState),
    Completion,
    Error(String),
}

/// Observer that remembers everything it was told.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    calls: Mutex<Vec<ObserverCall>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<ObserverCall> {
        self.calls.lock().clone()
    }

    pub fn statuses(&self) -> Vec<PlaybackState> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                ObserverCall::Status(state) => Some(*state),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                ObserverCall::Error(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    /// Returns and forgets everything recorded so far.
    pub fn take(&self) -> Vec<ObserverCall> {
        std::mem::take(&mut *self.calls.lock())
    }
}

impl PlaybackObserver for RecordingObserver {
    fn on_playback_status_changed(&self, state: PlaybackState) {
        self.calls.lock().push(ObserverCall::Status(state));
    }

    fn on_completion(&self) {
        self.calls.lock().push(ObserverCall::Completion);
    }

    fn on_error(&self, message: &str) {
        self.calls.lock().push(ObserverCall::Error(message.to_string()));
    }
}
