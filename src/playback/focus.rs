//! Focus Arbiter: requests and abandons the shared output device.

use super::error::PlaybackError;
use super::events::EventSink;
use super::state::{FocusChange, FocusLevel};
use tracing::{debug, info, warn};

const LOG_TARGET: &str = "focus_playback::playback::focus";

/// Output stream the controller plays on. Only music is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamType {
    Music,
}

/// Kind of focus requested. The controller always asks for full gain and
/// accepts being ducked by transient sounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusGain {
    Gain,
}

/// Synchronous answer of the platform audio policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusRequestResult {
    Granted,
    Denied,
}

/// Platform audio policy service.
///
/// `request` registers `events` as the receiver of later
/// [`FocusChange`] notifications for as long as focus is held.
pub trait AudioFocusService: Send {
    fn request(&mut self, stream: StreamType, gain: FocusGain, events: EventSink) -> FocusRequestResult;
    fn abandon(&mut self) -> FocusRequestResult;
}

/// Tracks the controller's belief about focus ownership.
///
/// `registered` follows the platform listener rather than the level: a
/// transient loss drops the level to `None` but the listener stays, since
/// the platform will call back when focus returns.
pub struct FocusArbiter {
    service: Box<dyn AudioFocusService>,
    events: EventSink,
    level: FocusLevel,
    registered: bool,
}

impl FocusArbiter {
    pub fn new(service: Box<dyn AudioFocusService>, events: EventSink) -> Self {
        FocusArbiter {
            service,
            events,
            level: FocusLevel::None,
            registered: false,
        }
    }

    pub fn level(&self) -> FocusLevel {
        self.level
    }

    /// Whether the platform still delivers focus changes to us.
    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// Asks for exclusive music focus unless it is already held.
    /// A denial leaves the level untouched; the platform will not call back.
    pub fn request_focus(&mut self) -> Result<(), PlaybackError> {
        if self.level == FocusLevel::Focused {
            return Ok(());
        }
        match self
            .service
            .request(StreamType::Music, FocusGain::Gain, self.events.clone())
        {
            FocusRequestResult::Granted => {
                info!(target: LOG_TARGET, "Audio focus granted.");
                self.level = FocusLevel::Focused;
                self.registered = true;
                Ok(())
            }
            FocusRequestResult::Denied => {
                warn!(target: LOG_TARGET, "Audio focus request denied, staying at {:?}.", self.level);
                Err(PlaybackError::FocusDenied)
            }
        }
    }

    /// Gives held focus back to the platform. Also abandons a ducked claim.
    /// After a non-duckable loss there is nothing held and the listener is
    /// kept so the regain can still arrive.
    pub fn release_focus(&mut self) {
        if self.level == FocusLevel::None {
            return;
        }
        self.abandon();
    }

    /// Abandons focus and unregisters the listener whatever the level, so
    /// nothing reaches a stopped controller. Always ends at
    /// [`FocusLevel::None`] unless the platform refuses.
    pub fn relinquish(&mut self) {
        if self.level == FocusLevel::None && !self.registered {
            return;
        }
        self.abandon();
    }

    fn abandon(&mut self) {
        match self.service.abandon() {
            FocusRequestResult::Granted => {
                debug!(target: LOG_TARGET, "Audio focus abandoned.");
                self.level = FocusLevel::None;
                self.registered = false;
            }
            FocusRequestResult::Denied => {
                warn!(target: LOG_TARGET, "Platform refused to abandon focus, keeping {:?}.", self.level);
            }
        }
    }

    /// Applies a platform focus change. Returns `Some(true)` for a
    /// non-duckable loss, i.e. the caller should remember to resume, and
    /// `None` when the change was ignored.
    pub fn on_focus_changed(&mut self, change: FocusChange) -> Option<bool> {
        if !self.registered {
            warn!(target: LOG_TARGET, "Focus change {:?} after abandoning focus, ignoring.", change);
            return None;
        }
        match change {
            FocusChange::Gained => {
                self.level = FocusLevel::Focused;
                Some(false)
            }
            FocusChange::LostTransientCanDuck => {
                self.level = FocusLevel::DuckedAllowed;
                Some(false)
            }
            FocusChange::LostPermanently | FocusChange::LostTransient => {
                self.level = FocusLevel::None;
                Some(true)
            }
            FocusChange::Unknown(value) => {
                warn!(target: LOG_TARGET, "Ignoring unsupported focus change: {}", value);
                None
            }
        }
    }
}
