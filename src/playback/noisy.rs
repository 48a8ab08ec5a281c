use super::events::EventSink;
use tracing::debug;

const LOG_TARGET: &str = "focus_playback::playback::noisy";

/// Platform signal raised when the active output route disappears
/// (headphones pulled, bluetooth sink lost). Subscribers receive
/// `PlaybackEvent::DeviceUnplugged` on the sink they registered.
pub trait DeviceUnplugSource: Send {
    fn subscribe(&mut self, events: EventSink);
    fn unsubscribe(&mut self);
}

/// Keeps registrations and unregistrations paired.
pub struct NoisyGuard {
    source: Box<dyn DeviceUnplugSource>,
    events: EventSink,
    active: bool,
}

impl NoisyGuard {
    pub fn new(source: Box<dyn DeviceUnplugSource>, events: EventSink) -> Self {
        NoisyGuard {
            source,
            events,
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn subscribe(&mut self) {
        if !self.active {
            debug!(target: LOG_TARGET, "Subscribing to device-unplug notifications.");
            self.source.subscribe(self.events.clone());
            self.active = true;
        }
    }

    pub fn unsubscribe(&mut self) {
        if self.active {
            debug!(target: LOG_TARGET, "Unsubscribing from device-unplug notifications.");
            self.source.unsubscribe();
            self.active = false;
        }
    }
}

impl Drop for NoisyGuard {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
