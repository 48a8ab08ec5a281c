use crate::playback::{
    AudioFocusService, DeviceUnplugSource, EventSink, FocusChange, FocusGain, FocusRequestResult,
    ForegroundClaim, PlaybackEvent, StreamType,
};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, warn};

const LOG_TARGET: &str = "focus_playback::sim::platform";

#[derive(Debug)]
struct FocusShared {
    grant: bool,
    requests: usize,
    abandons: usize,
    listener: Option<EventSink>,
}

/// Audio policy stand-in. Grants by default.
#[derive(Debug, Clone)]
pub struct SimFocusService {
    shared: Arc<Mutex<FocusShared>>,
}

impl Default for SimFocusService {
    fn default() -> Self {
        SimFocusService {
            shared: Arc::new(Mutex::new(FocusShared {
                grant: true,
                requests: 0,
                abandons: 0,
                listener: None,
            })),
        }
    }
}

impl SimFocusService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> SimFocusHandle {
        SimFocusHandle {
            shared: self.shared.clone(),
        }
    }
}

impl AudioFocusService for SimFocusService {
    fn request(&mut self, stream: StreamType, gain: FocusGain, events: EventSink) -> FocusRequestResult {
        let mut shared = self.shared.lock();
        shared.requests += 1;
        debug!(target: LOG_TARGET, "Focus requested: {:?}/{:?}, granting: {}", stream, gain, shared.grant);
        if shared.grant {
            shared.listener = Some(events);
            FocusRequestResult::Granted
        } else {
            FocusRequestResult::Denied
        }
    }

    fn abandon(&mut self) -> FocusRequestResult {
        let mut shared = self.shared.lock();
        shared.abandons += 1;
        shared.listener = None;
        FocusRequestResult::Granted
    }
}

#[derive(Debug, Clone)]
pub struct SimFocusHandle {
    shared: Arc<Mutex<FocusShared>>,
}

impl SimFocusHandle {
    pub fn set_grant(&self, grant: bool) {
        self.shared.lock().grant = grant;
    }

    pub fn requests(&self) -> usize {
        self.shared.lock().requests
    }

    pub fn abandons(&self) -> usize {
        self.shared.lock().abandons
    }

    /// Sends a focus change to the current focus holder, if any.
    pub fn change(&self, change: FocusChange) -> bool {
        let shared = self.shared.lock();
        match shared.listener.as_ref() {
            Some(events) => {
                events.post(PlaybackEvent::FocusChanged(change));
                true
            }
            None => {
                warn!(target: LOG_TARGET, "No focus listener registered, dropping {:?}", change);
                false
            }
        }
    }
}

#[derive(Debug, Default)]
struct UnplugShared {
    listener: Option<EventSink>,
    subscribes: usize,
    unsubscribes: usize,
}

/// "Audio becoming noisy" broadcast stand-in.
#[derive(Debug, Clone, Default)]
pub struct SimUnplugSource {
    shared: Arc<Mutex<UnplugShared>>,
}

impl SimUnplugSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> SimUnplugHandle {
        SimUnplugHandle {
            shared: self.shared.clone(),
        }
    }
}

impl DeviceUnplugSource for SimUnplugSource {
    fn subscribe(&mut self, events: EventSink) {
        let mut shared = self.shared.lock();
        shared.subscribes += 1;
        shared.listener = Some(events);
    }

    fn unsubscribe(&mut self) {
        let mut shared = self.shared.lock();
        shared.unsubscribes += 1;
        shared.listener = None;
    }
}

#[derive(Debug, Clone)]
pub struct SimUnplugHandle {
    shared: Arc<Mutex<UnplugShared>>,
}

impl SimUnplugHandle {
    pub fn is_subscribed(&self) -> bool {
        self.shared.lock().listener.is_some()
    }

    pub fn counts(&self) -> (usize, usize) {
        let shared = self.shared.lock();
        (shared.subscribes, shared.unsubscribes)
    }

    /// Pulls the headphones. Only delivered while someone is subscribed.
    pub fn unplug(&self) -> bool {
        let shared = self.shared.lock();
        match shared.listener.as_ref() {
            Some(events) => {
                events.post(PlaybackEvent::DeviceUnplugged);
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ForegroundLog {
    pub enters: usize,
    pub exits: usize,
    pub last_exit_released_engine: Option<bool>,
    pub in_foreground: bool,
}

/// Records foreground enter/exit calls.
#[derive(Debug, Clone, Default)]
pub struct SimForegroundClaim {
    log: Arc<Mutex<ForegroundLog>>,
}

impl SimForegroundClaim {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> ForegroundLog {
        self.log.lock().clone()
    }
}

impl ForegroundClaim for SimForegroundClaim {
    fn enter(&mut self) {
        let mut log = self.log.lock();
        log.enters += 1;
        log.in_foreground = true;
    }

    fn exit(&mut self, release_engine: bool) {
        let mut log = self.log.lock();
        log.exits += 1;
        log.last_exit_released_engine = Some(release_engine);
        log.in_foreground = false;
    }
}
