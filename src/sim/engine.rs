use crate::playback::{
    EngineOptions, EventSink, PlaybackError, PlaybackEvent, PrepareTicket, RenderEngine,
    RenderEngineFactory,
};
use crate::probe::probe_source;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, trace, warn};

const LOG_TARGET: &str = "focus_playback::sim::engine";

/// Everything the simulated engines were asked to do.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct EngineLog {
    pub created: usize,
    pub released: usize,
    pub resets: usize,
    pub sources: Vec<String>,
    pub prepares: Vec<PrepareTicket>,
    pub starts: usize,
    pub pauses: usize,
    pub seeks: Vec<u64>,
    pub volume: Option<(f32, f32)>,
    pub options: Option<EngineOptions>,
    pub wake_lock_held: bool,
    pub active: bool,
    pub position_ms: u64,
}

#[derive(Debug, Default)]
struct Shared {
    log: EngineLog,
    auto_prepare: bool,
    probe: bool,
    fail_creation: bool,
    unavailable: HashSet<String>,
    events: Option<EventSink>,
    // Generation of the last prepare request; stamped on every callback.
    generation: u64,
}

/// Builds [`SimEngine`]s that record into a shared [`EngineLog`].
#[derive(Debug, Clone, Default)]
pub struct SimEngineFactory {
    shared: Arc<Mutex<Shared>>,
}

impl SimEngineFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Post `EnginePrepared` as soon as preparation is requested.
    pub fn with_auto_prepare(self, auto_prepare: bool) -> Self {
        self.shared.lock().auto_prepare = auto_prepare;
        self
    }

    /// Validate sources with [`probe_source`] before accepting them.
    pub fn with_probe(self, probe: bool) -> Self {
        self.shared.lock().probe = probe;
        self
    }

    pub fn handle(&self) -> SimEngineHandle {
        SimEngineHandle {
            shared: self.shared.clone(),
        }
    }
}

impl RenderEngineFactory for SimEngineFactory {
    fn create(
        &mut self,
        options: EngineOptions,
        events: EventSink,
    ) -> Result<Box<dyn RenderEngine>, PlaybackError> {
        let mut shared = self.shared.lock();
        if shared.fail_creation {
            return Err(PlaybackError::EngineCreation("simulated creation failure".to_string()));
        }
        shared.log.created += 1;
        shared.log.options = Some(options);
        shared.log.wake_lock_held = true;
        shared.log.active = false;
        shared.log.position_ms = 0;
        shared.events = Some(events.clone());
        debug!(target: LOG_TARGET, "Simulated engine #{} created.", shared.log.created);
        Ok(Box::new(SimEngine {
            shared: self.shared.clone(),
            events,
            released: false,
        }))
    }
}

/// In-memory render engine. Position only moves when the test or shell
/// calls [`SimEngineHandle::advance`].
pub struct SimEngine {
    shared: Arc<Mutex<Shared>>,
    events: EventSink,
    released: bool,
}

impl SimEngine {
    fn check_live(&self, op: &str) -> bool {
        if self.released {
            warn!(target: LOG_TARGET, "{} called on a released engine.", op);
        }
        !self.released
    }
}

impl RenderEngine for SimEngine {
    fn set_source(&mut self, uri: &str) -> Result<(), PlaybackError> {
        let (probe, unavailable) = {
            let shared = self.shared.lock();
            (shared.probe, shared.unavailable.contains(uri))
        };
        if unavailable {
            return Err(PlaybackError::source_unavailable(uri, "marked unavailable"));
        }
        if probe {
            probe_source(uri)?;
        }
        self.shared.lock().log.sources.push(uri.to_string());
        Ok(())
    }

    fn prepare_async(&mut self, ticket: PrepareTicket) {
        if !self.check_live("prepare_async") {
            return;
        }
        let auto_prepare = {
            let mut shared = self.shared.lock();
            shared.log.prepares.push(ticket.clone());
            shared.generation = ticket.generation;
            shared.auto_prepare
        };
        if auto_prepare {
            self.events.post(PlaybackEvent::EnginePrepared(ticket));
        }
    }

    fn start(&mut self) {
        if self.check_live("start") {
            let mut shared = self.shared.lock();
            shared.log.starts += 1;
            shared.log.active = true;
        }
    }

    fn pause(&mut self) {
        if self.check_live("pause") {
            let mut shared = self.shared.lock();
            shared.log.pauses += 1;
            shared.log.active = false;
        }
    }

    fn seek(&mut self, position_ms: u64) {
        if !self.check_live("seek") {
            return;
        }
        let generation = {
            let mut shared = self.shared.lock();
            shared.log.seeks.push(position_ms);
            shared.log.position_ms = position_ms;
            shared.generation
        };
        self.events.post(PlaybackEvent::EngineSeekComplete { generation });
    }

    fn position_ms(&self) -> u64 {
        self.shared.lock().log.position_ms
    }

    fn is_active(&self) -> bool {
        !self.released && self.shared.lock().log.active
    }

    fn set_volume(&mut self, left: f32, right: f32) {
        if self.check_live("set_volume") {
            self.shared.lock().log.volume = Some((left, right));
        }
    }

    fn reset(&mut self) {
        if self.check_live("reset") {
            let mut shared = self.shared.lock();
            shared.log.resets += 1;
            shared.log.active = false;
            shared.log.position_ms = 0;
        }
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        let mut shared = self.shared.lock();
        shared.log.released += 1;
        shared.log.wake_lock_held = false;
        shared.log.active = false;
        shared.events = None;
        trace!(target: LOG_TARGET, "Simulated engine released.");
    }
}

/// Test/shell side of the simulated engine: inspect calls and inject the
/// engine's asynchronous callbacks.
#[derive(Debug, Clone)]
pub struct SimEngineHandle {
    shared: Arc<Mutex<Shared>>,
}

impl SimEngineHandle {
    pub fn log(&self) -> EngineLog {
        self.shared.lock().log.clone()
    }

    pub fn last_ticket(&self) -> Option<PrepareTicket> {
        self.shared.lock().log.prepares.last().cloned()
    }

    pub fn mark_unavailable(&self, uri: &str) {
        self.shared.lock().unavailable.insert(uri.to_string());
    }

    pub fn set_fail_creation(&self, fail: bool) {
        self.shared.lock().fail_creation = fail;
    }

    /// Moves the playhead forward while the engine is producing audio.
    pub fn advance(&self, ms: u64) {
        let mut shared = self.shared.lock();
        if shared.log.active {
            shared.log.position_ms += ms;
        }
    }

    /// Delivers `prepared` for the most recent prepare request.
    pub fn finish_prepare(&self) -> bool {
        let shared = self.shared.lock();
        match (shared.log.prepares.last(), shared.events.as_ref()) {
            (Some(ticket), Some(events)) => {
                events.post(PlaybackEvent::EnginePrepared(ticket.clone()));
                true
            }
            _ => false,
        }
    }

    /// Plays to the end of the track.
    pub fn complete(&self) -> bool {
        let mut shared = self.shared.lock();
        shared.log.active = false;
        match shared.events.as_ref() {
            Some(events) => {
                events.post(PlaybackEvent::EngineCompleted {
                    generation: shared.generation,
                });
                true
            }
            None => false,
        }
    }

    pub fn fail(&self, code: i32, extra: i32) -> bool {
        let mut shared = self.shared.lock();
        shared.log.active = false;
        match shared.events.as_ref() {
            Some(events) => {
                events.post(PlaybackEvent::EngineError {
                    generation: shared.generation,
                    code,
                    extra,
                });
                true
            }
            None => false,
        }
    }
}
