//! Render Engine Lifecycle: owns at most one decoder/renderer.

use super::error::PlaybackError;
use super::events::EventSink;
use super::focus::StreamType;
use super::state::PrepareTicket;
use tracing::{debug, info, instrument, trace};

const LOG_TARGET: &str = "focus_playback::playback::engine";

/// Wake lock an engine holds while decoding and rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeMode {
    PartialCpu,
}

/// How a freshly created engine must be configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    pub stream: StreamType,
    pub wake_mode: WakeMode,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            stream: StreamType::Music,
            wake_mode: WakeMode::PartialCpu,
        }
    }
}

/// A decoder/renderer handle.
///
/// `prepare_async` must return immediately and later post
/// `PlaybackEvent::EnginePrepared(ticket)` to the sink the engine was
/// created with. Completion, seek completion and errors are reported the
/// same way.
pub trait RenderEngine: Send {
    fn set_source(&mut self, uri: &str) -> Result<(), PlaybackError>;
    fn prepare_async(&mut self, ticket: PrepareTicket);
    fn start(&mut self);
    fn pause(&mut self);
    fn seek(&mut self, position_ms: u64);
    fn position_ms(&self) -> u64;
    /// Whether the engine is currently producing audio.
    fn is_active(&self) -> bool;
    fn set_volume(&mut self, left: f32, right: f32);
    /// Returns to idle, dropping any loaded source.
    fn reset(&mut self);
    /// Frees the engine and its wake lock. The handle is unusable afterwards.
    fn release(&mut self);
}

/// Builds render engines wired to the controller's event queue.
pub trait RenderEngineFactory: Send {
    fn create(
        &mut self,
        options: EngineOptions,
        events: EventSink,
    ) -> Result<Box<dyn RenderEngine>, PlaybackError>;
}

/// The hosting process's "doing user-visible audio work" claim.
pub trait ForegroundClaim: Send {
    fn enter(&mut self);
    fn exit(&mut self, release_engine: bool);
}

/// Exclusive owner of the single engine instance and the foreground claim.
pub struct EngineSlot {
    factory: Box<dyn RenderEngineFactory>,
    foreground: Box<dyn ForegroundClaim>,
    events: EventSink,
    engine: Option<Box<dyn RenderEngine>>,
    prepared: bool,
    claim_held: bool,
}

impl EngineSlot {
    pub fn new(
        factory: Box<dyn RenderEngineFactory>,
        foreground: Box<dyn ForegroundClaim>,
        events: EventSink,
    ) -> Self {
        EngineSlot {
            factory,
            foreground,
            events,
            engine: None,
            prepared: false,
            claim_held: false,
        }
    }

    pub fn is_owned(&self) -> bool {
        self.engine.is_some()
    }

    /// The loaded source finished preparing and can be started.
    pub fn is_prepared(&self) -> bool {
        self.engine.is_some() && self.prepared
    }

    pub fn is_active(&self) -> bool {
        self.engine.as_ref().map_or(false, |e| e.is_active())
    }

    pub fn engine_mut(&mut self) -> Option<&mut (dyn RenderEngine + 'static)> {
        self.engine.as_deref_mut()
    }

    /// Live position once the loaded source is prepared. Before that the
    /// engine has no meaningful position of its own.
    pub fn live_position_ms(&self) -> Option<u64> {
        if !self.prepared {
            return None;
        }
        self.engine.as_ref().map(|e| e.position_ms())
    }

    /// Creates the engine on first use, otherwise resets the existing one
    /// to idle. The wake lock stays with the engine across resets.
    #[instrument(skip(self))]
    pub fn ensure_engine(&mut self) -> Result<(), PlaybackError> {
        self.prepared = false;
        match self.engine.as_mut() {
            Some(engine) => {
                debug!(target: LOG_TARGET, "Resetting existing render engine.");
                engine.reset();
            }
            None => {
                info!(target: LOG_TARGET, "Creating render engine.");
                let engine = self
                    .factory
                    .create(EngineOptions::default(), self.events.clone())?;
                self.engine = Some(engine);
            }
        }
        Ok(())
    }

    /// Points the engine at `uri` and starts asynchronous preparation.
    /// Fails synchronously when the source cannot be opened.
    #[instrument(skip(self), fields(generation = ticket.generation))]
    pub fn load_and_prepare(&mut self, uri: &str, ticket: PrepareTicket) -> Result<(), PlaybackError> {
        let engine = self
            .engine
            .as_mut()
            .ok_or_else(|| PlaybackError::EngineCreation("no render engine owned".to_string()))?;
        engine.set_source(uri)?;
        self.prepared = false;
        engine.prepare_async(ticket);
        debug!(target: LOG_TARGET, "Preparation requested for {}", uri);
        Ok(())
    }

    pub fn mark_prepared(&mut self) {
        self.prepared = self.engine.is_some();
    }

    /// Takes the foreground claim, once, when rendering starts.
    pub fn enter_foreground(&mut self) {
        if !self.claim_held {
            trace!(target: LOG_TARGET, "Entering foreground.");
            self.foreground.enter();
            self.claim_held = true;
        }
    }

    /// Drops the foreground claim. With `full`, also stops and frees the
    /// engine and its wake lock; without it the engine is kept for a fast
    /// resume.
    #[instrument(skip(self))]
    pub fn release(&mut self, full: bool) {
        if self.claim_held {
            self.foreground.exit(full);
            self.claim_held = false;
        }
        if full {
            if let Some(mut engine) = self.engine.take() {
                info!(target: LOG_TARGET, "Releasing render engine.");
                engine.reset();
                engine.release();
            }
            self.prepared = false;
        }
    }
}

impl Drop for EngineSlot {
    fn drop(&mut self) {
        if self.engine.is_some() || self.claim_held {
            debug!(target: LOG_TARGET, "Engine slot dropped while holding resources, releasing.");
            self.release(true);
        }
    }
}
