//! Playback State Machine: the single source of truth for what is playing.

use super::engine::{EngineSlot, ForegroundClaim, RenderEngineFactory};
use super::error::PlaybackError;
use super::events::EventSink;
use super::focus::{AudioFocusService, FocusArbiter};
use super::noisy::{DeviceUnplugSource, NoisyGuard};
use super::observer::{PlaybackObserver, StatusNotifier};
use super::state::{
    FocusLevel, PlaybackEvent, PlaybackSnapshot, PlaybackState, PrepareTicket, TrackRef,
};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, trace, warn};

const LOG_TARGET: &str = "focus_playback::playback::controller";

pub const DEFAULT_DUCK_VOLUME: f32 = 0.2;
pub const DEFAULT_NORMAL_VOLUME: f32 = 1.0;

/// Platform services the controller drives. Each is exclusively owned.
pub struct Collaborators {
    pub focus: Box<dyn AudioFocusService>,
    pub engines: Box<dyn RenderEngineFactory>,
    pub unplug: Box<dyn DeviceUnplugSource>,
    pub foreground: Box<dyn ForegroundClaim>,
}

/// Engine volumes applied for each focus level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeLevels {
    pub duck: f32,
    pub normal: f32,
}

impl Default for VolumeLevels {
    fn default() -> Self {
        VolumeLevels {
            duck: DEFAULT_DUCK_VOLUME,
            normal: DEFAULT_NORMAL_VOLUME,
        }
    }
}

/// Single-track playback controller.
///
/// All methods take `&mut self`: the owner must serialize public calls and
/// event dispatch, which [`crate::service::PlaybackService`] does by
/// confining the controller to one task.
pub struct PlaybackController {
    state: PlaybackState,
    focus: FocusArbiter,
    play_on_focus_gain: bool,
    engine: EngineSlot,
    last_position_ms: u64,
    loaded_track: Option<TrackRef>,
    pending_prepare: Option<PrepareTicket>,
    generation: u64,
    noisy: NoisyGuard,
    notifier: StatusNotifier,
    volumes: VolumeLevels,
}

impl PlaybackController {
    pub fn new(collaborators: Collaborators, volumes: VolumeLevels, events: EventSink) -> Self {
        let Collaborators {
            focus,
            engines,
            unplug,
            foreground,
        } = collaborators;
        PlaybackController {
            state: PlaybackState::Stopped,
            focus: FocusArbiter::new(focus, events.clone()),
            play_on_focus_gain: false,
            engine: EngineSlot::new(engines, foreground, events.clone()),
            last_position_ms: 0,
            loaded_track: None,
            pending_prepare: None,
            generation: 0,
            noisy: NoisyGuard::new(unplug, events),
            notifier: StatusNotifier::default(),
            volumes,
        }
    }

    /// Registers the observer. Only a weak reference is kept.
    pub fn set_observer(&mut self, observer: &Arc<dyn PlaybackObserver>) {
        self.notifier.set_observer(observer);
    }

    pub fn clear_observer(&mut self) {
        self.notifier.clear_observer();
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn focus(&self) -> FocusLevel {
        self.focus.level()
    }

    pub fn play_on_focus_gain(&self) -> bool {
        self.play_on_focus_gain
    }

    pub fn engine_owned(&self) -> bool {
        self.engine.is_owned()
    }

    pub fn noisy_subscribed(&self) -> bool {
        self.noisy.is_active()
    }

    pub fn loaded_track(&self) -> Option<&TrackRef> {
        self.loaded_track.as_ref()
    }

    /// Live engine position when an engine is owned, else the cached one.
    pub fn current_position_ms(&self) -> u64 {
        self.engine
            .live_position_ms()
            .unwrap_or(self.last_position_ms)
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            state: self.state,
            focus: self.focus.level(),
            position_ms: self.current_position_ms(),
            loaded_track: self.loaded_track.clone(),
            engine_owned: self.engine.is_owned(),
            play_on_focus_gain: self.play_on_focus_gain,
            noisy_subscribed: self.noisy.is_active(),
        }
    }

    /// Plays `item`. Resumes without reloading when it is the paused,
    /// already-loaded track; otherwise loads and prepares it.
    #[instrument(skip(self, item), fields(media_id = %item.media_id))]
    pub fn play(&mut self, item: TrackRef) {
        info!(target: LOG_TARGET, "Play requested for {}", item.media_id);
        self.play_on_focus_gain = true;
        if let Err(e) = self.focus.request_focus() {
            debug!(target: LOG_TARGET, "Loading without focus: {}", e);
        }
        self.noisy.subscribe();

        let track_changed = self
            .loaded_track
            .as_ref()
            .map_or(true, |loaded| loaded.media_id != item.media_id);
        if track_changed {
            self.last_position_ms = 0;
        }

        if !track_changed && self.state == PlaybackState::Paused && self.engine.is_owned() {
            debug!(target: LOG_TARGET, "Same track while paused, resuming.");
            self.reconcile_focus();
            return;
        }

        let observed = self.notifier.last_status();
        self.state = PlaybackState::Stopped;
        self.pending_prepare = None;
        self.engine.release(false);
        if observed.map_or(false, |s| s != PlaybackState::Stopped) {
            self.notifier.status(PlaybackState::Stopped, false);
        }
        self.loaded_track = Some(item.clone());

        let Some(uri) = item.source_uri else {
            warn!(target: LOG_TARGET, "Media {} has no source, aborting play.", item.media_id);
            self.abandon_attempt(PlaybackError::MissingSource {
                media_id: item.media_id,
            });
            return;
        };

        if let Err(e) = self.engine.ensure_engine() {
            self.abandon_attempt(e);
            return;
        }

        self.generation += 1;
        let ticket = PrepareTicket {
            generation: self.generation,
            media_id: item.media_id,
        };
        match self.engine.load_and_prepare(&uri, ticket.clone()) {
            Ok(()) => {
                self.pending_prepare = Some(ticket);
                self.state = PlaybackState::Buffering;
                self.notifier.status(PlaybackState::Buffering, false);
            }
            Err(e) => {
                error!(target: LOG_TARGET, "Can't load from source {}: {}", uri, e);
                self.abandon_attempt(e);
            }
        }
    }

    /// Pauses playback, keeping the engine for a fast resume. Always ends
    /// in `Paused` and always notifies, even when already paused.
    #[instrument(skip(self))]
    pub fn pause(&mut self) {
        info!(target: LOG_TARGET, "Pause requested in state {:?}", self.state);
        self.play_on_focus_gain = false;
        self.pause_playback();
    }

    /// Seeks to `position_ms`. Until the loaded source is prepared the
    /// position is only recorded; it is applied when preparation finishes.
    /// With a prepared engine, observers hear back on seek completion.
    #[instrument(skip(self))]
    pub fn seek_to(&mut self, position_ms: u64) {
        self.last_position_ms = position_ms;
        if !self.engine.is_prepared() {
            debug!(target: LOG_TARGET, "No prepared engine, storing position {} ms.", position_ms);
            return;
        }
        if let Some(engine) = self.engine.engine_mut() {
            engine.seek(position_ms);
        }
    }

    /// Stops playback and releases the engine, wake lock, focus and
    /// unplug subscription. Observers are told before the final position
    /// is captured.
    #[instrument(skip(self))]
    pub fn stop(&mut self, notify: bool) {
        info!(target: LOG_TARGET, "Stopping playback (notify: {}).", notify);
        self.state = PlaybackState::Stopped;
        if notify {
            self.notifier.status(PlaybackState::Stopped, false);
        }
        self.last_position_ms = self.current_position_ms();
        self.play_on_focus_gain = false;
        self.pending_prepare = None;
        self.focus.relinquish();
        self.noisy.unsubscribe();
        self.engine.release(true);
    }

    /// Feeds one asynchronous hardware event into the state machine.
    #[instrument(skip(self))]
    pub fn dispatch(&mut self, event: PlaybackEvent) {
        trace!(target: LOG_TARGET, "Dispatching {:?}", event);
        match event {
            PlaybackEvent::FocusChanged(change) => {
                let Some(lost_without_duck) = self.focus.on_focus_changed(change) else {
                    return;
                };
                self.notifier.event_arrived();
                if lost_without_duck && self.state == PlaybackState::Playing {
                    self.play_on_focus_gain = true;
                }
                self.reconcile_focus();
            }
            PlaybackEvent::EnginePrepared(ticket) => self.on_prepared(ticket),
            PlaybackEvent::EngineSeekComplete { generation } => {
                if self.is_current(generation, "seek completion") {
                    self.on_seek_complete();
                }
            }
            PlaybackEvent::EngineCompleted { generation } => {
                if self.is_current(generation, "completion") {
                    self.on_completed();
                }
            }
            PlaybackEvent::EngineError {
                generation,
                code,
                extra,
            } => {
                if self.is_current(generation, "engine error") {
                    self.on_error(code, extra);
                }
            }
            PlaybackEvent::DeviceUnplugged => self.on_device_unplugged(),
        }
    }

    fn on_prepared(&mut self, ticket: PrepareTicket) {
        if self.pending_prepare.as_ref() != Some(&ticket) {
            warn!(
                target: LOG_TARGET,
                "Discarding stale prepared callback for {} (generation {}).",
                ticket.media_id,
                ticket.generation
            );
            return;
        }
        debug!(target: LOG_TARGET, "Render engine prepared {}", ticket.media_id);
        self.pending_prepare = None;
        self.engine.mark_prepared();
        let position = self.last_position_ms;
        if let Some(engine) = self.engine.engine_mut() {
            if engine.position_ms() != position {
                debug!(target: LOG_TARGET, "Applying deferred seek to {} ms.", position);
                engine.seek(position);
            }
        }
        self.notifier.event_arrived();
        self.reconcile_focus();
    }

    /// Engine callbacks only count for the source currently loaded into
    /// the engine we still own.
    fn is_current(&self, generation: u64, what: &str) -> bool {
        if !self.engine.is_owned() {
            trace!(target: LOG_TARGET, "{} without an engine, ignoring.", what);
            return false;
        }
        if generation != self.generation {
            warn!(
                target: LOG_TARGET,
                "Discarding stale {} from generation {} (current {}).",
                what,
                generation,
                self.generation
            );
            return false;
        }
        true
    }

    fn on_seek_complete(&mut self) {
        if let Some(position) = self.engine.live_position_ms() {
            self.last_position_ms = position;
        }
        self.notifier.event_arrived();
        self.notifier.status(self.state, false);
    }

    fn on_completed(&mut self) {
        info!(target: LOG_TARGET, "Track completed.");
        self.notifier.event_arrived();
        self.notifier.completion();
    }

    fn on_error(&mut self, code: i32, extra: i32) {
        error!(target: LOG_TARGET, "Render engine error: code={}, extra={}", code, extra);
        self.notifier.event_arrived();
        let err = PlaybackError::DecodeOrRender { code, extra };
        self.notifier.error(&err.to_string());
    }

    fn on_device_unplugged(&mut self) {
        if !self.noisy.is_active() {
            trace!(target: LOG_TARGET, "Unplug event while unsubscribed, ignoring.");
            return;
        }
        match self.state {
            PlaybackState::Playing | PlaybackState::Buffering => {
                info!(target: LOG_TARGET, "Output device removed, pausing.");
                self.notifier.event_arrived();
                self.pause();
            }
            _ => {}
        }
    }

    fn pause_playback(&mut self) {
        if self.state == PlaybackState::Playing {
            if let Some(engine) = self.engine.engine_mut() {
                if engine.is_active() {
                    engine.pause();
                    self.last_position_ms = engine.position_ms();
                }
            }
            self.engine.release(false);
            self.focus.release_focus();
        }
        self.state = PlaybackState::Paused;
        self.notifier.status(PlaybackState::Paused, true);
        self.noisy.unsubscribe();
    }

    /// Brings the engine in line with the current focus level: pause
    /// without focus, duck or restore volume with it, and start playback
    /// if a resume is pending and the engine is ready.
    fn reconcile_focus(&mut self) {
        let level = self.focus.level();
        if level == FocusLevel::None {
            if self.state == PlaybackState::Playing {
                self.pause_playback();
            }
        } else {
            let volume = if level == FocusLevel::DuckedAllowed {
                self.volumes.duck
            } else {
                self.volumes.normal
            };
            if let Some(engine) = self.engine.engine_mut() {
                engine.set_volume(volume, volume);
            }

            if self.play_on_focus_gain {
                if self.engine.is_prepared() {
                    if !self.engine.is_active() {
                        let position = self.last_position_ms;
                        if let Some(engine) = self.engine.engine_mut() {
                            if engine.position_ms() != position {
                                engine.seek(position);
                            }
                            engine.start();
                        }
                        self.engine.enter_foreground();
                        self.noisy.subscribe();
                        self.state = PlaybackState::Playing;
                        info!(target: LOG_TARGET, "Playback started at {} ms.", position);
                    }
                    self.play_on_focus_gain = false;
                } else if self.pending_prepare.is_some() {
                    // Resume wanted but the source is still preparing.
                    self.state = PlaybackState::Buffering;
                }
            }
        }
        self.notifier.status(self.state, false);
    }

    /// Reports a failed play attempt and drops the claims taken for it.
    /// The controller is left `Stopped`, so the engine goes too.
    fn abandon_attempt(&mut self, err: PlaybackError) {
        self.play_on_focus_gain = false;
        self.focus.relinquish();
        self.noisy.unsubscribe();
        self.engine.release(true);
        self.notifier.error(&err.to_string());
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        if self.engine.is_owned() {
            debug!(target: LOG_TARGET, "Controller dropped with an engine owned, stopping.");
            self.stop(false);
        }
    }
}
