//! Hosts a [`PlaybackController`] on a single tokio task.
//!
//! Public calls arrive as [`PlaybackCommand`]s through a [`PlaybackHandle`];
//! hardware callbacks arrive on the controller's event queue. The run loop
//! consumes both one at a time, so every mutation of controller state is
//! serialized without a lock.

use crate::config::Settings;
use crate::playback::{
    BroadcastObserver, Collaborators, EventReceiver, EventSink, PlaybackController,
    PlaybackError, PlaybackObserver, PlaybackSnapshot, PlaybackUpdate, TrackRef,
};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{info, instrument};

mod command;
mod run_loop;

pub use command::PlaybackCommand;

const SERVICE_LOG_TARGET: &str = "focus_playback::service";

/// Owns the controller and the receiving ends of both queues.
pub struct PlaybackService {
    controller: PlaybackController,
    command_rx: mpsc::Receiver<PlaybackCommand>,
    event_rx: EventReceiver,
    // The controller only holds a weak reference; keep the broadcaster alive.
    _observer: Arc<dyn PlaybackObserver>,
}

impl PlaybackService {
    /// Creates a service and the handle used to drive it. The service does
    /// nothing until [`PlaybackService::run`] is awaited.
    pub fn new(collaborators: Collaborators, settings: &Settings) -> (Self, PlaybackHandle) {
        let (events, event_rx) = EventSink::channel();
        let mut controller = PlaybackController::new(collaborators, settings.volumes(), events);

        let broadcaster = Arc::new(BroadcastObserver::new(settings.update_capacity));
        let updates = broadcaster.sender();
        let observer: Arc<dyn PlaybackObserver> = broadcaster;
        controller.set_observer(&observer);

        let (command_tx, command_rx) = mpsc::channel(settings.command_buffer_size);
        info!(target: SERVICE_LOG_TARGET, "Playback service created.");

        let service = PlaybackService {
            controller,
            command_rx,
            event_rx,
            _observer: observer,
        };
        (service, PlaybackHandle { command_tx, updates })
    }

    /// Runs until shutdown or until every handle is dropped, then stops
    /// playback and releases all resources.
    #[instrument(skip(self))]
    pub async fn run(mut self) {
        run_loop::run_service_loop(&mut self).await;
    }
}

/// Cloneable front end of a running [`PlaybackService`].
#[derive(Debug, Clone)]
pub struct PlaybackHandle {
    command_tx: mpsc::Sender<PlaybackCommand>,
    updates: broadcast::Sender<PlaybackUpdate>,
}

impl PlaybackHandle {
    async fn send(&self, command: PlaybackCommand) -> Result<(), PlaybackError> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| PlaybackError::ServiceClosed)
    }

    pub async fn play(&self, track: TrackRef) -> Result<(), PlaybackError> {
        self.send(PlaybackCommand::Play(track)).await
    }

    pub async fn pause(&self) -> Result<(), PlaybackError> {
        self.send(PlaybackCommand::Pause).await
    }

    pub async fn seek_to(&self, position_ms: u64) -> Result<(), PlaybackError> {
        self.send(PlaybackCommand::SeekTo(position_ms)).await
    }

    pub async fn stop(&self, notify: bool) -> Result<(), PlaybackError> {
        self.send(PlaybackCommand::Stop { notify }).await
    }

    pub async fn snapshot(&self) -> Result<PlaybackSnapshot, PlaybackError> {
        let (tx, rx) = oneshot::channel();
        self.send(PlaybackCommand::GetSnapshot(tx)).await?;
        rx.await.map_err(|_| PlaybackError::ServiceClosed)
    }

    pub async fn shutdown(&self) -> Result<(), PlaybackError> {
        self.send(PlaybackCommand::Shutdown).await
    }

    /// Subscribes to observer notifications from now on.
    pub fn subscribe_updates(&self) -> broadcast::Receiver<PlaybackUpdate> {
        self.updates.subscribe()
    }
}
