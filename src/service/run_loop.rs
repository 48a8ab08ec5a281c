use super::{PlaybackCommand, PlaybackService, SERVICE_LOG_TARGET};
use tracing::{debug, info, trace};

/// Runs the service's command and event processing loop. The controller is
/// only ever touched from here.
pub async fn run_service_loop(service: &mut PlaybackService) {
    info!(target: SERVICE_LOG_TARGET, "Playback service loop started.");

    loop {
        tokio::select! {
            biased; // Check commands first

            command = service.command_rx.recv() => {
                let Some(command) = command else {
                    info!(target: SERVICE_LOG_TARGET, "All playback handles dropped. Exiting loop.");
                    break;
                };
                trace!(target: SERVICE_LOG_TARGET, "Received command: {:?}", command);
                match command {
                    PlaybackCommand::Play(track) => service.controller.play(track),
                    PlaybackCommand::Pause => service.controller.pause(),
                    PlaybackCommand::SeekTo(position_ms) => service.controller.seek_to(position_ms),
                    PlaybackCommand::Stop { notify } => service.controller.stop(notify),
                    PlaybackCommand::GetSnapshot(responder) => {
                        let _ = responder.send(service.controller.snapshot()); // Receiver may be gone
                    }
                    PlaybackCommand::Shutdown => {
                        info!(target: SERVICE_LOG_TARGET, "Shutdown command received. Exiting loop.");
                        break;
                    }
                }
            }

            Some(event) = service.event_rx.recv() => {
                debug!(target: SERVICE_LOG_TARGET, "Hardware event: {:?}", event);
                service.controller.dispatch(event);
            }
        }
    }

    info!(target: SERVICE_LOG_TARGET, "Playback service loop finished. Forcing stop.");
    service.controller.stop(true);
}
