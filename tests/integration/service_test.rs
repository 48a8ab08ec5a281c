//! Integration tests for the playback service task

use focus_playback::config::Settings;
use focus_playback::playback::{PlaybackState, PlaybackUpdate, TrackRef};
use focus_playback::service::PlaybackService;
use focus_playback::sim::{simulated_platform, SimOptions};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::timeout;

async fn next_update(rx: &mut broadcast::Receiver<PlaybackUpdate>) -> PlaybackUpdate {
    timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for update")
        .expect("update channel closed")
}

#[cfg(test)]
mod service_integration_tests {
    use super::*;

    /// Completion and seek notifications reach subscribers
    #[tokio::test]
    async fn test_completion_and_seek_reach_subscribers() {
        let (collaborators, sim) = simulated_platform(SimOptions {
            auto_prepare: true,
            ..SimOptions::default()
        });
        let (service, handle) = PlaybackService::new(collaborators, &Settings::default());
        let task = tokio::spawn(service.run());
        let mut updates = handle.subscribe_updates();

        handle.play(TrackRef::new("A", "a.mp3")).await.unwrap();
        assert_eq!(
            next_update(&mut updates).await,
            PlaybackUpdate::StatusChanged(PlaybackState::Buffering)
        );
        assert_eq!(
            next_update(&mut updates).await,
            PlaybackUpdate::StatusChanged(PlaybackState::Playing)
        );

        handle.seek_to(30_000).await.unwrap();
        assert_eq!(
            next_update(&mut updates).await,
            PlaybackUpdate::StatusChanged(PlaybackState::Playing)
        );
        assert_eq!(handle.snapshot().await.unwrap().position_ms, 30_000);

        assert!(sim.engine.complete());
        assert_eq!(next_update(&mut updates).await, PlaybackUpdate::Completed);

        handle.shutdown().await.unwrap();
        timeout(Duration::from_secs(2), task).await.unwrap().unwrap();
        assert_eq!(sim.focus.abandons(), 1);
    }
}
