//! Integration tests for the controller driven through its public API

use focus_playback::playback::{
    EventReceiver, EventSink, FocusChange, FocusLevel, PlaybackController, PlaybackObserver,
    PlaybackState, TrackRef, VolumeLevels,
};
use focus_playback::sim::{simulated_platform, ObserverCall, RecordingObserver, SimHandles, SimOptions};
use std::sync::Arc;

use PlaybackState::{Buffering, Paused, Playing, Stopped};

fn setup() -> (PlaybackController, EventReceiver, SimHandles, Arc<RecordingObserver>) {
    let (collaborators, sim) = simulated_platform(SimOptions::default());
    let (sink, events) = EventSink::channel();
    let mut controller = PlaybackController::new(collaborators, VolumeLevels::default(), sink);
    let observer = Arc::new(RecordingObserver::new());
    let as_observer: Arc<dyn PlaybackObserver> = observer.clone();
    controller.set_observer(&as_observer);
    (controller, events, sim, observer)
}

fn pump(controller: &mut PlaybackController, events: &mut EventReceiver) {
    while let Ok(event) = events.try_recv() {
        controller.dispatch(event);
    }
}

#[cfg(test)]
mod playback_flow_tests {
    use super::*;

    /// Play, pause and replay the same track without reloading it
    #[test]
    fn test_pause_and_resume_same_track() {
        let (mut controller, mut events, sim, observer) = setup();

        controller.play(TrackRef::new("A", "a.mp3"));
        assert_eq!(observer.statuses(), vec![Buffering]);
        assert_eq!(controller.focus(), FocusLevel::Focused);

        assert!(sim.engine.finish_prepare());
        pump(&mut controller, &mut events);
        assert_eq!(observer.statuses(), vec![Buffering, Playing]);

        sim.engine.advance(4_000);
        controller.pause();
        assert_eq!(observer.statuses(), vec![Buffering, Playing, Paused]);
        assert!(controller.engine_owned());
        assert_eq!(controller.current_position_ms(), 4_000);

        controller.play(TrackRef::new("A", "a.mp3"));
        pump(&mut controller, &mut events);
        assert_eq!(observer.statuses(), vec![Buffering, Playing, Paused, Playing]);

        let log = sim.engine.log();
        assert_eq!(log.sources.len(), 1);
        assert_eq!(log.prepares.len(), 1);
        assert_eq!(log.position_ms, 4_000);
    }

    /// A second play before the first prepares supersedes it
    #[test]
    fn test_quick_track_switch_ignores_late_prepare() {
        let (mut controller, mut events, sim, observer) = setup();

        controller.play(TrackRef::new("A", "a.mp3"));
        let stale = sim.engine.last_ticket().unwrap();
        controller.play(TrackRef::new("B", "b.mp3"));
        assert_eq!(observer.statuses(), vec![Buffering, Stopped, Buffering]);

        // A's prepare lands late and must not start anything
        controller.dispatch(focus_playback::playback::PlaybackEvent::EnginePrepared(stale));
        assert_eq!(controller.state(), Buffering);
        assert_eq!(sim.engine.log().starts, 0);

        assert!(sim.engine.finish_prepare());
        pump(&mut controller, &mut events);
        assert_eq!(controller.state(), Playing);
        assert_eq!(controller.loaded_track().unwrap().media_id, "B");

        let statuses = observer.statuses();
        assert_eq!(statuses.iter().filter(|s| **s == Buffering).count(), 2);
        assert_eq!(statuses.last(), Some(&Playing));
    }

    /// Stop always hands everything back to the platform
    #[test]
    fn test_stop_releases_platform_resources() {
        let (mut controller, mut events, sim, observer) = setup();

        controller.play(TrackRef::new("A", "a.mp3"));
        assert!(sim.engine.finish_prepare());
        pump(&mut controller, &mut events);
        assert!(sim.unplug.is_subscribed());
        assert!(sim.foreground.log().in_foreground);

        controller.stop(true);
        assert_eq!(observer.calls().last(), Some(&ObserverCall::Status(Stopped)));
        assert_eq!(controller.focus(), FocusLevel::None);
        assert!(!controller.engine_owned());
        assert!(!sim.unplug.is_subscribed());
        assert!(!sim.foreground.log().in_foreground);
        assert!(sim.foreground.log().last_exit_released_engine);
        assert_eq!(sim.engine.log().released, 1);
        assert_eq!(sim.focus.abandons(), 1);
    }

    /// A phone call pauses playback and its end resumes at the same spot
    #[test]
    fn test_transient_interruption_round_trip() {
        let (mut controller, mut events, sim, observer) = setup();

        controller.play(TrackRef::new("A", "a.mp3"));
        assert!(sim.engine.finish_prepare());
        pump(&mut controller, &mut events);
        sim.engine.advance(2_500);

        assert!(sim.focus.change(FocusChange::LostTransient));
        pump(&mut controller, &mut events);
        assert_eq!(controller.state(), Paused);
        assert!(controller.play_on_focus_gain());

        assert!(sim.focus.change(FocusChange::Gained));
        pump(&mut controller, &mut events);
        assert_eq!(controller.state(), Playing);
        assert_eq!(controller.current_position_ms(), 2_500);
        assert_eq!(observer.statuses(), vec![Buffering, Playing, Paused, Playing]);
    }

    /// Unplugging headphones pauses and a user pause keeps focus released
    #[test]
    fn test_unplug_pauses_playback() {
        let (mut controller, mut events, sim, observer) = setup();

        controller.play(TrackRef::new("A", "a.mp3"));
        assert!(sim.engine.finish_prepare());
        pump(&mut controller, &mut events);

        assert!(sim.unplug.unplug());
        pump(&mut controller, &mut events);
        assert_eq!(controller.state(), Paused);
        assert!(!controller.play_on_focus_gain());
        assert!(!sim.unplug.is_subscribed());
        assert_eq!(observer.statuses().last(), Some(&Paused));
    }
}
