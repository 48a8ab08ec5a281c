//! Tests for the command-line interface

use super::*;
use crate::playback::{FocusChange, PlaybackSnapshot, PlaybackState, PlaybackUpdate, TrackRef};

fn cli() -> Cli {
    Cli {
        args: Args {
            config: None,
            log_level: None,
            duck_volume: None,
            no_probe: false,
        },
    }
}

#[test]
fn test_args_parsing() {
    use clap::CommandFactory;
    let app = Args::command();
    app.debug_assert();
}

#[test]
fn test_args_flags() {
    use clap::Parser;
    let args = Args::try_parse_from(["focus-playback", "--duck-volume", "0.3", "--no-probe"]).unwrap();
    assert_eq!(args.duck_volume, Some(0.3));
    assert!(args.no_probe);
}

#[test]
fn test_parse_play() {
    assert_eq!(
        ShellCommand::parse("play A a.mp3").unwrap(),
        ShellCommand::Play(TrackRef::new("A", "a.mp3"))
    );
    assert_eq!(
        ShellCommand::parse("PLAY B").unwrap(),
        ShellCommand::Play(TrackRef::without_source("B"))
    );
    assert!(ShellCommand::parse("play").is_err());
}

#[test]
fn test_parse_numbers() {
    assert_eq!(ShellCommand::parse("seek 1500").unwrap(), ShellCommand::Seek(1500));
    assert_eq!(
        ShellCommand::parse("fail 1 -1004").unwrap(),
        ShellCommand::Fail { code: 1, extra: -1004 }
    );
    let err = ShellCommand::parse("seek soon").unwrap_err();
    assert_eq!(err.to_string(), "invalid position: soon");
}

#[test]
fn test_parse_focus() {
    assert_eq!(
        ShellCommand::parse("focus duck").unwrap(),
        ShellCommand::Focus(FocusCommand::Duck)
    );
    assert_eq!(FocusChange::from(FocusCommand::Transient), FocusChange::LostTransient);
    assert!(ShellCommand::parse("focus sideways").is_err());
}

#[test]
fn test_parse_misc() {
    assert_eq!(ShellCommand::parse("  quit ").unwrap(), ShellCommand::Quit);
    assert_eq!(ShellCommand::parse("?").unwrap(), ShellCommand::Help);
    assert!(ShellCommand::parse("").is_err());
    assert!(ShellCommand::parse("dance").is_err());
}

#[test]
fn test_display_functions() {
    let cli = cli();
    cli.display_update(&PlaybackUpdate::StatusChanged(PlaybackState::Paused));
    cli.display_snapshot(&PlaybackSnapshot {
        state: PlaybackState::Playing,
        focus: crate::playback::FocusLevel::Focused,
        position_ms: 1200,
        loaded_track: Some(TrackRef::new("A", "a.mp3")),
        engine_owned: true,
        play_on_focus_gain: false,
        noisy_subscribed: true,
    });
    let error = std::io::Error::new(std::io::ErrorKind::Other, "Test error");
    cli.display_error(&error);
}
