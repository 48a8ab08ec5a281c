//! Command-line interface implementation

use clap::Parser;
use std::error::Error;
use thiserror::Error;

use crate::playback::{FocusChange, PlaybackSnapshot, PlaybackUpdate, TrackRef};

/// Command-line arguments for the playback shell
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Single-track playback controller shell", long_about = None)]
pub struct Args {
    /// Config file path
    #[arg(short, long, env = "FOCUS_PLAYBACK_CONFIG")]
    pub config: Option<String>,

    /// Log filter, used when RUST_LOG is not set
    #[arg(short, long, env = "FOCUS_PLAYBACK_LOG")]
    pub log_level: Option<String>,

    /// Engine volume while ducked (0.0 - 1.0)
    #[arg(short, long)]
    pub duck_volume: Option<f32>,

    /// Accept any source without probing it
    #[arg(long)]
    pub no_probe: bool,
}

/// Focus changes the shell can simulate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusCommand {
    Gain,
    Loss,
    Transient,
    Duck,
}

impl From<FocusCommand> for FocusChange {
    fn from(cmd: FocusCommand) -> Self {
        match cmd {
            FocusCommand::Gain => FocusChange::Gained,
            FocusCommand::Loss => FocusChange::LostPermanently,
            FocusCommand::Transient => FocusChange::LostTransient,
            FocusCommand::Duck => FocusChange::LostTransientCanDuck,
        }
    }
}

/// One line typed into the shell
#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Play(TrackRef),
    Pause,
    Seek(u64),
    Stop,
    Focus(FocusCommand),
    Unplug,
    Complete,
    Fail { code: i32, extra: i32 },
    Advance(u64),
    Status,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct CommandParseError(String);

fn number<T: std::str::FromStr>(arg: Option<&str>, what: &str) -> Result<T, CommandParseError> {
    let raw = arg.ok_or_else(|| CommandParseError(format!("missing {}", what)))?;
    raw.parse()
        .map_err(|_| CommandParseError(format!("invalid {}: {}", what, raw)))
}

impl ShellCommand {
    /// Parses a shell line such as `play A song.mp3` or `seek 1500`.
    pub fn parse(line: &str) -> Result<Self, CommandParseError> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err(CommandParseError("empty command".to_string()));
        };

        let command = match verb.to_lowercase().as_str() {
            "play" => {
                let id = words
                    .next()
                    .ok_or_else(|| CommandParseError("missing media id".to_string()))?;
                match words.next() {
                    Some(uri) => ShellCommand::Play(TrackRef::new(id, uri)),
                    None => ShellCommand::Play(TrackRef::without_source(id)),
                }
            }
            "pause" => ShellCommand::Pause,
            "seek" => ShellCommand::Seek(number(words.next(), "position")?),
            "stop" => ShellCommand::Stop,
            "focus" => {
                let focus = match words.next().map(str::to_lowercase).as_deref() {
                    Some("gain") => FocusCommand::Gain,
                    Some("loss") => FocusCommand::Loss,
                    Some("transient") => FocusCommand::Transient,
                    Some("duck") => FocusCommand::Duck,
                    Some(other) => {
                        return Err(CommandParseError(format!("unknown focus change: {}", other)))
                    }
                    None => return Err(CommandParseError("missing focus change".to_string())),
                };
                ShellCommand::Focus(focus)
            }
            "unplug" => ShellCommand::Unplug,
            "complete" => ShellCommand::Complete,
            "fail" => ShellCommand::Fail {
                code: number(words.next(), "error code")?,
                extra: number(words.next(), "error extra")?,
            },
            "advance" => ShellCommand::Advance(number(words.next(), "duration")?),
            "status" => ShellCommand::Status,
            "help" | "?" => ShellCommand::Help,
            "quit" | "exit" | "q" => ShellCommand::Quit,
            other => return Err(CommandParseError(format!("unknown command: {}", other))),
        };
        Ok(command)
    }
}

/// CLI user interface for the playback shell
pub struct Cli {
    pub args: Args,
}

impl Cli {
    /// Create a new CLI instance
    pub fn new() -> Self {
        Cli {
            args: Args::parse(),
        }
    }

    /// Display available shell commands
    pub fn display_help(&self) {
        println!("\nCommands:");
        println!("  play <id> [uri]     load and play a track (resumes if paused on it)");
        println!("  pause | stop        pause or stop playback");
        println!("  seek <ms>           seek within the current track");
        println!("  focus gain|loss|transient|duck");
        println!("                      simulate an audio focus change");
        println!("  unplug              simulate headphones being unplugged");
        println!("  complete            simulate end of track");
        println!("  fail <code> <extra> simulate a render engine error");
        println!("  advance <ms>        move the simulated playhead");
        println!("  status              show controller state");
        println!("  quit");
        println!();
    }

    /// Display an observer notification
    pub fn display_update(&self, update: &PlaybackUpdate) {
        match update {
            PlaybackUpdate::StatusChanged(state) => println!("[status] {}", state),
            PlaybackUpdate::Completed => println!("[completed]"),
            PlaybackUpdate::Error(message) => println!("[error] {}", message),
        }
    }

    /// Display a controller snapshot
    pub fn display_snapshot(&self, snapshot: &PlaybackSnapshot) {
        let track = snapshot
            .loaded_track
            .as_ref()
            .map(|t| t.media_id.as_str())
            .unwrap_or("-");
        println!(
            "{:<10} focus={:<14} pos={:>8} ms  track={:<12} engine={} resume={} unplug-watch={}",
            snapshot.state.to_string(),
            format!("{:?}", snapshot.focus),
            snapshot.position_ms,
            track,
            snapshot.engine_owned,
            snapshot.play_on_focus_gain,
            snapshot.noisy_subscribed,
        );
    }

    /// Display error messages
    pub fn display_error(&self, error: &dyn Error) {
        eprintln!("Error: {}", error);
    }
}
