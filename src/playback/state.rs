use serde::{Deserialize, Serialize};
use std::fmt;

/// The four observable playback states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaybackState {
    Stopped,
    Buffering,
    Playing,
    Paused,
}

impl Default for PlaybackState {
    fn default() -> Self {
        PlaybackState::Stopped
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaybackState::Stopped => "stopped",
            PlaybackState::Buffering => "buffering",
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
        };
        f.write_str(name)
    }
}

/// What the controller believes about its claim on the output device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FocusLevel {
    /// No focus, and ducking is not allowed.
    None,
    /// Focus was lost transiently but playback may continue quietly.
    DuckedAllowed,
    Focused,
}

impl Default for FocusLevel {
    fn default() -> Self {
        FocusLevel::None
    }
}

/// Focus change notification delivered by the platform audio policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusChange {
    Gained,
    LostPermanently,
    LostTransient,
    LostTransientCanDuck,
    /// A value the controller does not understand; logged and ignored.
    Unknown(i32),
}

/// Identifies the track a `play` call targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRef {
    pub media_id: String,
    pub source_uri: Option<String>,
}

impl TrackRef {
    pub fn new(media_id: impl Into<String>, source_uri: impl Into<String>) -> Self {
        TrackRef {
            media_id: media_id.into(),
            source_uri: Some(source_uri.into()),
        }
    }

    /// A track with no resolvable source. Playing it is reported as an error.
    pub fn without_source(media_id: impl Into<String>) -> Self {
        TrackRef {
            media_id: media_id.into(),
            source_uri: None,
        }
    }
}

/// Tag attached to every prepare request so late callbacks for a
/// superseded track can be told apart from the current one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrepareTicket {
    pub generation: u64,
    pub media_id: String,
}

/// Asynchronous inputs consumed by [`PlaybackController::dispatch`].
///
/// Engine callbacks carry the generation of the prepare request that loaded
/// the source they refer to; the controller drops any that do not match
/// the source currently loaded.
///
/// [`PlaybackController::dispatch`]: super::PlaybackController::dispatch
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    FocusChanged(FocusChange),
    EnginePrepared(PrepareTicket),
    EngineCompleted { generation: u64 },
    EngineSeekComplete { generation: u64 },
    EngineError { generation: u64, code: i32, extra: i32 },
    DeviceUnplugged,
}

/// Point-in-time view of the controller, used by the service and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSnapshot {
    pub state: PlaybackState,
    pub focus: FocusLevel,
    pub position_ms: u64,
    pub loaded_track: Option<TrackRef>,
    pub engine_owned: bool,
    pub play_on_focus_gain: bool,
    pub noisy_subscribed: bool,
}
