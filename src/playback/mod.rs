//! Single-track playback control: focus arbitration, render engine
//! lifecycle and the playback state machine.

mod controller;
mod engine;
mod error;
mod events;
mod focus;
mod noisy;
mod observer;
mod state;

pub use controller::{
    Collaborators, PlaybackController, VolumeLevels, DEFAULT_DUCK_VOLUME, DEFAULT_NORMAL_VOLUME,
};
pub use engine::{
    EngineOptions, EngineSlot, ForegroundClaim, RenderEngine, RenderEngineFactory, WakeMode,
};
pub use error::PlaybackError;
pub use events::{EventReceiver, EventSink};
pub use focus::{AudioFocusService, FocusArbiter, FocusGain, FocusRequestResult, StreamType};
pub use noisy::{DeviceUnplugSource, NoisyGuard};
pub use observer::{BroadcastObserver, PlaybackObserver, PlaybackUpdate};
pub use state::{
    FocusChange, FocusLevel, PlaybackEvent, PlaybackSnapshot, PlaybackState, PrepareTicket,
    TrackRef,
};
