//! Simulated platform collaborators.
//!
//! Every piece of "hardware" the controller talks to has an in-memory
//! stand-in here, plus a handle to inspect what it was asked to do and to
//! inject the asynchronous callbacks real hardware would deliver. The
//! developer shell runs on these, and so do the tests.

mod engine;
mod platform;
mod recorder;

pub use engine::{EngineLog, SimEngine, SimEngineFactory, SimEngineHandle};
pub use platform::{
    ForegroundLog, SimFocusHandle, SimFocusService, SimForegroundClaim, SimUnplugHandle,
    SimUnplugSource,
};
pub use recorder::{ObserverCall, RecordingObserver};

use crate::playback::Collaborators;

/// Knobs for [`simulated_platform`].
#[derive(Debug, Clone, Copy)]
pub struct SimOptions {
    pub auto_prepare: bool,
    pub probe_sources: bool,
    pub grant_focus: bool,
}

impl Default for SimOptions {
    fn default() -> Self {
        SimOptions {
            auto_prepare: false,
            probe_sources: false,
            grant_focus: true,
        }
    }
}

/// Handles onto every simulated collaborator of one controller.
#[derive(Debug, Clone)]
pub struct SimHandles {
    pub focus: SimFocusHandle,
    pub engine: SimEngineHandle,
    pub unplug: SimUnplugHandle,
    pub foreground: SimForegroundClaim,
}

/// Builds a full set of simulated collaborators.
pub fn simulated_platform(options: SimOptions) -> (Collaborators, SimHandles) {
    let focus = SimFocusService::new();
    focus.handle().set_grant(options.grant_focus);
    let engines = SimEngineFactory::new()
        .with_auto_prepare(options.auto_prepare)
        .with_probe(options.probe_sources);
    let unplug = SimUnplugSource::new();
    let foreground = SimForegroundClaim::new();

    let handles = SimHandles {
        focus: focus.handle(),
        engine: engines.handle(),
        unplug: unplug.handle(),
        foreground: foreground.clone(),
    };
    let collaborators = Collaborators {
        focus: Box::new(focus),
        engines: Box::new(engines),
        unplug: Box::new(unplug),
        foreground: Box::new(foreground),
    };
    (collaborators, handles)
}
