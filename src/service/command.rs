use crate::playback::{PlaybackSnapshot, TrackRef};
use tokio::sync::oneshot;

/// Commands that can be sent to the playback service task.
#[derive(Debug)]
pub enum PlaybackCommand {
    Play(TrackRef),
    Pause,
    SeekTo(u64),
    Stop { notify: bool },
    GetSnapshot(oneshot::Sender<PlaybackSnapshot>),
    Shutdown,
}
