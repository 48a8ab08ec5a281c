use thiserror::Error;

/// Failures the controller absorbs and reports to its observer.
///
/// None of these escape as fatal faults; the `Display` text is what the
/// observer receives through `on_error`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("source unavailable: {uri} ({reason})")]
    SourceUnavailable { uri: String, reason: String },

    #[error("render engine error {code} ({extra})")]
    DecodeOrRender { code: i32, extra: i32 },

    #[error("audio focus request denied")]
    FocusDenied,

    #[error("missing source for media '{media_id}'")]
    MissingSource { media_id: String },

    #[error("failed to create render engine: {0}")]
    EngineCreation(String),

    #[error("playback service is no longer running")]
    ServiceClosed,
}

impl PlaybackError {
    pub fn source_unavailable(uri: &str, reason: impl ToString) -> Self {
        PlaybackError::SourceUnavailable {
            uri: uri.to_string(),
            reason: reason.to_string(),
        }
    }
}
