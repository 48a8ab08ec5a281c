//! Source locator validation.
//!
//! Render engines call [`probe_source`] from `set_source` so that a locator
//! that cannot be opened fails synchronously with
//! [`PlaybackError::SourceUnavailable`] instead of surfacing later as an
//! asynchronous decode error.

use crate::playback::PlaybackError;
use std::fs::File;
use std::path::{Path, PathBuf};
use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, instrument};
use url::Url;

const LOG_TARGET: &str = "focus_playback::probe";

/// What a successful probe learned about a source.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceInfo {
    /// Network stream; opened by the engine itself.
    Remote { url: Url },
    Local {
        path: PathBuf,
        codec: String,
        sample_rate: Option<u32>,
        channels: Option<usize>,
        duration_ms: Option<u64>,
    },
}

/// Checks that `locator` names something an engine can open.
#[instrument]
pub fn probe_source(locator: &str) -> Result<SourceInfo, PlaybackError> {
    let trimmed = locator.trim();
    if trimmed.is_empty() {
        return Err(PlaybackError::source_unavailable(locator, "empty locator"));
    }

    match Url::parse(trimmed) {
        Ok(url) => match url.scheme() {
            "http" | "https" => {
                debug!(target: LOG_TARGET, "Accepting remote source {}", url);
                Ok(SourceInfo::Remote { url })
            }
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| PlaybackError::source_unavailable(locator, "invalid file URL"))?;
                probe_local(locator, &path)
            }
            other => Err(PlaybackError::source_unavailable(
                locator,
                format!("unsupported scheme '{}'", other),
            )),
        },
        Err(url::ParseError::RelativeUrlWithoutBase) => probe_local(locator, Path::new(trimmed)),
        Err(e) => Err(PlaybackError::source_unavailable(locator, e)),
    }
}

fn probe_local(locator: &str, path: &Path) -> Result<SourceInfo, PlaybackError> {
    let file = File::open(path).map_err(|e| PlaybackError::source_unavailable(locator, e))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| PlaybackError::source_unavailable(locator, e))?;

    let track = probed
        .format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| PlaybackError::source_unavailable(locator, "no playable audio track"))?;
    let params = &track.codec_params;

    let codec = symphonia::default::get_codecs()
        .get_codec(params.codec)
        .map(|descriptor| descriptor.short_name.to_string())
        .unwrap_or_else(|| format!("{:?}", params.codec));

    let duration_ms = match (params.time_base, params.n_frames) {
        (Some(time_base), Some(frames)) => {
            let time = time_base.calc_time(frames);
            Some(time.seconds * 1000 + (time.frac * 1000.0) as u64)
        }
        _ => None,
    };

    debug!(target: LOG_TARGET, "Probed {}: codec={}, duration={:?} ms", path.display(), codec, duration_ms);

    Ok(SourceInfo::Local {
        path: path.to_path_buf(),
        codec,
        sample_rate: params.sample_rate,
        channels: params.channels.map(|c| c.count()),
        duration_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    /// One second of 16-bit stereo silence at 44.1 kHz.
    fn write_silent_wav(path: &Path) -> std::io::Result<()> {
        let sample_rate: u32 = 44_100;
        let channels: u16 = 2;
        let block_align: u16 = channels * 2;
        let data_len: u32 = sample_rate * block_align as u32;

        let mut bytes = Vec::with_capacity(44 + data_len as usize);
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
        bytes.extend_from_slice(b"WAVE");
        bytes.extend_from_slice(b"fmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&channels.to_le_bytes());
        bytes.extend_from_slice(&sample_rate.to_le_bytes());
        bytes.extend_from_slice(&(sample_rate * block_align as u32).to_le_bytes());
        bytes.extend_from_slice(&block_align.to_le_bytes());
        bytes.extend_from_slice(&16u16.to_le_bytes());
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&data_len.to_le_bytes());
        bytes.resize(44 + data_len as usize, 0);

        let mut file = File::create(path)?;
        file.write_all(&bytes)
    }

    #[test]
    fn test_empty_locator_is_unavailable() {
        let err = probe_source("   ").unwrap_err();
        assert!(matches!(err, PlaybackError::SourceUnavailable { .. }));
    }

    #[test]
    fn test_remote_locator_is_accepted_without_probing() {
        let info = probe_source("https://example.com/stream.mp3").unwrap();
        assert!(matches!(info, SourceInfo::Remote { .. }));
    }

    #[test]
    fn test_unsupported_scheme() {
        let err = probe_source("ftp://example.com/a.mp3").unwrap_err();
        assert!(err.to_string().contains("unsupported scheme"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.mp3");
        let err = probe_source(missing.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, PlaybackError::SourceUnavailable { .. }));
    }

    #[test]
    fn test_garbage_file_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("garbage.bin");
        std::fs::write(&path, b"definitely not audio").unwrap();
        assert!(probe_source(path.to_str().unwrap()).is_err());
    }

    #[test]
    fn test_wav_file_is_probed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("silence.wav");
        write_silent_wav(&path).unwrap();

        match probe_source(path.to_str().unwrap()).unwrap() {
            SourceInfo::Local {
                sample_rate,
                channels,
                duration_ms,
                ..
            } => {
                assert_eq!(sample_rate, Some(44_100));
                assert_eq!(channels, Some(2));
                assert_eq!(duration_ms, Some(1000));
            }
            other => panic!("expected local source, got {:?}", other),
        }
    }

    #[test]
    fn test_file_url_is_probed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("silence.wav");
        write_silent_wav(&path).unwrap();
        let url = Url::from_file_path(&path).unwrap();

        assert!(matches!(
            probe_source(url.as_str()).unwrap(),
            SourceInfo::Local { .. }
        ));
    }
}
