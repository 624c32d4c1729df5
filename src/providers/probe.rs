use std::{io::Cursor, path::Path};

use async_trait::async_trait;
use symphonia::core::{
    codecs::CODEC_TYPE_NULL,
    formats::{FormatOptions, Track},
    io::{MediaSource, MediaSourceStream},
    meta::MetadataOptions,
    probe::Hint,
};
use tracing::{debug, trace};

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unrecognized container: {0}")]
    Format(String),

    #[error("no track with a known duration")]
    NoDuration,

    #[error("download failed: {0}")]
    Download(#[from] reqwest::Error),

    #[error("probe task failed: {0}")]
    Task(String),
}

/// Reads a media container and reports its duration in seconds.
#[async_trait]
pub trait MediaProbe: Send + Sync {
    async fn probe(&self, path: &str) -> Result<f64, ProbeError>;
}

/// Container probe backed by symphonia.
///
/// Local paths are opened directly. For `http(s)` locations only the first
/// `max_remote_bytes` are downloaded, which is enough for containers that
/// keep their index up front.
pub struct SymphoniaProbe {
    client: reqwest::Client,
    max_remote_bytes: usize,
}

impl SymphoniaProbe {
    pub fn new(client: reqwest::Client, max_remote_bytes: usize) -> Self {
        Self {
            client,
            max_remote_bytes,
        }
    }

    async fn download_head(&self, url: &str) -> Result<Vec<u8>, ProbeError> {
        let range = format!("bytes=0-{}", self.max_remote_bytes.saturating_sub(1));
        let mut resp = self
            .client
            .get(url)
            .header(reqwest::header::RANGE, range)
            .send()
            .await?
            .error_for_status()?;

        let mut buf = Vec::new();
        while let Some(chunk) = resp.chunk().await? {
            buf.extend_from_slice(&chunk);
            if buf.len() >= self.max_remote_bytes {
                buf.truncate(self.max_remote_bytes);
                break;
            }
        }
        trace!("Probe: downloaded {} bytes of {}", buf.len(), url);
        Ok(buf)
    }
}

#[async_trait]
impl MediaProbe for SymphoniaProbe {
    async fn probe(&self, path: &str) -> Result<f64, ProbeError> {
        let ext = extension_of(path);
        let head = if is_remote(path) {
            Some(self.download_head(path).await?)
        } else {
            None
        };

        let local = path.to_string();
        let seconds = tokio::task::spawn_blocking(move || {
            let source: Box<dyn MediaSource> = match head {
                Some(bytes) => Box::new(Cursor::new(bytes)),
                None => Box::new(std::fs::File::open(&local)?),
            };
            probe_source(source, ext.as_deref())
        })
        .await
        .map_err(|e| ProbeError::Task(e.to_string()))??;

        debug!("Probe: {} lasts {:.3}s", path, seconds);
        Ok(seconds)
    }
}

fn is_remote(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}

fn extension_of(path: &str) -> Option<String> {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
}

fn probe_source(source: Box<dyn MediaSource>, ext: Option<&str>) -> Result<f64, ProbeError> {
    let mut hint = Hint::new();
    if let Some(ext) = ext {
        hint.with_extension(ext);
    }

    let mss = MediaSourceStream::new(source, Default::default());
    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| ProbeError::Format(e.to_string()))?;

    probed
        .format
        .tracks()
        .iter()
        .filter(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .find_map(track_seconds)
        .ok_or(ProbeError::NoDuration)
}

fn track_seconds(track: &Track) -> Option<f64> {
    let params = &track.codec_params;
    let frames = params.n_frames?;

    if let Some(time_base) = params.time_base {
        let time = time_base.calc_time(frames);
        return Some(time.seconds as f64 + time.frac);
    }

    params
        .sample_rate
        .filter(|rate| *rate > 0)
        .map(|rate| frames as f64 / rate as f64)
}
