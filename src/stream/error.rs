use std::time::Duration;

/// Errors raised while resolving a stream's identity or enriching its metadata.
///
/// Every variant keeps the identifier it failed on (video id, URL or path).
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("invalid url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: &'static str },

    #[error("request for {id:?} failed: {source}")]
    Transport {
        id: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("provider answered {status} for {id:?}")]
    Status { id: String, status: u16 },

    #[error("malformed payload for {id:?}: {source}")]
    Decode {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no usable data for {id:?}: {reason}")]
    MissingResult { id: String, reason: String },

    #[error("metadata fetch for {id:?} timed out after {after:?}")]
    Timeout { id: String, after: Duration },

    #[error("unable to probe {path:?}: {reason}")]
    Probe { path: String, reason: String },
}

impl StreamError {
    pub(crate) fn invalid_url(url: &str, reason: &'static str) -> Self {
        Self::InvalidUrl {
            url: url.to_string(),
            reason,
        }
    }

    pub(crate) fn missing(id: &str, reason: impl Into<String>) -> Self {
        Self::MissingResult {
            id: id.to_string(),
            reason: reason.into(),
        }
    }

    /// Network-level failures an outer policy may choose to retry.
    /// Auth rejections from a provider surface here as [`StreamError::Status`].
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Status { .. } | Self::Timeout { .. }
        )
    }
}

pub type StreamResult<T> = std::result::Result<T, StreamError>;
