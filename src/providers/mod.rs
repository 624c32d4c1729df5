pub mod pipeline;
pub mod probe;
pub mod soundcloud;
pub mod twitch;
pub mod youtube;

pub use pipeline::{
    FetchRequest, FetchTarget, MetadataCallback, MetadataOutcome, MetadataPipeline, StreamInfo,
};
pub use probe::{MediaProbe, ProbeError, SymphoniaProbe};

use serde::de::DeserializeOwned;
use tracing::{trace, warn};

use crate::stream::{StreamError, StreamResult};

/// Sends `request` and decodes a JSON body, mapping every failure onto the
/// stream error taxonomy keyed by `id`.
pub(crate) async fn get_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
    id: &str,
) -> StreamResult<T> {
    let resp = request.send().await.map_err(|source| StreamError::Transport {
        id: id.to_string(),
        source,
    })?;

    let status = resp.status();
    if !status.is_success() {
        warn!("Provider answered {} for {}", status, id);
        return Err(StreamError::Status {
            id: id.to_string(),
            status: status.as_u16(),
        });
    }

    let body = resp.bytes().await.map_err(|source| StreamError::Transport {
        id: id.to_string(),
        source,
    })?;
    trace!("Provider payload for {}: {} bytes", id, body.len());

    serde_json::from_slice(&body).map_err(|source| StreamError::Decode {
        id: id.to_string(),
        source,
    })
}
