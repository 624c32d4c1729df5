use serde::Deserialize;
use tracing::debug;

use super::{StreamInfo, get_json};
use crate::stream::{StreamError, StreamResult};

#[derive(Debug, Deserialize)]
struct ResolvedTrack {
    #[serde(default)]
    title: String,
    /// Milliseconds.
    duration: Option<f64>,
    #[serde(default)]
    user: Option<TrackUser>,
}

#[derive(Debug, Deserialize)]
struct TrackUser {
    avatar_url: Option<String>,
}

/// Resolves a permalink to its track. The resolve endpoint redirects to the
/// canonical track resource, which reqwest follows.
pub(super) async fn fetch(
    client: &reqwest::Client,
    base: &str,
    permalink: &str,
    client_id: &str,
) -> StreamResult<StreamInfo> {
    let req_url = format!("{}/resolve.json", base.trim_end_matches('/'));
    debug!("SoundCloud: resolving {}", permalink);

    let request = client
        .get(&req_url)
        .query(&[("url", permalink), ("client_id", client_id)]);
    let track: ResolvedTrack = get_json(request, permalink).await?;
    let millis = track
        .duration
        .ok_or_else(|| StreamError::missing(permalink, "resolved track has no duration"))?;

    Ok(StreamInfo {
        name: Some(track.title),
        duration: millis / 1000.0,
        thumb: track.user.and_then(|u| u.avatar_url),
    })
}
