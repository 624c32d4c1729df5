use std::{sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{probe::MediaProbe, soundcloud, twitch, youtube};
use crate::{
    configs::{ProviderEndpoints, ProvidersConfig},
    stream::{StreamError, StreamResult},
};

/// Provider metadata normalized into the schema every stream kind shares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumb: Option<String>,
}

/// Everything a single provider call needs, owned, so the spawned task does
/// not borrow from the stream that requested it.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchTarget {
    YouTube { video_id: String, api_key: String },
    TwitchVideo { video_id: String, client_id: String },
    TwitchClip { slug: String, client_id: String },
    SoundCloud { permalink: String, client_id: String },
    Media { path: String },
}

impl FetchTarget {
    /// Provider-side identifier, used to key errors.
    pub fn id(&self) -> &str {
        match self {
            Self::YouTube { video_id, .. } | Self::TwitchVideo { video_id, .. } => video_id,
            Self::TwitchClip { slug, .. } => slug,
            Self::SoundCloud { permalink, .. } => permalink,
            Self::Media { path } => path,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// Canonical URL of the stream that asked for enrichment.
    pub stream_id: String,
    pub target: FetchTarget,
}

#[derive(Debug)]
pub struct MetadataOutcome {
    pub stream_id: String,
    pub result: StreamResult<StreamInfo>,
}

pub type MetadataCallback = Box<dyn FnOnce(MetadataOutcome) + Send + 'static>;

/// Runs provider call-outs off the caller's task.
///
/// Cheap to clone; every clone shares the same HTTP client and probe.
#[derive(Clone)]
pub struct MetadataPipeline {
    client: reqwest::Client,
    endpoints: Arc<ProviderEndpoints>,
    probe: Arc<dyn MediaProbe>,
    timeout: Duration,
}

impl MetadataPipeline {
    pub fn new(
        client: reqwest::Client,
        config: &ProvidersConfig,
        probe: Arc<dyn MediaProbe>,
    ) -> Self {
        Self {
            client,
            endpoints: Arc::new(config.endpoints.clone()),
            probe,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Spawns one task for `request` and returns immediately. `callback` runs
    /// exactly once on that task. Must be called from within a tokio runtime.
    ///
    /// Requests are not deduplicated: two dispatches for the same stream make
    /// two provider calls.
    pub fn dispatch(&self, request: FetchRequest, callback: MetadataCallback) {
        let pipeline = self.clone();
        tokio::spawn(async move {
            let outcome = pipeline.run(request).await;
            callback(outcome);
        });
    }

    /// Performs the call under the configured deadline.
    pub async fn run(&self, request: FetchRequest) -> MetadataOutcome {
        let FetchRequest { stream_id, target } = request;
        debug!("Fetching metadata for {} ({})", stream_id, target.id());

        let result = match tokio::time::timeout(self.timeout, self.fetch(&target)).await {
            Ok(result) => result,
            Err(_) => Err(StreamError::Timeout {
                id: target.id().to_string(),
                after: self.timeout,
            }),
        };

        if let Err(e) = &result {
            warn!("Metadata fetch for {} failed: {}", stream_id, e);
        }

        MetadataOutcome { stream_id, result }
    }

    /// Single provider round trip without a deadline.
    pub async fn fetch(&self, target: &FetchTarget) -> StreamResult<StreamInfo> {
        match target {
            FetchTarget::YouTube { video_id, api_key } => {
                youtube::fetch(&self.client, &self.endpoints.youtube, video_id, api_key).await
            }
            FetchTarget::TwitchVideo {
                video_id,
                client_id,
            } => {
                twitch::fetch_video(&self.client, &self.endpoints.twitch, video_id, client_id)
                    .await
            }
            FetchTarget::TwitchClip { slug, client_id } => {
                twitch::fetch_clip(&self.client, &self.endpoints.twitch, slug, client_id).await
            }
            FetchTarget::SoundCloud {
                permalink,
                client_id,
            } => {
                soundcloud::fetch(&self.client, &self.endpoints.soundcloud, permalink, client_id)
                    .await
            }
            FetchTarget::Media { path } => {
                let duration = self.probe.probe(path).await.map_err(|e| StreamError::Probe {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;
                Ok(StreamInfo {
                    name: None,
                    duration,
                    thumb: None,
                })
            }
        }
    }
}
