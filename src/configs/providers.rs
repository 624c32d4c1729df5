use serde::{Deserialize, Serialize};

/// Credentials and endpoints for the metadata providers.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub youtube_api_key: String,
    #[serde(default)]
    pub twitch_client_id: String,
    #[serde(default)]
    pub soundcloud_client_id: String,
    /// Upper bound for a single metadata fetch, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// How much of a remote media file is downloaded for probing.
    #[serde(default = "default_remote_probe_bytes")]
    pub remote_probe_bytes: usize,
    #[serde(default)]
    pub endpoints: ProviderEndpoints,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            youtube_api_key: String::new(),
            twitch_client_id: String::new(),
            soundcloud_client_id: String::new(),
            timeout_secs: default_timeout_secs(),
            remote_probe_bytes: default_remote_probe_bytes(),
            endpoints: ProviderEndpoints::default(),
        }
    }
}

/// API base URLs. Overridable so tests and proxies can point elsewhere.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderEndpoints {
    #[serde(default = "default_youtube")]
    pub youtube: String,
    #[serde(default = "default_twitch")]
    pub twitch: String,
    #[serde(default = "default_soundcloud")]
    pub soundcloud: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            youtube: default_youtube(),
            twitch: default_twitch(),
            soundcloud: default_soundcloud(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_remote_probe_bytes() -> usize {
    8 * 1024 * 1024
}

fn default_youtube() -> String {
    "https://www.googleapis.com/youtube/v3".to_string()
}

fn default_twitch() -> String {
    "https://api.twitch.tv/kraken".to_string()
}

fn default_soundcloud() -> String {
    "https://api.soundcloud.com".to_string()
}
