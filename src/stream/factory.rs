use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::trace;

use super::{
    LocalVideoStream, RemoteVideoStream, SoundCloudStream, Stream, TwitchClipStream, TwitchStream,
    YouTubeStream,
    codec::StreamCodec,
    error::{StreamError, StreamResult},
    ident,
    meta::{CreationSource, RefKey},
};
use crate::configs::ProvidersConfig;

static YOUTUBE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:https?://)?(?:www\.|m\.|music\.)?(?:youtube\.com|youtu\.be)/")
        .expect("youtube pattern")
});
static TWITCH_CLIP_HOST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:https?://)?clips\.twitch\.tv/").expect("clip pattern"));
static TWITCH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:https?://)?(?:www\.|m\.|player\.)?twitch\.tv/").expect("twitch pattern")
});
static SOUNDCLOUD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:https?://)?(?:www\.|m\.)?soundcloud\.com/").expect("soundcloud pattern")
});

/// Provider credentials handed to every stream the factory builds.
#[derive(Debug, Clone, Default)]
pub struct ProviderCredentials {
    pub youtube_api_key: String,
    pub twitch_client_id: String,
    pub soundcloud_client_id: String,
}

impl From<&ProvidersConfig> for ProviderCredentials {
    fn from(config: &ProvidersConfig) -> Self {
        Self {
            youtube_api_key: config.youtube_api_key.clone(),
            twitch_client_id: config.twitch_client_id.clone(),
            soundcloud_client_id: config.soundcloud_client_id.clone(),
        }
    }
}

/// Picks the stream variant for a URL.
#[derive(Debug, Clone)]
pub struct StreamFactory {
    credentials: Arc<ProviderCredentials>,
}

impl StreamFactory {
    pub fn new(credentials: ProviderCredentials) -> Self {
        Self {
            credentials: Arc::new(credentials),
        }
    }

    pub fn create(&self, raw: &str) -> StreamResult<Stream> {
        let url = raw.trim();
        if url.is_empty() {
            return Err(StreamError::invalid_url(raw, "empty stream url"));
        }

        let creds = &self.credentials;
        let stream = if YOUTUBE_RE.is_match(url) {
            Stream::YouTube(YouTubeStream::new(url, creds.youtube_api_key.clone()))
        } else if TWITCH_CLIP_HOST_RE.is_match(url)
            || (TWITCH_RE.is_match(url) && ident::twitch_clip_id(url).is_ok())
        {
            Stream::TwitchClip(TwitchClipStream::new(url, creds.twitch_client_id.clone()))
        } else if TWITCH_RE.is_match(url) {
            Stream::Twitch(TwitchStream::new(url, creds.twitch_client_id.clone()))
        } else if SOUNDCLOUD_RE.is_match(url) {
            Stream::SoundCloud(SoundCloudStream::new(url, creds.soundcloud_client_id.clone()))
        } else if url.starts_with("http://") || url.starts_with("https://") {
            Stream::RemoteVideo(RemoteVideoStream::new(url))
        } else {
            Stream::LocalVideo(LocalVideoStream::new(url))
        };

        trace!("Created {} stream for {}", stream.kind(), stream.uuid());
        Ok(stream)
    }

    pub fn create_with_source(&self, raw: &str, source: CreationSource) -> StreamResult<Stream> {
        let mut stream = self.create(raw)?;
        stream.metadata_mut().set_creation_source(source);
        Ok(stream)
    }

    /// Rebuilds a stream from its wire snapshot. Refs come back as [`RefKey`]s.
    pub fn from_codec(&self, codec: StreamCodec) -> StreamResult<Stream> {
        let mut stream = self.create(&codec.url)?;
        let thumb = Some(codec.thumb).filter(|t| !t.is_empty());
        stream.restore(codec.name, codec.duration, thumb);

        let meta = stream.metadata_mut();
        let source = codec.metadata.creation_source.name;
        if !source.is_empty() && source != CreationSource::Unknown.source_name() {
            meta.set_creation_source(CreationSource::Named(source));
        }
        meta.set_last_updated(codec.metadata.last_updated);
        for parent in codec.metadata.parent_refs {
            meta.add_parent_ref(Arc::new(RefKey(parent)));
        }
        for (label, target) in codec.metadata.labelled_refs {
            meta.set_labelled_ref(label, Arc::new(RefKey(target)));
        }
        Ok(stream)
    }
}
