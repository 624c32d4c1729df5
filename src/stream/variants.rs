use serde::Deserialize;
use time::OffsetDateTime;
use tracing::{debug, trace};

use super::{
    StreamKind,
    codec::StreamCodec,
    error::{StreamError, StreamResult},
    ident,
    meta::{StreamMeta, StreamRef},
};
use crate::providers::{FetchRequest, FetchTarget, MetadataOutcome, MetadataPipeline, StreamInfo};

/// Fields every stream kind carries. Owned by each variant, never shared.
#[derive(Debug, Clone)]
pub struct StreamSchema {
    kind: StreamKind,
    name: String,
    url: String,
    duration: f64,
    thumbnail: Option<String>,
    meta: StreamMeta,
}

impl StreamSchema {
    fn new(kind: StreamKind, url: impl Into<String>) -> Self {
        Self {
            kind,
            name: String::new(),
            url: url.into(),
            duration: 0.0,
            thumbnail: None,
            meta: StreamMeta::new(),
        }
    }

    fn with_thumbnail(mut self, thumbnail: Option<String>) -> Self {
        self.thumbnail = thumbnail;
        self
    }
}

/// Partial update accepted by [`Stream::set_info`]. Missing keys leave the
/// current value alone; `kind` and `url` are identity and are never patched.
#[derive(Debug, Default, Deserialize)]
struct InfoPatch {
    name: Option<String>,
    duration: Option<f64>,
    thumb: Option<String>,
}

#[derive(Debug, Clone)]
pub struct YouTubeStream {
    schema: StreamSchema,
    api_key: String,
}

impl YouTubeStream {
    pub fn new(url: &str, api_key: impl Into<String>) -> Self {
        let url = ident::normalize_youtube_url(url);
        let thumbnail = ident::youtube_video_id(url)
            .ok()
            .map(|id| ident::youtube_thumbnail(&id));

        Self {
            schema: StreamSchema::new(StreamKind::YouTube, url).with_thumbnail(thumbnail),
            api_key: api_key.into(),
        }
    }

    fn fetch_target(&self) -> StreamResult<FetchTarget> {
        Ok(FetchTarget::YouTube {
            video_id: ident::youtube_video_id(&self.schema.url)?,
            api_key: self.api_key.clone(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct TwitchStream {
    schema: StreamSchema,
    client_id: String,
}

impl TwitchStream {
    pub fn new(url: &str, client_id: impl Into<String>) -> Self {
        Self {
            schema: StreamSchema::new(StreamKind::Twitch, url),
            client_id: client_id.into(),
        }
    }

    fn fetch_target(&self) -> StreamResult<FetchTarget> {
        Ok(FetchTarget::TwitchVideo {
            video_id: ident::twitch_video_id(&self.schema.url)?,
            client_id: self.client_id.clone(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct TwitchClipStream {
    schema: StreamSchema,
    client_id: String,
}

impl TwitchClipStream {
    pub fn new(url: &str, client_id: impl Into<String>) -> Self {
        Self {
            schema: StreamSchema::new(StreamKind::TwitchClip, url),
            client_id: client_id.into(),
        }
    }

    fn fetch_target(&self) -> StreamResult<FetchTarget> {
        Ok(FetchTarget::TwitchClip {
            slug: ident::twitch_clip_id(&self.schema.url)?,
            client_id: self.client_id.clone(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct SoundCloudStream {
    schema: StreamSchema,
    client_id: String,
}

impl SoundCloudStream {
    pub fn new(permalink: &str, client_id: impl Into<String>) -> Self {
        Self {
            schema: StreamSchema::new(StreamKind::SoundCloud, permalink),
            client_id: client_id.into(),
        }
    }

    fn fetch_target(&self) -> StreamResult<FetchTarget> {
        Ok(FetchTarget::SoundCloud {
            permalink: ident::soundcloud_id(&self.schema.url)?,
            client_id: self.client_id.clone(),
        })
    }
}

/// A file reachable on the server's filesystem.
#[derive(Debug, Clone)]
pub struct LocalVideoStream {
    schema: StreamSchema,
}

impl LocalVideoStream {
    pub fn new(path: &str) -> Self {
        Self {
            schema: StreamSchema::new(StreamKind::LocalVideo, path),
        }
    }
}

/// A media file served over plain HTTP(S).
#[derive(Debug, Clone)]
pub struct RemoteVideoStream {
    schema: StreamSchema,
}

impl RemoteVideoStream {
    pub fn new(url: &str) -> Self {
        Self {
            schema: StreamSchema::new(StreamKind::RemoteVideo, url),
        }
    }
}

/// A playable media resource, identified by its canonical URL.
#[derive(Debug, Clone)]
pub enum Stream {
    YouTube(YouTubeStream),
    Twitch(TwitchStream),
    TwitchClip(TwitchClipStream),
    SoundCloud(SoundCloudStream),
    LocalVideo(LocalVideoStream),
    RemoteVideo(RemoteVideoStream),
}

impl Stream {
    fn schema(&self) -> &StreamSchema {
        match self {
            Self::YouTube(s) => &s.schema,
            Self::Twitch(s) => &s.schema,
            Self::TwitchClip(s) => &s.schema,
            Self::SoundCloud(s) => &s.schema,
            Self::LocalVideo(s) => &s.schema,
            Self::RemoteVideo(s) => &s.schema,
        }
    }

    fn schema_mut(&mut self) -> &mut StreamSchema {
        match self {
            Self::YouTube(s) => &mut s.schema,
            Self::Twitch(s) => &mut s.schema,
            Self::TwitchClip(s) => &mut s.schema,
            Self::SoundCloud(s) => &mut s.schema,
            Self::LocalVideo(s) => &mut s.schema,
            Self::RemoteVideo(s) => &mut s.schema,
        }
    }

    /// Identity of the stream: its canonical URL.
    pub fn uuid(&self) -> &str {
        &self.schema().url
    }

    pub fn stream_url(&self) -> &str {
        &self.schema().url
    }

    pub fn name(&self) -> &str {
        &self.schema().name
    }

    pub fn kind(&self) -> StreamKind {
        self.schema().kind
    }

    /// Seconds.
    pub fn duration(&self) -> f64 {
        self.schema().duration
    }

    pub fn thumbnail(&self) -> Option<&str> {
        self.schema().thumbnail.as_deref()
    }

    pub fn metadata(&self) -> &StreamMeta {
        &self.schema().meta
    }

    pub fn metadata_mut(&mut self) -> &mut StreamMeta {
        &mut self.schema_mut().meta
    }

    pub fn codec(&self) -> StreamCodec {
        let schema = self.schema();
        StreamCodec::from_parts(
            schema.kind,
            &schema.name,
            &schema.url,
            schema.duration,
            schema.thumbnail.as_deref(),
            &schema.meta,
        )
    }

    /// Provider call this stream needs, resolved offline from its URL.
    pub fn fetch_target(&self) -> StreamResult<FetchTarget> {
        match self {
            Self::YouTube(s) => s.fetch_target(),
            Self::Twitch(s) => s.fetch_target(),
            Self::TwitchClip(s) => s.fetch_target(),
            Self::SoundCloud(s) => s.fetch_target(),
            Self::LocalVideo(s) => Ok(FetchTarget::Media {
                path: s.schema.url.clone(),
            }),
            Self::RemoteVideo(s) => Ok(FetchTarget::Media {
                path: s.schema.url.clone(),
            }),
        }
    }

    /// Starts metadata enrichment and returns immediately.
    ///
    /// `callback` is invoked exactly once: synchronously when the URL does not
    /// yield a provider id, otherwise from the task spawned on `pipeline`.
    /// The stream itself is not modified; feed the outcome to
    /// [`Stream::apply_info`] or [`Stream::set_info`].
    pub fn fetch_metadata<F>(&self, pipeline: &MetadataPipeline, callback: F)
    where
        F: FnOnce(MetadataOutcome) + Send + 'static,
    {
        let stream_id = self.uuid().to_string();
        match self.fetch_target() {
            Ok(target) => pipeline.dispatch(FetchRequest { stream_id, target }, Box::new(callback)),
            Err(e) => {
                debug!("Not fetching metadata for {}: {}", stream_id, e);
                callback(MetadataOutcome {
                    stream_id,
                    result: Err(e),
                });
            }
        }
    }

    /// Merges a raw `{name, duration, thumb}` payload and stamps `last_updated`.
    pub fn set_info(&mut self, data: &[u8]) -> StreamResult<()> {
        let patch: InfoPatch = serde_json::from_slice(data).map_err(|source| StreamError::Decode {
            id: self.uuid().to_string(),
            source,
        })?;
        self.merge(patch);
        Ok(())
    }

    pub fn apply_info(&mut self, info: &StreamInfo) {
        self.merge(InfoPatch {
            name: info.name.clone(),
            duration: Some(info.duration),
            thumb: info.thumb.clone(),
        });
    }

    fn merge(&mut self, patch: InfoPatch) {
        let schema = self.schema_mut();
        if let Some(name) = patch.name {
            schema.name = name;
        }
        if let Some(duration) = patch.duration {
            schema.duration = duration;
        }
        if let Some(thumb) = patch.thumb {
            schema.thumbnail = Some(thumb);
        }
        schema.meta.set_last_updated(OffsetDateTime::now_utc());
        trace!("Updated stream info for {}", schema.url);
    }

    pub(crate) fn restore(&mut self, name: String, duration: f64, thumbnail: Option<String>) {
        let schema = self.schema_mut();
        schema.name = name;
        schema.duration = duration;
        if thumbnail.is_some() {
            schema.thumbnail = thumbnail;
        }
    }
}

impl StreamRef for Stream {
    fn uuid(&self) -> String {
        Stream::uuid(self).to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    use super::*;
    use crate::{
        configs::ProvidersConfig,
        providers::pipeline::tests::{FixedProbe, StalledProbe, pipeline_with},
    };

    #[test]
    fn youtube_construction_normalizes_url() {
        let stream = Stream::YouTube(YouTubeStream::new(
            "https://www.youtube.com/watch?v=abc123&t=5",
            "key",
        ));
        assert_eq!(stream.uuid(), "https://www.youtube.com/watch?v=abc123");
        assert_eq!(
            stream.thumbnail(),
            Some("https://img.youtube.com/vi/abc123/default.jpg")
        );
        assert_eq!(
            stream.fetch_target().unwrap(),
            FetchTarget::YouTube {
                video_id: "abc123".into(),
                api_key: "key".into()
            }
        );
    }

    #[test]
    fn twitch_target_requires_videos_segment() {
        let stream = Stream::Twitch(TwitchStream::new("https://www.twitch.tv/someone", "id"));
        assert!(matches!(
            stream.fetch_target(),
            Err(StreamError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn set_info_merges_present_fields() {
        let mut stream = Stream::LocalVideo(LocalVideoStream::new("/srv/media/a.mkv"));
        let before = stream.metadata().last_updated();

        stream.set_info(br#"{"name":"A","duration":90.5}"#).unwrap();
        assert_eq!(stream.name(), "A");
        assert_eq!(stream.duration(), 90.5);
        assert_eq!(stream.thumbnail(), None);
        assert!(stream.metadata().last_updated() >= before);

        stream.set_info(br#"{"thumb":"https://img/a.jpg","url":"elsewhere"}"#).unwrap();
        assert_eq!(stream.name(), "A");
        assert_eq!(stream.thumbnail(), Some("https://img/a.jpg"));
        assert_eq!(stream.uuid(), "/srv/media/a.mkv");
    }

    #[test]
    fn set_info_rejects_garbage() {
        let mut stream = Stream::RemoteVideo(RemoteVideoStream::new("https://cdn/a.mp4"));
        let err = stream.set_info(b"not json").unwrap_err();
        assert!(matches!(err, StreamError::Decode { ref id, .. } if id == "https://cdn/a.mp4"));
    }

    #[test]
    fn extraction_failure_calls_back_synchronously() {
        // No runtime here: reaching the pipeline would panic on spawn.
        let pipeline = pipeline_with(Arc::new(FixedProbe(Ok(1.0))), &ProvidersConfig::default());
        let stream =
            Stream::TwitchClip(TwitchClipStream::new("https://clips.twitch.tv/embed", "id"));

        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        stream.fetch_metadata(&pipeline, move |outcome| {
            seen.fetch_add(1, Ordering::SeqCst);
            assert!(matches!(outcome.result, Err(StreamError::InvalidUrl { .. })));
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_fetch_calls_back_once_with_timeout() {
        let config = ProvidersConfig {
            timeout_secs: 3,
            ..ProvidersConfig::default()
        };
        let pipeline = pipeline_with(Arc::new(StalledProbe), &config);
        let stream = Stream::LocalVideo(LocalVideoStream::new("/srv/media/stuck.mkv"));

        let calls = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = flume::unbounded();
        let seen = calls.clone();
        stream.fetch_metadata(&pipeline, move |outcome| {
            seen.fetch_add(1, Ordering::SeqCst);
            let _ = tx.send(outcome);
        });

        let outcome = rx.recv_async().await.unwrap();
        assert!(matches!(
            outcome.result,
            Err(StreamError::Timeout { ref id, after }) if id == "/srv/media/stuck.mkv"
                && after == Duration::from_secs(3)
        ));

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn fetch_then_apply() {
        let pipeline = pipeline_with(Arc::new(FixedProbe(Ok(61.0))), &ProvidersConfig::default());
        let mut stream = Stream::LocalVideo(LocalVideoStream::new("/srv/media/b.mkv"));
        let (tx, rx) = tokio::sync::oneshot::channel();

        stream.fetch_metadata(&pipeline, move |outcome| {
            let _ = tx.send(outcome);
        });

        let outcome = rx.await.unwrap();
        assert_eq!(outcome.stream_id, "/srv/media/b.mkv");
        stream.apply_info(&outcome.result.unwrap());
        assert_eq!(stream.duration(), 61.0);
    }
}
