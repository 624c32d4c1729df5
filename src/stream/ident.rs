//! Offline identity extraction. Nothing here touches the network.

use super::error::{StreamError, StreamResult};

const YOUTUBE_WATCH_MARKER: &str = "watch?v=";
const TWITCH_VIDEOS_MARKER: &str = "/videos/";
const TWITCH_CLIP_HOST: &str = "clips.twitch.tv";

/// Drops everything from the first `&`, so `watch?v=abc&t=5` keys the same stream as `watch?v=abc`.
pub fn normalize_youtube_url(raw: &str) -> &str {
    raw.split('&').next().unwrap_or(raw)
}

pub fn youtube_video_id(url: &str) -> StreamResult<String> {
    let segments: Vec<&str> = url.split('/').collect();
    if segments.len() < 2 {
        return Err(StreamError::invalid_url(url, "no path segments"));
    }

    let last = segments[segments.len() - 1];
    let id = match last.split_once(YOUTUBE_WATCH_MARKER) {
        Some((_, rest)) => rest.split('&').next().unwrap_or(rest),
        None => last,
    };
    if id.is_empty() {
        return Err(StreamError::invalid_url(url, "empty video id"));
    }
    Ok(id.to_string())
}

pub fn youtube_thumbnail(video_id: &str) -> String {
    format!("https://img.youtube.com/vi/{}/default.jpg", video_id)
}

pub fn twitch_video_id(url: &str) -> StreamResult<String> {
    let parts: Vec<&str> = url.split(TWITCH_VIDEOS_MARKER).collect();
    if parts.len() != 2 {
        return Err(StreamError::invalid_url(
            url,
            "expected exactly one /videos/ segment",
        ));
    }
    Ok(parts[1].to_string())
}

/// Clip slug from a `clip` query parameter, or from the first path segment
/// of a `clips.twitch.tv/<slug>` link.
pub fn twitch_clip_id(url: &str) -> StreamResult<String> {
    let parsed =
        url::Url::parse(url).map_err(|_| StreamError::invalid_url(url, "unparseable clip url"))?;

    let from_query = parsed
        .query_pairs()
        .find(|(k, _)| k == "clip")
        .map(|(_, v)| v.into_owned())
        .filter(|slug| !slug.is_empty());
    if let Some(slug) = from_query {
        return Ok(slug);
    }

    if parsed.host_str() == Some(TWITCH_CLIP_HOST) {
        let slug = parsed
            .path_segments()
            .and_then(|mut segments| segments.next())
            .filter(|s| !s.is_empty() && *s != "embed");
        if let Some(slug) = slug {
            return Ok(slug.to_string());
        }
    }

    Err(StreamError::invalid_url(url, "missing clip parameter"))
}

/// The whole permalink is the identity; it is only escaped when sent to the provider.
pub fn soundcloud_id(permalink: &str) -> StreamResult<String> {
    Ok(permalink.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn youtube_watch_url() {
        let url = "https://www.youtube.com/watch?v=abc123&t=5";
        assert_eq!(youtube_video_id(url).unwrap(), "abc123");
        assert_eq!(
            normalize_youtube_url(url),
            "https://www.youtube.com/watch?v=abc123"
        );
    }

    #[test]
    fn youtube_short_link_uses_last_segment() {
        assert_eq!(youtube_video_id("https://youtu.be/dQw4w9WgXcQ").unwrap(), "dQw4w9WgXcQ");
    }

    #[test]
    fn youtube_without_segments_is_rejected() {
        let err = youtube_video_id("dQw4w9WgXcQ").unwrap_err();
        assert!(matches!(err, StreamError::InvalidUrl { .. }));
    }

    #[test]
    fn youtube_empty_id_is_rejected() {
        for url in ["https://youtu.be/", "https://www.youtube.com/watch?v="] {
            assert!(
                matches!(youtube_video_id(url), Err(StreamError::InvalidUrl { .. })),
                "{url}"
            );
        }
    }

    #[test]
    fn youtube_thumbnail_is_deterministic() {
        assert_eq!(
            youtube_thumbnail("abc123"),
            "https://img.youtube.com/vi/abc123/default.jpg"
        );
    }

    #[test]
    fn twitch_video() {
        assert_eq!(
            twitch_video_id("https://www.twitch.tv/videos/55555").unwrap(),
            "55555"
        );
    }

    #[test]
    fn twitch_video_requires_marker_once() {
        assert!(twitch_video_id("https://www.twitch.tv/someone").is_err());
        assert!(twitch_video_id("https://twitch.tv/videos/1/videos/2").is_err());
    }

    #[test]
    fn twitch_clip_slug() {
        let url = "https://clips.twitch.tv/embed?clip=abcSlug&autoplay=false";
        assert_eq!(twitch_clip_id(url).unwrap(), "abcSlug");
    }

    #[test]
    fn twitch_clip_slug_from_path() {
        assert_eq!(
            twitch_clip_id("https://clips.twitch.tv/FunnySlug").unwrap(),
            "FunnySlug"
        );
        assert_eq!(
            twitch_clip_id("https://clips.twitch.tv/FunnySlug?tt_medium=share").unwrap(),
            "FunnySlug"
        );
        assert!(twitch_clip_id("https://www.twitch.tv/FunnySlug").is_err());
    }

    #[test]
    fn twitch_clip_without_parameter() {
        assert!(twitch_clip_id("https://clips.twitch.tv/embed?autoplay=false").is_err());
        assert!(twitch_clip_id("https://clips.twitch.tv/embed?clip=").is_err());
        assert!(twitch_clip_id("not a url").is_err());
    }

    #[test]
    fn soundcloud_keeps_permalink() {
        let permalink = "https://soundcloud.com/artist/track-name";
        assert_eq!(soundcloud_id(permalink).unwrap(), permalink);
    }
}
