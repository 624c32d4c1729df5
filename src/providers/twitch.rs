use serde::Deserialize;
use tracing::trace;

use super::{StreamInfo, get_json};
use crate::stream::StreamResult;

const CLIP_ACCEPT: &str = "application/vnd.twitchtv.v5+json";

#[derive(Debug, Deserialize)]
struct VideoResponse {
    #[serde(default)]
    title: String,
    length: i64,
    #[serde(default)]
    thumbnails: Vec<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ClipResponse {
    #[serde(default)]
    title: String,
    duration: f64,
    #[serde(default)]
    thumbnails: ClipThumbnails,
}

#[derive(Debug, Default, Deserialize)]
struct ClipThumbnails {
    #[serde(default)]
    medium: Option<String>,
}

pub(super) async fn fetch_video(
    client: &reqwest::Client,
    base: &str,
    video_id: &str,
    client_id: &str,
) -> StreamResult<StreamInfo> {
    let url = format!("{}/videos/{}", base.trim_end_matches('/'), video_id);
    trace!("Twitch: requesting video {}", video_id);

    let request = client.get(&url).header("Client-ID", client_id);
    let video: VideoResponse = get_json(request, video_id).await?;

    Ok(StreamInfo {
        name: Some(video.title),
        duration: video.length as f64,
        thumb: video.thumbnails.into_iter().next().map(|t| t.url),
    })
}

pub(super) async fn fetch_clip(
    client: &reqwest::Client,
    base: &str,
    slug: &str,
    client_id: &str,
) -> StreamResult<StreamInfo> {
    let url = format!("{}/clips/{}", base.trim_end_matches('/'), slug);
    trace!("Twitch: requesting clip {}", slug);

    let request = client
        .get(&url)
        .header("Client-ID", client_id)
        .header(reqwest::header::ACCEPT, CLIP_ACCEPT);
    let clip: ClipResponse = get_json(request, slug).await?;

    Ok(StreamInfo {
        name: Some(clip.title),
        duration: clip.duration,
        thumb: clip.thumbnails.medium,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::StreamError;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, path},
    };

    #[tokio::test]
    async fn video_takes_first_thumbnail() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/videos/55555"))
            .and(header("Client-ID", "tw-id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "title": "Speedrun",
                "length": 5400,
                "thumbnails": [{"url": "https://img/1.jpg"}, {"url": "https://img/2.jpg"}]
            })))
            .mount(&server)
            .await;

        let info = fetch_video(&reqwest::Client::new(), &server.uri(), "55555", "tw-id")
            .await
            .unwrap();
        assert_eq!(info.name.as_deref(), Some("Speedrun"));
        assert_eq!(info.duration, 5400.0);
        assert_eq!(info.thumb.as_deref(), Some("https://img/1.jpg"));
    }

    #[tokio::test]
    async fn video_without_thumbnails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/videos/1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"title": "t", "length": 10})),
            )
            .mount(&server)
            .await;

        let info = fetch_video(&reqwest::Client::new(), &server.uri(), "1", "id")
            .await
            .unwrap();
        assert_eq!(info.thumb, None);
    }

    #[tokio::test]
    async fn clip_sends_version_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/clips/abcSlug"))
            .and(header("Client-ID", "tw-id"))
            .and(header("Accept", CLIP_ACCEPT))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "title": "Clutch",
                "duration": 28.5,
                "thumbnails": {"medium": "https://img/clip.jpg", "small": "https://img/s.jpg"}
            })))
            .mount(&server)
            .await;

        let info = fetch_clip(&reqwest::Client::new(), &server.uri(), "abcSlug", "tw-id")
            .await
            .unwrap();
        assert_eq!(info.duration, 28.5);
        assert_eq!(info.thumb.as_deref(), Some("https://img/clip.jpg"));
    }

    #[tokio::test]
    async fn unauthorized_client_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = fetch_clip(&reqwest::Client::new(), &server.uri(), "abcSlug", "nope")
            .await
            .unwrap_err();
        assert!(matches!(err, StreamError::Status { status: 401, ref id } if id == "abcSlug"));
    }
}
