use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::trace;

use super::{StreamInfo, get_json};
use crate::stream::{StreamError, StreamResult};

const VIDEO_PARTS: &str = "contentDetails,snippet";

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    #[serde(default)]
    content_details: Map<String, Value>,
    #[serde(default)]
    snippet: Snippet,
}

#[derive(Debug, Default, Deserialize)]
struct Snippet {
    #[serde(default)]
    title: String,
}

pub(super) async fn fetch(
    client: &reqwest::Client,
    base: &str,
    video_id: &str,
    api_key: &str,
) -> StreamResult<StreamInfo> {
    let url = format!("{}/videos", base.trim_end_matches('/'));
    trace!("YouTube: requesting video data for {}", video_id);

    let request = client
        .get(&url)
        .query(&[("id", video_id), ("key", api_key), ("part", VIDEO_PARTS)]);
    let response: VideoListResponse = get_json(request, video_id).await?;

    normalize(response, video_id)
}

fn normalize(response: VideoListResponse, video_id: &str) -> StreamResult<StreamInfo> {
    let item = response
        .items
        .into_iter()
        .next()
        .ok_or_else(|| StreamError::missing(video_id, "no contentDetails found"))?;

    let token = match item.content_details.get("duration") {
        Some(Value::String(token)) => token,
        Some(_) => return Err(StreamError::missing(video_id, "duration value is not a string")),
        None => return Err(StreamError::missing(video_id, "missing video data key \"duration\"")),
    };

    let duration = parse_iso8601_duration(token).ok_or_else(|| {
        StreamError::missing(video_id, format!("invalid duration token {:?}", token))
    })?;

    Ok(StreamInfo {
        name: Some(item.snippet.title),
        duration,
        thumb: None,
    })
}

/// Converts tokens like `PT1H2M3S`, `PT45S` or `P1DT2H` to seconds.
pub fn parse_iso8601_duration(token: &str) -> Option<f64> {
    let rest = token.strip_prefix('P')?;
    let (date, time) = match rest.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (rest, None),
    };

    if date.is_empty() && time.is_none_or(str::is_empty) {
        return None;
    }

    let mut total = sum_components(date, &[('W', 604_800.0), ('D', 86_400.0)])?;
    if let Some(time) = time {
        if time.is_empty() {
            return None;
        }
        total += sum_components(time, &[('H', 3_600.0), ('M', 60.0), ('S', 1.0)])?;
    }
    Some(total)
}

/// Components must appear in the order given by `units`, each at most once.
fn sum_components(part: &str, units: &[(char, f64)]) -> Option<f64> {
    let mut total = 0.0;
    let mut number = String::new();
    let mut next_unit = 0;

    for c in part.chars() {
        if c.is_ascii_digit() || c == '.' {
            number.push(c);
            continue;
        }

        let offset = units[next_unit..].iter().position(|(unit, _)| *unit == c)?;
        let value: f64 = number.parse().ok()?;
        total += value * units[next_unit + offset].1;
        number.clear();
        next_unit += offset + 1;
    }

    number.is_empty().then_some(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path, query_param},
    };

    #[test]
    fn parses_durations() {
        assert_eq!(parse_iso8601_duration("PT1H2M3S"), Some(3723.0));
        assert_eq!(parse_iso8601_duration("PT45S"), Some(45.0));
        assert_eq!(parse_iso8601_duration("PT4M"), Some(240.0));
        assert_eq!(parse_iso8601_duration("PT2H"), Some(7200.0));
        assert_eq!(parse_iso8601_duration("P1DT1S"), Some(86_401.0));
        assert_eq!(parse_iso8601_duration("P0D"), Some(0.0));
    }

    #[test]
    fn rejects_malformed_durations() {
        assert_eq!(parse_iso8601_duration("1H2M"), None);
        assert_eq!(parse_iso8601_duration("PT"), None);
        assert_eq!(parse_iso8601_duration("P"), None);
        assert_eq!(parse_iso8601_duration("PT3S2M"), None);
        assert_eq!(parse_iso8601_duration("PT12"), None);
        assert_eq!(parse_iso8601_duration("PTxS"), None);
    }

    #[test]
    fn normalizes_first_item() {
        let response: VideoListResponse = serde_json::from_str(
            r#"{"items":[{"contentDetails":{"duration":"PT1H2M3S"},"snippet":{"title":"X"}}]}"#,
        )
        .unwrap();

        let info = normalize(response, "abc123").unwrap();
        assert_eq!(info.name.as_deref(), Some("X"));
        assert_eq!(info.duration, 3723.0);
        assert_eq!(info.thumb, None);
    }

    #[test]
    fn empty_items_is_missing_result() {
        let response: VideoListResponse = serde_json::from_str(r#"{"items":[]}"#).unwrap();
        let err = normalize(response, "abc123").unwrap_err();
        assert!(matches!(err, StreamError::MissingResult { ref id, .. } if id == "abc123"));
    }

    #[test]
    fn non_textual_duration_is_rejected() {
        let response: VideoListResponse = serde_json::from_str(
            r#"{"items":[{"contentDetails":{"duration":12},"snippet":{"title":"X"}}]}"#,
        )
        .unwrap();
        assert!(normalize(response, "abc123").is_err());

        let response: VideoListResponse =
            serde_json::from_str(r#"{"items":[{"contentDetails":{},"snippet":{"title":"X"}}]}"#)
                .unwrap();
        assert!(normalize(response, "abc123").is_err());
    }

    #[tokio::test]
    async fn fetch_queries_videos_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/videos"))
            .and(query_param("id", "abc123"))
            .and(query_param("key", "yt-key"))
            .and(query_param("part", "contentDetails,snippet"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [{"contentDetails": {"duration": "PT3M"}, "snippet": {"title": "Song"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let info = fetch(&reqwest::Client::new(), &server.uri(), "abc123", "yt-key")
            .await
            .unwrap();
        assert_eq!(info.name.as_deref(), Some("Song"));
        assert_eq!(info.duration, 180.0);
    }

    #[tokio::test]
    async fn rejected_key_is_a_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/videos"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = fetch(&reqwest::Client::new(), &server.uri(), "abc123", "bad")
            .await
            .unwrap_err();
        assert!(matches!(err, StreamError::Status { status: 403, .. }));
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn garbage_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/videos"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = fetch(&reqwest::Client::new(), &server.uri(), "abc123", "k")
            .await
            .unwrap_err();
        assert!(matches!(err, StreamError::Decode { ref id, .. } if id == "abc123"));
    }
}
