use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{StreamKind, meta::StreamMeta};

/// Serializable snapshot of a stream, the shape API and queue collaborators exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamCodec {
    pub kind: String,
    pub name: String,
    pub url: String,
    pub duration: f64,
    /// Empty when the stream has no thumbnail.
    #[serde(default)]
    pub thumb: String,
    pub metadata: MetaCodec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaCodec {
    #[serde(default)]
    pub creation_source: CreationSourceCodec,
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated: OffsetDateTime,
    #[serde(default)]
    pub parent_refs: Vec<String>,
    #[serde(default)]
    pub labelled_refs: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CreationSourceCodec {
    #[serde(default)]
    pub name: String,
}

impl StreamCodec {
    pub(crate) fn from_parts(
        kind: StreamKind,
        name: &str,
        url: &str,
        duration: f64,
        thumbnail: Option<&str>,
        meta: &StreamMeta,
    ) -> Self {
        Self {
            kind: kind.as_str().to_string(),
            name: name.to_string(),
            url: url.to_string(),
            duration,
            thumb: thumbnail.unwrap_or_default().to_string(),
            metadata: MetaCodec {
                creation_source: CreationSourceCodec {
                    name: meta.creation_source().source_name().to_string(),
                },
                last_updated: meta.last_updated(),
                parent_refs: meta.parent_ids(),
                labelled_refs: meta.labelled_ids(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::stream::{LocalVideoStream, RefKey, Stream, YouTubeStream};

    #[test]
    fn wire_field_names() {
        let mut stream = Stream::YouTube(YouTubeStream::new("https://youtu.be/abc123", "k"));
        stream.metadata_mut().add_parent_ref(Arc::new(RefKey::from("playlist-1")));
        stream
            .metadata_mut()
            .set_labelled_ref("next", Arc::new(RefKey::from("https://youtu.be/def456")));

        let json = serde_json::to_value(stream.codec()).unwrap();
        assert_eq!(json["kind"], "youtube");
        assert_eq!(json["url"], "https://youtu.be/abc123");
        assert_eq!(json["thumb"], "https://img.youtube.com/vi/abc123/default.jpg");
        assert_eq!(json["duration"], 0.0);

        let meta = &json["metadata"];
        assert_eq!(meta["creationSource"]["name"], "no source info");
        assert!(meta["lastUpdated"].is_string());
        assert_eq!(meta["parentRefs"], serde_json::json!(["playlist-1"]));
        assert_eq!(meta["labelledRefs"]["next"], "https://youtu.be/def456");
    }

    #[test]
    fn missing_thumbnail_is_empty_string() {
        let stream = Stream::LocalVideo(LocalVideoStream::new("/srv/a.mkv"));
        let codec = stream.codec();
        assert_eq!(codec.kind, "movie");
        assert_eq!(codec.thumb, "");
    }
}
