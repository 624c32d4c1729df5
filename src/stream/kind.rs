use std::fmt;

/// Closed set of media sources a [`Stream`](super::Stream) can come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    YouTube,
    LocalVideo,
    RemoteVideo,
    Twitch,
    TwitchClip,
    SoundCloud,
}

impl StreamKind {
    /// Wire tag consumed by clients. Local and remote files share `movie`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::YouTube => "youtube",
            Self::LocalVideo | Self::RemoteVideo => "movie",
            Self::Twitch => "twitch",
            Self::TwitchClip => "twitch#clip",
            Self::SoundCloud => "soundcloud",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl serde::Serialize for StreamKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
