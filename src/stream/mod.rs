//! Media streams: the closed set of source kinds, their identity rules and
//! the per-stream reference bookkeeping.

pub mod codec;
pub mod error;
pub mod factory;
pub mod ident;
pub mod kind;
pub mod meta;
pub mod variants;

pub use codec::StreamCodec;
pub use error::{StreamError, StreamResult};
pub use factory::{ProviderCredentials, StreamFactory};
pub use kind::StreamKind;
pub use meta::{CreationSource, RefKey, StreamMeta, StreamRef};
pub use variants::{
    LocalVideoStream, RemoteVideoStream, SoundCloudStream, Stream, StreamSchema, TwitchClipStream,
    TwitchStream, YouTubeStream,
};
