//! Server core for synchronized media viewing rooms: websocket admission into
//! named namespaces, typed media streams and their metadata lookups.

pub mod common;
pub mod configs;
pub mod providers;
pub mod server;
pub mod socket;
pub mod stream;
pub mod transport;
