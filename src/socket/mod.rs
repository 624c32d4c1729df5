//! Connection admission state: connections, namespaces and lifecycle events.

pub mod connection;
pub mod events;
pub mod namespace;
pub mod server;

pub use connection::{Connection, ConnectionId};
pub use events::{EventBus, Listener};
pub use namespace::{Namespace, NamespaceError, NamespaceRegistry, validate_name};
pub use server::SocketServer;
