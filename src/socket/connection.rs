use std::{fmt, sync::Arc};

use axum::extract::ws::Message;
use parking_lot::RwLock;
use uuid::Uuid;

/// Strongly typed connection identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An admitted client.
///
/// Outgoing frames go through an unbounded queue drained by the connection's
/// receive loop, so sending never blocks the caller.
pub struct Connection {
    id: ConnectionId,
    origin: String,
    sender: flume::Sender<Message>,
    namespace: RwLock<Option<String>>,
}

impl Connection {
    /// Creates a connection and the queue its receive loop must drain.
    pub fn channel(origin: impl Into<String>) -> (Arc<Self>, flume::Receiver<Message>) {
        let (tx, rx) = flume::unbounded();
        let conn = Arc::new(Self {
            id: ConnectionId::generate(),
            origin: origin.into(),
            sender: tx,
            namespace: RwLock::new(None),
        });
        (conn, rx)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Name of the namespace this connection belongs to, if it joined one.
    pub fn namespace(&self) -> Option<String> {
        self.namespace.read().clone()
    }

    pub(crate) fn set_namespace(&self, name: Option<String>) {
        *self.namespace.write() = name;
    }

    /// Queues a frame. Returns `false` once the receive loop has gone away.
    pub fn send(&self, msg: Message) -> bool {
        self.sender.send(msg).is_ok()
    }

    pub fn send_text(&self, text: impl Into<String>) -> bool {
        self.send(Message::Text(text.into().into()))
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("origin", &self.origin)
            .field("namespace", &*self.namespace.read())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queued_frames_reach_the_receiver() {
        let (conn, rx) = Connection::channel("https://watch.example");
        assert!(conn.send_text("hello"));

        match rx.try_recv().unwrap() {
            Message::Text(text) => assert_eq!(text.as_str(), "hello"),
            other => panic!("unexpected frame {other:?}"),
        }
    }

    #[test]
    fn send_fails_after_receiver_drops() {
        let (conn, rx) = Connection::channel("*");
        drop(rx);
        assert!(!conn.send_text("lost"));
    }

    #[test]
    fn ids_are_unique() {
        let (a, _ra) = Connection::channel("*");
        let (b, _rb) = Connection::channel("*");
        assert_ne!(a.id(), b.id());
        assert_eq!(a.namespace(), None);
    }
}
