use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use tracing::{debug, info, warn};

use crate::socket::{Connection, SocketServer};

/// Owns an admitted connection's socket until it closes.
#[async_trait]
pub trait ConnectionHandler: Send + Sync {
    async fn handle(
        &self,
        server: Arc<SocketServer>,
        conn: Arc<Connection>,
        socket: WebSocket,
        outbound: flume::Receiver<Message>,
    );
}

/// Default handler. Drains the connection's outbound queue onto the socket and
/// relays inbound data frames to the rest of its namespace. On close it leaves
/// the namespace and fires `disconnect`.
pub struct ReceiveLoop;

#[async_trait]
impl ConnectionHandler for ReceiveLoop {
    async fn handle(
        &self,
        server: Arc<SocketServer>,
        conn: Arc<Connection>,
        mut socket: WebSocket,
        outbound: flume::Receiver<Message>,
    ) {
        let id = conn.id();

        loop {
            tokio::select! {
                Ok(msg) = outbound.recv_async() => {
                    if let Err(e) = socket.send(msg).await {
                        warn!("Socket send error: connection={} err={}", id, e);
                        break;
                    }
                }
                msg = socket.recv() => {
                    let msg = match msg {
                        Some(Ok(msg)) => msg,
                        Some(Err(e)) => {
                            warn!("WebSocket error: connection={} err={}", id, e);
                            break;
                        }
                        None => break,
                    };

                    match msg {
                        Message::Text(_) | Message::Binary(_) => {
                            let delivered = server.relay(&conn, msg);
                            debug!("Relayed frame from {} to {} peer(s)", id, delivered);
                        }
                        Message::Close(_) => break,
                        _ => {}
                    }
                }
            }
        }

        let namespace = conn.namespace().unwrap_or_default();
        server.disconnect(&conn);
        info!("Connection closed: connection={} namespace={}", id, namespace);
    }
}
