pub mod receive_loop;
pub mod request;
pub mod websocket_server;

use std::sync::Arc;

use axum::{Router, routing::get};

pub use receive_loop::{ConnectionHandler, ReceiveLoop};

use crate::server::AppState;

/// Route the websocket endpoint is served on.
pub const SOCKET_PATH: &str = "/socket";

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(SOCKET_PATH, get(websocket_server::websocket_handler))
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
