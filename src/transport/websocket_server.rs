use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{
        Query, State,
        ws::{WebSocket, WebSocketUpgrade, rejection::WebSocketUpgradeRejection},
    },
    http::{
        HeaderMap, HeaderValue, Uri,
        header::{ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_ORIGIN, REFERER},
    },
    response::{IntoResponse, Response},
};
use tracing::{error, info, warn};

use super::request::{client_origin, namespace_from_request};
use crate::{
    common::ErrorResponse,
    server::AppState,
    socket::{Connection, Namespace, SocketServer},
};

const BUFFER_SIZE: usize = 1024;

pub async fn websocket_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    uri: Uri,
    Query(params): Query<HashMap<String, String>>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let referer = headers.get(REFERER).and_then(|h| h.to_str().ok());
    let origin = client_origin(referer);

    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => {
            warn!("Refusing non-websocket request from {}: {}", origin, rejection);
            return ErrorResponse::new(rejection.status(), rejection.body_text(), uri.path())
                .into_response();
        }
    };

    let name = resolve_namespace(
        &state.socket,
        params.get("namespace").map(String::as_str),
        referer,
    );
    let namespace = state.socket.namespace(&name);

    let failed_ns = name.clone();
    let conn_origin = origin.clone();
    let mut response = ws
        .read_buffer_size(BUFFER_SIZE)
        .write_buffer_size(BUFFER_SIZE)
        .on_failed_upgrade(move |e| {
            error!("WebSocket upgrade failed: namespace={} err={}", failed_ns, e);
        })
        .on_upgrade(move |socket| handle_socket(socket, state, conn_origin, namespace))
        .into_response();

    let allow_origin =
        HeaderValue::from_str(&origin).unwrap_or_else(|_| HeaderValue::from_static("*"));
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin);
    headers.insert(
        ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );

    response
}

/// Requested namespace, or the server default when the request names none
/// or an invalid one.
pub fn resolve_namespace(
    server: &SocketServer,
    query: Option<&str>,
    referer: Option<&str>,
) -> String {
    match namespace_from_request(query, referer) {
        Ok(name) => name,
        Err(e) => {
            warn!(
                "Using default namespace {}: {}",
                server.default_namespace(),
                e
            );
            server.default_namespace().to_string()
        }
    }
}

/// Creates the connection, joins it and announces it. The caller drives the
/// returned queue.
pub fn admit(
    server: &SocketServer,
    origin: String,
    namespace: &Arc<Namespace>,
) -> (Arc<Connection>, flume::Receiver<axum::extract::ws::Message>) {
    let (conn, outbound) = Connection::channel(origin);
    server.admit(&conn, namespace);
    (conn, outbound)
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    origin: String,
    namespace: Arc<Namespace>,
) {
    let (conn, outbound) = admit(&state.socket, origin, &namespace);
    info!(
        "WebSocket connected: connection={} namespace={} origin={}",
        conn.id(),
        namespace.name(),
        conn.origin()
    );

    state
        .handler
        .handle(state.socket.clone(), conn, socket, outbound)
        .await;
}
