use std::{sync::Arc, time::Duration};

use syncwatch::{
    common::{
        banner::{BuildInfo, print_banner},
        http::HttpClient,
        logger,
        types::AnyResult,
    },
    configs::Config,
    server::AppState,
    socket::events,
    transport,
};
use tracing::{debug, info};

#[tokio::main]
async fn main() -> AnyResult<()> {
    let config = Config::load()?;
    logger::init(&config);
    print_banner(&BuildInfo::default());

    let client = HttpClient::new(Duration::from_secs(config.providers.timeout_secs))?;
    let state = Arc::new(AppState::new(config.clone(), client));

    state.socket.on(events::CONNECTION, |conn| {
        debug!("Connection {} announced from {}", conn.id(), conn.origin());
    });

    let app = transport::router(state);

    let host = config.server.host.as_str();
    let port = config.server.port;
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    info!(
        "Listening on {}:{} (websocket route {})",
        host,
        port,
        transport::SOCKET_PATH
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
