use std::sync::Arc;

use crate::{
    configs::Config,
    providers::{MetadataPipeline, SymphoniaProbe},
    socket::SocketServer,
    stream::{ProviderCredentials, StreamFactory},
    transport::{ConnectionHandler, ReceiveLoop},
};

/// Top-level application state.
pub struct AppState {
    pub config: Config,
    pub socket: Arc<SocketServer>,
    /// Takes over each connection once it has been announced.
    pub handler: Arc<dyn ConnectionHandler>,
    pub streams: StreamFactory,
    pub pipeline: MetadataPipeline,
}

impl AppState {
    pub fn new(config: Config, client: reqwest::Client) -> Self {
        let probe = SymphoniaProbe::new(client.clone(), config.providers.remote_probe_bytes);
        let pipeline = MetadataPipeline::new(client, &config.providers, Arc::new(probe));

        Self {
            socket: Arc::new(SocketServer::new(config.server.default_namespace.clone())),
            handler: Arc::new(ReceiveLoop),
            streams: StreamFactory::new(ProviderCredentials::from(&config.providers)),
            pipeline,
            config,
        }
    }
}
