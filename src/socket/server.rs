use std::sync::Arc;

use axum::extract::ws::Message;
use tracing::{debug, info};

use super::{
    connection::Connection,
    events::{self, EventBus},
    namespace::{Namespace, NamespaceRegistry},
};

/// Owns the namespace registry and the connection lifecycle events.
pub struct SocketServer {
    events: EventBus,
    namespaces: NamespaceRegistry,
    default_namespace: String,
}

impl SocketServer {
    pub fn new(default_namespace: impl Into<String>) -> Self {
        Self {
            events: EventBus::new(),
            namespaces: NamespaceRegistry::new(),
            default_namespace: default_namespace.into(),
        }
    }

    pub fn default_namespace(&self) -> &str {
        &self.default_namespace
    }

    pub fn namespaces(&self) -> &NamespaceRegistry {
        &self.namespaces
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn on<F>(&self, event: &str, listener: F)
    where
        F: Fn(&Arc<Connection>) + Send + Sync + 'static,
    {
        self.events.on(event, listener);
    }

    pub fn emit(&self, event: &str, conn: &Arc<Connection>) -> usize {
        self.events.emit(event, conn)
    }

    pub fn namespace(&self, name: &str) -> Arc<Namespace> {
        let (ns, created) = self.namespaces.get_or_create(name);
        if created {
            info!("Namespace {} opened", name);
        }
        ns
    }

    /// Moves `conn` into `ns`, leaving whatever namespace it was in before.
    pub fn join(&self, conn: &Arc<Connection>, ns: &Arc<Namespace>) {
        if let Some(current) = conn.namespace() {
            if current == ns.name() {
                return;
            }
            if let Some(previous) = self.namespaces.namespace_by_name(&current) {
                previous.leave(conn.id());
            }
        }
        ns.join(conn);
        debug!(
            "Connection {} joined {} ({} member(s))",
            conn.id(),
            ns.name(),
            ns.len()
        );
    }

    /// Joins `conn` to `ns`, then announces it on the `connection` event.
    pub fn admit(&self, conn: &Arc<Connection>, ns: &Arc<Namespace>) {
        self.join(conn, ns);
        self.emit(events::CONNECTION, conn);
    }

    /// Removes `conn` from its namespace, then announces it on the `disconnect` event.
    pub fn disconnect(&self, conn: &Arc<Connection>) {
        if let Some(name) = conn.namespace()
            && let Some(ns) = self.namespaces.namespace_by_name(&name)
        {
            ns.leave(conn.id());
            debug!(
                "Connection {} left {} ({} member(s))",
                conn.id(),
                name,
                ns.len()
            );
        }
        self.emit(events::DISCONNECT, conn);
    }

    /// Relays a frame to the other members of the sender's namespace.
    pub fn relay(&self, from: &Arc<Connection>, msg: Message) -> usize {
        from.namespace()
            .and_then(|name| self.namespaces.namespace_by_name(&name))
            .map(|ns| ns.broadcast(&msg, Some(from.id())))
            .unwrap_or(0)
    }
}
