use std::{collections::HashMap, sync::Arc};

use parking_lot::RwLock;
use tracing::trace;

use super::connection::Connection;

/// Fired after a connection joined its namespace, before its receive loop starts.
pub const CONNECTION: &str = "connection";
/// Fired after a connection's receive loop ended and it left its namespace.
pub const DISCONNECT: &str = "disconnect";

pub type Listener = Arc<dyn Fn(&Arc<Connection>) + Send + Sync>;

/// Name-keyed listener registry with synchronous fan-out.
#[derive(Default)]
pub struct EventBus {
    listeners: RwLock<HashMap<String, Vec<Listener>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `listener` to the list for `event`. Earlier registrations are kept.
    pub fn on<F>(&self, event: &str, listener: F)
    where
        F: Fn(&Arc<Connection>) + Send + Sync + 'static,
    {
        self.listeners
            .write()
            .entry(event.to_string())
            .or_default()
            .push(Arc::new(listener));
    }

    /// Calls every listener for `event` in registration order and returns how
    /// many ran. Unknown events are a no-op.
    ///
    /// The list is snapshotted first, so listeners may register more listeners.
    pub fn emit(&self, event: &str, conn: &Arc<Connection>) -> usize {
        let listeners = match self.listeners.read().get(event) {
            Some(list) => list.clone(),
            None => return 0,
        };

        trace!(
            "Emitting {} to {} listener(s) for connection {}",
            event,
            listeners.len(),
            conn.id()
        );
        for listener in &listeners {
            listener(conn);
        }
        listeners.len()
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.read().get(event).map_or(0, Vec::len)
    }
}
