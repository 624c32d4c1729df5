use std::sync::Arc;

use axum::extract::ws::Message;
use dashmap::{DashMap, mapref::entry::Entry};
use tracing::debug;

use super::connection::{Connection, ConnectionId};

const MAX_NAME_LEN: usize = 64;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum NamespaceError {
    #[error("no namespace name supplied")]
    Missing,
    #[error("invalid namespace name {name:?}: {reason}")]
    Invalid { name: String, reason: &'static str },
}

/// Checks a client-supplied namespace name: 1 to 64 of `[A-Za-z0-9_-]`.
pub fn validate_name(name: &str) -> Result<&str, NamespaceError> {
    let invalid = |reason| NamespaceError::Invalid {
        name: name.to_string(),
        reason,
    };

    if name.is_empty() {
        return Err(NamespaceError::Missing);
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(invalid("longer than 64 characters"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(invalid("only letters, digits, '-' and '_' are allowed"));
    }
    Ok(name)
}

/// A named room of connections.
#[derive(Debug)]
pub struct Namespace {
    name: String,
    members: DashMap<ConnectionId, Arc<Connection>>,
}

impl Namespace {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: DashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn join(&self, conn: &Arc<Connection>) {
        conn.set_namespace(Some(self.name.clone()));
        self.members.insert(conn.id(), conn.clone());
    }

    /// Returns `false` if the connection was not a member.
    pub fn leave(&self, id: ConnectionId) -> bool {
        match self.members.remove(&id) {
            Some((_, conn)) => {
                conn.set_namespace(None);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.members.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn connections(&self) -> Vec<Arc<Connection>> {
        self.members.iter().map(|e| e.value().clone()).collect()
    }

    /// Queues `msg` for every member except `skip`. Returns how many accepted it.
    pub fn broadcast(&self, msg: &Message, skip: Option<ConnectionId>) -> usize {
        self.connections()
            .into_iter()
            .filter(|conn| Some(conn.id()) != skip)
            .filter(|conn| conn.send(msg.clone()))
            .count()
    }
}

/// Process-wide map of namespace name to instance.
#[derive(Debug, Default)]
pub struct NamespaceRegistry {
    namespaces: DashMap<String, Arc<Namespace>>,
}

impl NamespaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn namespace_by_name(&self, name: &str) -> Option<Arc<Namespace>> {
        self.namespaces.get(name).map(|ns| ns.value().clone())
    }

    /// Registers an empty namespace. An existing instance under the same name
    /// is returned instead of being replaced.
    pub fn new_namespace(&self, name: &str) -> Arc<Namespace> {
        self.get_or_create(name).0
    }

    /// Atomic lookup-or-insert. The flag is `true` when this call created it.
    pub fn get_or_create(&self, name: &str) -> (Arc<Namespace>, bool) {
        match self.namespaces.entry(name.to_string()) {
            Entry::Occupied(entry) => (entry.get().clone(), false),
            Entry::Vacant(entry) => {
                let ns = Arc::new(Namespace::new(name));
                entry.insert(ns.clone());
                debug!("Created namespace {}", name);
                (ns, true)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }
}
