use std::{collections::HashMap, fmt, sync::Arc};

use time::OffsetDateTime;

/// Anything that can point at a stream: playlists, queues, other streams.
///
/// Only the identity is exposed; holding a ref never implies ownership.
pub trait StreamRef: Send + Sync + fmt::Debug {
    fn uuid(&self) -> String;
}

/// A bare identity, for callers that only have the referrer's id at hand.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RefKey(pub String);

impl From<&str> for RefKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl StreamRef for RefKey {
    fn uuid(&self) -> String {
        self.0.clone()
    }
}

/// Who or what constructed a stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CreationSource {
    #[default]
    Unknown,
    Named(String),
}

impl CreationSource {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub fn source_name(&self) -> &str {
        match self {
            Self::Unknown => "no source info",
            Self::Named(name) => name,
        }
    }
}

/// Bookkeeping attached to every stream: provenance, freshness and the
/// compositions that currently include it.
#[derive(Debug, Clone)]
pub struct StreamMeta {
    creation_source: CreationSource,
    last_updated: OffsetDateTime,
    parent_refs: HashMap<String, Arc<dyn StreamRef>>,
    labelled_refs: HashMap<String, Arc<dyn StreamRef>>,
}

impl Default for StreamMeta {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamMeta {
    pub fn new() -> Self {
        Self {
            creation_source: CreationSource::Unknown,
            last_updated: OffsetDateTime::now_utc(),
            parent_refs: HashMap::new(),
            labelled_refs: HashMap::new(),
        }
    }

    pub fn creation_source(&self) -> &CreationSource {
        &self.creation_source
    }

    pub fn set_creation_source(&mut self, source: CreationSource) {
        self.creation_source = source;
    }

    pub fn last_updated(&self) -> OffsetDateTime {
        self.last_updated
    }

    pub fn set_last_updated(&mut self, at: OffsetDateTime) {
        self.last_updated = at;
    }

    /// Returns `false` without touching the set if the referrer is already present.
    pub fn add_parent_ref(&mut self, parent: Arc<dyn StreamRef>) -> bool {
        let key = parent.uuid();
        if self.parent_refs.contains_key(&key) {
            return false;
        }
        self.parent_refs.insert(key, parent);
        true
    }

    pub fn remove_parent_ref(&mut self, parent: &dyn StreamRef) -> bool {
        self.parent_refs.remove(&parent.uuid()).is_some()
    }

    /// Current parents, in no particular order.
    pub fn parent_refs(&self) -> Vec<Arc<dyn StreamRef>> {
        self.parent_refs.values().cloned().collect()
    }

    /// Stores `target` under `label`.
    ///
    /// Returns `true` when the label is new. When the label already exists the
    /// stored ref is replaced and `false` is returned: the write still happened.
    pub fn set_labelled_ref(
        &mut self,
        label: impl Into<String>,
        target: Arc<dyn StreamRef>,
    ) -> bool {
        self.labelled_refs.insert(label.into(), target).is_none()
    }

    pub fn labelled_ref(&self, label: &str) -> Option<Arc<dyn StreamRef>> {
        self.labelled_refs.get(label).cloned()
    }

    pub fn remove_labelled_ref(&mut self, label: &str) -> bool {
        self.labelled_refs.remove(label).is_some()
    }

    pub(crate) fn parent_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.parent_refs.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub(crate) fn labelled_ids(&self) -> std::collections::BTreeMap<String, String> {
        self.labelled_refs
            .iter()
            .map(|(label, target)| (label.clone(), target.uuid()))
            .collect()
    }
}
