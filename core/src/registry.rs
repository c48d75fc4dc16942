//! # Registry: Keyed Lifecycle Store
//!
//! `LoadingStore` is the status registry mounted under the tree's
//! `loading` node. It keeps exactly one [`Status`] per action identifier
//! and hands out owned snapshots, never live references.

use crate::status::{Phase, Status, StatusChange};
use ahash::AHashMap;
use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokio::sync::broadcast;

/// Buffered change notifications per subscriber before it starts lagging.
const CHANGE_CAPACITY: usize = 256;

/// Read and write access to lifecycle statuses.
///
/// The middleware only depends on this trait, so any host-provided store
/// can be injected in place of [`LoadingStore`].
pub trait StatusRegistry<E = serde_json::Value>: Send + Sync {
    /// Point-in-time copy of the status for `id`, or [`Status::idle`].
    fn status(&self, id: &str) -> Status<E>;

    /// Mutate the entry for `id` in place, creating it if absent.
    fn update_status(&self, id: &str, is_loading: bool, error: Option<E>);
}

/// The default status registry.
pub struct LoadingStore<E = serde_json::Value> {
    data: RwLock<AHashMap<String, Status<E>>>,
    changes: broadcast::Sender<StatusChange<E>>,
}

impl<E> LoadingStore<E>
where
    E: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            data: RwLock::new(AHashMap::new()),
            changes,
        }
    }

    /// Receive every applied mutation from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<StatusChange<E>> {
        self.changes.subscribe()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.data.read().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// True while at least one tracked flow is in flight.
    pub fn is_any_loading(&self) -> bool {
        self.data.read().values().any(|s| s.is_loading)
    }

    /// Identifiers currently in flight, sorted.
    pub fn loading_ids(&self) -> Vec<String> {
        self.ids_in(Phase::Loading)
    }

    /// Identifiers whose last run settled with an error, sorted.
    pub fn failed_ids(&self) -> Vec<String> {
        self.ids_in(Phase::Failed)
    }

    /// Copy of the whole registry, ordered by identifier.
    pub fn snapshot(&self) -> StoreSnapshot<E> {
        let data = self
            .data
            .read()
            .iter()
            .map(|(id, status)| (id.clone(), status.clone()))
            .collect();
        StoreSnapshot { data }
    }

    fn ids_in(&self, phase: Phase) -> Vec<String> {
        let mut ids: Vec<String> = self
            .data
            .read()
            .iter()
            .filter(|(_, status)| status.phase() == phase)
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }
}

impl<E> Default for LoadingStore<E>
where
    E: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E> StatusRegistry<E> for LoadingStore<E>
where
    E: Clone + Send + Sync + 'static,
{
    fn status(&self, id: &str) -> Status<E> {
        self.data
            .read()
            .get(id)
            .cloned()
            .unwrap_or_else(Status::idle)
    }

    fn update_status(&self, id: &str, is_loading: bool, error: Option<E>) {
        // Lookup, mutation, creation and the broadcast share one write
        // section, so subscribers see changes in the order they were applied.
        let mut data = self.data.write();
        let entry = data.entry(id.to_string()).or_insert_with(|| Status::started(id));
        entry.is_loading = is_loading;
        entry.error = error;
        let updated = entry.clone();

        tracing::trace!(id, is_loading, failed = updated.error.is_some(), "status updated");

        // No subscribers is not an error.
        let _ = self.changes.send(StatusChange {
            status: updated,
            at: Utc::now(),
        });
    }
}

impl<E> std::fmt::Debug for LoadingStore<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadingStore")
            .field("entry_count", &self.data.read().len())
            .finish()
    }
}

/// Serializable copy of a [`LoadingStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot<E = serde_json::Value> {
    pub data: BTreeMap<String, Status<E>>,
}
