//! Tree - Named Store Container
//!
//! The host tree's root exposes child stores by name (`tree["loading"]`).
//! Stores are mounted once at initialization and shared through `Arc`.
//!
//! Lookups are typed: asking for the wrong type behaves like a miss,
//! and [`Tree::contains`] tells the two cases apart.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// Root of the host state tree.
#[derive(Default)]
pub struct Tree {
    stores: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl Tree {
    pub fn new() -> Self {
        Tree {
            stores: HashMap::new(),
        }
    }

    /// Mount a store under `name`.
    ///
    /// If a store with this name already exists, it is replaced.
    pub fn mount<T: Send + Sync + 'static>(&mut self, name: impl Into<String>, store: Arc<T>) {
        self.stores.insert(name.into(), store);
    }

    /// Builder form of [`Tree::mount`].
    pub fn with_store<T: Send + Sync + 'static>(
        mut self,
        name: impl Into<String>,
        store: Arc<T>,
    ) -> Self {
        self.mount(name, store);
        self
    }

    /// Get a shared handle to the store under `name`.
    ///
    /// Returns `None` if nothing is mounted there or it is not a `T`.
    pub fn store<T: Send + Sync + 'static>(&self, name: &str) -> Option<Arc<T>> {
        let store = self.stores.get(name)?;
        Arc::clone(store).downcast::<T>().ok()
    }

    /// Check if anything is mounted under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.stores.contains_key(name)
    }

    pub fn unmount(&mut self, name: &str) -> bool {
        self.stores.remove(name).is_some()
    }

    pub fn store_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.stores.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tree")
            .field("stores", &self.store_names())
            .finish()
    }
}
