//! Reentrancy policies decide whether a lifecycle boundary reaches the
//! registry when several runs of the same action overlap.

use ahash::AHashMap;
use loadline_core::Reentrancy;
use parking_lot::Mutex;
use std::sync::Arc;

pub trait ReentrancyPolicy: Send + Sync {
    /// A run of `id` started. Returns whether to mark it loading.
    fn enter(&self, id: &str) -> bool;

    /// A run of `id` settled. Returns whether to record the settlement.
    fn exit(&self, id: &str) -> bool;
}

/// Every boundary is applied: overlapping runs collapse into one entry and
/// the first run to settle marks the id settled.
#[derive(Debug, Clone, Copy, Default)]
pub struct Collapse;

impl ReentrancyPolicy for Collapse {
    fn enter(&self, _id: &str) -> bool {
        true
    }

    fn exit(&self, _id: &str) -> bool {
        true
    }
}

/// Counts runs in flight per id; only the last settle is recorded.
///
/// A settle with no matching start (middleware installed mid-flight) is
/// always recorded.
#[derive(Debug, Default)]
pub struct Counted {
    in_flight: Mutex<AHashMap<String, usize>>,
}

impl Counted {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_flight(&self, id: &str) -> usize {
        self.in_flight.lock().get(id).copied().unwrap_or(0)
    }
}

impl ReentrancyPolicy for Counted {
    fn enter(&self, id: &str) -> bool {
        let mut in_flight = self.in_flight.lock();
        let count = in_flight.entry(id.to_string()).or_insert(0);
        *count += 1;
        *count == 1
    }

    fn exit(&self, id: &str) -> bool {
        let mut in_flight = self.in_flight.lock();
        let Some(count) = in_flight.get_mut(id) else {
            return true;
        };
        *count -= 1;
        if *count == 0 {
            in_flight.remove(id);
            true
        } else {
            false
        }
    }
}

/// The policy selected by a [`Reentrancy`] setting.
pub fn policy_for(reentrancy: Reentrancy) -> Arc<dyn ReentrancyPolicy> {
    match reentrancy {
        Reentrancy::Collapse => Arc::new(Collapse),
        Reentrancy::Counted => Arc::new(Counted::new()),
    }
}
