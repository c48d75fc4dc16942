//! # Status: Lifecycle of a Tracked Flow
//!
//! A `Status` is the point-in-time view of one action identifier.
//! Every async flow moves through the same small state machine:
//!
//! ```text
//! absent ──start──▶ loading ──ok────▶ settled
//!                      │    └─error─▶ failed
//!                      ◀──────start────┘
//! ```
//!
//! There is no terminal state; an identifier can restart indefinitely.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of the lifecycle of one action identifier.
///
/// `E` is the caller-defined failure payload. It defaults to
/// `serde_json::Value` since no shape is imposed on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status<E = serde_json::Value> {
    /// `None` only for the synthesized idle status.
    pub id: Option<String>,
    pub is_loading: bool,
    pub error: Option<E>,
}

impl<E> Status<E> {
    /// The status reported for identifiers that were never observed.
    pub fn idle() -> Self {
        Self {
            id: None,
            is_loading: false,
            error: None,
        }
    }

    /// A freshly started entry.
    pub fn started(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            is_loading: true,
            error: None,
        }
    }

    pub fn phase(&self) -> Phase {
        match (&self.id, self.is_loading, &self.error) {
            (None, _, _) => Phase::Idle,
            (Some(_), true, _) => Phase::Loading,
            (Some(_), false, Some(_)) => Phase::Failed,
            (Some(_), false, None) => Phase::Settled,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.phase(), Phase::Failed)
    }
}

impl<E> Default for Status<E> {
    fn default() -> Self {
        Self::idle()
    }
}

/// Coarse lifecycle phase derived from a [`Status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Never observed
    Idle,
    /// In flight
    Loading,
    /// Settled successfully
    Settled,
    /// Settled with an error payload
    Failed,
}

/// A registry mutation, broadcast to subscribers after it is applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChange<E = serde_json::Value> {
    pub status: Status<E>,
    pub at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_idle_status_shape() {
        let status: Status = Status::idle();
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json, json!({ "id": null, "isLoading": false, "error": null }));
        assert_eq!(status.phase(), Phase::Idle);
    }

    #[test]
    fn test_phase_follows_fields() {
        let mut status: Status<String> = Status::started("/list.fetch");
        assert_eq!(status.phase(), Phase::Loading);

        status.is_loading = false;
        assert_eq!(status.phase(), Phase::Settled);

        status.error = Some("network down".to_string());
        assert_eq!(status.phase(), Phase::Failed);
        assert!(status.is_failed());
    }
}
