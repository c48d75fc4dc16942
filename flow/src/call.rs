//! ActionCall - Intercepted Call Records
//!
//! Every boundary of an async action is delivered to interceptors as an
//! [`ActionCall`]. The boundary itself is a closed enum, so handling code
//! stays exhaustive.

use crate::path::{NodePath, effect_id};
use crate::tree::Tree;
use std::sync::Arc;

/// Which boundary of an action this call represents.
///
/// `E` is the failure payload carried by [`CallEvent::SettleError`].
#[derive(Debug, Clone, PartialEq)]
pub enum CallEvent<E = serde_json::Value> {
    /// An async flow was spawned
    Start,
    /// The flow returned normally
    SettleOk,
    /// The flow threw; carries the failure payload
    SettleError(E),
    /// Any other call kind (plain actions, flow resumes). Never tracked.
    Other(String),
}

impl<E> CallEvent<E> {
    /// Short name for logging.
    pub fn kind(&self) -> &str {
        match self {
            CallEvent::Start => "start",
            CallEvent::SettleOk => "settle-ok",
            CallEvent::SettleError(_) => "settle-error",
            CallEvent::Other(kind) => kind,
        }
    }

    pub fn is_tracked(&self) -> bool {
        !matches!(self, CallEvent::Other(_))
    }
}

/// A single intercepted action call.
#[derive(Debug, Clone)]
pub struct ActionCall<E = serde_json::Value> {
    pub event: CallEvent<E>,
    /// Name of the action being invoked
    pub name: String,
    /// Path of the node the action runs on
    pub path: NodePath,
    /// Handle to the whole tree
    pub tree: Arc<Tree>,
}

impl<E> ActionCall<E> {
    pub fn new(
        event: CallEvent<E>,
        name: impl Into<String>,
        path: impl Into<NodePath>,
        tree: Arc<Tree>,
    ) -> Self {
        Self {
            event,
            name: name.into(),
            path: path.into(),
            tree,
        }
    }

    pub fn start(name: impl Into<String>, path: impl Into<NodePath>, tree: Arc<Tree>) -> Self {
        Self::new(CallEvent::Start, name, path, tree)
    }

    pub fn settle_ok(name: impl Into<String>, path: impl Into<NodePath>, tree: Arc<Tree>) -> Self {
        Self::new(CallEvent::SettleOk, name, path, tree)
    }

    pub fn settle_error(
        name: impl Into<String>,
        path: impl Into<NodePath>,
        error: E,
        tree: Arc<Tree>,
    ) -> Self {
        Self::new(CallEvent::SettleError(error), name, path, tree)
    }

    /// `<path>.<name>`, the identifier this call is tracked under.
    pub fn effect_id(&self) -> String {
        effect_id(&self.path, &self.name)
    }
}
