//! # Loadline
//!
//! Loading and error state for every async action in a state tree, without
//! each action managing its own flag.
//!
//! Mount a [`LoadingStore`] on the tree, add a [`LoadingMiddleware`] to the
//! action chain, then read `store.status("<path>.<action>")` anywhere.
//!
//! ```rust
//! use loadline::prelude::*;
//! use std::sync::Arc;
//!
//! let store: Arc<LoadingStore> = Arc::new(LoadingStore::new());
//! let tree = Arc::new(Tree::new().with_store("loading", store.clone()));
//! let chain: Chain = Chain::passthrough().with(LoadingMiddleware::<serde_json::Value>::named("loading"));
//!
//! chain.dispatch(ActionCall::start("fetch", "/todos", tree)).unwrap();
//! assert!(store.status(&effect_id(&NodePath::parse("/todos"), "fetch")).is_loading);
//! ```

// Re-export member crate modules
pub use loadline_core::{config, error, registry, status};
pub use loadline_flow::{call, chain, path, tree};
pub use loadline_runtime::{middleware, policy};

pub mod telemetry;

pub use telemetry::init_stdout_tracing;

pub mod prelude {
    pub use loadline_core::{
        LoadingConfig, LoadingError, LoadingResult, LoadingStore, Phase, Reentrancy, Status,
        StatusChange, StatusRegistry,
    };
    pub use loadline_flow::{ActionCall, CallEvent, Chain, Interceptor, Next, NodePath, Tree, effect_id};
    pub use loadline_runtime::{Collapse, Counted, LoadingMiddleware, ReentrancyPolicy};

    pub use crate::init_stdout_tracing;
}
