//! # LoadingMiddleware: Lifecycle Tracking Interceptor
//!
//! Sits in the action chain and turns flow boundaries into registry
//! updates under the id `<path>.<action>`:
//!
//! | event          | registry update                  |
//! |----------------|----------------------------------|
//! | `Start`        | `update_status(id, true)`        |
//! | `SettleOk`     | `update_status(id, false)`       |
//! | `SettleError`  | `update_status(id, false, err)`  |
//! | `Other`        | none                             |
//!
//! The call is always forwarded unchanged. The only failure is a missing
//! registry, which aborts the dispatch before `next` runs.

use crate::policy::{Collapse, ReentrancyPolicy, policy_for};
use loadline_core::{
    LoadingConfig, LoadingError, LoadingResult, LoadingStore, Reentrancy, StatusRegistry,
};
use loadline_flow::{ActionCall, CallEvent, Interceptor, Next, Tree};
use std::sync::Arc;

const LIFECYCLE_TARGET: &str = "loadline::lifecycle";

/// Where the middleware finds its registry.
enum RegistrySource<E> {
    /// Handed in at construction.
    Injected(Arc<dyn StatusRegistry<E>>),
    /// Looked up on the call's tree under this store name.
    Named(String),
}

pub struct LoadingMiddleware<E = serde_json::Value> {
    source: RegistrySource<E>,
    debug_logging: bool,
    policy: Arc<dyn ReentrancyPolicy>,
}

impl<E> LoadingMiddleware<E>
where
    E: Clone + Send + Sync + 'static,
{
    /// Track into an explicitly provided registry.
    pub fn new(registry: Arc<dyn StatusRegistry<E>>) -> Self {
        Self {
            source: RegistrySource::Injected(registry),
            debug_logging: false,
            policy: Arc::new(Collapse),
        }
    }

    /// Track into the [`LoadingStore`] mounted on the tree under `store_name`.
    pub fn named(store_name: impl Into<String>) -> Self {
        Self {
            source: RegistrySource::Named(store_name.into()),
            debug_logging: false,
            policy: Arc::new(Collapse),
        }
    }

    pub fn from_config(config: &LoadingConfig) -> Self {
        Self::named(config.store_name.clone())
            .with_debug_logging(config.debug_logging)
            .with_reentrancy(config.reentrancy)
    }

    pub fn with_debug_logging(mut self, enabled: bool) -> Self {
        self.debug_logging = enabled;
        self
    }

    pub fn with_policy<P: ReentrancyPolicy + 'static>(mut self, policy: P) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    pub fn with_reentrancy(mut self, reentrancy: Reentrancy) -> Self {
        self.policy = policy_for(reentrancy);
        self
    }

    /// The registry this middleware writes to for calls on `tree`.
    pub fn resolve(&self, tree: &Tree) -> LoadingResult<Arc<dyn StatusRegistry<E>>> {
        match &self.source {
            RegistrySource::Injected(registry) => Ok(Arc::clone(registry)),
            RegistrySource::Named(name) => match tree.store::<LoadingStore<E>>(name) {
                Some(store) => Ok(store as Arc<dyn StatusRegistry<E>>),
                None if tree.contains(name) => Err(LoadingError::StoreTypeMismatch(name.clone())),
                None => Err(LoadingError::StoreNotFound(name.clone())),
            },
        }
    }

    /// Apply `call` to the registry without forwarding it.
    pub fn track(&self, call: &ActionCall<E>) -> LoadingResult {
        let registry = self.resolve(&call.tree).inspect_err(|e| {
            tracing::error!(action = %call.name, path = %call.path, error = %e, "status registry unavailable");
        })?;

        let id = call.effect_id();
        match &call.event {
            CallEvent::Start => {
                if self.policy.enter(&id) {
                    registry.update_status(&id, true, None);
                }
                self.debug_line(&id, "start loading");
            }
            CallEvent::SettleOk => {
                if self.policy.exit(&id) {
                    registry.update_status(&id, false, None);
                }
                self.debug_line(&id, "end loading");
            }
            CallEvent::SettleError(error) => {
                if self.policy.exit(&id) {
                    registry.update_status(&id, false, Some(error.clone()));
                }
                self.debug_line(&id, "got error");
            }
            CallEvent::Other(kind) => {
                tracing::trace!(id = %id, kind = %kind, "untracked call");
            }
        }
        Ok(())
    }

    fn debug_line(&self, id: &str, what: &str) {
        if self.debug_logging {
            tracing::info!(target: LIFECYCLE_TARGET, effect = id, "\"{id}\" {what}");
        }
    }
}

impl<E> Interceptor<E> for LoadingMiddleware<E>
where
    E: Clone + Send + Sync + 'static,
{
    fn intercept(&self, call: ActionCall<E>, next: Next<'_, E>) -> LoadingResult {
        self.track(&call)?;
        next.run(call)
    }
}

impl<E> std::fmt::Debug for LoadingMiddleware<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let source = match &self.source {
            RegistrySource::Injected(_) => "injected".to_string(),
            RegistrySource::Named(name) => format!("tree[{name:?}]"),
        };
        f.debug_struct("LoadingMiddleware")
            .field("source", &source)
            .field("debug_logging", &self.debug_logging)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::Counted;
    use loadline_core::Status;
    use loadline_flow::Chain;
    use parking_lot::Mutex;
    use serde_json::{Value, json};

    fn tree_with_store() -> (Arc<Tree>, Arc<LoadingStore>) {
        let store = Arc::new(LoadingStore::new());
        let tree = Arc::new(Tree::new().with_store("loading", Arc::clone(&store)));
        (tree, store)
    }

    #[test]
    fn test_fetch_lifecycle_end_to_end() {
        let (tree, store) = tree_with_store();
        let chain: Chain =
            Chain::passthrough().with(LoadingMiddleware::<Value>::named("loading"));

        chain
            .dispatch(ActionCall::start("fetch", "/root/list", Arc::clone(&tree)))
            .unwrap();
        assert_eq!(store.status("/root/list.fetch"), Status::started("/root/list.fetch"));

        chain
            .dispatch(ActionCall::settle_error(
                "fetch",
                "/root/list",
                json!("network down"),
                Arc::clone(&tree),
            ))
            .unwrap();
        let status = store.status("/root/list.fetch");
        assert!(!status.is_loading);
        assert_eq!(status.error, Some(json!("network down")));
    }

    #[test]
    fn test_settle_ok_clears_error() {
        let (tree, store) = tree_with_store();
        let middleware: LoadingMiddleware = LoadingMiddleware::named("loading");

        middleware
            .track(&ActionCall::start("save", "/cart", Arc::clone(&tree)))
            .unwrap();
        middleware
            .track(&ActionCall::settle_error("save", "/cart", json!("conflict"), Arc::clone(&tree)))
            .unwrap();
        middleware
            .track(&ActionCall::start("save", "/cart", Arc::clone(&tree)))
            .unwrap();
        middleware
            .track(&ActionCall::settle_ok("save", "/cart", Arc::clone(&tree)))
            .unwrap();

        let status = store.status("/cart.save");
        assert!(!status.is_loading);
        assert_eq!(status.error, None);
    }

    #[test]
    fn test_missing_store_aborts_before_next() {
        let tree = Arc::new(Tree::new());
        let reached = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&reached);

        let chain = Chain::new(move |_call: ActionCall| {
            *flag.lock() = true;
            Ok(())
        })
        .with(LoadingMiddleware::<Value>::named("loading"));

        let err = chain
            .dispatch(ActionCall::start("fetch", "/root/list", tree))
            .unwrap_err();
        assert!(matches!(err, LoadingError::StoreNotFound(ref name) if name == "loading"));
        assert!(err.is_configuration());
        assert!(!*reached.lock());
    }

    #[test]
    fn test_wrong_store_type_is_reported() {
        let tree = Arc::new(Tree::new().with_store("loading", Arc::new("not a registry")));
        let middleware: LoadingMiddleware = LoadingMiddleware::named("loading");

        let err = middleware
            .track(&ActionCall::start("fetch", "/list", tree))
            .unwrap_err();
        assert!(matches!(err, LoadingError::StoreTypeMismatch(_)));
    }

    #[test]
    fn test_injected_registry_ignores_tree() {
        let store: Arc<LoadingStore> = Arc::new(LoadingStore::new());
        let middleware: LoadingMiddleware = LoadingMiddleware::new(store.clone());

        middleware
            .track(&ActionCall::start("fetch", "/list", Arc::new(Tree::new())))
            .unwrap();
        assert!(store.status("/list.fetch").is_loading);
    }

    #[test]
    fn test_other_events_pass_through() {
        let (tree, store) = tree_with_store();
        let forwarded = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&forwarded);

        let chain = Chain::new(move |call: ActionCall| {
            sink.lock().push(call.event.kind().to_string());
            Ok(())
        })
        .with(LoadingMiddleware::<Value>::named("loading"));

        chain
            .dispatch(ActionCall::new(
                CallEvent::Other("action".to_string()),
                "rename",
                "/list",
                tree,
            ))
            .unwrap();

        assert!(store.is_empty());
        assert_eq!(*forwarded.lock(), vec!["action"]);
    }

    #[test]
    fn test_failure_payload_is_forwarded_unchanged() {
        let (tree, _store) = tree_with_store();
        let forwarded: Arc<Mutex<Option<CallEvent>>> = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&forwarded);

        let chain = Chain::new(move |call: ActionCall| {
            *sink.lock() = Some(call.event);
            Ok(())
        })
        .with(LoadingMiddleware::<Value>::named("loading"));

        chain
            .dispatch(ActionCall::settle_error("fetch", "/list", json!({ "code": 500 }), tree))
            .unwrap();
        assert_eq!(
            *forwarded.lock(),
            Some(CallEvent::SettleError(json!({ "code": 500 })))
        );
    }

    #[test]
    fn test_concurrent_starts_collapse() {
        let (tree, store) = tree_with_store();
        let middleware: LoadingMiddleware = LoadingMiddleware::named("loading");

        for _ in 0..2 {
            middleware
                .track(&ActionCall::start("fetch", "/list", Arc::clone(&tree)))
                .unwrap();
        }
        middleware
            .track(&ActionCall::settle_ok("fetch", "/list", Arc::clone(&tree)))
            .unwrap();

        // The first settle ends loading even though a run is still in flight.
        assert_eq!(store.len(), 1);
        assert!(!store.status("/list.fetch").is_loading);
    }

    #[test]
    fn test_counted_policy_waits_for_last_settle() {
        let (tree, store) = tree_with_store();
        let middleware: LoadingMiddleware =
            LoadingMiddleware::named("loading").with_policy(Counted::new());

        for _ in 0..2 {
            middleware
                .track(&ActionCall::start("fetch", "/list", Arc::clone(&tree)))
                .unwrap();
        }
        middleware
            .track(&ActionCall::settle_ok("fetch", "/list", Arc::clone(&tree)))
            .unwrap();
        assert!(store.status("/list.fetch").is_loading);

        middleware
            .track(&ActionCall::settle_error("fetch", "/list", json!("late"), Arc::clone(&tree)))
            .unwrap();
        let status = store.status("/list.fetch");
        assert!(!status.is_loading);
        assert_eq!(status.error, Some(json!("late")));
    }

    #[test]
    fn test_from_config_uses_store_name() {
        let store: Arc<LoadingStore<String>> = Arc::new(LoadingStore::new());
        let tree = Arc::new(Tree::new().with_store("busy", Arc::clone(&store)));
        let config = LoadingConfig::new()
            .with_store_name("busy")
            .with_debug_logging(true);
        let middleware = LoadingMiddleware::<String>::from_config(&config);

        middleware
            .track(&ActionCall::settle_error("sync", "/inbox", "offline".to_string(), tree))
            .unwrap();
        assert_eq!(store.status("/inbox.sync").error.as_deref(), Some("offline"));
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn lifecycle_output(debug_logging: bool) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let store: Arc<LoadingStore<String>> = Arc::new(LoadingStore::new());
        let tree = Arc::new(Tree::new().with_store("loading", Arc::clone(&store)));
        let middleware =
            LoadingMiddleware::<String>::named("loading").with_debug_logging(debug_logging);

        tracing::subscriber::with_default(subscriber, || {
            middleware
                .track(&ActionCall::start("sync", "/inbox", Arc::clone(&tree)))
                .unwrap();
            middleware
                .track(&ActionCall::settle_error("sync", "/inbox", "offline".to_string(), tree))
                .unwrap();
        });

        let bytes = captured.0.lock().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_debug_logging_emits_lifecycle_lines() {
        let output = lifecycle_output(true);
        assert!(output.contains("\"/inbox.sync\" start loading"), "{output}");
        assert!(output.contains("\"/inbox.sync\" got error"), "{output}");
        assert!(output.contains(LIFECYCLE_TARGET), "{output}");
    }

    #[test]
    fn test_debug_logging_off_is_silent() {
        let output = lifecycle_output(false);
        assert!(!output.contains("start loading"), "{output}");
        assert!(!output.contains("got error"), "{output}");
    }

    #[test]
    fn test_resolve_prefers_injected_registry() {
        let injected: Arc<LoadingStore<Value>> = Arc::new(LoadingStore::new());
        let middleware: LoadingMiddleware = LoadingMiddleware::new(injected);
        assert!(middleware.resolve(&Tree::new()).is_ok());
        assert!(format!("{middleware:?}").contains("injected"));
    }
}
