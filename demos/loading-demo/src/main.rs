/*!
# Loading Demo

Runs a few async flows against a state tree and renders their loading and
error state from the registry while they are in flight.

## Key Concepts
1. **One store**: a `LoadingStore` mounted under `loading` tracks every action.
2. **One middleware**: flows only report their boundaries to the chain.
3. **Readers rebuild ids**: `effect_id(path, action)` addresses any action.
*/

use loadline::prelude::*;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

/// Run `work` as a flow named `action` on the node at `path`.
async fn run_flow<F>(
    chain: Arc<Chain>,
    tree: Arc<Tree>,
    path: NodePath,
    action: &str,
    work: F,
) -> anyhow::Result<()>
where
    F: std::future::Future<Output = Result<(), Value>>,
{
    chain.dispatch(ActionCall::start(action, path.clone(), Arc::clone(&tree)))?;
    match work.await {
        Ok(()) => chain.dispatch(ActionCall::settle_ok(action, path, tree))?,
        Err(error) => chain.dispatch(ActionCall::settle_error(action, path, error, tree))?,
    }
    Ok(())
}

fn render(store: &LoadingStore, label: &str, id: &str) {
    let status = store.status(id);
    let line = match status.phase() {
        Phase::Idle => "idle".to_string(),
        Phase::Loading => "loading...".to_string(),
        Phase::Settled => "done".to_string(),
        Phase::Failed => format!("failed: {}", status.error.unwrap_or(Value::Null)),
    };
    println!("  {label:<8} {line}");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_stdout_tracing();
    println!("=== Loading Demo ===\n");

    let config = LoadingConfig::new().with_debug_logging(true);
    let store: Arc<LoadingStore> = Arc::new(LoadingStore::new());
    let tree = Arc::new(Tree::new().with_store(config.store_name.clone(), Arc::clone(&store)));
    let chain: Arc<Chain> = Arc::new(
        Chain::new(|call: ActionCall| {
            tracing::debug!(
                action = %call.name,
                path = %call.path,
                kind = call.event.kind(),
                "action performed"
            );
            Ok(())
        })
        .with(LoadingMiddleware::<Value>::from_config(&config)),
    );

    let users = NodePath::root().child("users");
    let orders = NodePath::root().child("orders");
    let users_id = effect_id(&users, "fetch");
    let orders_id = effect_id(&orders, "fetch");

    let users_flow = tokio::spawn(run_flow(
        Arc::clone(&chain),
        Arc::clone(&tree),
        users,
        "fetch",
        async {
            tokio::time::sleep(Duration::from_millis(150)).await;
            Ok(())
        },
    ));
    let orders_flow = tokio::spawn(run_flow(
        Arc::clone(&chain),
        Arc::clone(&tree),
        orders,
        "fetch",
        async {
            tokio::time::sleep(Duration::from_millis(300)).await;
            Err(json!({ "message": "network down" }))
        },
    ));

    for tick in 0..4 {
        tokio::time::sleep(Duration::from_millis(100)).await;
        println!("--- t+{}ms ---", (tick + 1) * 100);
        render(&store, "users", &users_id);
        render(&store, "orders", &orders_id);
    }

    users_flow.await??;
    orders_flow.await??;

    println!("\nSnapshot:\n{}", serde_json::to_string_pretty(&store.snapshot())?);
    Ok(())
}
