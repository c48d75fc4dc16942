//! Loadline Flow - Host Tree Layer
//!
//! This crate defines the host side that the lifecycle middleware plugs into:
//! - `Tree`: named stores under the root
//! - `NodePath`: structural addresses of nodes
//! - `ActionCall`: intercepted call records
//! - `Chain`: ordered interceptors around an action
//!
//! **IMPORTANT**: This layer is Pure Rust - no IO, no Async.

pub mod call;
pub mod chain;
pub mod path;
pub mod tree;

pub use call::{ActionCall, CallEvent};
pub use chain::{Chain, Interceptor, Next, Terminal};
pub use path::{NodePath, effect_id};
pub use tree::Tree;
