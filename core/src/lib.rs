//! # Loadline Core
//!
//! Status model and registry for tracking the lifecycle of async flows.
//! This crate knows nothing about how actions are dispatched; see
//! `loadline-flow` for the host tree and `loadline-runtime` for the
//! middleware that drives the registry.

pub mod config;
pub mod error;
pub mod registry;
pub mod status;

pub use config::{DEFAULT_STORE_NAME, LoadingConfig, Reentrancy};
pub use error::{LoadingError, LoadingResult};
pub use registry::{LoadingStore, StatusRegistry, StoreSnapshot};
pub use status::{Phase, Status, StatusChange};
