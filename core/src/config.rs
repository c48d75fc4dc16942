use crate::error::{LoadingError, LoadingResult};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_STORE_NAME: &str = "loading";

/// How concurrent runs of the same action identifier are folded together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reentrancy {
    /// All runs share one entry; the first settle marks it settled.
    #[default]
    Collapse,
    /// The entry settles only when the last in-flight run settles.
    Counted,
}

/// Construction-time settings for the lifecycle middleware.
///
/// ```toml
/// store_name = "loading"
/// debug_logging = true
/// reentrancy = "counted"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadingConfig {
    /// Name of the tree node holding the status registry
    pub store_name: String,
    /// Emit a log line per start/end/error event
    pub debug_logging: bool,
    pub reentrancy: Reentrancy,
}

impl Default for LoadingConfig {
    fn default() -> Self {
        Self {
            store_name: DEFAULT_STORE_NAME.to_string(),
            debug_logging: false,
            reentrancy: Reentrancy::Collapse,
        }
    }
}

impl LoadingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store_name(mut self, name: impl Into<String>) -> Self {
        self.store_name = name.into();
        self
    }

    pub fn with_debug_logging(mut self, enabled: bool) -> Self {
        self.debug_logging = enabled;
        self
    }

    pub fn with_reentrancy(mut self, reentrancy: Reentrancy) -> Self {
        self.reentrancy = reentrancy;
        self
    }

    pub fn from_toml_str(raw: &str) -> LoadingResult<Self> {
        let config: Self = toml::from_str(raw).map_err(|e| LoadingError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file on disk.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read loading config {}", path.display()))?;
        let config = Self::from_toml_str(&raw)
            .with_context(|| format!("Failed to parse loading config {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> LoadingResult {
        if self.store_name.trim().is_empty() {
            return Err(LoadingError::Config("store_name must not be empty".to_string()));
        }
        Ok(())
    }
}
