use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tally_cache::CacheConfig;
use tally_store::StoreConfig;

/// Contents of the `--config` file.
///
/// ```toml
/// [store]
/// url = "redis://127.0.0.1:6379/0"
///
/// [cache]
/// id_scheme = "time_ordered"
/// page_ttl_secs = 30
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub cache: CacheConfig,
}

impl AppConfig {
    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(text).context("invalid configuration")?;
        config.store.validate().context("invalid [store] section")?;
        Ok(config)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_toml_str(&text)
    }

    /// Load from `path` if given, otherwise use defaults.
    pub fn resolve(path: Option<&Path>) -> anyhow::Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }
}
