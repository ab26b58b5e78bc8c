use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Connection settings for the external store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Redis connection URL (`redis://host:port/db`).
    pub url: String,
    /// How long to wait for the initial connection before giving up.
    pub connect_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379/".into(),
            connect_timeout_ms: 2_000,
        }
    }
}

impl StoreConfig {
    /// Override the connection URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Override the connection timeout. Saturates at `u64::MAX` ms.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Check the settings before connecting.
    pub fn validate(&self) -> StoreResult<()> {
        if self.connect_timeout_ms == 0 {
            return Err(StoreError::Config(
                "connect_timeout_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Parse a configuration from TOML text. Missing fields take defaults.
    pub fn from_toml_str(text: &str) -> StoreResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| StoreError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn default_config() {
        let c = StoreConfig::default();
        assert_eq!(c.url, "redis://127.0.0.1:6379/");
        assert_eq!(c.connect_timeout(), Duration::from_secs(2));
    }

    #[test]
    fn builder_overrides() {
        let c = StoreConfig::default()
            .with_url("redis://cache.internal:6380/2")
            .with_connect_timeout(Duration::from_millis(250));
        assert_eq!(c.url, "redis://cache.internal:6380/2");
        assert_eq!(c.connect_timeout_ms, 250);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let c = StoreConfig::from_toml_str("url = \"redis://10.0.0.5/\"").unwrap();
        assert_eq!(c.url, "redis://10.0.0.5/");
        assert_eq!(c.connect_timeout_ms, 2_000);
    }

    #[test]
    fn malformed_toml_is_config_error() {
        let err = StoreConfig::from_toml_str("url = ").unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "url = \"redis://example:6379/1\"").unwrap();
        writeln!(file, "connect_timeout_ms = 50").unwrap();

        let c = StoreConfig::load(file.path()).unwrap();
        assert_eq!(c.url, "redis://example:6379/1");
        assert_eq!(c.connect_timeout(), Duration::from_millis(50));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = StoreConfig::from_toml_str("connect_timeout_ms = 0").unwrap_err();
        assert!(matches!(err, StoreError::Config(ref msg) if msg.contains("connect_timeout_ms")));

        let c = StoreConfig::default().with_connect_timeout(Duration::ZERO);
        assert!(matches!(c.validate(), Err(StoreError::Config(_))));
    }

    #[test]
    fn huge_timeout_saturates() {
        let c = StoreConfig::default().with_connect_timeout(Duration::MAX);
        assert_eq!(c.connect_timeout_ms, u64::MAX);
    }

    #[test]
    fn load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = StoreConfig::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }
}
