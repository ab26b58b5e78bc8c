use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::id::IdScheme;

/// Configuration for [`Cache`](crate::Cache) and [`PageCache`](crate::PageCache).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Flush the whole backing database when the cache is constructed,
    /// starting every session from an empty namespace. Turn this off when
    /// the store is shared with other clients.
    pub flush_on_start: bool,
    /// How identifiers for stored values are generated.
    pub id_scheme: IdScheme,
    /// Default expiry for cached pages, in seconds.
    pub page_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            flush_on_start: true,
            id_scheme: IdScheme::Random,
            page_ttl_secs: 10,
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the flush on construction.
    pub fn with_flush_on_start(mut self, flush: bool) -> Self {
        self.flush_on_start = flush;
        self
    }

    pub fn with_id_scheme(mut self, scheme: IdScheme) -> Self {
        self.id_scheme = scheme;
        self
    }

    /// Set the default page expiry.
    pub fn with_page_ttl(mut self, ttl: Duration) -> Self {
        self.page_ttl_secs = ttl.as_secs();
        self
    }

    pub fn page_ttl(&self) -> Duration {
        Duration::from_secs(self.page_ttl_secs)
    }
}
