//! Cache-aside page cache.
//!
//! [`PageCache::fetch_cached`] serves `cached:<url>` when present. On a miss
//! it bumps `count:<url>`, fetches the page through a [`PageFetcher`] and
//! writes the body back with an expiry. Hits are neither counted nor
//! fetched, so `count:<url>` is the number of times the page was actually
//! retrieved.

use std::time::Duration;

use tally_store::{SharedStore, StoreError};
use tracing::debug;

use crate::error::{CacheError, CacheResult};

/// Source of page bodies.
pub trait PageFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> CacheResult<String>;
}

/// Blocking HTTP fetcher. Non-success status codes are errors.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> CacheResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CacheError::fetch("<client>", e))?;
        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> CacheResult<String> {
        let response = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| CacheError::fetch(url, e))?;
        response.text().map_err(|e| CacheError::fetch(url, e))
    }
}

/// Key holding the cached body of `url`.
pub fn cached_key(url: &str) -> String {
    format!("cached:{url}")
}

/// Key holding the fetch counter of `url`.
pub fn count_key(url: &str) -> String {
    format!("count:{url}")
}

/// Cache-aside wrapper around a [`PageFetcher`].
pub struct PageCache<F> {
    store: SharedStore,
    fetcher: F,
    default_ttl: Duration,
}

impl<F: PageFetcher> PageCache<F> {
    pub fn new(store: SharedStore, fetcher: F, default_ttl: Duration) -> Self {
        Self {
            store,
            fetcher,
            default_ttl,
        }
    }

    /// Fetch `url` with the default expiry.
    pub fn fetch(&self, url: &str) -> CacheResult<String> {
        self.fetch_cached(url, self.default_ttl)
    }

    /// Return the cached body of `url`, or fetch it, cache it for `ttl` and
    /// return it.
    ///
    /// A `ttl` under one second fails with
    /// [`StoreError::InvalidExpiration`] before anything is read, counted
    /// or fetched.
    pub fn fetch_cached(&self, url: &str, ttl: Duration) -> CacheResult<String> {
        if ttl < Duration::from_secs(1) {
            return Err(StoreError::InvalidExpiration(ttl).into());
        }
        let cached = cached_key(url);
        if let Some(bytes) = self.store.get(&cached)? {
            debug!(url, "page cache hit");
            return String::from_utf8(bytes).map_err(|e| CacheError::decode(cached, e));
        }

        let count = self.store.increment(&count_key(url))?;
        debug!(url, count, "page cache miss; fetching");
        let body = self.fetcher.fetch(url)?;
        self.store.set_with_expiration(&cached, body.as_bytes(), ttl)?;
        Ok(body)
    }

    /// How many times `url` has been fetched (cache misses).
    pub fn access_count(&self, url: &str) -> CacheResult<u64> {
        let key = count_key(url);
        match self.store.get(&key)? {
            None => Ok(0),
            Some(bytes) => std::str::from_utf8(&bytes)
                .ok()
                .and_then(|text| text.parse().ok())
                .ok_or_else(|| CacheError::decode(key, "counter is not a decimal integer")),
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }
}
