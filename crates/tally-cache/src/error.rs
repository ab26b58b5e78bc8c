use tally_instrument::InstrumentError;
use tally_store::StoreError;

/// Errors from cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The backing store failed (connection loss, wrong type, ...).
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Telemetry could not be read back.
    #[error("instrumentation error: {0}")]
    Instrument(#[from] InstrumentError),

    /// A typed accessor could not decode the stored bytes.
    #[error("cannot decode value at {key}: {reason}")]
    Decode { key: String, reason: String },

    /// An identifier string is not a canonical UUID.
    #[error("invalid identifier {0:?}")]
    InvalidIdentifier(String),

    /// The page fetcher failed.
    #[error("fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },
}

impl CacheError {
    /// Create a decode error for `key`.
    pub fn decode(key: impl Into<String>, reason: impl ToString) -> Self {
        Self::Decode {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a fetch error for `url`.
    pub fn fetch(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Fetch {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result alias for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
