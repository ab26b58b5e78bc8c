use tally_store::StoreError;

/// Errors from instrumentation and replay.
#[derive(Debug, thiserror::Error)]
pub enum InstrumentError {
    /// The backing store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// An operation key was empty or contained whitespace.
    #[error("invalid operation key: {0:?}")]
    InvalidKey(String),

    /// The invocation counter holds something other than a non-negative
    /// decimal integer.
    #[error("corrupt invocation counter at '{key}': {value:?}")]
    CorruptCounter { key: String, value: String },
}

/// Result alias for instrumentation operations.
pub type InstrumentResult<T> = Result<T, InstrumentError>;
