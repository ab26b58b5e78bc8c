use std::time::Duration;

/// Errors from key-value store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend could not be reached or the connection failed.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The key holds a value of a different type than the command expects.
    #[error("wrong type for key '{key}': expected {expected}")]
    WrongType { key: String, expected: &'static str },

    /// `INCR` on a value that is not a decimal integer.
    #[error("value at key '{0}' is not an integer")]
    NotAnInteger(String),

    /// Expirations must be at least one second.
    #[error("invalid expiration {0:?}: must be at least one second")]
    InvalidExpiration(Duration),

    /// The server answered with an error reply not covered above.
    #[error("command rejected: {0}")]
    Rejected(String),

    /// Configuration is invalid or could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Classify a Redis error raised while running a command on `key`.
    ///
    /// `expected` names the value type the command operates on and is only
    /// used for `WRONGTYPE` replies.
    pub fn from_redis(err: redis::RedisError, key: &str, expected: &'static str) -> Self {
        if err.is_io_error()
            || err.is_connection_refusal()
            || err.is_connection_dropped()
            || err.is_timeout()
        {
            return Self::Unavailable(err.to_string());
        }
        match err.kind() {
            redis::ErrorKind::TypeError => Self::WrongType {
                key: key.to_string(),
                expected,
            },
            redis::ErrorKind::InvalidClientConfig => Self::Config(err.to_string()),
            _ if err.to_string().contains("not an integer") => {
                Self::NotAnInteger(key.to_string())
            }
            _ => Self::Rejected(err.to_string()),
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
