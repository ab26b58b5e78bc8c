//! Key-value store adapter for Tally.
//!
//! Everything Tally persists (cached values, invocation counters, call
//! histories, cached pages) lives in an external key-value service. This
//! crate is the only place that talks to it. The surface is deliberately
//! small and mirrors the handful of Redis commands the rest of the
//! workspace needs: `GET`, `SET`, `SETEX`, `INCR`, `RPUSH`, `LRANGE` and
//! `FLUSHDB`.
//!
//! # Backends
//!
//! All backends implement the [`KeyValueStore`] trait:
//!
//! - [`RedisStore`] -- a single Redis connection, every call a round-trip
//! - [`InMemoryStore`] -- `HashMap`-based store with Redis semantics for tests
//!   and offline use
//!
//! # Design Rules
//!
//! 1. Keys are UTF-8 strings, values are opaque byte strings.
//! 2. A missing key is `Ok(None)` (or an empty list), never an error.
//! 3. No local caching: every read goes to the backend.
//! 4. Nothing is retried. Connection failures surface as
//!    [`StoreError::Unavailable`].
//! 5. The adapter never flushes on its own; callers decide when to call
//!    [`KeyValueStore::clear_all`].

pub mod config;
pub mod error;
pub mod memory;
pub mod redis_store;
pub mod traits;

use std::sync::Arc;

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryStore;
pub use redis_store::RedisStore;
pub use traits::KeyValueStore;

/// Shared handle to a store backend, passed explicitly to every component.
pub type SharedStore = Arc<dyn KeyValueStore>;
