//! Typed, instrumented cache over a key-value store.
//!
//! [`Cache`] stores scalar values ([`StoredValue`]) under freshly generated
//! [`Identifier`]s and reads them back as raw bytes or through a typed
//! accessor. Every `store` call runs through the `Cache.store` instrumented
//! operation, so the store also holds its invocation counter and call
//! history, which [`Cache::replay`] renders.
//!
//! [`PageCache`] is a cache-aside wrapper for fetched web pages with
//! time-based expiry and a per-URL access counter.
//!
//! Constructing a [`Cache`] with the default [`CacheConfig`] flushes the
//! whole backing database. Disable `flush_on_start` when other clients share
//! the store.

pub mod cache;
pub mod config;
pub mod error;
pub mod id;
pub mod page;
pub mod value;

pub use cache::{Cache, STORE_OPERATION};
pub use config::CacheConfig;
pub use error::{CacheError, CacheResult};
pub use id::{IdGenerator, IdScheme, Identifier, RandomIds, TimeOrderedIds};
pub use page::{HttpFetcher, PageCache, PageFetcher};
pub use value::StoredValue;

// Re-export the pieces callers need to build stores and read replays.
pub use tally_instrument::{CallRecord, OperationKey, Replay, ReplayEngine};
pub use tally_store::{InMemoryStore, KeyValueStore, RedisStore, SharedStore, StoreConfig};
