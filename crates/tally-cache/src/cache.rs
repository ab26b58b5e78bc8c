use std::fmt;

use tally_instrument::{Counted, Operation, OperationExt, OperationKey, Recorded, Replay, ReplayEngine};
use tally_store::SharedStore;
use tracing::{debug, info};

use crate::config::CacheConfig;
use crate::error::{CacheError, CacheResult};
use crate::id::{IdGenerator, Identifier};
use crate::value::StoredValue;

/// Qualified name of the instrumented store operation.
pub const STORE_OPERATION: &str = "Cache.store";

/// The raw write behind [`Cache::store`]: fresh identifier, one `SET`.
struct StoreValue {
    key: OperationKey,
    store: SharedStore,
    ids: Box<dyn IdGenerator>,
}

impl Operation for StoreValue {
    type Args = (StoredValue,);
    type Output = Identifier;
    type Error = CacheError;

    fn key(&self) -> &OperationKey {
        &self.key
    }

    fn call(&self, (value,): (StoredValue,)) -> CacheResult<Identifier> {
        let id = self.ids.generate();
        self.store.set(&id.as_key(), &value.to_bytes())?;
        debug!(id = %id, kind = value.kind(), "value stored");
        Ok(id)
    }
}

/// Typed cache over a key-value store.
///
/// Values are written under generated identifiers and read back with an
/// optional decoding step. Reads always go to the store. Writes go through
/// the `Cache.store` operation wrapped with invocation counting and call
/// history (see [`Cache::replay`]).
pub struct Cache {
    store: SharedStore,
    store_op: Counted<Recorded<StoreValue>>,
}

impl Cache {
    /// Create a cache with the default configuration.
    ///
    /// This flushes the backing database.
    pub fn new(store: SharedStore) -> CacheResult<Self> {
        Self::with_config(store, &CacheConfig::default())
    }

    pub fn with_config(store: SharedStore, config: &CacheConfig) -> CacheResult<Self> {
        Self::with_generator(store, config, config.id_scheme.generator())
    }

    /// Create a cache with an explicit identifier generator.
    pub fn with_generator(
        store: SharedStore,
        config: &CacheConfig,
        ids: Box<dyn IdGenerator>,
    ) -> CacheResult<Self> {
        if config.flush_on_start {
            store.clear_all()?;
            info!("store flushed for a fresh cache session");
        }
        let op = StoreValue {
            key: OperationKey::new(STORE_OPERATION)?,
            store: store.clone(),
            ids,
        };
        Ok(Self {
            store_op: op.instrumented(store.clone()),
            store,
        })
    }

    /// Store `value` under a fresh identifier and return the identifier.
    pub fn store(&self, value: impl Into<StoredValue>) -> CacheResult<Identifier> {
        self.store_op.call((value.into(),))
    }

    /// Raw bytes stored under `id`, or `None` if absent.
    pub fn get(&self, id: &Identifier) -> CacheResult<Option<Vec<u8>>> {
        Ok(self.store.get(&id.as_key())?)
    }

    /// Read `id` and decode it with `transform`.
    ///
    /// The transform runs only when the key exists. A transform failure is
    /// returned as [`CacheError::Decode`], never as `None`.
    pub fn get_with<T, E, F>(&self, id: &Identifier, transform: F) -> CacheResult<Option<T>>
    where
        F: FnOnce(Vec<u8>) -> Result<T, E>,
        E: fmt::Display,
    {
        match self.get(id)? {
            None => Ok(None),
            Some(bytes) => transform(bytes)
                .map(Some)
                .map_err(|e| CacheError::decode(id.as_key(), e)),
        }
    }

    /// Read `id` as UTF-8 text.
    pub fn get_str(&self, id: &Identifier) -> CacheResult<Option<String>> {
        self.get_with(id, String::from_utf8)
    }

    /// Read `id` as a decimal integer.
    pub fn get_int(&self, id: &Identifier) -> CacheResult<Option<i64>> {
        self.get_with(id, |bytes| parse_text::<i64>(&bytes))
    }

    /// Read `id` as a floating-point number.
    pub fn get_float(&self, id: &Identifier) -> CacheResult<Option<f64>> {
        self.get_with(id, |bytes| parse_text::<f64>(&bytes))
    }

    /// Recorded history of [`Cache::store`] calls.
    pub fn replay(&self) -> CacheResult<Replay> {
        Ok(ReplayEngine::replay(self.store.as_ref(), self.store_op.key())?)
    }

    /// Number of times [`Cache::store`] has been called.
    pub fn store_calls(&self) -> CacheResult<u64> {
        Ok(ReplayEngine::call_count(self.store.as_ref(), self.store_op.key())?)
    }

    /// The store handle this cache writes to.
    pub fn backing_store(&self) -> &SharedStore {
        &self.store
    }
}

fn parse_text<T>(bytes: &[u8]) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    let text = std::str::from_utf8(bytes).map_err(|e| e.to_string())?;
    text.parse::<T>().map_err(|e| format!("{e}: {text:?}"))
}

impl fmt::Debug for Cache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("operation", self.store_op.key())
            .finish()
    }
}
