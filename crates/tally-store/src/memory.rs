//! In-memory store for tests and offline use.
//!
//! [`InMemoryStore`] keeps every key in a `HashMap` behind a `RwLock` and
//! reproduces the parts of Redis semantics the rest of the workspace relies
//! on: typed values (strings vs. lists), `INCR` parsing, inclusive list
//! ranges and time-based expiry. Expired keys are dropped lazily, the next
//! time they are touched.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::{resolve_range, KeyValueStore};

#[derive(Clone, Debug)]
enum Value {
    Bytes(Vec<u8>),
    List(Vec<Vec<u8>>),
}

#[derive(Clone, Debug)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn persistent(value: Value) -> Self {
        Self {
            value,
            expires_at: None,
        }
    }

    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }
}

/// An in-memory implementation of [`KeyValueStore`].
///
/// All data lives in a `HashMap` behind a `RwLock`. Data is lost when the
/// store is dropped.
pub struct InMemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .expect("lock poisoned")
            .values()
            .filter(|entry| entry.is_live(now))
            .count()
    }

    /// Returns `true` if no live keys remain.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sorted list of all live keys.
    pub fn keys(&self) -> Vec<String> {
        let now = Instant::now();
        let map = self.entries.read().expect("lock poisoned");
        let mut keys: Vec<String> = map
            .iter()
            .filter(|(_, entry)| entry.is_live(now))
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    fn live_entry<'a>(map: &'a HashMap<String, Entry>, key: &str) -> Option<&'a Entry> {
        map.get(key).filter(|entry| entry.is_live(Instant::now()))
    }

    /// Drop `key` if it has expired, so that writers see a clean slot.
    fn evict_expired(map: &mut HashMap<String, Entry>, key: &str) {
        if map.get(key).is_some_and(|entry| !entry.is_live(Instant::now())) {
            map.remove(key);
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for InMemoryStore {
    fn set(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        let mut map = self.entries.write().expect("lock poisoned");
        map.insert(key.to_string(), Entry::persistent(Value::Bytes(value.to_vec())));
        debug!(key, len = value.len(), "SET");
        Ok(())
    }

    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let map = self.entries.read().expect("lock poisoned");
        match Self::live_entry(&map, key).map(|entry| &entry.value) {
            None => Ok(None),
            Some(Value::Bytes(bytes)) => Ok(Some(bytes.clone())),
            Some(Value::List(_)) => Err(StoreError::WrongType {
                key: key.to_string(),
                expected: "string",
            }),
        }
    }

    fn set_with_expiration(&self, key: &str, value: &[u8], ttl: Duration) -> StoreResult<()> {
        if ttl < Duration::from_secs(1) {
            return Err(StoreError::InvalidExpiration(ttl));
        }
        let mut map = self.entries.write().expect("lock poisoned");
        map.insert(
            key.to_string(),
            Entry {
                value: Value::Bytes(value.to_vec()),
                expires_at: Some(Instant::now() + ttl),
            },
        );
        debug!(key, ttl_secs = ttl.as_secs(), "SETEX");
        Ok(())
    }

    fn increment(&self, key: &str) -> StoreResult<i64> {
        let mut map = self.entries.write().expect("lock poisoned");
        Self::evict_expired(&mut map, key);

        let entry = map
            .entry(key.to_string())
            .or_insert_with(|| Entry::persistent(Value::Bytes(b"0".to_vec())));
        let Value::Bytes(bytes) = &mut entry.value else {
            return Err(StoreError::WrongType {
                key: key.to_string(),
                expected: "string",
            });
        };

        let current: i64 = std::str::from_utf8(bytes.as_slice())
            .ok()
            .and_then(|text| text.parse().ok())
            .ok_or_else(|| StoreError::NotAnInteger(key.to_string()))?;
        let next = current
            .checked_add(1)
            .ok_or_else(|| StoreError::NotAnInteger(key.to_string()))?;
        *bytes = next.to_string().into_bytes();
        debug!(key, value = next, "INCR");
        Ok(next)
    }

    fn append_to_list(&self, key: &str, value: &[u8]) -> StoreResult<usize> {
        let mut map = self.entries.write().expect("lock poisoned");
        Self::evict_expired(&mut map, key);

        let entry = map
            .entry(key.to_string())
            .or_insert_with(|| Entry::persistent(Value::List(Vec::new())));
        let Value::List(items) = &mut entry.value else {
            return Err(StoreError::WrongType {
                key: key.to_string(),
                expected: "list",
            });
        };
        items.push(value.to_vec());
        debug!(key, len = items.len(), "RPUSH");
        Ok(items.len())
    }

    fn read_list_range(&self, key: &str, start: isize, end: isize) -> StoreResult<Vec<Vec<u8>>> {
        let map = self.entries.read().expect("lock poisoned");
        match Self::live_entry(&map, key).map(|entry| &entry.value) {
            None => Ok(Vec::new()),
            Some(Value::List(items)) => Ok(resolve_range(items.len(), start, end)
                .map(|(from, to)| items[from..=to].to_vec())
                .unwrap_or_default()),
            Some(Value::Bytes(_)) => Err(StoreError::WrongType {
                key: key.to_string(),
                expected: "list",
            }),
        }
    }

    fn clear_all(&self) -> StoreResult<()> {
        let mut map = self.entries.write().expect("lock poisoned");
        let dropped = map.len();
        map.clear();
        debug!(dropped, "FLUSHDB");
        Ok(())
    }

    fn delete(&self, key: &str) -> StoreResult<bool> {
        let mut map = self.entries.write().expect("lock poisoned");
        Self::evict_expired(&mut map, key);
        Ok(map.remove(key).is_some())
    }

    fn exists(&self, key: &str) -> StoreResult<bool> {
        let map = self.entries.read().expect("lock poisoned");
        Ok(Self::live_entry(&map, key).is_some())
    }
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStore")
            .field("key_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Strings
    // -----------------------------------------------------------------------

    #[test]
    fn set_and_get() {
        let store = InMemoryStore::new();
        store.set("greeting", b"hello").unwrap();
        assert_eq!(store.get("greeting").unwrap(), Some(b"hello".to_vec()));
    }

    #[test]
    fn get_missing_is_none() {
        let store = InMemoryStore::new();
        assert_eq!(store.get("nope").unwrap(), None);
        assert!(!store.exists("nope").unwrap());
    }

    #[test]
    fn set_overwrites() {
        let store = InMemoryStore::new();
        store.set("k", b"one").unwrap();
        store.set("k", b"two").unwrap();
        assert_eq!(store.get("k").unwrap(), Some(b"two".to_vec()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn delete_reports_existence() {
        let store = InMemoryStore::new();
        store.set("k", b"v").unwrap();
        assert!(store.delete("k").unwrap());
        assert!(!store.delete("k").unwrap());
        assert!(store.is_empty());
    }

    // -----------------------------------------------------------------------
    // Counters
    // -----------------------------------------------------------------------

    #[test]
    fn increment_starts_at_one() {
        let store = InMemoryStore::new();
        assert_eq!(store.increment("hits").unwrap(), 1);
        assert_eq!(store.increment("hits").unwrap(), 2);
        assert_eq!(store.get("hits").unwrap(), Some(b"2".to_vec()));
    }

    #[test]
    fn increment_existing_decimal_text() {
        let store = InMemoryStore::new();
        store.set("n", b"41").unwrap();
        assert_eq!(store.increment("n").unwrap(), 42);
    }

    #[test]
    fn increment_rejects_non_integer() {
        let store = InMemoryStore::new();
        store.set("n", b"forty").unwrap();
        assert!(matches!(
            store.increment("n"),
            Err(StoreError::NotAnInteger(key)) if key == "n"
        ));
    }

    #[test]
    fn increment_rejects_overflow() {
        let store = InMemoryStore::new();
        store.set("n", i64::MAX.to_string().as_bytes()).unwrap();
        assert!(matches!(store.increment("n"), Err(StoreError::NotAnInteger(_))));
    }

    // -----------------------------------------------------------------------
    // Lists
    // -----------------------------------------------------------------------

    #[test]
    fn append_and_read_in_order() {
        let store = InMemoryStore::new();
        assert_eq!(store.append_to_list("l", b"a").unwrap(), 1);
        assert_eq!(store.append_to_list("l", b"b").unwrap(), 2);
        assert_eq!(store.append_to_list("l", b"c").unwrap(), 3);

        let all = store.read_list_range("l", 0, -1).unwrap();
        assert_eq!(all, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
        assert_eq!(store.read_list_range("l", 1, 1).unwrap(), vec![b"b".to_vec()]);
        assert_eq!(store.read_list_range("l", -1, -1).unwrap(), vec![b"c".to_vec()]);
        assert_eq!(store.list_len("l").unwrap(), 3);
    }

    #[test]
    fn missing_list_is_empty() {
        let store = InMemoryStore::new();
        assert!(store.read_list("nothing").unwrap().is_empty());
        assert_eq!(store.list_len("nothing").unwrap(), 0);
    }

    #[test]
    fn type_mismatch_is_an_error() {
        let store = InMemoryStore::new();
        store.set("s", b"text").unwrap();
        store.append_to_list("l", b"x").unwrap();

        assert!(matches!(
            store.append_to_list("s", b"y"),
            Err(StoreError::WrongType { expected: "list", .. })
        ));
        assert!(matches!(
            store.read_list("s"),
            Err(StoreError::WrongType { expected: "list", .. })
        ));
        assert!(matches!(
            store.get("l"),
            Err(StoreError::WrongType { expected: "string", .. })
        ));
        assert!(matches!(
            store.increment("l"),
            Err(StoreError::WrongType { expected: "string", .. })
        ));
    }

    // -----------------------------------------------------------------------
    // Expiry and flush
    // -----------------------------------------------------------------------

    #[test]
    fn sub_second_expiration_rejected() {
        let store = InMemoryStore::new();
        let err = store
            .set_with_expiration("k", b"v", Duration::from_millis(500))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidExpiration(_)));
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn expired_key_disappears() {
        let store = InMemoryStore::new();
        store
            .set_with_expiration("page", b"<html>", Duration::from_secs(1))
            .unwrap();
        assert_eq!(store.get("page").unwrap(), Some(b"<html>".to_vec()));

        std::thread::sleep(Duration::from_millis(1100));
        assert_eq!(store.get("page").unwrap(), None);
        assert!(!store.exists("page").unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn set_clears_previous_expiration() {
        let store = InMemoryStore::new();
        store
            .set_with_expiration("k", b"short", Duration::from_secs(1))
            .unwrap();
        store.set("k", b"forever").unwrap();

        std::thread::sleep(Duration::from_millis(1100));
        assert_eq!(store.get("k").unwrap(), Some(b"forever".to_vec()));
    }

    #[test]
    fn clear_all_drops_everything() {
        let store = InMemoryStore::new();
        store.set("a", b"1").unwrap();
        store.increment("b").unwrap();
        store.append_to_list("c", b"x").unwrap();
        assert_eq!(store.keys(), vec!["a", "b", "c"]);

        store.clear_all().unwrap();
        assert!(store.is_empty());
        assert_eq!(store.get("a").unwrap(), None);
        assert_eq!(store.increment("b").unwrap(), 1);
    }
}
