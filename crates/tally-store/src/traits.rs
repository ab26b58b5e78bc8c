use std::time::Duration;

use crate::error::StoreResult;

/// Minimal synchronous facade over an external key-value service.
///
/// All implementations must satisfy these invariants:
/// - Every call reaches the backend; nothing is memoized in process.
/// - `increment` is atomic at the backend.
/// - List indices follow Redis `LRANGE` rules: both ends inclusive,
///   negative indices count from the tail (`-1` is the last element),
///   out-of-range indices are clamped, a missing key is an empty list.
/// - A missing key is reported as `Ok(None)`, not as an error.
pub trait KeyValueStore: Send + Sync {
    /// Write `value` under `key`, replacing any previous value and expiry.
    fn set(&self, key: &str, value: &[u8]) -> StoreResult<()>;

    /// Read the raw bytes stored under `key`.
    ///
    /// Returns `Ok(None)` if the key does not exist or has expired.
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Write `value` under `key` and expire it after `ttl`.
    ///
    /// Expirations have one-second resolution; a `ttl` below one second is
    /// rejected.
    fn set_with_expiration(&self, key: &str, value: &[u8], ttl: Duration) -> StoreResult<()>;

    /// Atomically increment the integer at `key` (missing keys start at 0)
    /// and return the new value.
    fn increment(&self, key: &str) -> StoreResult<i64>;

    /// Append `value` to the tail of the list at `key`, creating it if
    /// needed. Returns the list length after the push.
    fn append_to_list(&self, key: &str, value: &[u8]) -> StoreResult<usize>;

    /// Read the elements of the list at `key` between `start` and `end`,
    /// inclusive.
    fn read_list_range(&self, key: &str, start: isize, end: isize) -> StoreResult<Vec<Vec<u8>>>;

    /// Delete every key in the backing database.
    fn clear_all(&self) -> StoreResult<()>;

    /// Delete `key`. Returns `true` if it existed.
    fn delete(&self, key: &str) -> StoreResult<bool>;

    /// Check whether `key` exists.
    ///
    /// Default implementation reads the value; backends with a cheaper
    /// existence check should override.
    fn exists(&self, key: &str) -> StoreResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Read the whole list at `key`.
    fn read_list(&self, key: &str) -> StoreResult<Vec<Vec<u8>>> {
        self.read_list_range(key, 0, -1)
    }

    /// Length of the list at `key` (0 if missing).
    fn list_len(&self, key: &str) -> StoreResult<usize> {
        Ok(self.read_list(key)?.len())
    }
}

/// Resolve a Redis-style inclusive `[start, end]` range against a list of
/// `len` elements. Returns `None` when the range selects nothing.
pub(crate) fn resolve_range(len: usize, start: isize, end: isize) -> Option<(usize, usize)> {
    let len = len as isize;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let end = if end < 0 { len + end } else { end.min(len - 1) };
    if len == 0 || start > end || start >= len {
        return None;
    }
    Some((start as usize, end as usize))
}

#[cfg(test)]
mod tests {
    use super::resolve_range;

    #[test]
    fn full_range() {
        assert_eq!(resolve_range(3, 0, -1), Some((0, 2)));
    }

    #[test]
    fn negative_indices_count_from_tail() {
        assert_eq!(resolve_range(5, -2, -1), Some((3, 4)));
        assert_eq!(resolve_range(5, -10, 1), Some((0, 1)));
    }

    #[test]
    fn end_is_clamped() {
        assert_eq!(resolve_range(3, 1, 100), Some((1, 2)));
    }

    #[test]
    fn empty_selections() {
        assert_eq!(resolve_range(0, 0, -1), None);
        assert_eq!(resolve_range(3, 2, 1), None);
        assert_eq!(resolve_range(3, 5, 10), None);
        assert_eq!(resolve_range(3, 0, -5), None);
    }
}
