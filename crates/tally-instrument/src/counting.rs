use tally_store::{SharedStore, StoreResult};
use tracing::debug;

use crate::key::OperationKey;
use crate::operation::Operation;

/// Wrapper that increments the operation's invocation counter.
///
/// The counter at `<key>` is incremented *before* the inner operation runs,
/// so it counts every entry into the wrapper, including calls that go on to
/// fail. If the increment itself fails the inner operation is not invoked.
pub struct Counted<O> {
    inner: O,
    store: SharedStore,
}

impl<O: Operation> Counted<O> {
    pub fn new(inner: O, store: SharedStore) -> Self {
        Self { inner, store }
    }

    /// The wrapped operation.
    pub fn inner(&self) -> &O {
        &self.inner
    }

    fn increment(&self) -> StoreResult<i64> {
        self.store.increment(self.inner.key().counter_key())
    }
}

impl<O> Counted<O> {
    /// Unwrap, discarding the store handle.
    pub fn into_inner(self) -> O {
        self.inner
    }
}

impl<O: Operation> Operation for Counted<O> {
    type Args = O::Args;
    type Output = O::Output;
    type Error = O::Error;

    fn key(&self) -> &OperationKey {
        self.inner.key()
    }

    fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        let count = self.increment()?;
        debug!(operation = %self.key(), count, "call counted");
        self.inner.call(args)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tally_store::{InMemoryStore, KeyValueStore};

    use super::*;
    use crate::operation::test_support::TestError;
    use crate::operation::{operation, OperationExt};

    fn setup() -> (Arc<InMemoryStore>, OperationKey) {
        (
            Arc::new(InMemoryStore::new()),
            OperationKey::new("Counter.op").unwrap(),
        )
    }

    #[test]
    fn counts_successful_calls() {
        let (store, key) = setup();
        let op = operation(key, |(n,): (i64,)| Ok::<_, TestError>(n + 1)).counted(store.clone());

        assert_eq!(store.get("Counter.op").unwrap(), None);
        for i in 0..5 {
            assert_eq!(op.call((i,)).unwrap(), i + 1);
        }
        assert_eq!(store.get("Counter.op").unwrap(), Some(b"5".to_vec()));
    }

    #[test]
    fn failed_calls_are_counted() {
        let (store, key) = setup();
        let op = operation(key, |(n,): (i64,)| {
            if n < 0 {
                Err(TestError::Failed("negative".into()))
            } else {
                Ok(n)
            }
        })
        .counted(store.clone());

        op.call((1,)).unwrap();
        op.call((-1,)).unwrap_err();
        op.call((2,)).unwrap();
        assert_eq!(store.get("Counter.op").unwrap(), Some(b"3".to_vec()));
    }

    #[test]
    fn corrupt_counter_blocks_the_call() {
        let (store, key) = setup();
        store.set("Counter.op", b"many").unwrap();

        let invoked = std::cell::Cell::new(false);
        let op = operation(key, |(): ()| {
            invoked.set(true);
            Ok::<_, TestError>(0)
        })
        .counted(store.clone());

        assert!(matches!(op.call(()), Err(TestError::Store(_))));
        assert!(!invoked.get());
    }

    #[test]
    fn does_not_touch_history() {
        let (store, key) = setup();
        let op = operation(key, |(): ()| Ok::<_, TestError>("done")).counted(store.clone());
        op.call(()).unwrap();
        assert_eq!(store.keys(), vec!["Counter.op"]);
    }
}
