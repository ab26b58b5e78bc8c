use tally_store::SharedStore;
use tracing::{debug, warn};

use crate::args::CallArgs;
use crate::key::OperationKey;
use crate::operation::Operation;

/// Prefix of the `:outputs` entry recorded for a call that failed.
pub const ERROR_MARKER: &str = "!error: ";

/// Wrapper that appends each call's arguments and result to the
/// operation's history lists.
///
/// The rendered arguments go to `<key>:inputs` before the inner operation
/// runs. Afterwards exactly one entry goes to `<key>:outputs`: the result's
/// `Display` form on success, or [`ERROR_MARKER`] followed by the error on
/// failure.
///
/// If the output append fails after the inner operation succeeded, the
/// caller gets the store error and never sees the result. Side effects of
/// the inner call stay in place and `<key>:inputs` is left one entry longer
/// than `<key>:outputs`. When the inner call failed instead, its own error
/// is returned and a failed marker append is only logged.
///
/// Appends are not transactional. Concurrent callers sharing one key may
/// interleave their entries.
pub struct Recorded<O> {
    inner: O,
    store: SharedStore,
}

impl<O: Operation> Recorded<O> {
    pub fn new(inner: O, store: SharedStore) -> Self {
        Self { inner, store }
    }

    /// The wrapped operation.
    pub fn inner(&self) -> &O {
        &self.inner
    }
}

impl<O> Recorded<O> {
    /// Unwrap, discarding the store handle.
    pub fn into_inner(self) -> O {
        self.inner
    }
}

impl<O: Operation> Operation for Recorded<O> {
    type Args = O::Args;
    type Output = O::Output;
    type Error = O::Error;

    fn key(&self) -> &OperationKey {
        self.inner.key()
    }

    fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        let key = self.inner.key();
        let input = args.render();
        self.store.append_to_list(key.inputs_key(), input.as_bytes())?;

        match self.inner.call(args) {
            Ok(output) => {
                let rendered = output.to_string();
                self.store
                    .append_to_list(key.outputs_key(), rendered.as_bytes())?;
                debug!(operation = %key, %input, output = %rendered, "call recorded");
                Ok(output)
            }
            Err(err) => {
                let marker = format!("{ERROR_MARKER}{err}");
                warn!(operation = %key, %input, error = %err, "call failed; recording error marker");
                if let Err(store_err) = self.store.append_to_list(key.outputs_key(), marker.as_bytes()) {
                    // The caller gets the operation's own error; losing the
                    // marker leaves the lists one entry apart.
                    warn!(operation = %key, error = %store_err, "failed to record error marker");
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tally_store::{InMemoryStore, KeyValueStore};

    use super::*;
    use crate::operation::test_support::TestError;
    use crate::operation::{operation, OperationExt};

    fn strings(items: Vec<Vec<u8>>) -> Vec<String> {
        items
            .into_iter()
            .map(|b| String::from_utf8(b).unwrap())
            .collect()
    }

    fn key() -> OperationKey {
        OperationKey::new("Echo.upper").unwrap()
    }

    #[test]
    fn records_inputs_and_outputs_in_order() {
        let store = Arc::new(InMemoryStore::new());
        let op = operation(key(), |(s,): (String,)| Ok::<_, TestError>(s.to_uppercase()))
            .recorded(store.clone());

        for word in ["a", "b", "c"] {
            assert_eq!(op.call((word.to_string(),)).unwrap(), word.to_uppercase());
        }

        let inputs = strings(store.read_list("Echo.upper:inputs").unwrap());
        let outputs = strings(store.read_list("Echo.upper:outputs").unwrap());
        assert_eq!(inputs, vec!["('a',)", "('b',)", "('c',)"]);
        assert_eq!(outputs, vec!["A", "B", "C"]);
    }

    #[test]
    fn failure_records_error_marker() {
        let store = Arc::new(InMemoryStore::new());
        let op = operation(key(), |(s,): (String,)| {
            if s.is_empty() {
                Err(TestError::Failed("empty input".into()))
            } else {
                Ok(s)
            }
        })
        .recorded(store.clone());

        op.call(("x".into(),)).unwrap();
        let err = op.call((String::new(),)).unwrap_err();
        assert_eq!(err.to_string(), "empty input");
        op.call(("y".into(),)).unwrap();

        let inputs = strings(store.read_list("Echo.upper:inputs").unwrap());
        let outputs = strings(store.read_list("Echo.upper:outputs").unwrap());
        assert_eq!(inputs, vec!["('x',)", "('',)", "('y',)"]);
        assert_eq!(outputs, vec!["x", "!error: empty input", "y"]);
    }

    #[test]
    fn does_not_count() {
        let store = Arc::new(InMemoryStore::new());
        let op = operation(key(), |(): ()| Ok::<_, TestError>(1)).recorded(store.clone());
        op.call(()).unwrap();
        assert_eq!(store.get("Echo.upper").unwrap(), None);
    }

    #[test]
    fn unwritable_history_fails_before_invocation() {
        let store = Arc::new(InMemoryStore::new());
        store.set("Echo.upper:inputs", b"not a list").unwrap();

        let invoked = std::cell::Cell::new(false);
        let op = operation(key(), |(): ()| {
            invoked.set(true);
            Ok::<_, TestError>(1)
        })
        .recorded(store.clone());

        assert!(matches!(op.call(()), Err(TestError::Store(_))));
        assert!(!invoked.get());
        assert!(store.read_list("Echo.upper:outputs").unwrap().is_empty());
    }

    #[test]
    fn unwritable_output_loses_result_after_invocation() {
        let store = Arc::new(InMemoryStore::new());
        store.set("Echo.upper:outputs", b"not a list").unwrap();

        let invoked = std::cell::Cell::new(false);
        let op = operation(key(), |(): ()| {
            invoked.set(true);
            Ok::<_, TestError>(1)
        })
        .recorded(store.clone());

        assert!(matches!(op.call(()), Err(TestError::Store(_))));
        assert!(invoked.get());
        assert_eq!(store.list_len("Echo.upper:inputs").unwrap(), 1);
        assert_eq!(store.get("Echo.upper:outputs").unwrap(), Some(b"not a list".to_vec()));
    }
}
