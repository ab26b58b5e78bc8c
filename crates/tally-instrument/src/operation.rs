use std::fmt;
use std::marker::PhantomData;

use tally_store::{SharedStore, StoreError};

use crate::args::CallArgs;
use crate::counting::Counted;
use crate::history::Recorded;
use crate::key::OperationKey;

/// A named, callable unit of work that telemetry can be attached to.
///
/// Wrappers such as [`Counted`] and [`Recorded`] implement `Operation` with
/// the same associated types as the operation they wrap, so callers see the
/// same signature no matter how many layers are stacked.
///
/// The error type must absorb [`StoreError`] because the wrappers write to
/// the store around every call.
pub trait Operation {
    type Args: CallArgs;
    type Output: fmt::Display;
    type Error: fmt::Display + From<StoreError>;

    /// Qualified name that roots this operation's telemetry keys.
    fn key(&self) -> &OperationKey;

    /// Invoke the operation.
    fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error>;
}

/// Composition helpers available on every [`Operation`].
pub trait OperationExt: Operation + Sized {
    /// Count every call in the store.
    fn counted(self, store: SharedStore) -> Counted<Self> {
        Counted::new(self, store)
    }

    /// Record every call's arguments and result in the store.
    fn recorded(self, store: SharedStore) -> Recorded<Self> {
        Recorded::new(self, store)
    }

    /// The standard stack: counting outermost, history innermost.
    fn instrumented(self, store: SharedStore) -> Counted<Recorded<Self>> {
        Counted::new(Recorded::new(self, store.clone()), store)
    }
}

impl<O: Operation> OperationExt for O {}

/// An [`Operation`] backed by a closure.
pub struct FnOperation<F, A> {
    key: OperationKey,
    f: F,
    _args: PhantomData<fn(A)>,
}

impl<F, A> FnOperation<F, A> {
    pub fn new(key: OperationKey, f: F) -> Self {
        Self {
            key,
            f,
            _args: PhantomData,
        }
    }
}

/// Wrap `f` as an operation named `key`.
pub fn operation<A, F>(key: OperationKey, f: F) -> FnOperation<F, A> {
    FnOperation::new(key, f)
}

impl<F, A, T, E> Operation for FnOperation<F, A>
where
    F: Fn(A) -> Result<T, E>,
    A: CallArgs,
    T: fmt::Display,
    E: fmt::Display + From<StoreError>,
{
    type Args = A;
    type Output = T;
    type Error = E;

    fn key(&self) -> &OperationKey {
        &self.key
    }

    fn call(&self, args: A) -> Result<T, E> {
        (self.f)(args)
    }
}

impl<F, A> fmt::Debug for FnOperation<F, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnOperation").field("key", &self.key).finish()
    }
}
