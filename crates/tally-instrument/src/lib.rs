//! Call instrumentation and replay for Tally.
//!
//! An instrumented operation is any type implementing [`Operation`]. Two
//! wrappers attach telemetry to it without changing its signature:
//!
//! - [`Counted`] -- increments the invocation counter at `<key>` before
//!   every call, whether or not the call succeeds.
//! - [`Recorded`] -- appends the rendered arguments to `<key>:inputs` and
//!   the rendered result to `<key>:outputs`. A failed call records
//!   [`ERROR_MARKER`] followed by the error, so both lists always grow in
//!   lockstep.
//!
//! Wrappers are themselves operations and can be stacked in any order;
//! [`OperationExt::instrumented`] applies the standard stack (counting
//! outermost, history innermost).
//!
//! [`ReplayEngine`] reads the persisted counter and histories back and
//! renders them:
//!
//! ```text
//! Cache.store was called 2 times:
//! Cache.store(*('a',)) -> 0b6c2c8e-...
//! Cache.store(*('b',)) -> 5d0e7a91-...
//! ```

pub mod args;
pub mod counting;
pub mod error;
pub mod history;
pub mod key;
pub mod operation;
pub mod replay;

pub use args::{ArgRepr, CallArgs};
pub use counting::Counted;
pub use error::{InstrumentError, InstrumentResult};
pub use history::{Recorded, ERROR_MARKER};
pub use key::OperationKey;
pub use operation::{operation, FnOperation, Operation, OperationExt};
pub use replay::{CallRecord, Replay, ReplayEngine, ReplayLines};
