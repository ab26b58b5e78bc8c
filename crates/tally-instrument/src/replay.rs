use std::fmt;

use serde::{Deserialize, Serialize};
use tally_store::KeyValueStore;
use tracing::warn;

use crate::error::{InstrumentError, InstrumentResult};
use crate::history::ERROR_MARKER;
use crate::key::OperationKey;

/// One recorded call: rendered arguments and rendered result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRecord {
    pub input: String,
    pub output: String,
}

impl CallRecord {
    /// Returns `true` if the call failed and its output is an error marker.
    pub fn is_error(&self) -> bool {
        self.output.starts_with(ERROR_MARKER)
    }
}

/// Snapshot of an operation's persisted telemetry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replay {
    pub operation: OperationKey,
    /// Value of the invocation counter (0 if the operation was never called).
    pub count: u64,
    /// Positionally paired history, oldest first.
    pub calls: Vec<CallRecord>,
    /// History entries left without a partner because one list is longer
    /// than the other.
    pub unpaired: usize,
}

impl Replay {
    /// The summary line, e.g. `Cache.store was called 3 times:`.
    pub fn header(&self) -> String {
        let unit = if self.count == 1 { "time" } else { "times" };
        format!("{} was called {} {unit}:", self.operation, self.count)
    }

    /// Consume the replay into its rendered lines: the header, then one
    /// line per call in call order. Lines are formatted as they are pulled.
    pub fn into_lines(self) -> ReplayLines {
        ReplayLines {
            header: Some(self.header()),
            operation: self.operation,
            calls: self.calls.into_iter(),
        }
    }
}

fn call_line(operation: &OperationKey, call: &CallRecord) -> String {
    format!("{operation}(*{}) -> {}", call.input, call.output)
}

impl fmt::Display for Replay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.header())?;
        for call in &self.calls {
            write!(f, "\n{}", call_line(&self.operation, call))?;
        }
        Ok(())
    }
}

/// Iterator over the rendered lines of a [`Replay`].
pub struct ReplayLines {
    header: Option<String>,
    operation: OperationKey,
    calls: std::vec::IntoIter<CallRecord>,
}

impl Iterator for ReplayLines {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if let Some(header) = self.header.take() {
            return Some(header);
        }
        self.calls.next().map(|call| call_line(&self.operation, &call))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.calls.len() + usize::from(self.header.is_some());
        (n, Some(n))
    }
}

impl ExactSizeIterator for ReplayLines {}

/// Reconstructs recorded call history from the store. Read-only.
pub struct ReplayEngine;

impl ReplayEngine {
    /// Read the counter and both history lists for `operation` and pair
    /// them up. Each call re-reads the current store state.
    pub fn replay(store: &dyn KeyValueStore, operation: &OperationKey) -> InstrumentResult<Replay> {
        let count = Self::call_count(store, operation)?;
        let inputs = store.read_list(operation.inputs_key())?;
        let outputs = store.read_list(operation.outputs_key())?;

        let unpaired = inputs.len().abs_diff(outputs.len());
        if unpaired > 0 {
            warn!(
                operation = %operation,
                inputs = inputs.len(),
                outputs = outputs.len(),
                "history lists out of step"
            );
        }

        let calls = inputs
            .into_iter()
            .zip(outputs)
            .map(|(input, output)| CallRecord {
                input: String::from_utf8_lossy(&input).into_owned(),
                output: String::from_utf8_lossy(&output).into_owned(),
            })
            .collect();

        Ok(Replay {
            operation: operation.clone(),
            count,
            calls,
            unpaired,
        })
    }

    /// Read the invocation counter for `operation`; 0 if it was never called.
    pub fn call_count(store: &dyn KeyValueStore, operation: &OperationKey) -> InstrumentResult<u64> {
        let Some(raw) = store.get(operation.counter_key())? else {
            return Ok(0);
        };
        let text = String::from_utf8_lossy(&raw);
        text.parse().map_err(|_| InstrumentError::CorruptCounter {
            key: operation.counter_key().to_string(),
            value: text.into_owned(),
        })
    }
}
