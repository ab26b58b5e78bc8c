use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{InstrumentError, InstrumentResult};

/// Qualified name of an instrumented operation (e.g. `Cache.store`).
///
/// The name is the root of the three store keys that hold the operation's
/// telemetry:
///
/// - `<name>` -- invocation counter, decimal text
/// - `<name>:inputs` -- list of rendered argument tuples
/// - `<name>:outputs` -- list of rendered results
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OperationKey {
    name: String,
    inputs: String,
    outputs: String,
}

impl OperationKey {
    /// Validate `name` and derive its history keys.
    pub fn new(name: impl Into<String>) -> InstrumentResult<Self> {
        let name = name.into();
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(InstrumentError::InvalidKey(name));
        }
        Ok(Self {
            inputs: format!("{name}:inputs"),
            outputs: format!("{name}:outputs"),
            name,
        })
    }

    /// The qualified name, also the counter key.
    pub fn as_str(&self) -> &str {
        &self.name
    }

    pub fn counter_key(&self) -> &str {
        &self.name
    }

    pub fn inputs_key(&self) -> &str {
        &self.inputs
    }

    pub fn outputs_key(&self) -> &str {
        &self.outputs
    }
}

impl fmt::Debug for OperationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OperationKey({})", self.name)
    }
}

impl fmt::Display for OperationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl FromStr for OperationKey {
    type Err = InstrumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for OperationKey {
    type Error = InstrumentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<OperationKey> for String {
    fn from(key: OperationKey) -> Self {
        key.name
    }
}
