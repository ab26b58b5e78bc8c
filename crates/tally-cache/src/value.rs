use std::fmt;

use serde::{Deserialize, Serialize};
use tally_instrument::args::{quote_bytes, quote_text};
use tally_instrument::ArgRepr;

/// A scalar value the cache can store.
///
/// The store only ever sees the serialized bytes:
///
/// | variant   | bytes                                            |
/// |-----------|--------------------------------------------------|
/// | `Text`    | UTF-8                                            |
/// | `Bytes`   | verbatim                                         |
/// | `Integer` | decimal text (`-12`)                             |
/// | `Float`   | shortest round-trip decimal text, `.0` for whole numbers (`1.0`, `0.1`, `1e20`) |
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum StoredValue {
    Text(String),
    Bytes(Vec<u8>),
    Integer(i64),
    Float(f64),
}

impl StoredValue {
    /// Serialized form written to the store.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Text(text) => text.as_bytes().to_vec(),
            Self::Bytes(bytes) => bytes.clone(),
            Self::Integer(n) => n.to_string().into_bytes(),
            Self::Float(x) => format!("{x:?}").into_bytes(),
        }
    }

    /// Short name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
        }
    }
}

impl ArgRepr for StoredValue {
    fn repr(&self) -> String {
        match self {
            Self::Text(text) => quote_text(text),
            Self::Bytes(bytes) => quote_bytes(bytes),
            Self::Integer(n) => n.to_string(),
            Self::Float(x) => format!("{x:?}"),
        }
    }
}

/// Literal-style rendering, the same form used in call histories.
impl fmt::Display for StoredValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr())
    }
}

impl From<String> for StoredValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for StoredValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Vec<u8>> for StoredValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<&[u8]> for StoredValue {
    fn from(value: &[u8]) -> Self {
        Self::Bytes(value.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for StoredValue {
    fn from(value: &[u8; N]) -> Self {
        Self::Bytes(value.to_vec())
    }
}

impl From<i64> for StoredValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for StoredValue {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<f64> for StoredValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}
