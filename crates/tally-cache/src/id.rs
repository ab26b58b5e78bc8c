use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// Key under which a cached value is stored (a UUID).
///
/// The store key is the canonical lowercase hyphenated form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identifier(uuid::Uuid);

impl Identifier {
    /// Create from an existing UUID.
    pub fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }

    /// The store key for this identifier.
    pub fn as_key(&self) -> String {
        self.0.hyphenated().to_string()
    }

    /// Short representation (first 8 characters).
    pub fn short_id(&self) -> String {
        self.as_key()[..8].to_string()
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({})", self.short_id())
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for Identifier {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| CacheError::InvalidIdentifier(s.to_string()))
    }
}

/// Source of fresh identifiers.
///
/// No collision detection is performed; implementations rely on the
/// 128-bit space.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> Identifier;
}

/// Random identifiers (UUID v4).
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn generate(&self) -> Identifier {
        Identifier(uuid::Uuid::new_v4())
    }
}

/// Time-ordered identifiers (UUID v7).
#[derive(Clone, Copy, Debug, Default)]
pub struct TimeOrderedIds;

impl IdGenerator for TimeOrderedIds {
    fn generate(&self) -> Identifier {
        Identifier(uuid::Uuid::now_v7())
    }
}

/// Identifier scheme selectable from configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdScheme {
    #[default]
    Random,
    TimeOrdered,
}

impl IdScheme {
    pub fn generator(self) -> Box<dyn IdGenerator> {
        match self {
            Self::Random => Box::new(RandomIds),
            Self::TimeOrdered => Box::new(TimeOrderedIds),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_ids_are_distinct_v4() {
        let a = RandomIds.generate();
        let b = RandomIds.generate();
        assert_ne!(a, b);
        assert_eq!(a.as_uuid().get_version_num(), 4);
    }

    #[test]
    fn time_ordered_ids_are_v7() {
        let a = TimeOrderedIds.generate();
        let b = TimeOrderedIds.generate();
        assert_ne!(a, b);
        assert_eq!(a.as_uuid().get_version_num(), 7);
    }

    #[test]
    fn canonical_string_round_trip() {
        let id = RandomIds.generate();
        let text = id.to_string();
        assert_eq!(text.len(), 36);
        assert_eq!(text, id.as_key());
        assert_eq!(text, text.to_lowercase());
        assert_eq!(text.parse::<Identifier>().unwrap(), id);
        assert_eq!(id.short_id(), &text[..8]);
    }

    #[test]
    fn rejects_non_uuid_text() {
        assert!(matches!(
            "not-an-id".parse::<Identifier>(),
            Err(CacheError::InvalidIdentifier(s)) if s == "not-an-id"
        ));
    }

    #[test]
    fn scheme_from_config_text() {
        let scheme: IdScheme = serde_json::from_str("\"time_ordered\"").unwrap();
        assert_eq!(scheme, IdScheme::TimeOrdered);
        assert_eq!(scheme.generator().generate().as_uuid().get_version_num(), 7);
        assert_eq!(IdScheme::default(), IdScheme::Random);
    }
}
