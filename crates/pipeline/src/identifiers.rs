//! Newtype domain identifiers.
//!
//! Every concept that has an identity is represented as a distinct newtype
//! wrapping a primitive, so a model name can never be passed where a session
//! identifier is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identifiers: String-backed (configuration names)
// ---------------------------------------------------------------------------

/// Identifies the hosted LLM model a request is addressed to (e.g. `"gpt-4o"`).
///
/// Model identifiers are opaque to the pipeline; the provider adapter passes
/// them through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModelId(String);

impl ModelId {
    /// Creates a new model identifier, returning `None` if the value is blank.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let v = value.into();
        if v.trim().is_empty() {
            None
        } else {
            Some(Self(v))
        }
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ModelId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| "model identifier must not be empty".to_string())
    }
}

impl From<ModelId> for String {
    fn from(id: ModelId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers: UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies one campaign session: the span from entering a brief to
/// starting a new campaign.
///
/// Generated fresh for every session; recorded on log spans so that all
/// activity for one campaign can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generates a new random session identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_id_rejects_blank_values() {
        assert!(ModelId::new("").is_none());
        assert!(ModelId::new("   ").is_none());
        assert_eq!(ModelId::new("gpt-4o").map(|m| m.to_string()), Some("gpt-4o".to_string()));
    }

    #[test]
    fn model_id_deserialisation_validates() {
        let ok: ModelId = serde_json::from_str("\"gpt-4o-mini\"").unwrap();
        assert_eq!(ok.as_str(), "gpt-4o-mini");
        assert!(serde_json::from_str::<ModelId>("\"\"").is_err());
    }

    #[test]
    fn session_ids_are_unique() {
        assert_ne!(SessionId::new_random(), SessionId::new_random());
    }
}
