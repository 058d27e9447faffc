//! Unique identifier types for queue entities
//!
//! Entities flowing through a queue discipline are keyed by a UUID-based
//! identifier so that bookkeeping never depends on object addresses.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an entity (customer, call, vehicle, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub Uuid);

impl EntityId {
    /// Create a new random entity ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ENT_{}", self.0.simple())
    }
}

impl Serialize for EntityId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        // Raw UUIDs are accepted as well as the prefixed form
        let raw = s.strip_prefix("ENT_").unwrap_or(&s);
        let uuid = Uuid::parse_str(raw).map_err(serde::de::Error::custom)?;
        Ok(EntityId(uuid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_creation() {
        let id1 = EntityId::new();
        let id2 = EntityId::new();

        // IDs should be unique
        assert_ne!(id1, id2);

        // Default should create a new ID
        let id3 = EntityId::default();
        assert_ne!(id1, id3);
    }

    #[test]
    fn test_entity_id_display() {
        let id = EntityId::new();
        let display_str = format!("{}", id);

        assert!(display_str.starts_with("ENT_"));
        // ENT_ + 32 hex chars
        assert_eq!(display_str.len(), 36);
    }

    #[test]
    fn test_entity_id_serde() {
        let id = EntityId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert!(json.contains("ENT_"));

        let parsed: EntityId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);

        let raw = format!("\"{}\"", id.0);
        let parsed_raw: EntityId = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed_raw, id);
    }
}
