//! The purpose catalog entity.
//!
//! A purpose is an org-scoped, named reason data may be requested for
//! ("marketing", "credit-scoring", ...). Its `purpose_type` constrains the
//! shape of `attributes`; see [`crate::validation::validate_purpose_type_contract`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::{EntityId, Timestamp};

/// How a purpose's `attributes` map is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PurposeType {
    /// No schema: the purpose is a plain label.
    String,
    /// `attributes["schema"]` holds a JSON Schema document.
    JsonSchema,
    /// `attributes` enumerates individually requestable data attributes.
    Attribute,
}

/// A catalog entry describing a reason data may be collected or shared for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purpose {
    pub id: EntityId,
    pub org_id: String,
    pub name: String,
    pub description: Option<String>,
    pub purpose_type: PurposeType,
    #[serde(default)]
    pub attributes: HashMap<String, Value>,
    pub created_time: Timestamp,
    pub updated_time: Timestamp,
}

impl Purpose {
    /// Build a new purpose with a fresh id and `created_time`/`updated_time`
    /// both set to now.
    pub fn new(
        org_id: impl Into<String>,
        name: impl Into<String>,
        description: Option<String>,
        purpose_type: PurposeType,
        attributes: HashMap<String, Value>,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: EntityId::new(),
            org_id: org_id.into(),
            name: name.into(),
            description,
            purpose_type,
            attributes,
            created_time: now,
            updated_time: now,
        }
    }

    /// Apply a field-level update, bumping `updated_time`.
    pub fn touch(&mut self) {
        self.updated_time = Timestamp::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_purpose_stamps_matching_created_and_updated_time() {
        let p = Purpose::new("org-1", "marketing", None, PurposeType::String, HashMap::new());
        assert_eq!(p.created_time, p.updated_time);
        assert_eq!(p.org_id, "org-1");
    }

    #[test]
    fn touch_advances_updated_time() {
        let mut p = Purpose::new("org-1", "marketing", None, PurposeType::String, HashMap::new());
        let original = p.updated_time;
        std::thread::sleep(std::time::Duration::from_millis(2));
        p.touch();
        assert!(p.updated_time.as_datetime() >= original.as_datetime());
    }
}
