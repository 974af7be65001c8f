//! Validation helpers shared across the domain and store layers.
//!
//! These are plain functions rather than a `validator::Validate` derive
//! because the rules they encode (the purpose type/attribute contract, the
//! mandatory/approved link invariant) cross multiple fields and sometimes
//! multiple entities, which the derive macro cannot express.

use crate::entities::purpose::{Purpose, PurposeType};
use crate::errors::CoreError;

const MAX_NAME_LEN: usize = 255;
const MAX_DESCRIPTION_LEN: usize = 1024;

/// A non-empty, length-bounded display name.
pub fn validate_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::bad_request("name must not be empty").with_field("name"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(CoreError::bad_request(format!(
            "name must be at most {MAX_NAME_LEN} characters"
        ))
        .with_field("name"));
    }
    Ok(())
}

/// An optional, length-bounded free-text description.
pub fn validate_description(description: Option<&str>) -> Result<(), CoreError> {
    match description {
        Some(d) if d.len() > MAX_DESCRIPTION_LEN => Err(CoreError::bad_request(format!(
            "description must be at most {MAX_DESCRIPTION_LEN} characters"
        ))
        .with_field("description")),
        _ => Ok(()),
    }
}

/// Validate that `names` has no duplicates and every name is well-formed.
///
/// Used by the purpose catalog's batch "validate names" operation and by
/// the consent creation path when resolving the purposes a new consent
/// links to.
pub fn validate_names_unique(names: &[String]) -> Result<(), CoreError> {
    for name in names {
        validate_name(name)?;
    }

    let mut seen = std::collections::HashSet::with_capacity(names.len());
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(CoreError::bad_request(format!("duplicate purpose name: {name}"))
                .with_field("names"));
        }
    }
    Ok(())
}

/// The purpose type/attribute contract: a purpose's `type` constrains the
/// shape its `attributes` map must take.
///
/// - `String`: attributes must be empty; the purpose carries no schema.
/// - `JsonSchema`: attributes must contain a `validationSchema` key holding
///   a JSON document describing the consent data shape.
/// - `Attribute`: attributes must contain both a `resourcePath` and a
///   `jsonPath` key naming the requestable data attribute.
pub fn validate_purpose_type_contract(purpose: &Purpose) -> Result<(), CoreError> {
    match purpose.purpose_type {
        PurposeType::String => {
            if !purpose.attributes.is_empty() {
                return Err(CoreError::bad_request(
                    "attributes must be empty for a string-typed purpose",
                )
                .with_field("attributes"));
            }
        }
        PurposeType::JsonSchema => {
            if !purpose.attributes.contains_key("validationSchema") {
                return Err(CoreError::bad_request(
                    "json-schema-typed purpose requires a \"validationSchema\" attribute",
                )
                .with_field("attributes"));
            }
        }
        PurposeType::Attribute => {
            if !purpose.attributes.contains_key("resourcePath") || !purpose.attributes.contains_key("jsonPath") {
                return Err(CoreError::bad_request(
                    "attribute-typed purpose requires both \"resourcePath\" and \"jsonPath\" attributes",
                )
                .with_field("attributes"));
            }
        }
    }
    Ok(())
}

/// The mandatory/approved link invariant: a consent cannot become `ACTIVE`
/// while any of its mandatory purpose links is unapproved. This is enforced
/// at link-creation/update time so the status derivation function in
/// [`crate::status`] never has to special-case mandatory purposes itself.
pub fn validate_mandatory_link_approved(mandatory: bool, approved: bool) -> Result<(), CoreError> {
    if mandatory && !approved {
        return Err(CoreError::bad_request(
            "a mandatory purpose link must be approved before the consent can activate",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn rejects_empty_name() {
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
    }

    #[test]
    fn rejects_overlong_name() {
        let name = "a".repeat(MAX_NAME_LEN + 1);
        assert!(validate_name(&name).is_err());
    }

    #[test]
    fn detects_duplicate_names() {
        let names = vec!["a".to_string(), "b".to_string(), "a".to_string()];
        let err = validate_names_unique(&names).unwrap_err();
        assert!(err.message.contains("duplicate"));
    }

    fn purpose(purpose_type: PurposeType, attributes: HashMap<String, serde_json::Value>) -> Purpose {
        Purpose {
            id: crate::entities::common::EntityId::new(),
            org_id: "org-1".to_string(),
            name: "marketing".to_string(),
            description: None,
            purpose_type,
            attributes,
            created_time: crate::entities::common::Timestamp::now(),
            updated_time: crate::entities::common::Timestamp::now(),
        }
    }

    #[test]
    fn string_purpose_rejects_attributes() {
        let mut attrs = HashMap::new();
        attrs.insert("x".to_string(), serde_json::json!(true));
        let p = purpose(PurposeType::String, attrs);
        assert!(validate_purpose_type_contract(&p).is_err());
    }

    #[test]
    fn json_schema_purpose_requires_validation_schema_key() {
        let p = purpose(PurposeType::JsonSchema, HashMap::new());
        assert!(validate_purpose_type_contract(&p).is_err());

        let mut attrs = HashMap::new();
        attrs.insert("schema".to_string(), serde_json::json!({"type": "object"}));
        let p = purpose(PurposeType::JsonSchema, attrs);
        assert!(validate_purpose_type_contract(&p).is_err());

        let mut attrs = HashMap::new();
        attrs.insert("validationSchema".to_string(), serde_json::json!({"type": "object"}));
        let p = purpose(PurposeType::JsonSchema, attrs);
        assert!(validate_purpose_type_contract(&p).is_ok());
    }

    #[test]
    fn attribute_purpose_requires_resource_path_and_json_path() {
        let p = purpose(PurposeType::Attribute, HashMap::new());
        assert!(validate_purpose_type_contract(&p).is_err());

        let mut attrs = HashMap::new();
        attrs.insert("resourcePath".to_string(), serde_json::json!("/accounts"));
        let p = purpose(PurposeType::Attribute, attrs);
        assert!(validate_purpose_type_contract(&p).is_err());

        let mut attrs = HashMap::new();
        attrs.insert("resourcePath".to_string(), serde_json::json!("/accounts"));
        attrs.insert("jsonPath".to_string(), serde_json::json!("$.balance"));
        let p = purpose(PurposeType::Attribute, attrs);
        assert!(validate_purpose_type_contract(&p).is_ok());
    }

    #[test]
    fn mandatory_unapproved_link_is_rejected() {
        assert!(validate_mandatory_link_approved(true, false).is_err());
        assert!(validate_mandatory_link_approved(true, true).is_ok());
        assert!(validate_mandatory_link_approved(false, false).is_ok());
    }
}
