//! SeaORM entity models for the consent management service

pub mod authorization;
pub mod consent;
pub mod purpose;
pub mod purpose_link;

// Re-export all entities
pub use authorization::*;
pub use consent::*;
pub use purpose::*;
pub use purpose_link::*;

// Common imports for all entities
pub use sea_orm::entity::prelude::*;
pub use sea_orm::{Set, NotSet, Unchanged};
pub use serde::{Deserialize, Serialize};

use consent_core::entities::authorization::AuthorizationStatus;
use consent_core::entities::common::{EntityId, Timestamp};
use consent_core::entities::purpose::PurposeType;

/// Convert from domain entity ID to database UUID
pub fn entity_id_to_uuid(id: &EntityId) -> Uuid {
    id.as_uuid()
}

/// Convert from database UUID to domain entity ID
pub fn uuid_to_entity_id(uuid: Uuid) -> EntityId {
    EntityId::from_uuid(uuid)
}

/// Convert from domain timestamp to database DateTime
pub fn timestamp_to_datetime(ts: &Timestamp) -> chrono::DateTime<chrono::Utc> {
    ts.as_datetime()
}

/// Convert from database DateTime to domain timestamp
pub fn datetime_to_timestamp(dt: chrono::DateTime<chrono::Utc>) -> Timestamp {
    Timestamp::from_datetime(dt)
}

/// Render a [`PurposeType`] as the string stored in the `purpose_type` column.
pub fn purpose_type_to_str(purpose_type: PurposeType) -> &'static str {
    match purpose_type {
        PurposeType::String => "string",
        PurposeType::JsonSchema => "json-schema",
        PurposeType::Attribute => "attribute",
    }
}

/// Parse the `purpose_type` column back into a [`PurposeType`].
pub fn purpose_type_from_str(s: &str) -> Option<PurposeType> {
    match s {
        "string" => Some(PurposeType::String),
        "json-schema" => Some(PurposeType::JsonSchema),
        "attribute" => Some(PurposeType::Attribute),
        _ => None,
    }
}

/// Render an [`AuthorizationStatus`] as the string stored in the `status` column.
pub fn authorization_status_to_str(status: AuthorizationStatus) -> &'static str {
    match status {
        AuthorizationStatus::Created => "CREATED",
        AuthorizationStatus::Approved => "APPROVED",
        AuthorizationStatus::Rejected => "REJECTED",
        AuthorizationStatus::SysExpired => "SYS_EXPIRED",
    }
}

/// Parse the `status` column back into an [`AuthorizationStatus`].
pub fn authorization_status_from_str(s: &str) -> Option<AuthorizationStatus> {
    match s {
        "CREATED" => Some(AuthorizationStatus::Created),
        "APPROVED" => Some(AuthorizationStatus::Approved),
        "REJECTED" => Some(AuthorizationStatus::Rejected),
        "SYS_EXPIRED" => Some(AuthorizationStatus::SysExpired),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purpose_type_round_trips_through_its_column_string() {
        for pt in [PurposeType::String, PurposeType::JsonSchema, PurposeType::Attribute] {
            let s = purpose_type_to_str(pt);
            assert_eq!(purpose_type_from_str(s), Some(pt));
        }
    }

    #[test]
    fn authorization_status_round_trips_through_its_column_string() {
        for st in [
            AuthorizationStatus::Created,
            AuthorizationStatus::Approved,
            AuthorizationStatus::Rejected,
            AuthorizationStatus::SysExpired,
        ] {
            let s = authorization_status_to_str(st);
            assert_eq!(authorization_status_from_str(s), Some(st));
        }
    }
}
