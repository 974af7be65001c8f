//! Consent entity
//!
//! No `status` column: status is always derived by
//! [`consent_core::status::derive_consent_status`] from `revoked`,
//! `validity_time`, and the statuses of linked authorizations.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "consents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub org_id: String,
    pub client_id: String,
    pub subject_id: String,
    pub consent_type: String,
    pub validity_time: DateTimeUtc,
    pub revoked: bool,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::purpose_link::Entity")]
    PurposeLinks,
    #[sea_orm(has_many = "super::authorization::Entity")]
    Authorizations,
}

impl Related<super::purpose_link::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurposeLinks.def()
    }
}

impl Related<super::authorization::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Authorizations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
