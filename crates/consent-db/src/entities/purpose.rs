//! Purpose entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purposes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub org_id: String,
    pub name: String,
    pub description: Option<String>,

    /// One of "string", "json-schema", "attribute". See [`super::super::entities`]
    /// conversion helpers for the domain-level [`consent_core::entities::purpose::PurposeType`].
    pub purpose_type: String,
    pub attributes: Json,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::purpose_link::Entity")]
    PurposeLinks,
}

impl Related<super::purpose_link::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurposeLinks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
