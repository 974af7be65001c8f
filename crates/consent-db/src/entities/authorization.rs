//! Authorization entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "authorizations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub org_id: String,
    pub consent_id: Uuid,
    pub purpose_link_id: Uuid,
    pub user_id: String,
    pub auth_type: String,

    /// One of "CREATED", "APPROVED", "REJECTED", "SYS_EXPIRED".
    pub status: String,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::consent::Entity",
        from = "Column::ConsentId",
        to = "super::consent::Column::Id"
    )]
    Consent,
    #[sea_orm(
        belongs_to = "super::purpose_link::Entity",
        from = "Column::PurposeLinkId",
        to = "super::purpose_link::Column::Id"
    )]
    PurposeLink,
}

impl Related<super::consent::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Consent.def()
    }
}

impl Related<super::purpose_link::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurposeLink.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
