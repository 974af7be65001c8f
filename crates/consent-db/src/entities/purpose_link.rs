//! ConsentPurposeLink entity: the join between a consent and a purpose.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "consent_purpose_links")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub org_id: String,
    pub consent_id: Uuid,
    pub purpose_id: Uuid,
    pub mandatory: bool,
    pub approved: bool,

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
        belongs_to = "super::purpose::Entity",
        from = "Column::PurposeId",
        to = "super::purpose::Column::Id"
    )]
    Purpose,
    #[sea_orm(has_many = "super::authorization::Entity")]
    Authorizations,
}

impl Related<super::consent::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Consent.def()
    }
}

impl Related<super::purpose::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Purpose.def()
    }
}

impl Related<super::authorization::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Authorizations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
