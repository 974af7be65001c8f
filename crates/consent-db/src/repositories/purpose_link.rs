//! Consent-purpose link repository

use consent_core::entities::purpose_link::ConsentPurposeLink;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::entities::purpose_link;
use crate::error::{DatabaseError, Result};

pub struct PurposeLinkRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> PurposeLinkRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn create(&self, link: &ConsentPurposeLink) -> Result<()> {
        let model = purpose_link::ActiveModel {
            id: Set(link.id.as_uuid()),
            org_id: Set(link.org_id.clone()),
            consent_id: Set(link.consent_id.as_uuid()),
            purpose_id: Set(link.purpose_id.as_uuid()),
            mandatory: Set(link.mandatory),
            approved: Set(link.approved),
            created_at: Set(link.created_time.as_datetime()),
            updated_at: Set(link.updated_time.as_datetime()),
        };
        model.insert(self.db).await.map_err(DatabaseError::from)?;
        Ok(())
    }

    pub async fn list_for_consent(&self, consent_id: Uuid) -> Result<Vec<ConsentPurposeLink>> {
        let models = purpose_link::Entity::find()
            .filter(purpose_link::Column::ConsentId.eq(consent_id))
            .all(self.db)
            .await
            .map_err(DatabaseError::from)?;
        Ok(models.into_iter().map(to_domain).collect())
    }

    /// Delete every purpose link belonging to `consent_id`. Used by the
    /// consent update path's full-replacement semantics for the
    /// `consentPurpose` section.
    pub async fn delete_for_consent(&self, consent_id: Uuid) -> Result<()> {
        purpose_link::Entity::delete_many()
            .filter(purpose_link::Column::ConsentId.eq(consent_id))
            .exec(self.db)
            .await
            .map_err(DatabaseError::from)?;
        Ok(())
    }

    pub async fn save(&self, link: &ConsentPurposeLink) -> Result<()> {
        let existing = purpose_link::Entity::find_by_id(link.id.as_uuid())
            .one(self.db)
            .await
            .map_err(DatabaseError::from)?
            .ok_or_else(|| DatabaseError::NotFound(link.id.to_string()))?;

        let mut active: purpose_link::ActiveModel = existing.into();
        active.mandatory = Set(link.mandatory);
        active.approved = Set(link.approved);
        active.updated_at = Set(link.updated_time.as_datetime());

        active.update(self.db).await.map_err(DatabaseError::from)?;
        Ok(())
    }
}

fn to_domain(model: purpose_link::Model) -> ConsentPurposeLink {
    ConsentPurposeLink {
        id: crate::entities::uuid_to_entity_id(model.id),
        org_id: model.org_id,
        consent_id: crate::entities::uuid_to_entity_id(model.consent_id),
        purpose_id: crate::entities::uuid_to_entity_id(model.purpose_id),
        mandatory: model.mandatory,
        approved: model.approved,
        created_time: crate::entities::datetime_to_timestamp(model.created_at),
        updated_time: crate::entities::datetime_to_timestamp(model.updated_at),
    }
}
