//! Purpose catalog repository

use consent_core::entities::purpose::Purpose;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::{purpose, purpose_type_from_str, purpose_type_to_str};
use crate::error::{DatabaseError, Result};

/// Repository for the org-scoped purpose catalog.
///
/// Generic over any [`ConnectionTrait`] so the same methods run against a
/// plain connection or a [`sea_orm::DatabaseTransaction`] handed out by
/// [`crate::store::Store`].
pub struct PurposeRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> PurposeRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn create(&self, purpose: &Purpose) -> Result<()> {
        if self
            .find_by_org_and_name(&purpose.org_id, &purpose.name)
            .await?
            .is_some()
        {
            return Err(DatabaseError::Conflict(format!(
                "purpose name '{}' already exists for this org",
                purpose.name
            )));
        }

        let model = purpose::ActiveModel {
            id: Set(purpose.id.as_uuid()),
            org_id: Set(purpose.org_id.clone()),
            name: Set(purpose.name.clone()),
            description: Set(purpose.description.clone()),
            purpose_type: Set(purpose_type_to_str(purpose.purpose_type).to_string()),
            attributes: Set(serde_json::to_value(&purpose.attributes)?),
            created_at: Set(purpose.created_time.as_datetime()),
            updated_at: Set(purpose.updated_time.as_datetime()),
        };
        model.insert(self.db).await.map_err(DatabaseError::from)?;
        Ok(())
    }

    pub async fn find_by_id(&self, org_id: &str, id: Uuid) -> Result<Option<Purpose>> {
        let model = purpose::Entity::find_by_id(id)
            .filter(purpose::Column::OrgId.eq(org_id))
            .one(self.db)
            .await
            .map_err(DatabaseError::from)?;
        model.map(to_domain).transpose()
    }

    pub async fn find_by_org_and_name(&self, org_id: &str, name: &str) -> Result<Option<Purpose>> {
        let model = purpose::Entity::find()
            .filter(purpose::Column::OrgId.eq(org_id))
            .filter(purpose::Column::Name.eq(name))
            .one(self.db)
            .await
            .map_err(DatabaseError::from)?;
        model.map(to_domain).transpose()
    }

    pub async fn list(&self, org_id: &str, limit: u64, offset: u64) -> Result<Vec<Purpose>> {
        let models = purpose::Entity::find()
            .filter(purpose::Column::OrgId.eq(org_id))
            .order_by_asc(purpose::Column::CreatedAt)
            .limit(limit)
            .offset(offset)
            .all(self.db)
            .await
            .map_err(DatabaseError::from)?;
        models.into_iter().map(to_domain).collect()
    }

    pub async fn count(&self, org_id: &str) -> Result<u64> {
        purpose::Entity::find()
            .filter(purpose::Column::OrgId.eq(org_id))
            .count(self.db)
            .await
            .map_err(DatabaseError::from)
    }

    /// Check which of `names` already exist in the org's catalog.
    pub async fn find_existing_names(&self, org_id: &str, names: &[String]) -> Result<Vec<String>> {
        let models = purpose::Entity::find()
            .filter(purpose::Column::OrgId.eq(org_id))
            .filter(purpose::Column::Name.is_in(names.to_vec()))
            .all(self.db)
            .await
            .map_err(DatabaseError::from)?;
        Ok(models.into_iter().map(|m| m.name).collect())
    }

    pub async fn update(&self, purpose: &Purpose) -> Result<()> {
        let existing = purpose::Entity::find_by_id(purpose.id.as_uuid())
            .filter(purpose::Column::OrgId.eq(purpose.org_id.clone()))
            .one(self.db)
            .await
            .map_err(DatabaseError::from)?
            .ok_or_else(|| DatabaseError::NotFound(purpose.id.to_string()))?;

        let mut active: purpose::ActiveModel = existing.into();
        active.description = Set(purpose.description.clone());
        active.purpose_type = Set(purpose_type_to_str(purpose.purpose_type).to_string());
        active.attributes = Set(serde_json::to_value(&purpose.attributes)?);
        active.updated_at = Set(purpose.updated_time.as_datetime());

        active.update(self.db).await.map_err(DatabaseError::from)?;
        Ok(())
    }

    /// Hard-delete a purpose. The catalog does not cascade to existing
    /// consent purpose links; it only validates purpose existence at
    /// link-write time, so deleting a referenced purpose leaves history
    /// intact. `name` becomes reusable immediately.
    pub async fn delete(&self, org_id: &str, id: Uuid) -> Result<()> {
        let existing = purpose::Entity::find_by_id(id)
            .filter(purpose::Column::OrgId.eq(org_id))
            .one(self.db)
            .await
            .map_err(DatabaseError::from)?
            .ok_or_else(|| DatabaseError::NotFound(id.to_string()))?;

        purpose::Entity::delete_by_id(existing.id)
            .exec(self.db)
            .await
            .map_err(DatabaseError::from)?;
        Ok(())
    }
}

fn to_domain(model: purpose::Model) -> Result<Purpose> {
    let purpose_type = purpose_type_from_str(&model.purpose_type).ok_or_else(|| {
        DatabaseError::SerializationError(format!(
            "unrecognized purpose_type '{}' in row {}",
            model.purpose_type, model.id
        ))
    })?;

    Ok(Purpose {
        id: crate::entities::uuid_to_entity_id(model.id),
        org_id: model.org_id,
        name: model.name,
        description: model.description,
        purpose_type,
        attributes: serde_json::from_value(model.attributes)?,
        created_time: crate::entities::datetime_to_timestamp(model.created_at),
        updated_time: crate::entities::datetime_to_timestamp(model.updated_at),
    })
}
