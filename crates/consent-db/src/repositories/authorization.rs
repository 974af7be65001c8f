//! Authorization repository

use consent_core::entities::authorization::Authorization;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::entities::{authorization, authorization_status_from_str, authorization_status_to_str};
use crate::error::{DatabaseError, Result};

pub struct AuthorizationRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> AuthorizationRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn create(&self, auth: &Authorization) -> Result<()> {
        let model = authorization::ActiveModel {
            id: Set(auth.id.as_uuid()),
            org_id: Set(auth.org_id.clone()),
            consent_id: Set(auth.consent_id.as_uuid()),
            purpose_link_id: Set(auth.purpose_link_id.as_uuid()),
            user_id: Set(auth.user_id.clone()),
            auth_type: Set(auth.auth_type.clone()),
            status: Set(authorization_status_to_str(auth.status).to_string()),
            created_at: Set(auth.created_time.as_datetime()),
            updated_at: Set(auth.updated_time.as_datetime()),
        };
        model.insert(self.db).await.map_err(DatabaseError::from)?;
        Ok(())
    }

    pub async fn list_for_consent(&self, consent_id: Uuid) -> Result<Vec<Authorization>> {
        let models = authorization::Entity::find()
            .filter(authorization::Column::ConsentId.eq(consent_id))
            .all(self.db)
            .await
            .map_err(DatabaseError::from)?;
        models.into_iter().map(to_domain).collect()
    }

    /// Delete every authorization belonging to `consent_id`. Used by the
    /// consent update path's full-replacement semantics for the
    /// `authorizations` section.
    pub async fn delete_for_consent(&self, consent_id: Uuid) -> Result<()> {
        authorization::Entity::delete_many()
            .filter(authorization::Column::ConsentId.eq(consent_id))
            .exec(self.db)
            .await
            .map_err(DatabaseError::from)?;
        Ok(())
    }

    pub async fn save(&self, auth: &Authorization) -> Result<()> {
        let existing = authorization::Entity::find_by_id(auth.id.as_uuid())
            .one(self.db)
            .await
            .map_err(DatabaseError::from)?
            .ok_or_else(|| DatabaseError::NotFound(auth.id.to_string()))?;

        let mut active: authorization::ActiveModel = existing.into();
        active.status = Set(authorization_status_to_str(auth.status).to_string());
        active.updated_at = Set(auth.updated_time.as_datetime());

        active.update(self.db).await.map_err(DatabaseError::from)?;
        Ok(())
    }
}

fn to_domain(model: authorization::Model) -> Result<Authorization> {
    let status = authorization_status_from_str(&model.status).ok_or_else(|| {
        DatabaseError::SerializationError(format!(
            "unrecognized authorization status '{}' in row {}",
            model.status, model.id
        ))
    })?;

    Ok(Authorization {
        id: crate::entities::uuid_to_entity_id(model.id),
        org_id: model.org_id,
        consent_id: crate::entities::uuid_to_entity_id(model.consent_id),
        purpose_link_id: crate::entities::uuid_to_entity_id(model.purpose_link_id),
        user_id: model.user_id,
        auth_type: model.auth_type,
        status,
        created_time: crate::entities::datetime_to_timestamp(model.created_at),
        updated_time: crate::entities::datetime_to_timestamp(model.updated_at),
    })
}
