//! Consent repository

use consent_core::entities::consent::Consent;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, Select,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::entities::consent;
use crate::error::{DatabaseError, Result};

/// Filters for `GET /consents` (§4.3.1 List consents). Every field is
/// optional and AND-combined; a multi-valued field is OR-within-itself via
/// `is_in`.
#[derive(Debug, Default, Clone)]
pub struct ConsentFilter {
    pub consent_types: Vec<String>,
    pub client_ids: Vec<String>,
    pub from_time: Option<chrono::DateTime<chrono::Utc>>,
    pub to_time: Option<chrono::DateTime<chrono::Utc>>,
}

pub struct ConsentRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

fn apply_filters(mut query: Select<consent::Entity>, filter: &ConsentFilter) -> Select<consent::Entity> {
    if !filter.consent_types.is_empty() {
        query = query.filter(consent::Column::ConsentType.is_in(filter.consent_types.clone()));
    }
    if !filter.client_ids.is_empty() {
        query = query.filter(consent::Column::ClientId.is_in(filter.client_ids.clone()));
    }
    if let Some(from) = filter.from_time {
        query = query.filter(consent::Column::CreatedAt.gte(from));
    }
    if let Some(to) = filter.to_time {
        query = query.filter(consent::Column::CreatedAt.lte(to));
    }
    query
}

impl<'a, C: ConnectionTrait> ConsentRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn create(&self, consent: &Consent) -> Result<()> {
        let model = consent::ActiveModel {
            id: Set(consent.id.as_uuid()),
            org_id: Set(consent.org_id.clone()),
            client_id: Set(consent.client_id.clone()),
            subject_id: Set(consent.subject_id.clone()),
            consent_type: Set(consent.consent_type.clone()),
            validity_time: Set(consent.validity_time.as_datetime()),
            revoked: Set(consent.revoked),
            created_at: Set(consent.created_time.as_datetime()),
            updated_at: Set(consent.updated_time.as_datetime()),
        };
        model.insert(self.db).await.map_err(DatabaseError::from)?;
        Ok(())
    }

    pub async fn find_by_id(&self, org_id: &str, id: Uuid) -> Result<Option<Consent>> {
        let model = consent::Entity::find_by_id(id)
            .filter(consent::Column::OrgId.eq(org_id))
            .one(self.db)
            .await
            .map_err(DatabaseError::from)?;
        Ok(model.map(to_domain))
    }

    /// Load a consent row with a `SELECT ... FOR UPDATE` lock, serializing
    /// concurrent writers against the same consent. Must run inside a
    /// transaction; the lock is released at commit/rollback.
    pub async fn find_by_id_for_update(&self, org_id: &str, id: Uuid) -> Result<Option<Consent>> {
        let model = consent::Entity::find_by_id(id)
            .filter(consent::Column::OrgId.eq(org_id))
            .lock_exclusive()
            .one(self.db)
            .await
            .map_err(DatabaseError::from)?;
        Ok(model.map(to_domain))
    }

    pub async fn list(
        &self,
        org_id: &str,
        filter: &ConsentFilter,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Consent>> {
        let query = apply_filters(
            consent::Entity::find().filter(consent::Column::OrgId.eq(org_id)),
            filter,
        );
        let models = query
            .order_by_desc(consent::Column::CreatedAt)
            .limit(limit)
            .offset(offset)
            .all(self.db)
            .await
            .map_err(DatabaseError::from)?;
        Ok(models.into_iter().map(to_domain).collect())
    }

    /// List every matching consent with no `LIMIT`/`OFFSET`, for callers
    /// that need to apply further in-memory filtering (derived status,
    /// authorization `userId`) before paginating themselves.
    pub async fn list_unpaged(&self, org_id: &str, filter: &ConsentFilter) -> Result<Vec<Consent>> {
        let query = apply_filters(
            consent::Entity::find().filter(consent::Column::OrgId.eq(org_id)),
            filter,
        );
        let models = query
            .order_by_desc(consent::Column::CreatedAt)
            .all(self.db)
            .await
            .map_err(DatabaseError::from)?;
        Ok(models.into_iter().map(to_domain).collect())
    }

    pub async fn list_by_subject(&self, org_id: &str, subject_id: &str) -> Result<Vec<Consent>> {
        let models = consent::Entity::find()
            .filter(consent::Column::OrgId.eq(org_id))
            .filter(consent::Column::SubjectId.eq(subject_id))
            .order_by_desc(consent::Column::CreatedAt)
            .all(self.db)
            .await
            .map_err(DatabaseError::from)?;
        Ok(models.into_iter().map(to_domain).collect())
    }

    pub async fn count(&self, org_id: &str, filter: &ConsentFilter) -> Result<u64> {
        let query = apply_filters(
            consent::Entity::find().filter(consent::Column::OrgId.eq(org_id)),
            filter,
        );
        query.count(self.db).await.map_err(DatabaseError::from)
    }

    pub async fn save(&self, consent: &Consent) -> Result<()> {
        let existing = consent::Entity::find_by_id(consent.id.as_uuid())
            .filter(consent::Column::OrgId.eq(consent.org_id.clone()))
            .one(self.db)
            .await
            .map_err(DatabaseError::from)?
            .ok_or_else(|| DatabaseError::NotFound(consent.id.to_string()))?;

        let mut active: consent::ActiveModel = existing.into();
        active.validity_time = Set(consent.validity_time.as_datetime());
        active.revoked = Set(consent.revoked);
        active.updated_at = Set(consent.updated_time.as_datetime());

        active.update(self.db).await.map_err(DatabaseError::from)?;
        Ok(())
    }
}

fn to_domain(model: consent::Model) -> Consent {
    Consent {
        id: crate::entities::uuid_to_entity_id(model.id),
        org_id: model.org_id,
        client_id: model.client_id,
        subject_id: model.subject_id,
        consent_type: model.consent_type,
        validity_time: crate::entities::datetime_to_timestamp(model.validity_time),
        revoked: model.revoked,
        created_time: crate::entities::datetime_to_timestamp(model.created_at),
        updated_time: crate::entities::datetime_to_timestamp(model.updated_at),
    }
}
