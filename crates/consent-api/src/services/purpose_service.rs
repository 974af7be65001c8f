//! The purpose catalog service: batch create, get, list, update, delete,
//! and the validate-names lookup used by consent creation.

use std::collections::HashMap;

use consent_core::entities::purpose::{Purpose, PurposeType};
use consent_core::errors::{CoreError, CoreResult};
use consent_core::validation::{
    validate_description, validate_name, validate_names_unique, validate_purpose_type_contract,
};
use consent_db::Store;
use serde_json::Value;
use uuid::Uuid;

use crate::logging::events;

/// One element of a purpose-catalog create-batch request.
pub struct NewPurpose {
    pub name: String,
    pub description: Option<String>,
    pub purpose_type: PurposeType,
    pub attributes: HashMap<String, Value>,
}

pub struct PurposeService<'a> {
    store: &'a Store,
}

impl<'a> PurposeService<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Create a batch of purposes, all-or-nothing. Every element is
    /// validated before any write; a duplicate name within the batch or a
    /// collision with an existing live purpose fails the whole batch.
    pub async fn create_batch(&self, org_id: &str, batch: Vec<NewPurpose>) -> CoreResult<Vec<Purpose>> {
        if batch.is_empty() {
            return Err(CoreError::bad_request("purpose batch must not be empty"));
        }

        let names: Vec<String> = batch.iter().map(|p| p.name.clone()).collect();
        validate_names_unique(&names)?;

        let mut purposes = Vec::with_capacity(batch.len());
        for item in &batch {
            validate_name(&item.name)?;
            validate_description(item.description.as_deref())?;
            let purpose = Purpose::new(
                org_id,
                item.name.clone(),
                item.description.clone(),
                item.purpose_type,
                item.attributes.clone(),
            );
            validate_purpose_type_contract(&purpose)?;
            purposes.push(purpose);
        }

        let existing = self
            .store
            .purposes()
            .find_existing_names(org_id, &names)
            .await
            .map_err(|e| CoreError::internal(e.to_string()))?;
        if let Some(name) = existing.first() {
            return Err(CoreError::conflict(format!(
                "purpose name '{name}' already exists for this org"
            )));
        }

        let to_persist = purposes.clone();
        self.store
            .run_in_transaction(move |txn| {
                Box::pin(async move {
                    for purpose in &to_persist {
                        txn.purposes().create(purpose).await?;
                    }
                    Ok(())
                })
            })
            .await
            .map_err(|e| e.into())?;

        for purpose in &purposes {
            events::purpose_upserted(org_id, &purpose.id.to_string(), &purpose.name);
        }

        Ok(purposes)
    }

    pub async fn get(&self, org_id: &str, id: Uuid) -> CoreResult<Purpose> {
        self.store
            .purposes()
            .find_by_id(org_id, id)
            .await
            .map_err(|e| CoreError::internal(e.to_string()))?
            .ok_or_else(|| CoreError::not_found("Purpose", id.to_string()))
    }

    pub async fn list(&self, org_id: &str, name: Option<&str>, limit: u64, offset: u64) -> CoreResult<(Vec<Purpose>, u64)> {
        if let Some(name) = name {
            let found = self
                .store
                .purposes()
                .find_by_org_and_name(org_id, name)
                .await
                .map_err(|e| CoreError::internal(e.to_string()))?;
            let items: Vec<Purpose> = found.into_iter().collect();
            let total = items.len() as u64;
            return Ok((items, total));
        }

        let items = self
            .store
            .purposes()
            .list(org_id, limit, offset)
            .await
            .map_err(|e| CoreError::internal(e.to_string()))?;
        let total = self
            .store
            .purposes()
            .count(org_id)
            .await
            .map_err(|e| CoreError::internal(e.to_string()))?;
        Ok((items, total))
    }

    /// Full-replacement update. Name uniqueness is enforced by the store's
    /// unique `(org_id, name)` index surfacing as a conflict on collision.
    pub async fn update(
        &self,
        org_id: &str,
        id: Uuid,
        name: String,
        description: Option<String>,
        purpose_type: PurposeType,
        attributes: HashMap<String, Value>,
    ) -> CoreResult<Purpose> {
        validate_name(&name)?;
        validate_description(description.as_deref())?;

        let mut purpose = self.get(org_id, id).await?;

        if name != purpose.name {
            if let Some(existing) = self
                .store
                .purposes()
                .find_by_org_and_name(org_id, &name)
                .await
                .map_err(|e| CoreError::internal(e.to_string()))?
            {
                if existing.id != purpose.id {
                    return Err(CoreError::conflict(format!(
                        "purpose name '{name}' already exists for this org"
                    )));
                }
            }
        }

        purpose.name = name;
        purpose.description = description;
        purpose.purpose_type = purpose_type;
        purpose.attributes = attributes;
        validate_purpose_type_contract(&purpose)?;
        purpose.touch();

        self.store
            .run_in_transaction({
                let purpose = purpose.clone();
                move |txn| Box::pin(async move { txn.purposes().update(&purpose).await })
            })
            .await
            .map_err(|e| e.into())?;

        events::purpose_upserted(org_id, &purpose.id.to_string(), &purpose.name);
        Ok(purpose)
    }

    pub async fn delete(&self, org_id: &str, id: Uuid) -> CoreResult<()> {
        // Ensure it exists and is org-scoped before the delete, so a
        // cross-org or unknown id yields `not-found` rather than a silent
        // no-op delete of nothing.
        self.get(org_id, id).await?;
        self.store
            .run_in_transaction(move |txn| Box::pin(async move { txn.purposes().delete(org_id, id).await }))
            .await
            .map_err(|e| e.into())
    }

    /// Return the subset of `names` that refer to live purposes in the org,
    /// deduplicated. Empty input or an empty intersection are both
    /// `bad-request` per the observed source behavior.
    pub async fn validate_names(&self, org_id: &str, names: Vec<String>) -> CoreResult<Vec<String>> {
        if names.is_empty() {
            return Err(CoreError::bad_request("at least one purpose name is required"));
        }

        let mut deduped = names;
        deduped.sort();
        deduped.dedup();

        let existing = self
            .store
            .purposes()
            .find_existing_names(org_id, &deduped)
            .await
            .map_err(|e| CoreError::internal(e.to_string()))?;

        if existing.is_empty() {
            return Err(CoreError::bad_request("no valid purposes found"));
        }

        Ok(existing)
    }
}
