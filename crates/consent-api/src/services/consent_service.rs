//! The consent aggregate service: create, get (with lazy expiry
//! reconciliation), list, update, and revoke. Every mutating operation runs
//! inside exactly one [`consent_db::Store::run_in_transaction`] call; status
//! is never stored directly, only recomputed via
//! [`consent_core::status::derive_consent_status`].

use consent_core::entities::authorization::{Authorization, AuthorizationStatus};
use consent_core::entities::common::{EntityId, Timestamp};
use consent_core::entities::consent::{Consent, ConsentStatus};
use consent_core::entities::purpose_link::ConsentPurposeLink;
use consent_core::errors::{CoreError, CoreResult};
use consent_core::status::derive_consent_status;
use consent_db::repositories::consent::ConsentFilter;
use consent_db::Store;
use uuid::Uuid;

use crate::logging::events;

/// One purpose link supplied on consent create/update.
pub struct NewPurposeLink {
    pub purpose_id: Uuid,
    pub mandatory: bool,
    pub approved: bool,
}

/// One authorization supplied on consent create/update.
pub struct NewAuthorization {
    pub user_id: String,
    pub auth_type: String,
    pub status: AuthorizationStatus,
}

/// `GET /consents` filters (§4.3.1 List consents). All optional, all
/// AND-combined; a multi-valued field is OR-within-itself.
#[derive(Debug, Default)]
pub struct ConsentListFilter {
    pub consent_types: Vec<String>,
    pub consent_statuses: Vec<ConsentStatus>,
    pub client_ids: Vec<String>,
    pub user_ids: Vec<String>,
    pub from_time: Option<Timestamp>,
    pub to_time: Option<Timestamp>,
}

/// A consent together with its derived status and the sub-entities that
/// feed that derivation — the shape handlers assemble into the wire
/// response.
pub struct ConsentView {
    pub consent: Consent,
    pub status: ConsentStatus,
    pub purpose_links: Vec<ConsentPurposeLink>,
    pub authorizations: Vec<Authorization>,
}

pub struct ConsentService<'a> {
    store: &'a Store,
}

impl<'a> ConsentService<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        org_id: &str,
        client_id: &str,
        subject_id: &str,
        consent_type: &str,
        validity_time: Timestamp,
        links: Vec<NewPurposeLink>,
        authorizations: Vec<NewAuthorization>,
    ) -> CoreResult<ConsentView> {
        consent_core::validation::validate_name(consent_type)?;
        for link in &links {
            consent_core::validation::validate_mandatory_link_approved(link.mandatory, link.approved)?;
        }

        let consent = Consent::new(org_id, client_id, subject_id, consent_type, validity_time);

        let mut purpose_links = Vec::with_capacity(links.len());
        for link in &links {
            let purpose_id = EntityId::from_uuid(link.purpose_id);
            if self
                .store
                .purposes()
                .find_by_id(org_id, link.purpose_id)
                .await
                .map_err(CoreError::from)?
                .is_none()
            {
                return Err(CoreError::not_found("Purpose", link.purpose_id.to_string()));
            }
            let mut domain_link = ConsentPurposeLink::new(org_id, consent.id, purpose_id, link.mandatory);
            domain_link.approved = link.approved;
            purpose_links.push(domain_link);
        }

        let mut domain_auths = Vec::with_capacity(authorizations.len());
        for auth in &authorizations {
            let mut domain_auth = Authorization::new(
                org_id,
                consent.id,
                EntityId::new(),
                auth.user_id.clone(),
                auth.auth_type.clone(),
            );
            domain_auth.status = auth.status;
            domain_auths.push(domain_auth);
        }

        let status = derive_consent_status(
            consent.revoked,
            &consent.validity_time,
            &domain_auths.iter().map(|a| a.status).collect::<Vec<_>>(),
        );

        let to_persist_consent = consent.clone();
        let to_persist_links = purpose_links.clone();
        let to_persist_auths = domain_auths.clone();
        self.store
            .run_in_transaction(move |txn| {
                Box::pin(async move {
                    txn.consents().create(&to_persist_consent).await?;
                    for link in &to_persist_links {
                        txn.purpose_links().create(link).await?;
                    }
                    for auth in &to_persist_auths {
                        txn.authorizations().create(auth).await?;
                    }
                    Ok(())
                })
            })
            .await
            .map_err(CoreError::from)?;

        events::consent_created(org_id, &consent.id.to_string(), client_id);

        Ok(ConsentView {
            consent,
            status,
            purpose_links,
            authorizations: domain_auths,
        })
    }

    /// Load a consent, eagerly reconciling expiry: if `validity_time` is
    /// past and the consent is not already terminal, transition it (and
    /// every authorization) to its expired state in the same transaction
    /// before returning.
    pub async fn get(&self, org_id: &str, id: Uuid) -> CoreResult<ConsentView> {
        let consent_id = id;
        let reconciled = self
            .store
            .run_in_transaction(move |txn| {
                Box::pin(async move {
                    let consent = txn
                        .consents()
                        .find_by_id_for_update(org_id, consent_id)
                        .await?
                        .ok_or_else(|| consent_db::error::DatabaseError::NotFound(consent_id.to_string()))?;

                    let mut authorizations = txn.authorizations().list_for_consent(consent.id.as_uuid()).await?;
                    let purpose_links = txn.purpose_links().list_for_consent(consent.id.as_uuid()).await?;

                    let status = derive_consent_status(
                        consent.revoked,
                        &consent.validity_time,
                        &authorizations.iter().map(|a| a.status).collect::<Vec<_>>(),
                    );

                    if status == ConsentStatus::Expired && consent.validity_time.is_past() {
                        for auth in authorizations.iter_mut() {
                            if auth.status != AuthorizationStatus::SysExpired {
                                auth.status = AuthorizationStatus::SysExpired;
                                auth.updated_time = Timestamp::now();
                                txn.authorizations().save(auth).await?;
                            }
                        }
                    }

                    Ok((consent, status, purpose_links, authorizations))
                })
            })
            .await
            .map_err(CoreError::from)?;

        let (consent, status, purpose_links, authorizations) = reconciled;
        Ok(ConsentView {
            consent,
            status,
            purpose_links,
            authorizations,
        })
    }

    /// Update a consent (§4.3.1). Full-replacement semantics: `links`/
    /// `authorizations` of `None` leave that section untouched; `Some(v)`
    /// (including an empty `v`) replaces it entirely. `validity_time` of
    /// `None` leaves the scalar field untouched.
    ///
    /// Rejects with `conflict` if the consent is already terminal
    /// (`REVOKED`, `REJECTED`, `EXPIRED`) — a terminal status is never
    /// reopened by an update (§8 property 3).
    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        &self,
        org_id: &str,
        id: Uuid,
        validity_time: Option<Timestamp>,
        links: Option<Vec<NewPurposeLink>>,
        authorizations: Option<Vec<NewAuthorization>>,
    ) -> CoreResult<ConsentView> {
        if let Some(links) = &links {
            for link in links {
                consent_core::validation::validate_mandatory_link_approved(link.mandatory, link.approved)?;
            }
        }

        let org_id_owned = org_id.to_string();
        let consent_id = id;
        let result = self
            .store
            .run_in_transaction(move |txn| {
                Box::pin(async move {
                    let mut consent = txn
                        .consents()
                        .find_by_id_for_update(&org_id_owned, consent_id)
                        .await?
                        .ok_or_else(|| consent_db::error::DatabaseError::NotFound(consent_id.to_string()))?;

                    let existing_authorizations = txn.authorizations().list_for_consent(consent.id.as_uuid()).await?;
                    let current_status = derive_consent_status(
                        consent.revoked,
                        &consent.validity_time,
                        &existing_authorizations.iter().map(|a| a.status).collect::<Vec<_>>(),
                    );
                    if matches!(
                        current_status,
                        ConsentStatus::Revoked | ConsentStatus::Rejected | ConsentStatus::Expired
                    ) {
                        return Err(consent_db::error::DatabaseError::Conflict(format!(
                            "consent is already {current_status:?}"
                        )));
                    }

                    if let Some(vt) = validity_time {
                        consent.validity_time = vt;
                        consent.updated_time = Timestamp::now();
                        txn.consents().save(&consent).await?;
                    }

                    if let Some(links) = links {
                        for link in &links {
                            if txn.purposes().find_by_id(&consent.org_id, link.purpose_id).await?.is_none() {
                                return Err(consent_db::error::DatabaseError::NotFound(link.purpose_id.to_string()));
                            }
                        }
                        txn.purpose_links().delete_for_consent(consent.id.as_uuid()).await?;
                        for link in &links {
                            let purpose_id = EntityId::from_uuid(link.purpose_id);
                            let mut domain_link =
                                ConsentPurposeLink::new(consent.org_id.as_str(), consent.id, purpose_id, link.mandatory);
                            domain_link.approved = link.approved;
                            txn.purpose_links().create(&domain_link).await?;
                        }
                    }

                    if let Some(authorizations) = authorizations {
                        txn.authorizations().delete_for_consent(consent.id.as_uuid()).await?;
                        for auth in &authorizations {
                            let mut domain_auth = Authorization::new(
                                consent.org_id.as_str(),
                                consent.id,
                                EntityId::new(),
                                auth.user_id.clone(),
                                auth.auth_type.clone(),
                            );
                            domain_auth.status = auth.status;
                            txn.authorizations().create(&domain_auth).await?;
                        }
                    }

                    let purpose_links = txn.purpose_links().list_for_consent(consent.id.as_uuid()).await?;
                    let authorizations = txn.authorizations().list_for_consent(consent.id.as_uuid()).await?;
                    let status = derive_consent_status(
                        consent.revoked,
                        &consent.validity_time,
                        &authorizations.iter().map(|a| a.status).collect::<Vec<_>>(),
                    );

                    Ok((consent, status, purpose_links, authorizations))
                })
            })
            .await
            .map_err(CoreError::from)?;

        let (consent, status, purpose_links, authorizations) = result;
        events::consent_updated(org_id, &consent.id.to_string());

        Ok(ConsentView {
            consent,
            status,
            purpose_links,
            authorizations,
        })
    }

    /// List consents matching `filter`, paginated by `limit`/`offset`.
    ///
    /// `consentTypes`/`clientIds`/`fromTime`/`toTime` are pushed down to SQL.
    /// `consentStatuses` (derived, never stored) and `userIds` (lives on
    /// `Authorization`, not `Consent`) cannot be expressed as a single SQL
    /// predicate here, so when either is present this falls back to loading
    /// every SQL-matching row, filtering and paginating in memory — an
    /// accepted trade-off for a filter combination the spec does not
    /// require to be indexed.
    pub async fn list(
        &self,
        org_id: &str,
        filter: &ConsentListFilter,
        limit: u64,
        offset: u64,
    ) -> CoreResult<(Vec<ConsentView>, u64)> {
        let db_filter = ConsentFilter {
            consent_types: filter.consent_types.clone(),
            client_ids: filter.client_ids.clone(),
            from_time: filter.from_time.map(|t| t.as_datetime()),
            to_time: filter.to_time.map(|t| t.as_datetime()),
        };

        let needs_post_filter = !filter.consent_statuses.is_empty() || !filter.user_ids.is_empty();

        if !needs_post_filter {
            let consents = self
                .store
                .consents()
                .list(org_id, &db_filter, limit, offset)
                .await
                .map_err(CoreError::from)?;
            let total = self
                .store
                .consents()
                .count(org_id, &db_filter)
                .await
                .map_err(CoreError::from)?;
            let views = self.assemble_views(consents).await?;
            return Ok((views, total));
        }

        let consents = self
            .store
            .consents()
            .list_unpaged(org_id, &db_filter)
            .await
            .map_err(CoreError::from)?;
        let mut views = self.assemble_views(consents).await?;

        if !filter.consent_statuses.is_empty() {
            views.retain(|v| filter.consent_statuses.contains(&v.status));
        }
        if !filter.user_ids.is_empty() {
            views.retain(|v| v.authorizations.iter().any(|a| filter.user_ids.contains(&a.user_id)));
        }

        let total = views.len() as u64;
        let page = views.into_iter().skip(offset as usize).take(limit as usize).collect();
        Ok((page, total))
    }

    async fn assemble_views(&self, consents: Vec<Consent>) -> CoreResult<Vec<ConsentView>> {
        let mut views = Vec::with_capacity(consents.len());
        for consent in consents {
            let authorizations = self
                .store
                .authorizations()
                .list_for_consent(consent.id.as_uuid())
                .await
                .map_err(CoreError::from)?;
            let purpose_links = self
                .store
                .purpose_links()
                .list_for_consent(consent.id.as_uuid())
                .await
                .map_err(CoreError::from)?;
            let status = derive_consent_status(
                consent.revoked,
                &consent.validity_time,
                &authorizations.iter().map(|a| a.status).collect::<Vec<_>>(),
            );
            views.push(ConsentView {
                consent,
                status,
                purpose_links,
                authorizations,
            });
        }
        Ok(views)
    }

    /// Revoke a consent. Idempotency: revoking an already-terminal consent
    /// (`REVOKED`, `REJECTED`, `EXPIRED`) is a `conflict`.
    pub async fn revoke(&self, org_id: &str, id: Uuid) -> CoreResult<ConsentView> {
        let consent_id = id;
        let result = self
            .store
            .run_in_transaction(move |txn| {
                Box::pin(async move {
                    let mut consent = txn
                        .consents()
                        .find_by_id_for_update(org_id, consent_id)
                        .await?
                        .ok_or_else(|| consent_db::error::DatabaseError::NotFound(consent_id.to_string()))?;

                    let authorizations = txn.authorizations().list_for_consent(consent.id.as_uuid()).await?;
                    let current_status = derive_consent_status(
                        consent.revoked,
                        &consent.validity_time,
                        &authorizations.iter().map(|a| a.status).collect::<Vec<_>>(),
                    );

                    if matches!(
                        current_status,
                        ConsentStatus::Revoked | ConsentStatus::Rejected | ConsentStatus::Expired
                    ) {
                        return Err(consent_db::error::DatabaseError::Conflict(format!(
                            "consent is already {current_status:?}"
                        )));
                    }

                    consent.revoke();
                    txn.consents().save(&consent).await?;

                    let purpose_links = txn.purpose_links().list_for_consent(consent.id.as_uuid()).await?;
                    Ok((consent, purpose_links, authorizations))
                })
            })
            .await
            .map_err(CoreError::from)?;

        let (consent, purpose_links, authorizations) = result;
        events::consent_revoked(org_id, &consent.id.to_string());

        Ok(ConsentView {
            status: ConsentStatus::Revoked,
            consent,
            purpose_links,
            authorizations,
        })
    }
}
