//! The validation engine backing `POST /consents/validate`.
//!
//! Always resolves to a body-level verdict rather than an HTTP error for
//! anything past request-shape validation — the only path that returns an
//! `Err` here is the empty-`consent_id` case, which the handler maps to a
//! genuine 400.

use consent_core::entities::authorization::AuthorizationStatus;
use consent_core::entities::common::Timestamp;
use consent_core::entities::consent::ConsentStatus;
use consent_core::errors::{CoreError, CoreResult};
use consent_core::status::derive_consent_status;
use consent_db::Store;
use uuid::Uuid;

use crate::logging::events;
use crate::services::consent_service::ConsentView;

pub struct ValidationRequest {
    pub consent_id: String,
    /// Accepted per the wire contract; the algorithm (§4.4) does not key off
    /// it, only `userId` does (step 5).
    pub client_id: Option<String>,
    pub user_id: Option<String>,
}

pub struct ValidationVerdict {
    pub is_valid: bool,
    pub error_code: Option<u16>,
    pub error_message: Option<String>,
    pub error_description: Option<String>,
    pub consent_information: Option<ConsentView>,
}

impl ValidationVerdict {
    fn invalid(error_code: u16, error_message: &str) -> Self {
        Self {
            is_valid: false,
            error_code: Some(error_code),
            error_message: Some(error_message.to_string()),
            error_description: None,
            consent_information: None,
        }
    }

    fn invalid_with(mut self, description: impl Into<String>) -> Self {
        self.error_description = Some(description.into());
        self
    }
}

pub struct ValidationService<'a> {
    store: &'a Store,
}

impl<'a> ValidationService<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    pub async fn validate(&self, org_id: &str, request: ValidationRequest) -> CoreResult<ValidationVerdict> {
        if request.consent_id.trim().is_empty() {
            return Err(CoreError::bad_request("consentId required"));
        }

        let consent_id: Uuid = match request.consent_id.parse() {
            Ok(id) => id,
            Err(_) => {
                return Ok(ValidationVerdict::invalid(400, "invalid_request")
                    .invalid_with("consentId is not a valid identifier"))
            }
        };

        let org_id_owned = org_id.to_string();
        let reconciled = self
            .store
            .run_in_transaction(move |txn| {
                Box::pin(async move {
                    let consent = match txn.consents().find_by_id_for_update(&org_id_owned, consent_id).await? {
                        Some(c) => c,
                        None => return Ok(None),
                    };

                    let mut authorizations = txn.authorizations().list_for_consent(consent.id.as_uuid()).await?;
                    let purpose_links = txn.purpose_links().list_for_consent(consent.id.as_uuid()).await?;

                    let status = derive_consent_status(
                        consent.revoked,
                        &consent.validity_time,
                        &authorizations.iter().map(|a| a.status).collect::<Vec<_>>(),
                    );

                    let freshly_expired = status == ConsentStatus::Expired && consent.validity_time.is_past();
                    if freshly_expired {
                        for auth in authorizations.iter_mut() {
                            if auth.status != AuthorizationStatus::SysExpired {
                                auth.status = AuthorizationStatus::SysExpired;
                                auth.updated_time = Timestamp::now();
                                txn.authorizations().save(auth).await?;
                            }
                        }
                    }

                    Ok(Some((consent, status, purpose_links, authorizations, freshly_expired)))
                })
            })
            .await
            .map_err(CoreError::from)?;

        let Some((consent, status, purpose_links, authorizations, freshly_expired)) = reconciled else {
            return Ok(ValidationVerdict::invalid(404, "consent_not_found"));
        };

        events::consent_validated(org_id, &consent.id.to_string(), &format!("{status:?}"));

        let view = ConsentView {
            consent,
            status,
            purpose_links,
            authorizations,
        };

        if status == ConsentStatus::Expired {
            let message = if freshly_expired { "consent_expired" } else { "invalid_consent_status" };
            return Ok(ValidationVerdict {
                is_valid: false,
                error_code: Some(401),
                error_message: Some(message.to_string()),
                error_description: Some("consent status is EXPIRED".to_string()),
                consent_information: Some(view),
            });
        }

        if status != ConsentStatus::Active {
            return Ok(ValidationVerdict {
                is_valid: false,
                error_code: Some(401),
                error_message: Some("invalid_consent_status".to_string()),
                error_description: Some(format!("consent status is {status:?}")),
                consent_information: Some(view),
            });
        }

        if let Some(user_id) = &request.user_id {
            let matches = view.authorizations.iter().any(|a| &a.user_id == user_id);
            if !matches {
                return Ok(ValidationVerdict {
                    is_valid: false,
                    error_code: Some(401),
                    error_message: Some("invalid_consent_status".to_string()),
                    error_description: Some("userId does not match any authorization on this consent".to_string()),
                    consent_information: Some(view),
                });
            }
        }

        Ok(ValidationVerdict {
            is_valid: true,
            error_code: None,
            error_message: None,
            error_description: None,
            consent_information: Some(view),
        })
    }
}
