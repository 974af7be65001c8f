//! The consent aggregate root.
//!
//! `Consent` itself stores no `status` field: status is always computed by
//! [`crate::status::derive_consent_status`] from `revoked`, `validity_time`,
//! and the statuses of the authorizations linked through its purpose links.
//! This keeps the aggregate from ever drifting into an inconsistent status.

use serde::{Deserialize, Serialize};

use super::common::{EntityId, Timestamp};

/// The externally-visible status of a consent, always derived rather than
/// stored directly on the aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConsentStatus {
    Created,
    Active,
    Rejected,
    Revoked,
    Expired,
}

/// A data subject's consent, scoped to an org and a requesting client (TPP).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consent {
    pub id: EntityId,
    pub org_id: String,
    pub client_id: String,
    pub subject_id: String,
    /// Free-form domain tag (§3.2 `type`), required, ≤255 chars. Immutable
    /// after create and the value `consentTypes` list filters match against.
    pub consent_type: String,
    pub validity_time: Timestamp,
    pub revoked: bool,
    pub created_time: Timestamp,
    pub updated_time: Timestamp,
}

impl Consent {
    /// Build a new, unrevoked consent effective until `validity_time`.
    pub fn new(
        org_id: impl Into<String>,
        client_id: impl Into<String>,
        subject_id: impl Into<String>,
        consent_type: impl Into<String>,
        validity_time: Timestamp,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: EntityId::new(),
            org_id: org_id.into(),
            client_id: client_id.into(),
            subject_id: subject_id.into(),
            consent_type: consent_type.into(),
            validity_time,
            revoked: false,
            created_time: now,
            updated_time: now,
        }
    }

    /// Revoke the consent. This mutator itself is a harmless no-op on an
    /// already-revoked consent; the 409 a second `PUT /{id}/revoke` must
    /// return (§8 S3) is the service layer's job, checked before this is
    /// ever called.
    pub fn revoke(&mut self) {
        if !self.revoked {
            self.revoked = true;
            self.updated_time = Timestamp::now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_consent_is_not_revoked() {
        let c = Consent::new("org-1", "client-1", "subject-1", "accounts", Timestamp::now());
        assert!(!c.revoked);
    }

    #[test]
    fn revoke_is_idempotent() {
        let mut c = Consent::new("org-1", "client-1", "subject-1", "accounts", Timestamp::now());
        c.revoke();
        let updated_after_first = c.updated_time;
        std::thread::sleep(std::time::Duration::from_millis(2));
        c.revoke();
        assert!(c.revoked);
        assert_eq!(c.updated_time, updated_after_first);
    }
}
