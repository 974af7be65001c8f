//! Authorizations: the per-purpose-link decision a data subject renders.
//!
//! An authorization's status feeds [`crate::status::derive_consent_status`]
//! but is never itself derived — it is the terminal record of a subject's
//! decision (or the system's time-based expiry of a stale one).

use serde::{Deserialize, Serialize};

use super::common::{EntityId, Timestamp};

/// The lifecycle state of a single authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthorizationStatus {
    Created,
    Approved,
    Rejected,
    SysExpired,
}

/// A data subject's decision on one purpose link within a consent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Authorization {
    pub id: EntityId,
    pub org_id: String,
    pub consent_id: EntityId,
    pub purpose_link_id: EntityId,
    /// The data subject this authorization was rendered by. Matched against
    /// the validation engine's optional `userId` input (§4.4 step 5).
    pub user_id: String,
    pub auth_type: String,
    pub status: AuthorizationStatus,
    pub created_time: Timestamp,
    pub updated_time: Timestamp,
}

impl Authorization {
    /// Build a new authorization in the `Created` state.
    pub fn new(
        org_id: impl Into<String>,
        consent_id: EntityId,
        purpose_link_id: EntityId,
        user_id: impl Into<String>,
        auth_type: impl Into<String>,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: EntityId::new(),
            org_id: org_id.into(),
            consent_id,
            purpose_link_id,
            user_id: user_id.into(),
            auth_type: auth_type.into(),
            status: AuthorizationStatus::Created,
            created_time: now,
            updated_time: now,
        }
    }

    /// Transition to a terminal or system state, bumping `updated_time`.
    ///
    /// Rejects transitions out of a terminal status: `Approved`, `Rejected`,
    /// and `SysExpired` are all final once reached.
    pub fn transition(&mut self, next: AuthorizationStatus) -> Result<(), crate::errors::CoreError> {
        if self.is_terminal() {
            return Err(crate::errors::CoreError::conflict(format!(
                "authorization already in terminal status {:?}",
                self.status
            )));
        }
        self.status = next;
        self.updated_time = Timestamp::now();
        Ok(())
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            AuthorizationStatus::Approved
                | AuthorizationStatus::Rejected
                | AuthorizationStatus::SysExpired
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_authorization_starts_created() {
        let a = Authorization::new("org-1", EntityId::new(), EntityId::new(), "user-1", "payments");
        assert_eq!(a.status, AuthorizationStatus::Created);
    }

    #[test]
    fn transition_from_created_succeeds() {
        let mut a = Authorization::new("org-1", EntityId::new(), EntityId::new(), "user-1", "payments");
        assert!(a.transition(AuthorizationStatus::Approved).is_ok());
        assert_eq!(a.status, AuthorizationStatus::Approved);
    }

    #[test]
    fn transition_out_of_terminal_status_is_a_conflict() {
        let mut a = Authorization::new("org-1", EntityId::new(), EntityId::new(), "user-1", "payments");
        a.transition(AuthorizationStatus::Rejected).unwrap();
        let err = a.transition(AuthorizationStatus::Approved).unwrap_err();
        assert!(err.is_conflict());
    }
}
