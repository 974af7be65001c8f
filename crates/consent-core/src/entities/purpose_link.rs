//! The join between a consent and a purpose it was created for.
//!
//! `mandatory` and `approved` together enforce the activation invariant: a
//! consent cannot reach `ACTIVE` while any mandatory link is unapproved. See
//! [`crate::validation::validate_mandatory_link_approved`].

use serde::{Deserialize, Serialize};

use super::common::{EntityId, Timestamp};

/// One purpose a consent was created for, and whether that purpose is
/// required for the consent to activate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsentPurposeLink {
    pub id: EntityId,
    pub org_id: String,
    pub consent_id: EntityId,
    pub purpose_id: EntityId,
    pub mandatory: bool,
    pub approved: bool,
    pub created_time: Timestamp,
    pub updated_time: Timestamp,
}

impl ConsentPurposeLink {
    pub fn new(org_id: impl Into<String>, consent_id: EntityId, purpose_id: EntityId, mandatory: bool) -> Self {
        let now = Timestamp::now();
        Self {
            id: EntityId::new(),
            org_id: org_id.into(),
            consent_id,
            purpose_id,
            mandatory,
            approved: false,
            created_time: now,
            updated_time: now,
        }
    }

    /// Mark the link approved, validating the mandatory/approved contract.
    pub fn approve(&mut self) -> Result<(), crate::errors::CoreError> {
        self.approved = true;
        self.updated_time = Timestamp::now();
        crate::validation::validate_mandatory_link_approved(self.mandatory, self.approved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_link_starts_unapproved() {
        let link = ConsentPurposeLink::new("org-1", EntityId::new(), EntityId::new(), true);
        assert!(!link.approved);
    }

    #[test]
    fn approve_satisfies_the_mandatory_contract() {
        let mut link = ConsentPurposeLink::new("org-1", EntityId::new(), EntityId::new(), true);
        assert!(link.approve().is_ok());
        assert!(link.approved);
    }
}
