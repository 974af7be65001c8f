//! Service layer: orchestrates the store's repositories inside
//! [`consent_db::Store::run_in_transaction`] units of work, applying domain
//! validation and status derivation on the way in and out.

pub mod consent_service;
pub mod purpose_service;
pub mod validation_service;

pub use consent_service::{ConsentListFilter, ConsentService, ConsentView, NewAuthorization, NewPurposeLink};
pub use purpose_service::{NewPurpose, PurposeService};
pub use validation_service::{ValidationRequest, ValidationService, ValidationVerdict};
