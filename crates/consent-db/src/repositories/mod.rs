//! Repository layer: typed, org-scoped data access over the entity models.
//!
//! Every repository is generic over [`sea_orm::ConnectionTrait`] so the same
//! code runs against a plain pooled connection or the [`sea_orm::DatabaseTransaction`]
//! handle [`crate::store::Store`] hands to a unit of work.

pub mod authorization;
pub mod consent;
pub mod purpose;
pub mod purpose_link;

pub use authorization::AuthorizationRepository;
pub use consent::ConsentRepository;
pub use purpose::PurposeRepository;
pub use purpose_link::PurposeLinkRepository;
