//! Pure consent status derivation.
//!
//! The consent status is never stored as an independent field callers can
//! drift out of sync: it is derived, on every read, from the consent's
//! revocation flag, validity deadline, and the statuses of its linked
//! authorizations. [`derive_consent_status`] has no side effects and no I/O
//! so it can be unit tested exhaustively and reused identically by the
//! aggregate service and the validation engine.

use crate::entities::authorization::AuthorizationStatus;
use crate::entities::consent::ConsentStatus;
use crate::entities::common::Timestamp;

/// Derive the externally-visible status of a consent.
///
/// Order of precedence (first match wins):
/// 1. `revoked` is a terminal flag: a revoked consent is always `REVOKED`.
/// 2. A consent whose `validity_time` has passed is always `EXPIRED`,
///    regardless of its authorizations.
/// 3. A consent with no linked authorizations is `CREATED`.
/// 4. Any authorization `REJECTED` makes the whole consent `REJECTED`.
/// 5. All authorizations `APPROVED` makes the consent `ACTIVE`.
/// 6. Anything else (some still `CREATED`, or a mix without a rejection)
///    is `CREATED`.
pub fn derive_consent_status(
    revoked: bool,
    validity_time: &Timestamp,
    authorization_statuses: &[AuthorizationStatus],
) -> ConsentStatus {
    if revoked {
        return ConsentStatus::Revoked;
    }

    if validity_time.is_past() {
        return ConsentStatus::Expired;
    }

    if authorization_statuses.is_empty() {
        return ConsentStatus::Created;
    }

    if authorization_statuses
        .iter()
        .any(|s| *s == AuthorizationStatus::Rejected)
    {
        return ConsentStatus::Rejected;
    }

    if authorization_statuses
        .iter()
        .all(|s| *s == AuthorizationStatus::Approved)
    {
        return ConsentStatus::Active;
    }

    ConsentStatus::Created
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::time;

    fn future() -> Timestamp {
        Timestamp::from_epoch_millis(time::to_epoch_millis(&time::now()) + 3_600_000).unwrap()
    }

    fn past() -> Timestamp {
        Timestamp::from_epoch_millis(time::to_epoch_millis(&time::now()) - 3_600_000).unwrap()
    }

    #[test]
    fn revoked_wins_over_everything() {
        let status = derive_consent_status(true, &past(), &[AuthorizationStatus::Approved]);
        assert_eq!(status, ConsentStatus::Revoked);
    }

    #[test]
    fn expiry_wins_over_approved_authorizations() {
        let status = derive_consent_status(false, &past(), &[AuthorizationStatus::Approved]);
        assert_eq!(status, ConsentStatus::Expired);
    }

    #[test]
    fn no_authorizations_is_created() {
        let status = derive_consent_status(false, &future(), &[]);
        assert_eq!(status, ConsentStatus::Created);
    }

    #[test]
    fn any_rejection_makes_the_consent_rejected() {
        let status = derive_consent_status(
            false,
            &future(),
            &[AuthorizationStatus::Approved, AuthorizationStatus::Rejected],
        );
        assert_eq!(status, ConsentStatus::Rejected);
    }

    #[test]
    fn all_approved_is_active() {
        let status = derive_consent_status(
            false,
            &future(),
            &[AuthorizationStatus::Approved, AuthorizationStatus::Approved],
        );
        assert_eq!(status, ConsentStatus::Active);
    }

    #[test]
    fn partial_progress_stays_created() {
        let status = derive_consent_status(
            false,
            &future(),
            &[AuthorizationStatus::Approved, AuthorizationStatus::Created],
        );
        assert_eq!(status, ConsentStatus::Created);
    }

    #[test]
    fn sys_expired_authorization_without_rejection_stays_created() {
        let status = derive_consent_status(
            false,
            &future(),
            &[AuthorizationStatus::Approved, AuthorizationStatus::SysExpired],
        );
        assert_eq!(status, ConsentStatus::Created);
    }
}
