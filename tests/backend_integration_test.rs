//! End-to-end integration tests across `consent_core`, `consent_db`, and the
//! service layer, run against an in-memory SQLite store.
//!
//! These exercise the cross-crate properties that unit tests within a
//! single crate cannot: status derivation as observed through persistence,
//! transactional atomicity, org isolation, and the revoke/validate
//! lifecycle end to end.

use consent_core::entities::authorization::{Authorization, AuthorizationStatus};
use consent_core::entities::common::{EntityId, Timestamp};
use consent_core::entities::consent::{Consent, ConsentStatus};
use consent_core::entities::purpose::{Purpose, PurposeType};
use consent_core::entities::purpose_link::ConsentPurposeLink;
use consent_core::status::derive_consent_status;
use consent_core::validation::validate_mandatory_link_approved;
use consent_db::config::{DatabaseConfig, DatabaseUrl};
use consent_db::connection::establish_connection;
use consent_db::error::DatabaseError;
use consent_db::migration::run_migrations;
use consent_db::Store;

async fn memory_store() -> Store {
    let config = DatabaseConfig::new(DatabaseUrl::new("sqlite::memory:".to_string()).unwrap());
    let conn = establish_connection(&config).await.unwrap();
    run_migrations(&conn).await.unwrap();
    Store::new(conn)
}

fn future_time() -> Timestamp {
    Timestamp::from_epoch_millis(Timestamp::now().to_epoch_millis() + 3_600_000).unwrap()
}

fn past_time() -> Timestamp {
    Timestamp::from_epoch_millis(Timestamp::now().to_epoch_millis() - 3_600_000).unwrap()
}

#[tokio::test]
async fn backend_modules_wire_up_against_an_in_memory_database() {
    let store = memory_store().await;
    assert_eq!(
        store
            .consents()
            .count("org-1", &consent_db::repositories::consent::ConsentFilter::default())
            .await
            .unwrap(),
        0
    );
}

/// A freshly created consent with no authorizations derives to CREATED,
/// and a second read sees the exact same status: the derivation is pure
/// and persistence never drifts it.
#[tokio::test]
async fn consent_status_is_stable_across_repeated_reads() {
    let store = memory_store().await;
    let consent = Consent::new("org-1", "client-1", "subject-1", "accounts", future_time());

    store
        .run_in_transaction(|txn| {
            let consent = consent.clone();
            Box::pin(async move { txn.consents().create(&consent).await })
        })
        .await
        .unwrap();

    for _ in 0..2 {
        let found = store
            .consents()
            .find_by_id("org-1", consent.id.as_uuid())
            .await
            .unwrap()
            .expect("consent should be persisted");
        let status = derive_consent_status(found.revoked, &found.validity_time, &[]);
        assert_eq!(status, ConsentStatus::Created);
    }
}

/// A consent whose validity deadline has already passed derives to EXPIRED
/// even though nothing ever wrote that status to a column.
#[tokio::test]
async fn expired_validity_time_derives_expired_without_a_stored_status_column() {
    let store = memory_store().await;
    let consent = Consent::new("org-1", "client-1", "subject-1", "accounts", past_time());

    store
        .run_in_transaction(|txn| {
            let consent = consent.clone();
            Box::pin(async move { txn.consents().create(&consent).await })
        })
        .await
        .unwrap();

    let found = store
        .consents()
        .find_by_id("org-1", consent.id.as_uuid())
        .await
        .unwrap()
        .unwrap();
    let status = derive_consent_status(found.revoked, &found.validity_time, &[AuthorizationStatus::Approved]);
    assert_eq!(status, ConsentStatus::Expired);
}

/// A revoked consent's derived status stays REVOKED regardless of its
/// authorizations: revocation is the highest-precedence terminal state.
#[tokio::test]
async fn revoked_consent_derives_revoked_even_with_approved_authorizations() {
    let store = memory_store().await;
    let mut consent = Consent::new("org-1", "client-1", "subject-1", "accounts", future_time());
    consent.revoke();

    store
        .run_in_transaction(|txn| {
            let consent = consent.clone();
            Box::pin(async move { txn.consents().create(&consent).await })
        })
        .await
        .unwrap();

    let found = store
        .consents()
        .find_by_id("org-1", consent.id.as_uuid())
        .await
        .unwrap()
        .unwrap();
    assert!(found.revoked);

    let status = derive_consent_status(found.revoked, &found.validity_time, &[AuthorizationStatus::Approved]);
    assert_eq!(status, ConsentStatus::Revoked);
}

/// A purpose name freed by deletion can be reused: the uniqueness
/// constraint is scoped to live rows, not a tombstone of every name ever
/// used.
#[tokio::test]
async fn purpose_name_is_reusable_after_deletion() {
    let store = memory_store().await;
    let purpose = Purpose::new("org-1", "marketing", None, PurposeType::String, Default::default());

    store
        .run_in_transaction(|txn| {
            let purpose = purpose.clone();
            Box::pin(async move { txn.purposes().create(&purpose).await })
        })
        .await
        .unwrap();

    store
        .run_in_transaction(|txn| Box::pin(async move { txn.purposes().delete("org-1", purpose.id.as_uuid()).await }))
        .await
        .unwrap();

    let recreated = Purpose::new("org-1", "marketing", None, PurposeType::String, Default::default());
    let result = store
        .run_in_transaction(|txn| {
            let recreated = recreated.clone();
            Box::pin(async move { txn.purposes().create(&recreated).await })
        })
        .await;
    assert!(result.is_ok());
}

/// A mandatory purpose link that isn't approved fails validation: the
/// invariant that every mandatory purpose must be approved before a
/// consent can progress.
#[test]
fn mandatory_purpose_link_must_be_approved() {
    assert!(validate_mandatory_link_approved(true, false).is_err());
    assert!(validate_mandatory_link_approved(true, true).is_ok());
    assert!(validate_mandatory_link_approved(false, false).is_ok());
}

/// Consents created under one org are invisible to a lookup scoped to a
/// different org, even though the row exists in the same table.
#[tokio::test]
async fn consents_are_isolated_by_org() {
    let store = memory_store().await;
    let consent = Consent::new("org-1", "client-1", "subject-1", "accounts", future_time());

    store
        .run_in_transaction(|txn| {
            let consent = consent.clone();
            Box::pin(async move { txn.consents().create(&consent).await })
        })
        .await
        .unwrap();

    let seen_by_owner = store.consents().find_by_id("org-1", consent.id.as_uuid()).await.unwrap();
    let seen_by_other = store.consents().find_by_id("org-2", consent.id.as_uuid()).await.unwrap();

    assert!(seen_by_owner.is_some());
    assert!(seen_by_other.is_none());
}

/// When a unit of work fails partway through, nothing it wrote is visible
/// afterward: the transaction boundary is the whole multi-repository
/// write, not each individual repository call.
#[tokio::test]
async fn a_failing_unit_of_work_leaves_no_partial_write_behind() {
    let store = memory_store().await;
    let consent = Consent::new("org-1", "client-1", "subject-1", "accounts", future_time());
    let purpose_link = ConsentPurposeLink::new("org-1", consent.id, EntityId::new(), true);

    let result: consent_db::Result<()> = store
        .run_in_transaction(|txn| {
            let consent = consent.clone();
            let purpose_link = purpose_link.clone();
            Box::pin(async move {
                txn.consents().create(&consent).await?;
                txn.purpose_links().create(&purpose_link).await?;
                Err(DatabaseError::Internal("simulated failure after partial write".to_string()))
            })
        })
        .await;
    assert!(result.is_err());

    let found = store.consents().find_by_id("org-1", consent.id.as_uuid()).await.unwrap();
    assert!(found.is_none(), "consent row must not survive a rolled-back transaction");
}

/// The validate round trip: a consent with every authorization approved
/// derives ACTIVE and carries its own org's client id.
#[tokio::test]
async fn validate_round_trip_reflects_authorization_state() {
    let store = memory_store().await;
    let consent = Consent::new("org-1", "client-1", "subject-1", "accounts", future_time());
    let mut authorization = Authorization::new("org-1", consent.id, EntityId::new(), "user-1", "payments");
    authorization.status = AuthorizationStatus::Approved;

    store
        .run_in_transaction(|txn| {
            let consent = consent.clone();
            let authorization = authorization.clone();
            Box::pin(async move {
                txn.consents().create(&consent).await?;
                txn.authorizations().create(&authorization).await?;
                Ok(())
            })
        })
        .await
        .unwrap();

    let authorizations = store.authorizations().list_for_consent(consent.id.as_uuid()).await.unwrap();
    let status = derive_consent_status(
        consent.revoked,
        &consent.validity_time,
        &authorizations.iter().map(|a| a.status).collect::<Vec<_>>(),
    );
    assert_eq!(status, ConsentStatus::Active);
    assert_eq!(consent.client_id, "client-1");
}

/// List filters are AND-combined: a `consentTypes`/`clientIds` filter that
/// matches one of two consents returns only that one.
#[tokio::test]
async fn listing_consents_filters_by_type_and_client_id() {
    use consent_db::repositories::consent::ConsentFilter;

    let store = memory_store().await;
    let accounts = Consent::new("org-1", "client-1", "subject-1", "accounts", future_time());
    let payments = Consent::new("org-1", "client-2", "subject-1", "payments", future_time());

    for consent in [&accounts, &payments] {
        let consent = consent.clone();
        store
            .run_in_transaction(|txn| Box::pin(async move { txn.consents().create(&consent).await }))
            .await
            .unwrap();
    }

    let filter = ConsentFilter {
        consent_types: vec!["accounts".to_string()],
        ..Default::default()
    };
    let found = store.consents().list("org-1", &filter, 10, 0).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, accounts.id);

    let filter = ConsentFilter {
        client_ids: vec!["client-2".to_string()],
        ..Default::default()
    };
    let found = store.consents().list("org-1", &filter, 10, 0).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, payments.id);
}

/// Full-replacement update semantics: deleting then recreating a consent's
/// authorizations leaves only the new set, the mechanism the update
/// operation's `authorizations` section relies on (§4.3.1).
#[tokio::test]
async fn replacing_a_consents_authorizations_leaves_only_the_new_set() {
    let store = memory_store().await;
    let consent = Consent::new("org-1", "client-1", "subject-1", "accounts", future_time());
    let original = Authorization::new("org-1", consent.id, EntityId::new(), "user-1", "payments");

    store
        .run_in_transaction(|txn| {
            let consent = consent.clone();
            let original = original.clone();
            Box::pin(async move {
                txn.consents().create(&consent).await?;
                txn.authorizations().create(&original).await?;
                Ok(())
            })
        })
        .await
        .unwrap();

    let replacement = Authorization::new("org-1", consent.id, EntityId::new(), "user-2", "accounts");
    store
        .run_in_transaction(|txn| {
            let consent_id = consent.id.as_uuid();
            let replacement = replacement.clone();
            Box::pin(async move {
                txn.authorizations().delete_for_consent(consent_id).await?;
                txn.authorizations().create(&replacement).await?;
                Ok(())
            })
        })
        .await
        .unwrap();

    let authorizations = store.authorizations().list_for_consent(consent.id.as_uuid()).await.unwrap();
    assert_eq!(authorizations.len(), 1);
    assert_eq!(authorizations[0].user_id, "user-2");
}
