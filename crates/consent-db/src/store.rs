//! The transactional store: the one place the service layer touches
//! persistence. `run_in_transaction` is the single seam through which every
//! mutating unit of work passes, so a service never opens a nested
//! transaction and every multi-repository write is atomic.

use std::future::Future;
use std::pin::Pin;

use sea_orm::{DatabaseTransaction, TransactionTrait};

use crate::connection::DatabaseConnection;
use crate::error::{DatabaseError, Result};
use crate::repositories::{
    AuthorizationRepository, ConsentRepository, PurposeLinkRepository, PurposeRepository,
};

/// Handle passed into a unit of work: typed repository access scoped to the
/// current transaction.
pub struct Transaction<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> Transaction<'a> {
    pub fn purposes(&self) -> PurposeRepository<'a, DatabaseTransaction> {
        PurposeRepository::new(self.txn)
    }

    pub fn consents(&self) -> ConsentRepository<'a, DatabaseTransaction> {
        ConsentRepository::new(self.txn)
    }

    pub fn purpose_links(&self) -> PurposeLinkRepository<'a, DatabaseTransaction> {
        PurposeLinkRepository::new(self.txn)
    }

    pub fn authorizations(&self) -> AuthorizationRepository<'a, DatabaseTransaction> {
        AuthorizationRepository::new(self.txn)
    }
}

/// The service layer's entry point to persistence.
///
/// Read paths may go through the plain repositories directly against
/// `Store::connection()`; every write path goes through
/// [`Store::run_in_transaction`].
pub struct Store {
    connection: DatabaseConnection,
}

impl Store {
    pub fn new(connection: DatabaseConnection) -> Self {
        Self { connection }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }

    pub fn purposes(&self) -> PurposeRepository<'_, DatabaseConnection> {
        PurposeRepository::new(&self.connection)
    }

    pub fn consents(&self) -> ConsentRepository<'_, DatabaseConnection> {
        ConsentRepository::new(&self.connection)
    }

    pub fn purpose_links(&self) -> PurposeLinkRepository<'_, DatabaseConnection> {
        PurposeLinkRepository::new(&self.connection)
    }

    pub fn authorizations(&self) -> AuthorizationRepository<'_, DatabaseConnection> {
        AuthorizationRepository::new(&self.connection)
    }

    /// Run `unit` inside a single database transaction, committing on
    /// success and rolling back on any error returned by `unit` itself.
    ///
    /// `unit` never sees a nested transaction: the `Transaction` handle it
    /// receives only exposes repositories bound to the outer transaction.
    pub async fn run_in_transaction<F, R>(&self, unit: F) -> Result<R>
    where
        F: for<'c> FnOnce(Transaction<'c>) -> Pin<Box<dyn Future<Output = Result<R>> + Send + 'c>>
            + Send,
        R: Send,
    {
        let txn = self
            .connection
            .begin()
            .await
            .map_err(|e| DatabaseError::Transaction(e.to_string()))?;

        match unit(Transaction { txn: &txn }).await {
            Ok(result) => {
                txn.commit()
                    .await
                    .map_err(|e| DatabaseError::CommitFailed(e.to_string()))?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("failed to rollback transaction: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatabaseConfig, DatabaseUrl};
    use crate::connection::establish_connection;
    use crate::migration::run_migrations;
    use consent_core::entities::purpose::{Purpose, PurposeType};

    async fn memory_store() -> Store {
        let config = DatabaseConfig::new(DatabaseUrl::new("sqlite::memory:".to_string()).unwrap());
        let conn = establish_connection(&config).await.unwrap();
        run_migrations(&conn).await.unwrap();
        Store::new(conn)
    }

    #[tokio::test]
    async fn committed_unit_of_work_is_visible_after_commit() {
        let store = memory_store().await;
        let purpose = Purpose::new(
            "org-1",
            "marketing",
            None,
            PurposeType::String,
            Default::default(),
        );

        store
            .run_in_transaction(|txn| {
                let purpose = purpose.clone();
                Box::pin(async move { txn.purposes().create(&purpose).await })
            })
            .await
            .unwrap();

        let found = store
            .purposes()
            .find_by_org_and_name("org-1", "marketing")
            .await
            .unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn failed_unit_of_work_rolls_back() {
        let store = memory_store().await;
        let purpose = Purpose::new(
            "org-1",
            "marketing",
            None,
            PurposeType::String,
            Default::default(),
        );

        let result: Result<()> = store
            .run_in_transaction(|txn| {
                let purpose = purpose.clone();
                Box::pin(async move {
                    txn.purposes().create(&purpose).await?;
                    Err(DatabaseError::Internal("boom".to_string()))
                })
            })
            .await;
        assert!(result.is_err());

        let found = store
            .purposes()
            .find_by_org_and_name("org-1", "marketing")
            .await
            .unwrap();
        assert!(found.is_none());
    }
}
