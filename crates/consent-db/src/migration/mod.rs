//! Database migration management

pub mod m20260101_000001_create_consent_schema;

use crate::error::{DatabaseError, Result};
use sea_orm::DatabaseConnection;
use sea_orm_migration::prelude::*;

/// Consent service database migrator
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(
            m20260101_000001_create_consent_schema::Migration,
        )]
    }
}

/// Run all pending migrations
pub async fn run_migrations(db: &DatabaseConnection) -> Result<()> {
    Migrator::up(db, None)
        .await
        .map_err(|e| DatabaseError::MigrationError(format!("Failed to run migrations: {}", e)))?;

    tracing::info!("Database migrations completed successfully");
    Ok(())
}

/// Rollback migrations
pub async fn rollback_migrations(db: &DatabaseConnection, steps: Option<u32>) -> Result<()> {
    Migrator::down(db, steps)
        .await
        .map_err(|e| DatabaseError::MigrationError(format!("Failed to rollback migrations: {}", e)))?;

    tracing::info!("Database migrations rolled back successfully");
    Ok(())
}

/// Fresh migration (drop all tables and re-run migrations)
pub async fn fresh_migrations(db: &DatabaseConnection) -> Result<()> {
    Migrator::fresh(db)
        .await
        .map_err(|e| DatabaseError::MigrationError(format!("Failed to run fresh migrations: {}", e)))?;

    tracing::info!("Fresh database migrations completed successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrator_registers_the_schema_migration() {
        let migrations = Migrator::migrations();
        assert_eq!(migrations.len(), 1);
    }
}
