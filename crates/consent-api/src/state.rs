use consent_db::{DatabaseConfig, DatabaseUrl, Store};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The transactional store every service drives.
    pub store: Arc<Store>,
    /// Application configuration
    pub config: Arc<crate::config::ApiConfig>,
    /// Health check state
    pub health: Arc<RwLock<HealthState>>,
}

/// Health state tracking
#[derive(Debug, Clone)]
pub struct HealthState {
    pub database_healthy: bool,
    pub last_check: chrono::DateTime<chrono::Utc>,
    pub startup_time: chrono::DateTime<chrono::Utc>,
    pub version: String,
}

impl AppState {
    /// Create a new application state instance: establish the database
    /// connection, run migrations, and build the `Store` every service is
    /// handed.
    pub async fn new(config: crate::config::ApiConfig) -> Result<Self, AppStateError> {
        let database_url = DatabaseUrl::new(config.database.url.clone())
            .map_err(|e| AppStateError::Configuration(e.to_string()))?;
        let mut db_config = DatabaseConfig::new(database_url);
        db_config.max_connections = config.database.max_connections;
        db_config.min_connections = config.database.min_connections;

        let connection = consent_db::establish_connection(&db_config)
            .await
            .map_err(AppStateError::DatabaseConnection)?;
        consent_db::migration::run_migrations(&connection)
            .await
            .map_err(AppStateError::DatabaseConnection)?;

        crate::logging::events::database_connected(&config.database.url);

        let store = Store::new(connection);

        let health_state = HealthState {
            database_healthy: true,
            last_check: chrono::Utc::now(),
            startup_time: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        };

        Ok(Self {
            store: Arc::new(store),
            config: Arc::new(config),
            health: Arc::new(RwLock::new(health_state)),
        })
    }

    /// Check the health of all system components
    pub async fn health_check(&self) -> HealthCheckResult {
        let mut health = self.health.write().await;

        let db_healthy = self.check_database_health().await;
        health.database_healthy = db_healthy;
        health.last_check = chrono::Utc::now();

        let current_health = health.clone();
        drop(health);

        HealthCheckResult {
            healthy: db_healthy,
            checks: vec![
                HealthCheck {
                    name: "database".to_string(),
                    status: if db_healthy {
                        HealthStatus::Healthy
                    } else {
                        HealthStatus::Unhealthy
                    },
                    message: if db_healthy {
                        "Database connection is healthy".to_string()
                    } else {
                        "Database connection failed".to_string()
                    },
                    last_checked: current_health.last_check,
                },
            ],
            uptime: chrono::Utc::now()
                .signed_duration_since(current_health.startup_time)
                .num_seconds(),
            version: current_health.version,
        }
    }

    /// Check database health by executing a simple query
    async fn check_database_health(&self) -> bool {
        use sea_orm::{ConnectionTrait, Statement};

        let backend = self.store.connection().get_database_backend();
        match self
            .store
            .connection()
            .execute(Statement::from_string(backend, "SELECT 1".to_string()))
            .await
        {
            Ok(_) => true,
            Err(e) => {
                tracing::error!("Database health check failed: {}", e);
                false
            }
        }
    }

    /// Get the current application version
    pub fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    /// Get uptime in seconds
    pub async fn uptime(&self) -> i64 {
        let health = self.health.read().await;
        chrono::Utc::now()
            .signed_duration_since(health.startup_time)
            .num_seconds()
    }

    /// Get configuration
    pub fn config(&self) -> &crate::config::ApiConfig {
        &self.config
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppStateError {
    #[error("Failed to establish database connection: {0}")]
    DatabaseConnection(#[from] consent_db::error::DatabaseError),
    #[error("Configuration error: {0}")]
    Configuration(String),
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct HealthCheckResult {
    pub healthy: bool,
    pub checks: Vec<HealthCheck>,
    pub uptime: i64,
    pub version: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    pub message: String,
    pub last_checked: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub enum HealthStatus {
    #[serde(rename = "healthy")]
    Healthy,
    #[serde(rename = "unhealthy")]
    Unhealthy,
    #[serde(rename = "degraded")]
    Degraded,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            database_healthy: false,
            last_check: chrono::Utc::now(),
            startup_time: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_state_creation() {
        let health_state = HealthState::default();
        assert_eq!(health_state.version, env!("CARGO_PKG_VERSION"));
        assert!(!health_state.database_healthy);
    }

    #[test]
    fn test_app_state_error_display() {
        let error = AppStateError::Configuration("test error".to_string());
        assert!(error.to_string().contains("Configuration error: test error"));
    }

    #[test]
    fn test_health_status_serialization() {
        let status = HealthStatus::Healthy;
        let serialized = serde_json::to_string(&status).unwrap();
        assert_eq!(serialized, "\"healthy\"");

        let status = HealthStatus::Unhealthy;
        let serialized = serde_json::to_string(&status).unwrap();
        assert_eq!(serialized, "\"unhealthy\"");

        let status = HealthStatus::Degraded;
        let serialized = serde_json::to_string(&status).unwrap();
        assert_eq!(serialized, "\"degraded\"");
    }
}