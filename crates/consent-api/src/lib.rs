//! # Consent API
//!
//! REST API server for the consent management service. Built on Actix-web,
//! it exposes the consent lifecycle (create, get, list, revoke), the
//! validation engine, and the purpose catalog CRUD surface on top of
//! [`consent_db::Store`].
//!
//! ## Features
//!
//! - RESTful API endpoints with JSON serialization
//! - Health check endpoints for monitoring and load balancers
//! - Database integration with connection pooling
//! - Structured error handling and logging
//! - CORS support for frontend integration
//! - Request ID tracking for debugging
//! - Production-ready security headers
//!
//! ## Configuration
//!
//! The API server is configured through environment variables. See the
//! [`config`] module for available configuration options.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use consent_api::config::ApiConfig;
//! use consent_api::state::AppState;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ApiConfig::from_env()?;
//!     let app_state = AppState::new(config).await?;
//!
//!     // Server setup would go here
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod handlers;
pub mod logging;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use config::{ApiConfig, ConfigError};
pub use middleware::error_handler::{ApiError, ApiResult, ErrorResponse};
pub use state::{AppState, AppStateError, HealthCheckResult, HealthStatus};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const API_VERSION: &str = "v1";
pub const SERVICE_NAME: &str = "consent-api";

/// Prelude module for common imports
pub mod prelude {
    pub use crate::{
        config::{ApiConfig, ConfigError},
        handlers::*,
        middleware::error_handler::{ApiError, ApiResult},
        state::{AppState, AppStateError},
        API_VERSION, SERVICE_NAME, VERSION,
    };

    pub use actix_web::{
        middleware::{DefaultHeaders, Logger},
        web, App, HttpRequest, HttpResponse, HttpServer, Result as ActixResult,
    };

    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use serde_json;
    pub use tokio;
    pub use uuid::Uuid;
}
