use actix_web::{web, HttpResponse, Scope};
use tracing::info;

use crate::handlers::{
    consents::{create_consent, get_consent, list_consents, revoke_consent, update_consent},
    health::{detailed_health_check, health_check, liveness_check, readiness_check},
    purposes::{create_purposes, delete_purpose, get_purpose, list_purposes, update_purpose, validate_purpose_names},
    validate::validate_consent,
};

/// Configure all application routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Health check routes (no versioning, used by load balancers)
        .service(health_routes())
        // API routes with versioning
        .service(api_v1_routes())
        // Root route
        .route("/", web::get().to(root_handler));
}

/// Configure health check routes
fn health_routes() -> Scope {
    web::scope("/health")
        .route("", web::get().to(health_check))
        .route("/", web::get().to(health_check))
        .route("/detailed", web::get().to(detailed_health_check))
        .route("/ready", web::get().to(readiness_check))
        .route("/live", web::get().to(liveness_check))
}

/// Configure API v1 routes
fn api_v1_routes() -> Scope {
    web::scope("/api/v1")
        .service(configure_consent_routes())
        .service(configure_purpose_routes())
}

/// Consent lifecycle routes: create, get, list, update, revoke, validate.
fn configure_consent_routes() -> Scope {
    web::scope("/consents")
        .route("", web::post().to(create_consent))
        .route("", web::get().to(list_consents))
        .route("/validate", web::post().to(validate_consent))
        .route("/{id}", web::get().to(get_consent))
        .route("/{id}", web::put().to(update_consent))
        .route("/{id}/revoke", web::put().to(revoke_consent))
}

/// Purpose catalog routes: batch create, get, list, update, delete, validate.
fn configure_purpose_routes() -> Scope {
    web::scope("/consent-purposes")
        .route("", web::post().to(create_purposes))
        .route("", web::get().to(list_purposes))
        .route("/validate", web::post().to(validate_purpose_names))
        .route("/{id}", web::get().to(get_purpose))
        .route("/{id}", web::put().to(update_purpose))
        .route("/{id}", web::delete().to(delete_purpose))
}

/// Root handler - returns basic API information
async fn root_handler() -> HttpResponse {
    info!("Root endpoint accessed");

    let response = serde_json::json!({
        "service": "Consent Management API",
        "version": env!("CARGO_PKG_VERSION"),
        "api_version": "v1",
        "endpoints": {
            "health": "/health",
            "detailed_health": "/health/detailed",
            "readiness": "/health/ready",
            "liveness": "/health/live",
            "consents": "/api/v1/consents",
            "consent_validate": "/api/v1/consents/validate",
            "consent_purposes": "/api/v1/consent-purposes",
        },
        "timestamp": chrono::Utc::now()
    });

    HttpResponse::Ok().json(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn test_root_handler() {
        let app = test::init_service(App::new().route("/", web::get().to(root_handler))).await;

        let req = test::TestRequest::get().uri("/").to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_success());

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["service"], "Consent Management API");
        assert_eq!(body["api_version"], "v1");
    }
}
