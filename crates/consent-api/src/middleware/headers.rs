//! Org-id and client-id request header extractors.
//!
//! Every consent/purpose endpoint is scoped by the `org-id` header; the
//! consent-creation and validation endpoints also require a `client-id`
//! (the requesting TPP). These are [`actix_web::FromRequest`] extractors in
//! the same shape as actix's own `web::Path`/`web::Query`, so a handler
//! declares the requirement in its signature instead of parsing headers by
//! hand.

use std::future::{ready, Ready};

use actix_web::{FromRequest, HttpRequest};

use crate::middleware::error_handler::ApiError;

/// The `org-id` header value, required on every consent/purpose endpoint.
#[derive(Debug, Clone)]
pub struct OrgId(pub String);

impl std::fmt::Display for OrgId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromRequest for OrgId {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        ready(extract_header(req, "org-id").map(OrgId))
    }
}

/// The `client-id` header value identifying the requesting TPP/client.
///
/// Purpose endpoints also accept the `TPP-client-id` alias (§6); `client-id`
/// is tried first, `TPP-client-id` is the fallback.
#[derive(Debug, Clone)]
pub struct ClientId(pub String);

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromRequest for ClientId {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        ready(
            extract_header(req, "client-id")
                .or_else(|_| extract_header(req, "TPP-client-id"))
                .map(ClientId),
        )
    }
}

fn extract_header(req: &HttpRequest, name: &'static str) -> Result<String, ApiError> {
    req.headers()
        .get(name)
        .ok_or(ApiError::MissingHeader(name))?
        .to_str()
        .map_err(|_| ApiError::MissingHeader(name))
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn org_id_extracts_when_header_present() {
        let req = TestRequest::default()
            .insert_header(("org-id", "org-1"))
            .to_http_request();
        let mut payload = actix_web::dev::Payload::None;
        let org_id = OrgId::from_request(&req, &mut payload).await.unwrap();
        assert_eq!(org_id.0, "org-1");
    }

    #[actix_web::test]
    async fn org_id_rejects_when_header_missing() {
        let req = TestRequest::default().to_http_request();
        let mut payload = actix_web::dev::Payload::None;
        let err = OrgId::from_request(&req, &mut payload).await.unwrap_err();
        assert!(matches!(err, ApiError::MissingHeader("org-id")));
    }

    #[actix_web::test]
    async fn client_id_extracts_from_client_id_header() {
        let req = TestRequest::default()
            .insert_header(("client-id", "tpp-1"))
            .to_http_request();
        let mut payload = actix_web::dev::Payload::None;
        let client_id = ClientId::from_request(&req, &mut payload).await.unwrap();
        assert_eq!(client_id.0, "tpp-1");
    }

    #[actix_web::test]
    async fn client_id_falls_back_to_tpp_client_id_header() {
        let req = TestRequest::default()
            .insert_header(("TPP-client-id", "tpp-2"))
            .to_http_request();
        let mut payload = actix_web::dev::Payload::None;
        let client_id = ClientId::from_request(&req, &mut payload).await.unwrap();
        assert_eq!(client_id.0, "tpp-2");
    }

    #[actix_web::test]
    async fn client_id_rejects_when_both_headers_missing() {
        let req = TestRequest::default().to_http_request();
        let mut payload = actix_web::dev::Payload::None;
        let err = ClientId::from_request(&req, &mut payload).await.unwrap_err();
        assert!(matches!(err, ApiError::MissingHeader("TPP-client-id")));
    }
}
