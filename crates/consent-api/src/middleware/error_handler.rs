use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpResponse, ResponseError,
};
use consent_core::errors::{CoreError, ErrorKind};
use consent_db::error::DatabaseError;
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
};
use tracing::error;

/// The wire error envelope: `{code, message, description, traceId}`.
///
/// `trace_id` is best-effort: `ResponseError::error_response` has no access
/// to the originating request, so correlation with a particular request
/// relies primarily on the `x-request-id` response header the
/// [`crate::middleware::request_id`] middleware always sets; this field is
/// populated when a caller constructs the envelope directly from a request.
#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub description: Option<String>,
    #[serde(rename = "traceId")]
    pub trace_id: Option<String>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            description: None,
            trace_id: None,
        }
    }

    pub fn with_trace_id(mut self, trace_id: Option<String>) -> Self {
        self.trace_id = trace_id;
        self
    }
}

/// Application-facing error. Wraps [`CoreError`]/[`DatabaseError`] and maps
/// each [`ErrorKind`] onto exactly one HTTP status and `CSE-NNNN` code, per
/// the service's error taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Core(CoreError),

    #[error("missing required header: {0}")]
    MissingHeader(&'static str),
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::Core(err)
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        let core: CoreError = match err {
            DatabaseError::NotFound(msg) => CoreError::not_found("resource", msg),
            DatabaseError::Conflict(msg) => CoreError::conflict(msg),
            DatabaseError::ValidationError(msg) => CoreError::bad_request(msg),
            other => CoreError::internal(other.to_string()),
        };
        ApiError::Core(core)
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::Core(errors.into())
    }
}

/// `(HTTP status, CSE code)` for each error kind, plus the one-off
/// distinctions the taxonomy makes within `bad-request`.
fn code_for(err: &ApiError) -> (actix_web::http::StatusCode, &'static str) {
    use actix_web::http::StatusCode;

    match err {
        ApiError::MissingHeader(_) => (StatusCode::BAD_REQUEST, "CSE-4001"),
        ApiError::Core(core) => match core.kind {
            ErrorKind::BadRequest => (StatusCode::BAD_REQUEST, "CSE-4000"),
            ErrorKind::Forbidden => (StatusCode::FORBIDDEN, "CSE-4003"),
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, "CSE-4004"),
            ErrorKind::Conflict => (StatusCode::CONFLICT, "CSE-4009"),
            ErrorKind::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "CSE-5000"),
        },
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        code_for(self).0
    }

    fn error_response(&self) -> HttpResponse {
        let (status, code) = code_for(self);

        let body = match self {
            ApiError::MissingHeader(name) => {
                ErrorResponse::new(code, format!("missing required header: {name}"))
            }
            ApiError::Core(core) => {
                let mut body = ErrorResponse::new(code, core.message.clone());
                body.description = core.description.clone();
                body
            }
        };

        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        HttpResponse::build(status).json(body)
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Logging-only middleware: records every error the inner service produces,
/// tagged with the request ID the [`crate::middleware::request_id`]
/// middleware attached. Error-to-response conversion itself happens through
/// [`ResponseError`], not here.
pub struct ErrorHandler;

impl<S, B> Transform<S, ServiceRequest> for ErrorHandler
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = ErrorHandlerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ErrorHandlerMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct ErrorHandlerMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for ErrorHandlerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        Box::pin(async move {
            let request_id = crate::middleware::request_id::get_request_id(&req);

            match service.call(req).await {
                Ok(res) => Ok(res),
                Err(err) => {
                    error!(request_id = ?request_id, error = %err, "request failed with a framework error");
                    Err(err)
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn not_found_maps_to_404_with_cse_4004() {
        let err = ApiError::from(CoreError::not_found("Purpose", "abc"));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(code_for(&err).1, "CSE-4004");
    }

    #[test]
    fn conflict_maps_to_409_with_cse_4009() {
        let err = ApiError::from(CoreError::conflict("already revoked"));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(code_for(&err).1, "CSE-4009");
    }

    #[test]
    fn missing_header_is_a_bad_request() {
        let err = ApiError::MissingHeader("org-id");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn database_not_found_round_trips_to_api_not_found() {
        let err: ApiError = DatabaseError::NotFound("no such row".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }
}
