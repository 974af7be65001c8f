//! Error types and error handling utilities
//!
//! [`CoreError`] is the single tagged error type services raise. It carries
//! enough structure (`kind`, `message`, `description`, `field`) for the API
//! surface to map it onto the wire error envelope without re-deriving intent
//! from a string.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Core result type used throughout the domain and store layers.
pub type CoreResult<T> = Result<T, CoreError>;

/// The taxonomy of error kinds from the system's error handling design.
///
/// Each kind maps onto exactly one HTTP status and structured code prefix
/// at the API surface (`bad-request` -> 400/CSE-4000, etc.).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    BadRequest,
    NotFound,
    Conflict,
    Forbidden,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::BadRequest => "bad-request",
            ErrorKind::NotFound => "not-found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::Internal => "internal",
        };
        write!(f, "{s}")
    }
}

/// Core error type for the consent domain and store layers.
#[derive(Debug, Error, Clone)]
#[error("{kind}: {message}")]
pub struct CoreError {
    pub kind: ErrorKind,
    pub message: String,
    pub description: Option<String>,
    /// The offending field, when the error is attributable to one input field.
    pub field: Option<String>,
}

impl CoreError {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            description: None,
            field: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        let entity_type = entity_type.into();
        let id = id.into();
        Self {
            kind: ErrorKind::NotFound,
            message: format!("{entity_type} not found"),
            description: Some(format!("no {entity_type} with id {id}")),
            field: None,
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }

    pub fn is_conflict(&self) -> bool {
        self.kind == ErrorKind::Conflict
    }
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(err: validator::ValidationErrors) -> Self {
        CoreError::bad_request(err.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::internal(format!("serialization error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_request_carries_field() {
        let err = CoreError::bad_request("name is required").with_field("name");
        assert_eq!(err.kind, ErrorKind::BadRequest);
        assert_eq!(err.field.as_deref(), Some("name"));
    }

    #[test]
    fn not_found_describes_entity_and_id() {
        let err = CoreError::not_found("Purpose", "abc-123");
        assert!(err.is_not_found());
        assert!(err.description.unwrap().contains("abc-123"));
    }

    #[test]
    fn conflict_kind_round_trips_display() {
        let err = CoreError::conflict("already revoked");
        assert_eq!(err.kind.to_string(), "conflict");
    }
}
