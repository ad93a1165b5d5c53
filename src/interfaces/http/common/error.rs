//! Mapping of domain failures onto HTTP responses
//!
//! Every failure is answered with a JSON body `{"error": "..."}` and the
//! status matching its kind.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use utoipa::ToSchema;

use crate::domain::{DomainError, PersistenceError};

/// Error response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Unauthenticated(message) => Self::unauthenticated(message),
            DomainError::Validation(message) => Self::bad_request(message),
            DomainError::NotFound { .. } => Self::not_found(e.to_string()),
            DomainError::Persistence(ref failure) => {
                let status = match failure {
                    PersistenceError::ForeignKey(_) => StatusCode::UNPROCESSABLE_ENTITY,
                    PersistenceError::Unique(_) => StatusCode::CONFLICT,
                    PersistenceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                if e.is_storage_failure() {
                    error!("Storage failure: {}", e);
                    Self::new(status, "Internal server error")
                } else {
                    debug!("Persistence constraint rejected request: {}", e);
                    Self::new(status, e.to_string())
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(e: DomainError) -> StatusCode {
        ApiError::from(e).status
    }

    #[test]
    fn domain_errors_map_to_statuses() {
        assert_eq!(
            status_of(DomainError::Unauthenticated("x".into())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(DomainError::Validation("user_id is missing".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(DomainError::not_found("ApiKey", "id", 3)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(PersistenceError::ForeignKey("fk".into()).into()),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(PersistenceError::Unique("uq".into()).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(PersistenceError::Storage("io".into()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn storage_details_are_not_leaked() {
        let err = ApiError::from(DomainError::from(PersistenceError::Storage(
            "disk I/O error at /var/db".into(),
        )));
        assert_eq!(err.message, "Internal server error");
    }

    #[test]
    fn not_found_keeps_persistence_message() {
        let err = ApiError::from(DomainError::not_found("ApiKey", "id", 12));
        assert_eq!(err.message, "Not found: ApiKey with id=12");
    }
}
