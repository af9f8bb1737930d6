//! Application error type shared by the store, the allocator and the HTTP layer.
//!
//! Every variant maps to exactly one HTTP status in [`IntoResponse`], so handlers
//! can simply propagate errors with `?`.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// JSON body returned for every error response: `{"error": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed target URL, or an unacceptable custom code.
    #[error("{0}")]
    InvalidInput(String),

    /// The caller asked for a custom code that is already taken.
    #[error("Custom code already in use")]
    CodeConflict { code: String },

    /// The store rejected an insert because the code is present.
    ///
    /// Raised by the store itself; the allocator turns it into either a retry
    /// (generated codes) or [`AppError::CodeConflict`] (custom codes).
    #[error("Short code already exists")]
    DuplicateCode { code: String },

    #[error("Short URL not found")]
    NotFound { code: String },

    /// Candidate generation hit the retry cap without finding a free code.
    #[error("Could not allocate a unique short code after {attempts} attempts")]
    AllocationExhausted { attempts: usize },

    /// The durable flush after a mutation failed; the mutation was rolled back.
    #[error("Failed to persist the mapping store")]
    PersistenceFailure(#[source] std::io::Error),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn not_found(code: impl Into<String>) -> Self {
        Self::NotFound { code: code.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// HTTP status used when this error reaches a handler boundary.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_)
            | AppError::CodeConflict { .. }
            | AppError::DuplicateCode { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::AllocationExhausted { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::PersistenceFailure(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected JSON body: {}", rejection.body_text());
        AppError::invalid_input("URL is required")
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| "Invalid request".to_string());

        AppError::InvalidInput(message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = ?self, "Request failed");
        }

        let body = ErrorBody {
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_bad_request() {
        assert_eq!(
            AppError::invalid_input("URL is required").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::CodeConflict {
                code: "abc".to_string()
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::DuplicateCode {
                code: "abc".to_string()
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let err = AppError::not_found("missing");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Short URL not found");
    }

    #[test]
    fn test_server_side_errors() {
        assert_eq!(
            AppError::AllocationExhausted { attempts: 3 }.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );

        let io = std::io::Error::other("disk full");
        assert_eq!(
            AppError::PersistenceFailure(io).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_conflict_message_is_user_facing() {
        let err = AppError::CodeConflict {
            code: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "Custom code already in use");
    }
}
