//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::DomainError;
use crate::repository::StoreError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Expense not found: {0}")]
    ExpenseNotFound(Uuid),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Server errors (5xx)
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AppError {
    /// HTTP status, stable error code and optional details for this error
    fn parts(&self) -> (StatusCode, &'static str, Option<String>) {
        match self {
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
            }
            AppError::InvalidApiKey => (StatusCode::UNAUTHORIZED, "invalid_api_key", None),
            AppError::ExpenseNotFound(id) => {
                (StatusCode::NOT_FOUND, "expense_not_found", Some(id.to_string()))
            }

            AppError::Domain(domain_err) => match domain_err {
                DomainError::InvalidAmount(msg) => {
                    (StatusCode::BAD_REQUEST, "invalid_amount", Some(msg.clone()))
                }
                DomainError::InvalidDescription(msg) => {
                    (StatusCode::BAD_REQUEST, "invalid_description", Some(msg.clone()))
                }
                DomainError::InvalidExpenseType(msg) => {
                    (StatusCode::BAD_REQUEST, "invalid_type", Some(msg.clone()))
                }
                DomainError::InvalidEmail(msg) => {
                    (StatusCode::BAD_REQUEST, "invalid_email", Some(msg.clone()))
                }
                DomainError::MalformedApiKey => {
                    (StatusCode::UNAUTHORIZED, "invalid_api_key", None)
                }
                DomainError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "unauthorized", Some(msg.clone()))
                }
            },

            AppError::Store(e) => {
                tracing::error!("Storage error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }        }
    }

    pub fn status(&self) -> StatusCode {
        self.parts().0
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = self.parts();

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
