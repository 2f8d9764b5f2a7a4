//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use thiserror::Error;

/// Validation and lookup failures raised by the expense domain.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Amount missing, unparseable, zero, negative or above the limit
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Description empty or too long
    #[error("Invalid description: {0}")]
    InvalidDescription(String),

    /// Type outside food, study, transport, fun, other
    #[error("Invalid expense type: {0}")]
    InvalidExpenseType(String),

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// API key is not 32 alphanumeric characters
    #[error("Malformed API key")]
    MalformedApiKey,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl DomainError {
    pub fn invalid_amount(reason: impl Into<String>) -> Self {
        Self::InvalidAmount(reason.into())
    }

    pub fn invalid_description(reason: impl Into<String>) -> Self {
        Self::InvalidDescription(reason.into())
    }
}
