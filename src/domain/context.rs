//! Operation Context
//!
//! Contains metadata about the current operation for ownership checks and tracing.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::DomainError;

/// Recorded as `user_ip` when the client address is unknown
pub const UNKNOWN_SOURCE: &str = "api-request";

/// Context for an operation, used for row scoping and tracing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperationContext {
    /// API key ID used for this request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_id: Option<Uuid>,

    /// Owner of the API key; every expense read or write is scoped to it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_mail: Option<String>,

    /// Correlation ID for request tracing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<Uuid>,

    /// Client IP address, as reported by the proxy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<String>,
}

impl OperationContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_key(mut self, api_key_id: Uuid) -> Self {
        self.api_key_id = Some(api_key_id);
        self
    }

    pub fn with_user_mail(mut self, user_mail: impl Into<String>) -> Self {
        self.user_mail = Some(user_mail.into());
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }

    pub fn with_client_ip(mut self, ip: impl Into<String>) -> Self {
        self.client_ip = Some(ip.into());
        self
    }

    /// The authenticated owner, or an error for anonymous contexts.
    pub fn require_user(&self) -> Result<&str, DomainError> {
        self.user_mail
            .as_deref()
            .ok_or_else(|| DomainError::Unauthorized("no authenticated user".to_string()))
    }

    /// Value stored in `user_ip` for records created in this context.
    pub fn source(&self) -> &str {
        self.client_ip.as_deref().unwrap_or(UNKNOWN_SOURCE)
    }
}
