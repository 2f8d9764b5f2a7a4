//! Command definitions
//!
//! Commands represent intentions to change the system state. They carry raw
//! input; handlers validate it.

use serde::{Deserialize, Serialize};

use crate::domain::AmountInput;

// =========================================================================
// CreateExpenseCommand
// =========================================================================

/// Command to record a new expense for the authenticated user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateExpenseCommand {
    pub description: String,
    /// Number of reais or display text (e.g. "R$ 25,50")
    pub value: AmountInput,
    pub expense_type: String,
}

impl CreateExpenseCommand {
    pub fn new(description: impl Into<String>, value: AmountInput, expense_type: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            value,
            expense_type: expense_type.into(),
        }
    }
}

// =========================================================================
// UpdateExpenseCommand
// =========================================================================

/// Command to change some fields of an existing expense
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateExpenseCommand {
    pub description: Option<String>,
    pub value: Option<AmountInput>,
    pub expense_type: Option<String>,
}

impl UpdateExpenseCommand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_value(mut self, value: AmountInput) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_type(mut self, expense_type: impl Into<String>) -> Self {
        self.expense_type = Some(expense_type.into());
        self
    }
}

// =========================================================================
// IssueApiKeyCommand
// =========================================================================

/// Command to issue a fresh API key, replacing the user's active ones
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueApiKeyCommand {
    pub email: String,
}

impl IssueApiKeyCommand {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }
}

/// Result of key issuance. `api_key` is the only copy of the plaintext key.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedApiKey {
    pub key_id: uuid::Uuid,
    pub user_mail: String,
    pub api_key: String,
    pub revoked_previous: u64,
}
