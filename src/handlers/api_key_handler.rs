//! API Key Handlers
//!
//! Issue and revoke API keys.

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::api_key::normalize_email;
use crate::domain::ApiKeyRecord;
use crate::error::AppError;
use crate::repository::ApiKeyStore;

use super::{IssueApiKeyCommand, IssuedApiKey};

/// Handler for key issuance
pub struct IssueApiKeyHandler {
    store: Arc<dyn ApiKeyStore>,
}

impl IssueApiKeyHandler {
    pub fn new(store: Arc<dyn ApiKeyStore>) -> Self {
        Self { store }
    }

    /// Revoke the user's active keys, then store and return a new one
    pub async fn execute(&self, command: IssueApiKeyCommand) -> Result<IssuedApiKey, AppError> {
        let user_mail = normalize_email(&command.email)?;

        let (api_key, record) = ApiKeyRecord::issue(&user_mail, Utc::now());
        let (record, revoked_previous) = self.store.replace_for_user(record).await?;

        tracing::info!(
            key_id = %record.id,
            key_prefix = %record.key_prefix,
            revoked_previous,
            "API key issued"
        );

        Ok(IssuedApiKey {
            key_id: record.id,
            user_mail,
            api_key,
            revoked_previous,
        })
    }
}

/// Handler for key revocation
pub struct RevokeApiKeyHandler {
    store: Arc<dyn ApiKeyStore>,
}

impl RevokeApiKeyHandler {
    pub fn new(store: Arc<dyn ApiKeyStore>) -> Self {
        Self { store }
    }

    pub async fn execute(&self, key_id: Uuid) -> Result<(), AppError> {
        if !self.store.revoke(key_id).await? {
            return Err(AppError::InvalidApiKey);
        }

        tracing::info!(key_id = %key_id, "API key revoked");
        Ok(())
    }
}
