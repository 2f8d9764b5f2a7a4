//! Repository module
//!
//! Data access for expenses and API keys. Every expense operation is keyed by
//! the owner's email, so one user can never see or touch another's rows.

mod error;
mod memory;
mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{ApiKeyRecord, Expense, ExpenseChanges};

pub use error::StoreError;
pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Create/read/update/delete access to expense records.
#[async_trait]
pub trait ExpenseStore: Send + Sync {
    async fn insert(&self, expense: Expense) -> Result<Expense, StoreError>;

    /// All expenses of `user_mail`, newest first
    async fn list_by_user(&self, user_mail: &str) -> Result<Vec<Expense>, StoreError>;

    async fn get(&self, user_mail: &str, id: Uuid) -> Result<Option<Expense>, StoreError>;

    /// Apply `changes`; `None` when the row does not exist for this user
    async fn update(
        &self,
        user_mail: &str,
        id: Uuid,
        changes: &ExpenseChanges,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Expense>, StoreError>;

    /// `false` when the row does not exist for this user
    async fn delete(&self, user_mail: &str, id: Uuid) -> Result<bool, StoreError>;
}

/// Storage of hashed API keys.
#[async_trait]
pub trait ApiKeyStore: Send + Sync {
    /// Non-revoked key with this hash
    async fn find_active_by_hash(&self, key_hash: &str)
        -> Result<Option<ApiKeyRecord>, StoreError>;

    /// `false` when the key does not exist or was already revoked
    async fn revoke(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Revoke every active key of `record.user_mail` and store `record`, as one
    /// atomic step. Returns the stored record and how many keys were revoked.
    async fn replace_for_user(
        &self,
        record: ApiKeyRecord,
    ) -> Result<(ApiKeyRecord, u64), StoreError>;
}
