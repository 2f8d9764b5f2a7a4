//! In-memory Store
//!
//! Process-local storage for development and tests. Data is lost on restart.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{ApiKeyRecord, Expense, ExpenseChanges};

use super::{ApiKeyStore, ExpenseStore, StoreError};

/// Store holding everything behind `RwLock`s. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    expenses: Arc<RwLock<HashMap<Uuid, Expense>>>,
    api_keys: Arc<RwLock<HashMap<Uuid, ApiKeyRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored expenses across all users
    pub async fn expense_count(&self) -> usize {
        self.expenses.read().await.len()
    }
}

#[async_trait]
impl ExpenseStore for MemoryStore {
    async fn insert(&self, expense: Expense) -> Result<Expense, StoreError> {
        self.expenses
            .write()
            .await
            .insert(expense.id, expense.clone());
        Ok(expense)
    }

    async fn list_by_user(&self, user_mail: &str) -> Result<Vec<Expense>, StoreError> {
        let mut expenses: Vec<Expense> = self
            .expenses
            .read()
            .await
            .values()
            .filter(|e| e.user_mail == user_mail)
            .cloned()
            .collect();
        expenses.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(expenses)
    }

    async fn get(&self, user_mail: &str, id: Uuid) -> Result<Option<Expense>, StoreError> {
        Ok(self
            .expenses
            .read()
            .await
            .get(&id)
            .filter(|e| e.user_mail == user_mail)
            .cloned())
    }

    async fn update(
        &self,
        user_mail: &str,
        id: Uuid,
        changes: &ExpenseChanges,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Expense>, StoreError> {
        let mut expenses = self.expenses.write().await;
        let Some(expense) = expenses.get_mut(&id).filter(|e| e.user_mail == user_mail) else {
            return Ok(None);
        };
        changes.apply(expense, updated_at);
        Ok(Some(expense.clone()))
    }

    async fn delete(&self, user_mail: &str, id: Uuid) -> Result<bool, StoreError> {
        let mut expenses = self.expenses.write().await;
        if expenses.get(&id).is_some_and(|e| e.user_mail == user_mail) {
            expenses.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }
}

#[async_trait]
impl ApiKeyStore for MemoryStore {
    async fn find_active_by_hash(
        &self,
        key_hash: &str,
    ) -> Result<Option<ApiKeyRecord>, StoreError> {
        Ok(self
            .api_keys
            .read()
            .await
            .values()
            .find(|k| k.key_hash == key_hash && !k.revoked)
            .cloned())
    }

    async fn replace_for_user(
        &self,
        record: ApiKeyRecord,
    ) -> Result<(ApiKeyRecord, u64), StoreError> {
        let mut keys = self.api_keys.write().await;
        let mut revoked = 0;
        for key in keys.values_mut() {
            if key.user_mail == record.user_mail && !key.revoked {
                key.revoked = true;
                revoked += 1;
            }
        }
        keys.insert(record.id, record.clone());
        Ok((record, revoked))
    }

    async fn revoke(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut keys = self.api_keys.write().await;
        match keys.get_mut(&id) {
            Some(key) if !key.revoked => {
                key.revoked = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
