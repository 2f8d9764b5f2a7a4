//! Postgres Store
//!
//! `expenses` and `api_keys` tables accessed through sqlx.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{ApiKeyRecord, Expense, ExpenseChanges, ExpenseType, ExpenseValue, MonetaryAmount};

use super::{ApiKeyStore, ExpenseStore, StoreError};

type ExpenseRow = (
    Uuid,
    String,
    String,
    Decimal,
    String,
    DateTime<Utc>,
    DateTime<Utc>,
    String,
);

type ApiKeyRow = (Uuid, String, String, String, DateTime<Utc>, bool);

const EXPENSE_COLUMNS: &str =
    "id, user_mail, description, value, type, created_at, updated_at, user_ip";

/// Store backed by a Postgres pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn expense_from_row(row: ExpenseRow) -> Result<Expense, StoreError> {
    let (id, user_mail, description, value, expense_type, created_at, updated_at, user_ip) = row;

    let amount = MonetaryAmount::from_decimal(value)
        .ok_or_else(|| StoreError::CorruptRow(format!("expense {id}: value {value}")))?;
    let value = ExpenseValue::new(amount)
        .map_err(|e| StoreError::CorruptRow(format!("expense {id}: {e}")))?;
    let expense_type: ExpenseType = expense_type
        .parse()
        .map_err(|e| StoreError::CorruptRow(format!("expense {id}: {e}")))?;

    Ok(Expense {
        id,
        user_mail,
        description,
        value,
        expense_type,
        created_at,
        updated_at,
        user_ip,
    })
}

fn api_key_from_row(row: ApiKeyRow) -> ApiKeyRecord {
    let (id, user_mail, key_hash, key_prefix, created_at, revoked) = row;
    ApiKeyRecord {
        id,
        user_mail,
        key_hash,
        key_prefix,
        created_at,
        revoked,
    }
}

#[async_trait]
impl ExpenseStore for PgStore {
    async fn insert(&self, expense: Expense) -> Result<Expense, StoreError> {
        let row: ExpenseRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO expenses (id, user_mail, description, value, type, created_at, updated_at, user_ip)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {EXPENSE_COLUMNS}
            "#
        ))
        .bind(expense.id)
        .bind(&expense.user_mail)
        .bind(&expense.description)
        .bind(expense.value.amount().to_decimal())
        .bind(expense.expense_type.as_str())
        .bind(expense.created_at)
        .bind(expense.updated_at)
        .bind(&expense.user_ip)
        .fetch_one(&self.pool)
        .await?;

        expense_from_row(row)
    }

    async fn list_by_user(&self, user_mail: &str) -> Result<Vec<Expense>, StoreError> {
        let rows: Vec<ExpenseRow> = sqlx::query_as(&format!(
            r#"
            SELECT {EXPENSE_COLUMNS}
            FROM expenses
            WHERE user_mail = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(user_mail)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(expense_from_row).collect()
    }

    async fn get(&self, user_mail: &str, id: Uuid) -> Result<Option<Expense>, StoreError> {
        let row: Option<ExpenseRow> = sqlx::query_as(&format!(
            r#"
            SELECT {EXPENSE_COLUMNS}
            FROM expenses
            WHERE id = $1 AND user_mail = $2
            "#
        ))
        .bind(id)
        .bind(user_mail)
        .fetch_optional(&self.pool)
        .await?;

        row.map(expense_from_row).transpose()
    }

    async fn update(
        &self,
        user_mail: &str,
        id: Uuid,
        changes: &ExpenseChanges,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Expense>, StoreError> {
        let row: Option<ExpenseRow> = sqlx::query_as(&format!(
            r#"
            UPDATE expenses
            SET description = COALESCE($3, description),
                value = COALESCE($4, value),
                type = COALESCE($5, type),
                updated_at = $6
            WHERE id = $1 AND user_mail = $2
            RETURNING {EXPENSE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_mail)
        .bind(changes.description.as_deref())
        .bind(changes.value.map(|v| v.amount().to_decimal()))
        .bind(changes.expense_type.map(|t| t.as_str()))
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await?;

        row.map(expense_from_row).transpose()
    }

    async fn delete(&self, user_mail: &str, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = $1 AND user_mail = $2")
            .bind(id)
            .bind(user_mail)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ApiKeyStore for PgStore {
    async fn find_active_by_hash(
        &self,
        key_hash: &str,
    ) -> Result<Option<ApiKeyRecord>, StoreError> {
        let row: Option<ApiKeyRow> = sqlx::query_as(
            r#"
            SELECT id, user_mail, key_hash, key_prefix, created_at, revoked
            FROM api_keys
            WHERE key_hash = $1 AND revoked = false
            "#,
        )
        .bind(key_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(api_key_from_row))
    }

    async fn replace_for_user(
        &self,
        record: ApiKeyRecord,
    ) -> Result<(ApiKeyRecord, u64), StoreError> {
        let mut tx = self.pool.begin().await?;

        // Serializes concurrent issuance for the same user until commit
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(&record.user_mail)
            .execute(&mut *tx)
            .await?;

        let revoked = sqlx::query(
            "UPDATE api_keys SET revoked = true WHERE user_mail = $1 AND revoked = false",
        )
        .bind(&record.user_mail)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let row: ApiKeyRow = sqlx::query_as(
            r#"
            INSERT INTO api_keys (id, user_mail, key_hash, key_prefix, created_at, revoked)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_mail, key_hash, key_prefix, created_at, revoked
            "#,
        )
        .bind(record.id)
        .bind(&record.user_mail)
        .bind(&record.key_hash)
        .bind(&record.key_prefix)
        .bind(record.created_at)
        .bind(record.revoked)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((api_key_from_row(row), revoked))
    }

    async fn revoke(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE api_keys SET revoked = true WHERE id = $1 AND revoked = false")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
