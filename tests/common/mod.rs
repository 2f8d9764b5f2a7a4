//! Common test utilities

use std::sync::Arc;

use axum::Router;
use chrono::{DateTime, Utc};
use personal_finance::api::{build_router, AppState};
use personal_finance::domain::{ExpenseType, ExpenseValue, MonetaryAmount, NewExpense};
use personal_finance::handlers::{IssueApiKeyCommand, IssueApiKeyHandler, IssuedApiKey};
use personal_finance::repository::{ExpenseStore, MemoryStore};

pub const OWNER_EMAIL: &str = "owner@example.com";

pub struct TestApp {
    pub router: Router,
    pub store: MemoryStore,
    pub api_key: String,
}

/// Memory-backed app with one issued key for `OWNER_EMAIL`
pub async fn setup_test_app() -> TestApp {
    let store = MemoryStore::new();
    let issued = issue_key(&store, OWNER_EMAIL).await;

    TestApp {
        router: build_router(AppState::memory(store.clone())),
        store,
        api_key: issued.api_key,
    }
}

pub async fn issue_key(store: &MemoryStore, email: &str) -> IssuedApiKey {
    IssueApiKeyHandler::new(Arc::new(store.clone()))
        .execute(IssueApiKeyCommand::new(email))
        .await
        .expect("Failed to issue API key")
}

/// Store an expense for `OWNER_EMAIL` with a fixed creation time
pub async fn seed_expense(
    store: &MemoryStore,
    description: &str,
    cents: u64,
    expense_type: ExpenseType,
    created_at: &str,
) {
    let created_at: DateTime<Utc> = created_at.parse().expect("Invalid timestamp");
    let value = ExpenseValue::new(MonetaryAmount::from_cents(cents)).expect("Invalid value");
    let expense = NewExpense::new(description, value, expense_type)
        .expect("Invalid expense")
        .into_expense(OWNER_EMAIL, "api-request", created_at);
    store.insert(expense).await.expect("Failed to seed expense");
}
