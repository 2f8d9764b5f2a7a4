//! Handler tests against the in-memory store

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{AmountInput, AmountNormalizer, DomainError, ExpenseType, OperationContext};
use crate::error::AppError;
use crate::handlers::{
    CreateExpenseCommand, CreateExpenseHandler, DeleteExpenseHandler, IssueApiKeyCommand,
    IssueApiKeyHandler, RevokeApiKeyHandler, UpdateExpenseCommand, UpdateExpenseHandler,
};
use crate::repository::{ApiKeyStore, ExpenseStore, MemoryStore};

fn context(user_mail: &str) -> OperationContext {
    OperationContext::new()
        .with_user_mail(user_mail)
        .with_correlation_id(Uuid::new_v4())
}

fn create_handler(store: &MemoryStore) -> CreateExpenseHandler {
    CreateExpenseHandler::new(Arc::new(store.clone()), AmountNormalizer::brl())
}

// =========================================================================
// CreateExpenseHandler
// =========================================================================

#[tokio::test]
async fn test_create_expense_from_display_string() {
    let store = MemoryStore::new();
    let handler = create_handler(&store);

    let expense = handler
        .execute(
            CreateExpenseCommand::new(
                "  Almoço ",
                AmountInput::Text("R$\u{a0}2,55".to_string()),
                "food",
            ),
            &context("ana@example.com"),
        )
        .await
        .unwrap();

    assert_eq!(expense.description, "Almoço");
    assert_eq!(expense.value.amount().cents(), 255);
    assert_eq!(expense.expense_type, ExpenseType::Food);
    assert_eq!(expense.user_ip, "api-request");
    assert_eq!(store.expense_count().await, 1);
}

#[tokio::test]
async fn test_create_expense_records_client_ip() {
    let store = MemoryStore::new();
    let context = context("ana@example.com").with_client_ip("198.51.100.4");

    let expense = create_handler(&store)
        .execute(
            CreateExpenseCommand::new("Bus", AmountInput::Number(4.5), "transport"),
            &context,
        )
        .await
        .unwrap();

    assert_eq!(expense.user_ip, "198.51.100.4");
}

#[tokio::test]
async fn test_create_expense_rejects_zero_amount() {
    let store = MemoryStore::new();

    let result = create_handler(&store)
        .execute(
            CreateExpenseCommand::new("Nothing", AmountInput::Text("R$ 0,00".into()), "other"),
            &context("ana@example.com"),
        )
        .await;

    assert!(matches!(
        result,
        Err(AppError::Domain(DomainError::InvalidAmount(_)))
    ));
    assert_eq!(store.expense_count().await, 0);
}

#[tokio::test]
async fn test_create_expense_rejects_unknown_type() {
    let store = MemoryStore::new();

    let result = create_handler(&store)
        .execute(
            CreateExpenseCommand::new("Rent", AmountInput::Number(1200.0), "housing"),
            &context("ana@example.com"),
        )
        .await;

    assert!(matches!(
        result,
        Err(AppError::Domain(DomainError::InvalidExpenseType(_)))
    ));
}

#[tokio::test]
async fn test_create_expense_requires_user() {
    let store = MemoryStore::new();

    let result = create_handler(&store)
        .execute(
            CreateExpenseCommand::new("Coffee", AmountInput::Number(5.0), "food"),
            &OperationContext::new(),
        )
        .await;

    assert!(matches!(
        result,
        Err(AppError::Domain(DomainError::Unauthorized(_)))
    ));
}

// =========================================================================
// UpdateExpenseHandler / DeleteExpenseHandler
// =========================================================================

#[tokio::test]
async fn test_update_expense_value_and_type() {
    let store = MemoryStore::new();
    let ana = context("ana@example.com");
    let created = create_handler(&store)
        .execute(
            CreateExpenseCommand::new("Cinema", AmountInput::Number(30.0), "fun"),
            &ana,
        )
        .await
        .unwrap();

    let handler = UpdateExpenseHandler::new(Arc::new(store.clone()), AmountNormalizer::brl());
    let updated = handler
        .execute(
            created.id,
            UpdateExpenseCommand::new()
                .with_value(AmountInput::Text("32,50".into()))
                .with_type("other"),
            &ana,
        )
        .await
        .unwrap();

    assert_eq!(updated.value.amount().cents(), 3_250);
    assert_eq!(updated.expense_type, ExpenseType::Other);
    assert_eq!(updated.description, "Cinema");
    assert!(updated.updated_at >= created.updated_at);
}

#[tokio::test]
async fn test_update_expense_rejects_empty_changes() {
    let store = MemoryStore::new();
    let handler = UpdateExpenseHandler::new(Arc::new(store), AmountNormalizer::brl());

    let result = handler
        .execute(
            Uuid::new_v4(),
            UpdateExpenseCommand::new(),
            &context("ana@example.com"),
        )
        .await;

    assert!(matches!(result, Err(AppError::InvalidRequest(_))));
}

#[tokio::test]
async fn test_update_other_users_expense_is_not_found() {
    let store = MemoryStore::new();
    let created = create_handler(&store)
        .execute(
            CreateExpenseCommand::new("Book", AmountInput::Number(89.9), "study"),
            &context("ana@example.com"),
        )
        .await
        .unwrap();

    let handler = UpdateExpenseHandler::new(Arc::new(store.clone()), AmountNormalizer::brl());
    let result = handler
        .execute(
            created.id,
            UpdateExpenseCommand::new().with_description("Mine now"),
            &context("bia@example.com"),
        )
        .await;

    assert!(matches!(result, Err(AppError::ExpenseNotFound(id)) if id == created.id));
    let unchanged = store
        .get("ana@example.com", created.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.description, "Book");
}

#[tokio::test]
async fn test_delete_expense() {
    let store = MemoryStore::new();
    let ana = context("ana@example.com");
    let created = create_handler(&store)
        .execute(
            CreateExpenseCommand::new("Snack", AmountInput::Number(7.25), "food"),
            &ana,
        )
        .await
        .unwrap();

    let handler = DeleteExpenseHandler::new(Arc::new(store.clone()));
    assert!(handler
        .execute(created.id, &context("bia@example.com"))
        .await
        .is_err());
    handler.execute(created.id, &ana).await.unwrap();
    assert!(matches!(
        handler.execute(created.id, &ana).await,
        Err(AppError::ExpenseNotFound(_))
    ));
}

// =========================================================================
// API keys
// =========================================================================

#[tokio::test]
async fn test_issue_api_key_replaces_previous() {
    let store = MemoryStore::new();
    let handler = IssueApiKeyHandler::new(Arc::new(store.clone()));

    let first = handler
        .execute(IssueApiKeyCommand::new("Ana@Example.com"))
        .await
        .unwrap();
    assert_eq!(first.user_mail, "ana@example.com");
    assert_eq!(first.revoked_previous, 0);

    let second = handler
        .execute(IssueApiKeyCommand::new("ana@example.com"))
        .await
        .unwrap();
    assert_eq!(second.revoked_previous, 1);

    let first_hash = crate::domain::api_key::hash_api_key(&first.api_key);
    let second_hash = crate::domain::api_key::hash_api_key(&second.api_key);
    assert!(store.find_active_by_hash(&first_hash).await.unwrap().is_none());
    assert!(store.find_active_by_hash(&second_hash).await.unwrap().is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_issuance_leaves_one_active_key() {
    let store = MemoryStore::new();
    let handler = Arc::new(IssueApiKeyHandler::new(Arc::new(store.clone())));

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let handler = handler.clone();
            tokio::spawn(async move {
                handler
                    .execute(IssueApiKeyCommand::new("ana@example.com"))
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut active = 0;
    let mut revoked_total = 0;
    for task in tasks {
        let issued = task.await.unwrap();
        revoked_total += issued.revoked_previous;
        let hash = crate::domain::api_key::hash_api_key(&issued.api_key);
        if store.find_active_by_hash(&hash).await.unwrap().is_some() {
            active += 1;
        }
    }

    assert_eq!(active, 1);
    assert_eq!(revoked_total, 7);
}

#[tokio::test]
async fn test_issue_api_key_rejects_bad_email() {
    let handler = IssueApiKeyHandler::new(Arc::new(MemoryStore::new()));
    let result = handler.execute(IssueApiKeyCommand::new("not-an-email")).await;
    assert!(matches!(
        result,
        Err(AppError::Domain(DomainError::InvalidEmail(_)))
    ));
}

#[tokio::test]
async fn test_revoke_api_key() {
    let store = MemoryStore::new();
    let issued = IssueApiKeyHandler::new(Arc::new(store.clone()))
        .execute(IssueApiKeyCommand::new("ana@example.com"))
        .await
        .unwrap();

    let handler = RevokeApiKeyHandler::new(Arc::new(store.clone()));
    handler.execute(issued.key_id).await.unwrap();
    assert!(matches!(
        handler.execute(issued.key_id).await,
        Err(AppError::InvalidApiKey)
    ));
}
