//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::query::{summarize, total, DailyTotal, TypeTotal};
use crate::domain::{
    AmountInput, AmountNormalizer, Expense, ExpenseQuery, ExpenseType, MonetaryAmount,
    OperationContext, SortField, SortOrder,
};
use crate::error::{AppError, AppResult};
use crate::handlers::{
    CreateExpenseCommand, CreateExpenseHandler, DeleteExpenseHandler, RevokeApiKeyHandler,
    UpdateExpenseCommand, UpdateExpenseHandler,
};

use super::middleware::AuthenticatedApiKey;
use super::AppState;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateExpenseRequest {
    pub description: String,
    pub value: AmountInput,
    #[serde(rename = "type")]
    pub expense_type: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateExpenseRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<AmountInput>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub expense_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExpenseResponse {
    pub id: Uuid,
    pub user_mail: String,
    pub description: String,
    pub value: Decimal,
    pub value_display: String,
    #[serde(rename = "type")]
    pub expense_type: ExpenseType,
    pub type_label: &'static str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_ip: String,
}

impl ExpenseResponse {
    fn new(expense: Expense, normalizer: &AmountNormalizer) -> Self {
        let amount = expense.value.amount();
        Self {
            id: expense.id,
            user_mail: expense.user_mail,
            description: expense.description,
            value: amount.to_decimal(),
            value_display: normalizer.format_amount(amount),
            expense_type: expense.expense_type,
            type_label: expense.expense_type.label(),
            created_at: expense.created_at,
            updated_at: expense.updated_at,
            user_ip: expense.user_ip,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListExpensesQuery {
    /// Expense type, or "all"
    #[serde(default, rename = "type")]
    pub expense_type: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sort: Option<SortField>,
    #[serde(default)]
    pub order: Option<SortOrder>,
}

impl ListExpensesQuery {
    fn into_query(self) -> AppResult<ExpenseQuery> {
        let expense_type = match self.expense_type.as_deref() {
            None | Some("all") | Some("") => None,
            Some(t) => Some(t.parse::<ExpenseType>()?),
        };
        Ok(ExpenseQuery {
            expense_type,
            date: self.date,
            from: self.from,
            to: self.to,
            sort: self.sort.unwrap_or_default(),
            order: self.order.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ExpenseListResponse {
    pub expenses: Vec<ExpenseResponse>,
    pub count: usize,
    pub total: Decimal,
    pub total_display: String,
}

#[derive(Debug, Serialize)]
pub struct TypeTotalResponse {
    #[serde(rename = "type")]
    pub expense_type: ExpenseType,
    pub label: &'static str,
    pub count: usize,
    pub total: Decimal,
    pub total_display: String,
}

#[derive(Debug, Serialize)]
pub struct DailyTotalResponse {
    pub date: NaiveDate,
    pub total: Decimal,
    pub total_display: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub count: usize,
    pub total: Decimal,
    pub total_display: String,
    pub by_type: Vec<TypeTotalResponse>,
    pub daily: Vec<DailyTotalResponse>,
}

fn money(amount: MonetaryAmount, normalizer: &AmountNormalizer) -> (Decimal, String) {
    (amount.to_decimal(), normalizer.format_amount(amount))
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/expenses", post(create_expense).get(list_expenses))
        .route("/expenses/summary", get(expense_summary))
        .route(
            "/expenses/:id",
            get(get_expense).patch(update_expense).delete(delete_expense),
        )
        .route("/keys/current", delete(revoke_current_key))
}

// =========================================================================
// POST /expenses
// =========================================================================

/// Record an expense for the key's owner
async fn create_expense(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Json(request): Json<CreateExpenseRequest>,
) -> AppResult<(StatusCode, Json<ExpenseResponse>)> {
    let handler = CreateExpenseHandler::new(state.expenses.clone(), state.normalizer);

    let command =
        CreateExpenseCommand::new(request.description, request.value, request.expense_type);
    let expense = handler.execute(command, &context).await?;

    Ok((
        StatusCode::CREATED,
        Json(ExpenseResponse::new(expense, &state.normalizer)),
    ))
}

// =========================================================================
// GET /expenses
// =========================================================================

/// List the owner's expenses with optional filters and ordering
async fn list_expenses(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Query(query): Query<ListExpensesQuery>,
) -> AppResult<Json<ExpenseListResponse>> {
    let user_mail = context.require_user()?;
    let query = query.into_query()?;

    let expenses = query.apply(state.expenses.list_by_user(user_mail).await?);
    let (total, total_display) = money(total(&expenses), &state.normalizer);

    Ok(Json(ExpenseListResponse {
        count: expenses.len(),
        total,
        total_display,
        expenses: expenses
            .into_iter()
            .map(|e| ExpenseResponse::new(e, &state.normalizer))
            .collect(),
    }))
}

// =========================================================================
// GET /expenses/summary
// =========================================================================

/// Totals overall, per type and per day
async fn expense_summary(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
) -> AppResult<Json<SummaryResponse>> {
    let user_mail = context.require_user()?;
    let expenses = state.expenses.list_by_user(user_mail).await?;
    let summary = summarize(&expenses);
    let normalizer = &state.normalizer;

    let (total, total_display) = money(summary.total, normalizer);
    let by_type = summary
        .by_type
        .into_iter()
        .map(|TypeTotal { expense_type, count, total }| {
            let (total, total_display) = money(total, normalizer);
            TypeTotalResponse {
                expense_type,
                label: expense_type.label(),
                count,
                total,
                total_display,
            }
        })
        .collect();
    let daily = summary
        .daily
        .into_iter()
        .map(|DailyTotal { date, total }| {
            let (total, total_display) = money(total, normalizer);
            DailyTotalResponse {
                date,
                total,
                total_display,
            }
        })
        .collect();

    Ok(Json(SummaryResponse {
        count: summary.count,
        total,
        total_display,
        by_type,
        daily,
    }))
}

// =========================================================================
// GET /expenses/:id
// =========================================================================

async fn get_expense(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ExpenseResponse>> {
    let user_mail = context.require_user()?;

    let expense = state
        .expenses
        .get(user_mail, id)
        .await?
        .ok_or(AppError::ExpenseNotFound(id))?;

    Ok(Json(ExpenseResponse::new(expense, &state.normalizer)))
}

// =========================================================================
// PATCH /expenses/:id
// =========================================================================

async fn update_expense(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateExpenseRequest>,
) -> AppResult<Json<ExpenseResponse>> {
    let handler = UpdateExpenseHandler::new(state.expenses.clone(), state.normalizer);

    let mut command = UpdateExpenseCommand::new();
    if let Some(description) = request.description {
        command = command.with_description(description);
    }
    if let Some(value) = request.value {
        command = command.with_value(value);
    }
    if let Some(expense_type) = request.expense_type {
        command = command.with_type(expense_type);
    }

    let expense = handler.execute(id, command, &context).await?;

    Ok(Json(ExpenseResponse::new(expense, &state.normalizer)))
}

// =========================================================================
// DELETE /expenses/:id
// =========================================================================

async fn delete_expense(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    DeleteExpenseHandler::new(state.expenses.clone())
        .execute(id, &context)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// =========================================================================
// DELETE /keys/current
// =========================================================================

/// Revoke the key used for this request
async fn revoke_current_key(
    State(state): State<AppState>,
    Extension(api_key): Extension<AuthenticatedApiKey>,
) -> AppResult<StatusCode> {
    RevokeApiKeyHandler::new(state.api_keys.clone())
        .execute(api_key.id)
        .await?;

    tracing::info!(key_prefix = %api_key.key_prefix, user_mail = %api_key.user_mail, "Key revoked by owner");

    Ok(StatusCode::NO_CONTENT)
}
