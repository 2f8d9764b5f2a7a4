//! Expense Handlers
//!
//! Create, update and delete expenses on behalf of the authenticated user.

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    AmountNormalizer, Expense, ExpenseChanges, ExpenseType, ExpenseValue, NewExpense,
    OperationContext,
};
use crate::error::AppError;
use crate::repository::ExpenseStore;

use super::{CreateExpenseCommand, UpdateExpenseCommand};

/// Handler for recording expenses
pub struct CreateExpenseHandler {
    store: Arc<dyn ExpenseStore>,
    normalizer: AmountNormalizer,
}

impl CreateExpenseHandler {
    pub fn new(store: Arc<dyn ExpenseStore>, normalizer: AmountNormalizer) -> Self {
        Self { store, normalizer }
    }

    /// Validate and persist the expense
    pub async fn execute(
        &self,
        command: CreateExpenseCommand,
        context: &OperationContext,
    ) -> Result<Expense, AppError> {
        let user_mail = context.require_user()?;

        let value = ExpenseValue::from_input(&command.value, &self.normalizer)?;
        let expense_type: ExpenseType = command.expense_type.parse()?;
        let new_expense = NewExpense::new(&command.description, value, expense_type)?;

        let expense = self
            .store
            .insert(new_expense.into_expense(user_mail, context.source(), Utc::now()))
            .await?;

        tracing::info!(
            expense_id = %expense.id,
            expense_type = %expense.expense_type,
            value = %expense.value.amount(),
            correlation_id = ?context.correlation_id,
            "Expense created"
        );

        Ok(expense)
    }
}

/// Handler for partial expense updates
pub struct UpdateExpenseHandler {
    store: Arc<dyn ExpenseStore>,
    normalizer: AmountNormalizer,
}

impl UpdateExpenseHandler {
    pub fn new(store: Arc<dyn ExpenseStore>, normalizer: AmountNormalizer) -> Self {
        Self { store, normalizer }
    }

    pub async fn execute(
        &self,
        id: Uuid,
        command: UpdateExpenseCommand,
        context: &OperationContext,
    ) -> Result<Expense, AppError> {
        let user_mail = context.require_user()?;
        let changes = self.validate(command)?;

        if changes.is_empty() {
            return Err(AppError::InvalidRequest("no fields to update".to_string()));
        }

        let expense = self
            .store
            .update(user_mail, id, &changes, Utc::now())
            .await?
            .ok_or(AppError::ExpenseNotFound(id))?;

        tracing::info!(
            expense_id = %id,
            correlation_id = ?context.correlation_id,
            "Expense updated"
        );

        Ok(expense)
    }

    fn validate(&self, command: UpdateExpenseCommand) -> Result<ExpenseChanges, AppError> {
        let description = command
            .description
            .as_deref()
            .map(crate::domain::expense::validate_description)
            .transpose()?;
        let value = command
            .value
            .as_ref()
            .map(|v| ExpenseValue::from_input(v, &self.normalizer))
            .transpose()?;
        let expense_type = command
            .expense_type
            .as_deref()
            .map(str::parse::<ExpenseType>)
            .transpose()?;

        Ok(ExpenseChanges {
            description,
            value,
            expense_type,
        })
    }
}

/// Handler for expense removal
pub struct DeleteExpenseHandler {
    store: Arc<dyn ExpenseStore>,
}

impl DeleteExpenseHandler {
    pub fn new(store: Arc<dyn ExpenseStore>) -> Self {
        Self { store }
    }

    pub async fn execute(&self, id: Uuid, context: &OperationContext) -> Result<(), AppError> {
        let user_mail = context.require_user()?;

        if !self.store.delete(user_mail, id).await? {
            return Err(AppError::ExpenseNotFound(id));
        }

        tracing::info!(
            expense_id = %id,
            correlation_id = ?context.correlation_id,
            "Expense deleted"
        );

        Ok(())
    }
}
