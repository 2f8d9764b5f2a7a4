//! Domain module
//!
//! Core domain types and business logic.

pub mod api_key;
pub mod context;
pub mod error;
pub mod expense;
pub mod locale;
pub mod money;
pub mod query;

pub use api_key::ApiKeyRecord;
pub use context::OperationContext;
pub use error::DomainError;
pub use expense::{AmountInput, Expense, ExpenseChanges, ExpenseType, ExpenseValue, NewExpense};
pub use locale::{CurrencyLocale, LocaleFormatter};
pub use money::{AmountNormalizer, AmountParseError, MonetaryAmount};
pub use query::{ExpenseQuery, ExpenseSummary, SortField, SortOrder};
