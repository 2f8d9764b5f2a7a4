//! personal_finance Library
//!
//! Re-exports modules for integration testing and the binaries.

pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod repository;

pub use config::Config;
pub use domain::{AmountNormalizer, DomainError, MonetaryAmount, OperationContext};
pub use domain::{Expense, ExpenseType};
pub use error::{AppError, AppResult};
