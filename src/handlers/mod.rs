//! Command Handlers module
//!
//! Handlers validate command input against the domain rules and apply the
//! result through the stores.

mod api_key_handler;
mod commands;
mod expense_handler;

#[cfg(test)]
mod tests;

pub use api_key_handler::{IssueApiKeyHandler, RevokeApiKeyHandler};
pub use commands::*;
pub use expense_handler::{CreateExpenseHandler, DeleteExpenseHandler, UpdateExpenseHandler};
