//! Repository Errors
//!
//! Error types for store operations.

/// Errors that can occur in a store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Row could not be mapped back to a domain value
    #[error("Corrupt row: {0}")]
    CorruptRow(String),
}
