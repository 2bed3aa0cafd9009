//! Error types for the database layer

use bookly_common::services::StoreError;
use thiserror::Error;

/// Errors that can occur when working with the database
#[derive(Debug, Error)]
pub enum DbError {
    /// Error from SQLx
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    /// Error with the database configuration
    #[error("Database configuration error: {0}")]
    ConfigError(String),

    #[error("Database URL error: {0}")]
    UrlError(String),

    #[error("Database pool error: {0}")]
    PoolError(String),

    #[error("Database query error: {0}")]
    QueryError(String),

    #[error("Database transaction error: {0}")]
    TransactionError(String),

    /// A stored value could not be mapped back onto a domain type
    #[error("Corrupt row in {table}: {message}")]
    DecodeError { table: &'static str, message: String },
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        StoreError::Transport(err.to_string())
    }
}
