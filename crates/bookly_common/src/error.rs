use crate::services::StoreError;
use std::fmt;
use thiserror::Error;

/// The base error type for all Bookly errors.
///
/// Each crate can extend this by implementing From<SpecificError> for BooklyError.
#[derive(Error, Debug)]
pub enum BooklyError {
    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error occurred during validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error occurred during database operation
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// The appointment store could not be reached
    #[error("Transport error: {0}")]
    TransportError(String),

    /// Error occurred due to a conflict (e.g., slot already booked)
    #[error("Conflict: {0}")]
    ConflictError(String),

    /// Error occurred due to a resource not being found
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// Error occurred due to an internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for BooklyError {
    fn status_code(&self) -> u16 {
        match self {
            BooklyError::ConfigError(_) => 500,
            BooklyError::ValidationError(_) => 400,
            BooklyError::DatabaseError(_) => 500,
            BooklyError::TransportError(_) => 502,
            BooklyError::ConflictError(_) => 409,
            BooklyError::NotFoundError(_) => 404,
            BooklyError::InternalError(_) => 500,
        }
    }
}

/// A trait for adding context to errors.
pub trait Context<T, E> {
    /// Adds context to an error.
    fn context<C>(self, context: C) -> Result<T, BooklyError>
    where
        C: fmt::Display + Send + Sync + 'static;

    /// Adds context to an error with a lazy context provider.
    fn with_context<C, F>(self, f: F) -> Result<T, BooklyError>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E: std::error::Error + Send + Sync + 'static> Context<T, E> for Result<T, E> {
    fn context<C>(self, context: C) -> Result<T, BooklyError>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|error| BooklyError::InternalError(format!("{}: {}", context, error)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T, BooklyError>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|error| BooklyError::InternalError(format!("{}: {}", f(), error)))
    }
}

impl From<StoreError> for BooklyError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => BooklyError::ConflictError(msg),
            StoreError::Validation(msg) => BooklyError::ValidationError(msg),
            StoreError::NotFound(msg) => BooklyError::NotFoundError(msg),
            StoreError::Transport(msg) => BooklyError::TransportError(msg),
        }
    }
}

// Utility functions for error handling
pub fn validation_error<T: fmt::Display>(message: T) -> BooklyError {
    BooklyError::ValidationError(message.to_string())
}

pub fn not_found<T: fmt::Display>(message: T) -> BooklyError {
    BooklyError::NotFoundError(message.to_string())
}

pub fn conflict<T: fmt::Display>(message: T) -> BooklyError {
    BooklyError::ConflictError(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_http_codes() {
        let cases = [
            (StoreError::Conflict("taken".into()), 409),
            (StoreError::Validation("bad".into()), 400),
            (StoreError::NotFound("a1".into()), 404),
            (StoreError::Transport("down".into()), 502),
        ];
        for (store_error, code) in cases {
            assert_eq!(BooklyError::from(store_error).status_code(), code);
        }
    }

    #[test]
    fn test_context_wraps_as_internal_error() {
        let result: Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
        let err = result.context("loading").unwrap_err();
        assert_eq!(err.to_string(), "Internal error: loading: boom");
    }
}
