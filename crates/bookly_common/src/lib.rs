// Declare modules within this crate
pub mod error; // Error handling
pub mod http; // HTTP error responses
pub mod logging; // Logging utilities
pub mod models; // Data structures and models
pub mod routes; // Route definitions
pub mod services; // Collaborator abstractions

// Re-export the routes function to be used by the main backend service
pub use routes::routes;

// Re-export error types and utilities for easier access
pub use error::{
    conflict, not_found, validation_error, BooklyError, Context, HttpStatusCode,
};

pub use http::IntoHttpResponse;

// Re-export logging utilities for easier access
pub use logging::{init, init_with_level, log_result};

pub use services::{AppointmentStore, BoxFuture, StoreError};
