//! Database integration for Bookly
//!
//! This crate provides [`DbClient`], a thin wrapper over an SQLx `Any` pool,
//! and [`SqlAppointmentStore`], the SQL implementation of
//! [`bookly_common::AppointmentStore`]. SQLite is the default backend.
//!
//! # Example
//!
//! ```rust,no_run
//! use bookly_config::AppConfig;
//! use bookly_db::{DbClient, SqlAppointmentStore};
//!
//! async fn setup_store(config: &AppConfig) -> Result<SqlAppointmentStore, bookly_db::DbError> {
//!     let client = DbClient::new(config).await?;
//!     let store = SqlAppointmentStore::new(client);
//!     store.init_schema().await?;
//!     Ok(store)
//! }
//! ```

pub mod client;
pub mod error;
pub mod repositories;

pub use client::DbClient;
pub use error::DbError;
pub use repositories::SqlAppointmentStore;
