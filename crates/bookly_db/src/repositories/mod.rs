//! Repository implementations for the Bookly tables.

pub mod appointment_sql;

pub use appointment_sql::SqlAppointmentStore;
