//! Collaborator abstractions.
//!
//! The scheduling core never talks to a database or a remote API directly. It
//! goes through the [`AppointmentStore`] trait, which lets the same booking
//! flow run against the SQL store in production and an in-memory store in
//! tests.

use crate::models::{Appointment, AppointmentStatus, DateRange, NewAppointment, Service, StaffMember};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Failures reported by an appointment store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The requested interval intersects an existing appointment.
    #[error("Slot no longer available: {0}")]
    Conflict(String),

    #[error("Invalid appointment: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The store could not be reached or failed internally.
    #[error("Store unavailable: {0}")]
    Transport(String),
}

/// A trait for appointment store operations.
///
/// Implementations must re-check the requested interval against the stored
/// appointments of the same employee and date before persisting a new one, so
/// a slot list that went stale in the client cannot produce a double booking.
pub trait AppointmentStore: Send + Sync {
    /// List the staff members of a business.
    fn list_staff(&self, business_id: &str) -> BoxFuture<'_, Vec<StaffMember>, StoreError>;

    /// List the services a business offers.
    fn list_services(&self, business_id: &str) -> BoxFuture<'_, Vec<Service>, StoreError>;

    /// List appointments in `range`, optionally restricted to one employee.
    fn list_appointments(
        &self,
        business_id: &str,
        employee_id: Option<&str>,
        range: DateRange,
    ) -> BoxFuture<'_, Vec<Appointment>, StoreError>;

    /// Persist a new appointment.
    fn create_appointment(
        &self,
        business_id: &str,
        appointment: NewAppointment,
    ) -> BoxFuture<'_, Appointment, StoreError>;

    /// Change the status of an appointment.
    fn update_appointment_status(
        &self,
        appointment_id: &str,
        status: AppointmentStatus,
    ) -> BoxFuture<'_, Appointment, StoreError>;

    /// Replace the comment of an appointment.
    fn update_appointment_comment(
        &self,
        appointment_id: &str,
        comment: Option<String>,
    ) -> BoxFuture<'_, Appointment, StoreError>;
}
