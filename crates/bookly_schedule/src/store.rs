//! Process-local [`AppointmentStore`], used by tests and demos.
//!
//! Creation takes the write lock before re-checking the slot, so two
//! concurrent submissions for the same interval cannot both succeed.

use crate::availability::validate_booking;
use bookly_common::models::{
    Appointment, AppointmentStatus, DateRange, NewAppointment, Service, StaffMember,
};
use bookly_common::services::{AppointmentStore, BoxFuture, StoreError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Default)]
struct Inner {
    staff: HashMap<String, Vec<StaffMember>>,
    services: HashMap<String, Vec<Service>>,
    /// Appointment id -> (business id, appointment).
    appointments: HashMap<String, (String, Appointment)>,
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryAppointmentStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_staff(&self, business_id: &str, staff: StaffMember) {
        let mut inner = self.inner.write().await;
        inner
            .staff
            .entry(business_id.to_string())
            .or_default()
            .push(staff);
    }

    pub async fn add_service(&self, business_id: &str, service: Service) {
        let mut inner = self.inner.write().await;
        inner
            .services
            .entry(business_id.to_string())
            .or_default()
            .push(service);
    }

    /// Inserts an appointment as-is, bypassing the slot check.
    pub async fn insert_appointment(&self, business_id: &str, appointment: Appointment) {
        let mut inner = self.inner.write().await;
        inner.appointments.insert(
            appointment.id.clone(),
            (business_id.to_string(), appointment),
        );
    }

    pub async fn appointment_count(&self) -> usize {
        self.inner.read().await.appointments.len()
    }
}

fn sorted(mut appointments: Vec<Appointment>) -> Vec<Appointment> {
    appointments.sort_by(|a, b| {
        (a.date, a.start_time, &a.employee_id).cmp(&(b.date, b.start_time, &b.employee_id))
    });
    appointments
}

impl AppointmentStore for InMemoryAppointmentStore {
    fn list_staff(&self, business_id: &str) -> BoxFuture<'_, Vec<StaffMember>, StoreError> {
        let business_id = business_id.to_string();
        Box::pin(async move {
            let inner = self.inner.read().await;
            Ok(inner.staff.get(&business_id).cloned().unwrap_or_default())
        })
    }

    fn list_services(&self, business_id: &str) -> BoxFuture<'_, Vec<Service>, StoreError> {
        let business_id = business_id.to_string();
        Box::pin(async move {
            let inner = self.inner.read().await;
            Ok(inner.services.get(&business_id).cloned().unwrap_or_default())
        })
    }

    fn list_appointments(
        &self,
        business_id: &str,
        employee_id: Option<&str>,
        range: DateRange,
    ) -> BoxFuture<'_, Vec<Appointment>, StoreError> {
        let business_id = business_id.to_string();
        let employee_id = employee_id.map(str::to_string);
        Box::pin(async move {
            let inner = self.inner.read().await;
            let found = inner
                .appointments
                .values()
                .filter(|(owner, a)| {
                    *owner == business_id
                        && range.contains(a.date)
                        && employee_id.as_ref().map_or(true, |id| a.employee_id == *id)
                })
                .map(|(_, a)| a.clone())
                .collect();
            Ok(sorted(found))
        })
    }

    fn create_appointment(
        &self,
        business_id: &str,
        appointment: NewAppointment,
    ) -> BoxFuture<'_, Appointment, StoreError> {
        let business_id = business_id.to_string();
        Box::pin(async move {
            if appointment.end_time <= appointment.start_time {
                return Err(StoreError::Validation(
                    "end time must be after start time".to_string(),
                ));
            }
            let mut inner = self.inner.write().await;

            let same_day: Vec<Appointment> = inner
                .appointments
                .values()
                .filter(|(owner, a)| {
                    *owner == business_id
                        && a.employee_id == appointment.employee_id
                        && a.date == appointment.date
                })
                .map(|(_, a)| a.clone())
                .collect();

            let duration = u32::try_from(appointment.duration_minutes())
                .map_err(|_| StoreError::Validation("invalid duration".to_string()))?;
            validate_booking(appointment.start_time, duration, &same_day)
                .map_err(|conflict| StoreError::Conflict(conflict.to_string()))?;

            let id = Uuid::new_v4().to_string();
            let client_id = appointment
                .client_id
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string());
            let created = appointment.into_appointment(id.clone(), client_id);
            inner
                .appointments
                .insert(id, (business_id.clone(), created.clone()));

            info!(
                "Created appointment {} for {} on {} at {}",
                created.id, created.employee_id, created.date, created.start_time
            );
            Ok(created)
        })
    }

    fn update_appointment_status(
        &self,
        appointment_id: &str,
        status: AppointmentStatus,
    ) -> BoxFuture<'_, Appointment, StoreError> {
        let appointment_id = appointment_id.to_string();
        Box::pin(async move {
            let mut inner = self.inner.write().await;
            let (_, current) = inner
                .appointments
                .get_mut(&appointment_id)
                .ok_or_else(|| StoreError::NotFound(format!("appointment {}", appointment_id)))?;
            let updated = current
                .with_status(status)
                .map_err(|e| StoreError::Validation(e.to_string()))?;
            *current = updated.clone();
            debug!("Appointment {} is now {}", appointment_id, status);
            Ok(updated)
        })
    }

    fn update_appointment_comment(
        &self,
        appointment_id: &str,
        comment: Option<String>,
    ) -> BoxFuture<'_, Appointment, StoreError> {
        let appointment_id = appointment_id.to_string();
        Box::pin(async move {
            let mut inner = self.inner.write().await;
            let (_, current) = inner
                .appointments
                .get_mut(&appointment_id)
                .ok_or_else(|| StoreError::NotFound(format!("appointment {}", appointment_id)))?;
            let updated = current.with_comment(comment);
            *current = updated.clone();
            Ok(updated)
        })
    }
}
