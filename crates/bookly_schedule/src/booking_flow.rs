//! The client-facing booking form as a linear state machine.
//!
//! ```text
//! Service -> Staff -> Date -> Time -> Details -> Confirmation
//! ```
//!
//! The flow owns the selections but never talks to a store on its own: the
//! slot list is fed in through [`BookingFlow::refresh_slots`] and submission
//! is split into [`BookingFlow::begin_submission`] (builds the payload) and
//! [`BookingFlow::complete_submission`] (applies the store's answer). The
//! async [`BookingFlow::submit`] and [`BookingFlow::reload_slots`] helpers run
//! those halves against an [`AppointmentStore`].

use crate::availability::available_slots;
use crate::time_grid::TimeGrid;
use bookly_common::models::{
    Appointment, BookingLinkContext, ClientDetails, DateRange, NewAppointment, Service, StaffMember,
};
use bookly_common::services::{AppointmentStore, StoreError};
use chrono::{Duration, NaiveDate, NaiveTime};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStep {
    Service,
    Staff,
    Date,
    Time,
    Details,
    Confirmation,
}

impl BookingStep {
    pub fn next(self) -> Option<Self> {
        match self {
            BookingStep::Service => Some(BookingStep::Staff),
            BookingStep::Staff => Some(BookingStep::Date),
            BookingStep::Date => Some(BookingStep::Time),
            BookingStep::Time => Some(BookingStep::Details),
            BookingStep::Details => Some(BookingStep::Confirmation),
            BookingStep::Confirmation => None,
        }
    }

    pub fn previous(self) -> Option<Self> {
        match self {
            BookingStep::Service | BookingStep::Confirmation => None,
            BookingStep::Staff => Some(BookingStep::Service),
            BookingStep::Date => Some(BookingStep::Staff),
            BookingStep::Time => Some(BookingStep::Date),
            BookingStep::Details => Some(BookingStep::Time),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    /// A step guard failed. Reported inline, the step does not change.
    #[error("{message}")]
    Validation { step: BookingStep, message: String },

    /// The chosen slot was booked by someone else in the meantime.
    #[error("Slot no longer available: {0}")]
    Conflict(String),

    #[error("Booking could not be submitted: {0}")]
    Transport(String),

    #[error("A submission is already in progress")]
    SubmissionInFlight,

    /// The details step moves forward through submission, not `advance`.
    #[error("Details are submitted, not advanced")]
    SubmitRequired,

    #[error("Not available at step {0:?}")]
    WrongStep(BookingStep),
}

impl BookingError {
    fn validation(step: BookingStep, message: impl Into<String>) -> Self {
        BookingError::Validation {
            step,
            message: message.into(),
        }
    }
}

/// State of one client's pass through the booking form.
#[derive(Debug, Clone)]
pub struct BookingFlow {
    context: BookingLinkContext,
    grid: TimeGrid,
    today: NaiveDate,
    step: BookingStep,
    service: Option<Service>,
    staff: Option<StaffMember>,
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
    slots: Vec<NaiveTime>,
    slots_stale: bool,
    details: ClientDetails,
    submission_in_flight: bool,
    confirmation: Option<Appointment>,
}

impl BookingFlow {
    /// Starts a flow at [`BookingStep::Service`]. `today` is the earliest
    /// bookable date.
    ///
    /// Employee links pre-select their staff member.
    pub fn new(context: BookingLinkContext, grid: TimeGrid, today: NaiveDate) -> Self {
        let staff = context.pinned_staff().cloned();
        Self {
            context,
            grid,
            today,
            step: BookingStep::Service,
            service: None,
            staff,
            date: None,
            time: None,
            slots: Vec::new(),
            slots_stale: true,
            details: ClientDetails::default(),
            submission_in_flight: false,
            confirmation: None,
        }
    }

    pub fn step(&self) -> BookingStep {
        self.step
    }

    pub fn context(&self) -> &BookingLinkContext {
        &self.context
    }

    pub fn service(&self) -> Option<&Service> {
        self.service.as_ref()
    }

    pub fn staff(&self) -> Option<&StaffMember> {
        self.staff.as_ref()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn time(&self) -> Option<NaiveTime> {
        self.time
    }

    pub fn slots(&self) -> &[NaiveTime] {
        &self.slots
    }

    pub fn slots_are_stale(&self) -> bool {
        self.slots_stale
    }

    pub fn details(&self) -> &ClientDetails {
        &self.details
    }

    pub fn is_submitting(&self) -> bool {
        self.submission_in_flight
    }

    pub fn confirmation(&self) -> Option<&Appointment> {
        self.confirmation.as_ref()
    }

    /// True when an employee link fixed the staff member.
    pub fn staff_is_pinned(&self) -> bool {
        self.context.pinned_staff().is_some()
    }

    fn require_step(&self, step: BookingStep) -> Result<(), BookingError> {
        if self.step != step {
            return Err(BookingError::WrongStep(self.step));
        }
        if self.submission_in_flight {
            return Err(BookingError::SubmissionInFlight);
        }
        Ok(())
    }

    /// Drops the chosen time and the slot list; both depend on the service,
    /// the staff member and the date.
    fn invalidate_slots(&mut self) {
        self.time = None;
        self.slots.clear();
        self.slots_stale = true;
    }

    pub fn select_service(&mut self, service: Service) -> Result<(), BookingError> {
        self.require_step(BookingStep::Service)?;
        if service.duration_minutes == 0 {
            return Err(BookingError::validation(
                BookingStep::Service,
                format!("Service {} has no duration", service.name),
            ));
        }
        if let Some(pinned) = self.context.pinned_staff() {
            if !pinned.can_perform(&service.id) {
                return Err(BookingError::validation(
                    BookingStep::Service,
                    format!("{} does not offer {}", pinned.name, service.name),
                ));
            }
        }
        if let Some(staff) = &self.staff {
            if !staff.can_perform(&service.id) {
                debug!("Clearing staff {} who does not offer {}", staff.id, service.id);
                self.staff = None;
            }
        }
        if self.service.as_ref().map(|s| &s.id) != Some(&service.id) {
            self.invalidate_slots();
        }
        self.service = Some(service);
        Ok(())
    }

    pub fn select_staff(&mut self, staff: StaffMember) -> Result<(), BookingError> {
        self.require_step(BookingStep::Staff)?;
        if let Some(pinned) = self.context.pinned_staff() {
            if pinned.id != staff.id {
                return Err(BookingError::validation(
                    BookingStep::Staff,
                    format!("This booking link is for {}", pinned.name),
                ));
            }
        }
        let service = self.service.as_ref().ok_or(BookingError::WrongStep(self.step))?;
        if !staff.can_perform(&service.id) {
            return Err(BookingError::validation(
                BookingStep::Staff,
                format!("{} does not offer {}", staff.name, service.name),
            ));
        }
        if self.staff.as_ref().map(|s| &s.id) != Some(&staff.id) {
            self.invalidate_slots();
        }
        self.staff = Some(staff);
        Ok(())
    }

    pub fn select_date(&mut self, date: NaiveDate) -> Result<(), BookingError> {
        self.require_step(BookingStep::Date)?;
        if date < self.today {
            return Err(BookingError::validation(
                BookingStep::Date,
                format!("{} is in the past", date),
            ));
        }
        if self.date != Some(date) {
            self.invalidate_slots();
        }
        self.date = Some(date);
        Ok(())
    }

    /// Recomputes the candidate list from the appointments booked for the
    /// selected staff member on the selected date.
    ///
    /// Appointments of other staff or other dates in `existing` are ignored.
    /// A selected time that is no longer available is cleared.
    pub fn refresh_slots(&mut self, existing: &[Appointment]) -> Result<&[NaiveTime], BookingError> {
        let (service, staff, date) = match (&self.service, &self.staff, self.date) {
            (Some(service), Some(staff), Some(date)) => (service, staff, date),
            _ => return Err(BookingError::WrongStep(self.step)),
        };
        let booked: Vec<Appointment> = existing
            .iter()
            .filter(|a| a.employee_id == staff.id && a.date == date)
            .cloned()
            .collect();

        self.slots = available_slots(
            self.grid.hours,
            self.grid.granularity_minutes,
            service.duration_minutes,
            &booked,
        );
        self.slots_stale = false;
        if let Some(time) = self.time {
            if !self.slots.contains(&time) {
                debug!("Selected time {} is no longer available", time);
                self.time = None;
            }
        }
        Ok(&self.slots)
    }

    pub fn select_time(&mut self, time: NaiveTime) -> Result<(), BookingError> {
        self.require_step(BookingStep::Time)?;
        if self.slots_stale {
            return Err(BookingError::validation(
                BookingStep::Time,
                "Available times are out of date",
            ));
        }
        if !self.slots.contains(&time) {
            return Err(BookingError::validation(
                BookingStep::Time,
                format!("{} is not available", time.format("%H:%M")),
            ));
        }
        self.time = Some(time);
        Ok(())
    }

    pub fn set_details(&mut self, details: ClientDetails) -> Result<(), BookingError> {
        self.require_step(BookingStep::Details)?;
        self.details = details;
        Ok(())
    }

    fn check_guard(&self) -> Result<(), BookingError> {
        match self.step {
            BookingStep::Service => {
                if self.service.is_none() {
                    return Err(BookingError::validation(self.step, "Choose a service"));
                }
            }
            BookingStep::Staff => {
                let offered = match (&self.staff, &self.service) {
                    (Some(staff), Some(service)) => staff.can_perform(&service.id),
                    _ => false,
                };
                if !offered {
                    return Err(BookingError::validation(self.step, "Choose a staff member"));
                }
            }
            BookingStep::Date => match self.date {
                Some(date) if date >= self.today => {}
                Some(date) => {
                    return Err(BookingError::validation(
                        self.step,
                        format!("{} is in the past", date),
                    ))
                }
                None => return Err(BookingError::validation(self.step, "Choose a date")),
            },
            BookingStep::Time => {
                let listed = self.time.map_or(false, |t| self.slots.contains(&t));
                if self.slots_stale || !listed {
                    return Err(BookingError::validation(self.step, "Choose an available time"));
                }
            }
            BookingStep::Details => {
                self.details
                    .check()
                    .map_err(|message| BookingError::validation(self.step, message))?;
            }
            BookingStep::Confirmation => {}
        }
        Ok(())
    }

    /// Moves one step forward if the current step's guard passes.
    ///
    /// A no-op at [`BookingStep::Confirmation`]. At [`BookingStep::Details`]
    /// the guard is checked and [`BookingError::SubmitRequired`] is returned;
    /// that step only moves forward through submission.
    pub fn advance(&mut self) -> Result<BookingStep, BookingError> {
        if self.step == BookingStep::Confirmation {
            return Ok(self.step);
        }
        if self.submission_in_flight {
            return Err(BookingError::SubmissionInFlight);
        }
        self.check_guard()?;
        if self.step == BookingStep::Details {
            return Err(BookingError::SubmitRequired);
        }
        if let Some(next) = self.step.next() {
            self.step = next;
        }
        Ok(self.step)
    }

    /// Moves one step back. A no-op at the first and the terminal step, and
    /// while a submission is in flight.
    pub fn back(&mut self) -> BookingStep {
        if self.submission_in_flight {
            return self.step;
        }
        if let Some(previous) = self.step.previous() {
            self.step = previous;
        }
        self.step
    }

    /// Full reset to [`BookingStep::Service`], keeping the link.
    pub fn restart(&mut self) {
        *self = Self::new(self.context.clone(), self.grid, self.today);
    }

    /// Validates the details step and builds the creation payload.
    ///
    /// The flow stays on [`BookingStep::Details`] with a submission marked in
    /// flight until [`complete_submission`](Self::complete_submission) is
    /// called. A second call in the meantime is rejected.
    pub fn begin_submission(&mut self) -> Result<NewAppointment, BookingError> {
        if self.submission_in_flight {
            return Err(BookingError::SubmissionInFlight);
        }
        if self.step != BookingStep::Details {
            return Err(BookingError::WrongStep(self.step));
        }
        self.check_guard()?;

        let (service, staff, date, start) =
            match (&self.service, &self.staff, self.date, self.time) {
                (Some(service), Some(staff), Some(date), Some(start)) => {
                    (service, staff, date, start)
                }
                _ => return Err(BookingError::WrongStep(self.step)),
            };
        let (end, wrapped) = start.overflowing_add_signed(Duration::minutes(i64::from(
            service.duration_minutes,
        )));
        if wrapped != 0 {
            return Err(BookingError::validation(
                BookingStep::Time,
                "Appointment would run past midnight",
            ));
        }

        let payload = NewAppointment {
            client_id: None,
            client_name: self.details.name.trim().to_string(),
            client_phone: self.details.phone.trim().to_string(),
            client_email: self.details.email.clone(),
            employee_id: staff.id.clone(),
            service_id: service.id.clone(),
            date,
            start_time: start,
            end_time: end,
            price: service.price,
            comment: self.details.comment.clone(),
        };
        self.submission_in_flight = true;
        debug!(
            "Submitting booking for {} with {} on {} at {}",
            payload.service_id, payload.employee_id, payload.date, payload.start_time
        );
        Ok(payload)
    }

    /// Applies the store's answer to a submission started with
    /// [`begin_submission`](Self::begin_submission).
    ///
    /// - success: moves to [`BookingStep::Confirmation`];
    /// - conflict: clears the time, marks the slot list stale and returns to
    ///   [`BookingStep::Time`];
    /// - anything else: stays on [`BookingStep::Details`] so the client can retry.
    pub fn complete_submission(
        &mut self,
        result: Result<Appointment, StoreError>,
    ) -> Result<&Appointment, BookingError> {
        if !self.submission_in_flight {
            return Err(BookingError::WrongStep(self.step));
        }
        self.submission_in_flight = false;

        match result {
            Ok(appointment) => {
                info!("Booking {} confirmed", appointment.id);
                self.step = BookingStep::Confirmation;
                Ok(self.confirmation.insert(appointment))
            }
            Err(StoreError::Conflict(message)) => {
                warn!("Booking rejected, slot taken: {}", message);
                self.invalidate_slots();
                self.step = BookingStep::Time;
                Err(BookingError::Conflict(message))
            }
            Err(StoreError::Validation(message)) => {
                Err(BookingError::validation(BookingStep::Details, message))
            }
            Err(err @ (StoreError::NotFound(_) | StoreError::Transport(_))) => {
                warn!("Booking submission failed: {}", err);
                Err(BookingError::Transport(err.to_string()))
            }
        }
    }

    /// Fetches the selected staff member's appointments for the selected
    /// date and recomputes the slot list.
    pub async fn reload_slots(
        &mut self,
        store: &dyn AppointmentStore,
    ) -> Result<&[NaiveTime], BookingError> {
        let (staff_id, date) = match (&self.staff, self.date) {
            (Some(staff), Some(date)) => (staff.id.clone(), date),
            _ => return Err(BookingError::WrongStep(self.step)),
        };
        let existing = store
            .list_appointments(
                &self.context.business_id,
                Some(&staff_id),
                DateRange::single(date),
            )
            .await
            .map_err(|e| BookingError::Transport(e.to_string()))?;
        self.refresh_slots(&existing)
    }

    /// Submits the booking and applies the outcome.
    ///
    /// On conflict the slot list is reloaded from `store` before the error is
    /// returned, so the client lands on a fresh time list.
    pub async fn submit(
        &mut self,
        store: &dyn AppointmentStore,
    ) -> Result<Appointment, BookingError> {
        let payload = self.begin_submission()?;
        let result = store
            .create_appointment(&self.context.business_id, payload)
            .await;

        let outcome = self.complete_submission(result).cloned();
        match outcome {
            Ok(appointment) => Ok(appointment),
            Err(BookingError::Conflict(message)) => {
                if let Err(e) = self.reload_slots(store).await {
                    warn!("Could not reload slots after conflict: {}", e);
                }
                Err(BookingError::Conflict(message))
            }
            Err(e) => Err(e),
        }
    }
}
