use crate::time_grid::{generate_time_slots, minute_of_day, minutes_from_open, BusinessHours, TimeGrid};
use bookly_common::models::{Appointment, Service, StaffMember};
use chrono::NaiveTime;
use thiserror::Error;
use tracing::debug;

// --- Error Handling ---

/// A candidate interval intersects an existing appointment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "{} for {duration_minutes} min overlaps appointment {appointment_id} ({}-{})",
    .start.format("%H:%M"),
    .existing_start.format("%H:%M"),
    .existing_end.format("%H:%M")
)]
pub struct SlotConflict {
    pub start: NaiveTime,
    pub duration_minutes: u32,
    pub appointment_id: String,
    pub existing_start: NaiveTime,
    pub existing_end: NaiveTime,
}

/// Why a requested start time cannot be booked.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlotRejection {
    #[error("Service duration must be positive")]
    ZeroDuration,
    #[error("{} + {duration_minutes} min falls outside business hours", .start.format("%H:%M"))]
    OutsideBusinessHours { start: NaiveTime, duration_minutes: u32 },
    #[error("{} is not on the {granularity_minutes}-minute grid", .start.format("%H:%M"))]
    OffGrid { start: NaiveTime, granularity_minutes: u32 },
    #[error(transparent)]
    Conflict(#[from] SlotConflict),
}

// --- Availability Logic ---

/// Half-open overlap test: `[a_start, a_end)` and `[b_start, b_end)` share at
/// least one minute. Touching endpoints do not overlap.
pub fn intervals_overlap<T: PartialOrd>(a_start: T, a_end: T, b_start: T, b_end: T) -> bool {
    a_start < b_end && b_start < a_end
}

/// Grid start times whose appointment would end no later than closing.
pub fn candidate_start_times(
    hours: BusinessHours,
    granularity_minutes: u32,
    duration_minutes: u32,
) -> Vec<NaiveTime> {
    if duration_minutes == 0 {
        return Vec::new();
    }
    let duration = i64::from(duration_minutes);
    let window = hours.window_minutes();
    generate_time_slots(hours, granularity_minutes)
        .into_iter()
        .filter(|slot| minutes_from_open(*slot, hours) + duration <= window)
        .collect()
}

/// Checks one candidate against the appointments already booked for the same
/// staff member and date.
pub fn validate_booking(
    candidate: NaiveTime,
    duration_minutes: u32,
    existing: &[Appointment],
) -> Result<(), SlotConflict> {
    let start = minute_of_day(candidate);
    let end = start + i64::from(duration_minutes);

    match existing.iter().find(|appointment| {
        intervals_overlap(
            start,
            end,
            minute_of_day(appointment.start_time),
            minute_of_day(appointment.end_time),
        )
    }) {
        Some(appointment) => Err(SlotConflict {
            start: candidate,
            duration_minutes,
            appointment_id: appointment.id.clone(),
            existing_start: appointment.start_time,
            existing_end: appointment.end_time,
        }),
        None => Ok(()),
    }
}

/// Start times, ascending, at which a `duration_minutes` appointment fits
/// without touching `existing`.
///
/// `existing` must already be restricted to one staff member and one date.
/// A duration longer than the opening window yields no slots.
pub fn available_slots(
    hours: BusinessHours,
    granularity_minutes: u32,
    duration_minutes: u32,
    existing: &[Appointment],
) -> Vec<NaiveTime> {
    let candidates = candidate_start_times(hours, granularity_minutes, duration_minutes);
    let total = candidates.len();
    let slots: Vec<NaiveTime> = candidates
        .into_iter()
        .filter(|candidate| validate_booking(*candidate, duration_minutes, existing).is_ok())
        .collect();

    debug!(
        "Available slots for {} min against {} bookings: {} of {} candidates",
        duration_minutes,
        existing.len(),
        slots.len(),
        total
    );
    slots
}

/// Full check for a start time that did not come from [`available_slots`],
/// e.g. one submitted directly over HTTP.
pub fn check_slot(
    grid: &TimeGrid,
    start: NaiveTime,
    duration_minutes: u32,
    existing: &[Appointment],
) -> Result<(), SlotRejection> {
    if duration_minutes == 0 {
        return Err(SlotRejection::ZeroDuration);
    }
    let offset = minutes_from_open(start, grid.hours);
    if offset < 0 || offset + i64::from(duration_minutes) > grid.hours.window_minutes() {
        return Err(SlotRejection::OutsideBusinessHours {
            start,
            duration_minutes,
        });
    }
    if !grid.is_on_grid(start) {
        return Err(SlotRejection::OffGrid {
            start,
            granularity_minutes: grid.granularity_minutes,
        });
    }
    validate_booking(start, duration_minutes, existing)?;
    Ok(())
}

/// Staff members from `roster` who perform `service`.
pub fn eligible_staff<'a>(roster: &'a [StaffMember], service: &Service) -> Vec<&'a StaffMember> {
    roster
        .iter()
        .filter(|member| member.can_perform(&service.id))
        .collect()
}
