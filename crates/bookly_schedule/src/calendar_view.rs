//! Week grid composition: buckets appointments into day columns and attaches
//! their geometry.

use crate::layout::layout;
use crate::time_grid::TimeGrid;
use bookly_common::models::{hhmm, Appointment, DateRange};
use chrono::{Datelike, Days, NaiveDate, NaiveTime};
use serde::{Serialize, Serializer};
use tracing::{debug, warn};

pub const DAYS_PER_WEEK: usize = 7;

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedAppointment {
    pub appointment: Appointment,
    /// Day index within the week, Monday = 0.
    pub column: usize,
    pub top: f64,
    pub height: f64,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarWeek {
    pub days: Vec<NaiveDate>,
    #[serde(serialize_with = "serialize_times")]
    #[cfg_attr(feature = "openapi", schema(value_type = Vec<String>))]
    pub time_slots: Vec<NaiveTime>,
    pub blocks: Vec<PositionedAppointment>,
}

fn serialize_times<S: Serializer>(times: &[NaiveTime], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(times.iter().map(hhmm::format))
}

impl CalendarWeek {
    pub fn blocks_for_day(&self, column: usize) -> impl Iterator<Item = &PositionedAppointment> {
        self.blocks.iter().filter(move |block| block.column == column)
    }
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let from_monday = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(from_monday)).unwrap_or(date)
}

pub fn next_week(date: NaiveDate) -> NaiveDate {
    let start = week_start(date);
    start.checked_add_days(Days::new(7)).unwrap_or(start)
}

pub fn previous_week(date: NaiveDate) -> NaiveDate {
    let start = week_start(date);
    start.checked_sub_days(Days::new(7)).unwrap_or(start)
}

/// Monday to Sunday of the week containing `date`.
pub fn week_range(date: NaiveDate) -> DateRange {
    let start = week_start(date);
    DateRange::new(start, start.checked_add_days(Days::new(6)).unwrap_or(start))
}

/// Lays out one week of appointments.
///
/// Appointments outside the week, or of other staff when `staff_filter` is
/// set, are skipped. Appointments that cannot be laid out are dropped with a
/// warning so one bad record does not take down the whole view.
pub fn build_week(
    date: NaiveDate,
    appointments: &[Appointment],
    staff_filter: Option<&str>,
    grid: &TimeGrid,
) -> CalendarWeek {
    let range = week_range(date);
    let days: Vec<NaiveDate> = range.start.iter_days().take(DAYS_PER_WEEK).collect();

    let mut blocks: Vec<PositionedAppointment> = appointments
        .iter()
        .filter(|a| range.contains(a.date))
        .filter(|a| staff_filter.map_or(true, |id| a.employee_id == id))
        .filter_map(|a| match layout(a, grid.hours, grid.pixels_per_minute) {
            Ok(geometry) => Some(PositionedAppointment {
                appointment: a.clone(),
                column: a.date.weekday().num_days_from_monday() as usize,
                top: geometry.top,
                height: geometry.height,
            }),
            Err(e) => {
                warn!("Excluding appointment from week view: {}", e);
                None
            }
        })
        .collect();

    blocks.sort_by(|a, b| a.column.cmp(&b.column).then(a.top.total_cmp(&b.top)));

    debug!(
        "Week of {}: {} of {} appointments positioned",
        range.start,
        blocks.len(),
        appointments.len()
    );

    CalendarWeek {
        days,
        time_slots: grid.slots(),
        blocks,
    }
}
