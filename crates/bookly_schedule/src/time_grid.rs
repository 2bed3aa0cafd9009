//! Discretization of a business day into bookable units, and the vertical
//! geometry used to draw it.
//!
//! All times are wall-clock times of day. Minutes since opening are the only
//! geometry key; everything that draws a block goes through
//! [`minutes_from_open`].

use bookly_config::{BusinessHoursConfig, ScheduleConfig};
use chrono::{Duration, NaiveTime, Timelike};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("Invalid business hours {start}-{end}: start must precede end and end must be at most 23")]
    InvalidBusinessHours { start: u32, end: u32 },
    #[error("Slot granularity must be positive")]
    ZeroGranularity,
    #[error("Pixels per minute must be positive, got {0}")]
    InvalidScale(f64),
}

/// Opening window in whole hours, `start < end <= 23`.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BusinessHours {
    start: u32,
    end: u32,
}

impl BusinessHours {
    pub fn new(start: u32, end: u32) -> Result<Self, GridError> {
        if start >= end || end > 23 {
            return Err(GridError::InvalidBusinessHours { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn opening_time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.start, 0, 0).unwrap_or(NaiveTime::MIN)
    }

    pub fn closing_time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.end, 0, 0).unwrap_or(NaiveTime::MIN)
    }

    /// Length of the opening window in minutes.
    pub fn window_minutes(&self) -> i64 {
        i64::from(self.end - self.start) * 60
    }

    /// True for times in `[opening, closing]`.
    pub fn contains(&self, time: NaiveTime) -> bool {
        checked_minutes_from_open(time, *self).is_some()
    }
}

impl TryFrom<&BusinessHoursConfig> for BusinessHours {
    type Error = GridError;

    fn try_from(config: &BusinessHoursConfig) -> Result<Self, Self::Error> {
        BusinessHours::new(config.start, config.end)
    }
}

/// Business hours, slot step and display scale bundled together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeGrid {
    pub hours: BusinessHours,
    pub granularity_minutes: u32,
    pub pixels_per_minute: f64,
}

impl TimeGrid {
    pub fn new(
        hours: BusinessHours,
        granularity_minutes: u32,
        pixels_per_minute: f64,
    ) -> Result<Self, GridError> {
        if granularity_minutes == 0 {
            return Err(GridError::ZeroGranularity);
        }
        if pixels_per_minute.is_nan() || pixels_per_minute <= 0.0 {
            return Err(GridError::InvalidScale(pixels_per_minute));
        }
        Ok(Self {
            hours,
            granularity_minutes,
            pixels_per_minute,
        })
    }

    pub fn from_config(config: &ScheduleConfig) -> Result<Self, GridError> {
        let hours = BusinessHours::try_from(&config.business_hours)?;
        Self::new(
            hours,
            config.slot_granularity_minutes,
            config.pixels_per_minute,
        )
    }

    pub fn slots(&self) -> Vec<NaiveTime> {
        generate_time_slots(self.hours, self.granularity_minutes)
    }

    /// True if `time` sits exactly on a grid line inside business hours.
    pub fn is_on_grid(&self, time: NaiveTime) -> bool {
        if time.second() != 0 || time.nanosecond() != 0 {
            return false;
        }
        match checked_minutes_from_open(time, self.hours) {
            Some(minutes) => minutes % i64::from(self.granularity_minutes) == 0,
            None => false,
        }
    }
}

/// Every grid line from opening to closing, both inclusive.
///
/// A granularity of zero produces no slots.
pub fn generate_time_slots(hours: BusinessHours, granularity_minutes: u32) -> Vec<NaiveTime> {
    if granularity_minutes == 0 {
        return Vec::new();
    }
    let opening = hours.opening_time();
    let step = i64::from(granularity_minutes);
    let window = hours.window_minutes();

    let mut slots = Vec::with_capacity((window / step + 1) as usize);
    let mut offset = 0;
    while offset <= window {
        slots.push(opening + Duration::minutes(offset));
        offset += step;
    }
    slots
}

/// Minute of the day, ignoring seconds.
pub fn minute_of_day(time: NaiveTime) -> i64 {
    i64::from(time.hour() * 60 + time.minute())
}

/// Minutes elapsed since opening.
///
/// Negative values, or values past the window length, mean `time` is outside
/// business hours. Use [`checked_minutes_from_open`] to reject those.
pub fn minutes_from_open(time: NaiveTime, hours: BusinessHours) -> i64 {
    minute_of_day(time) - i64::from(hours.start) * 60
}

/// Like [`minutes_from_open`] but `None` outside `[opening, closing]`.
pub fn checked_minutes_from_open(time: NaiveTime, hours: BusinessHours) -> Option<i64> {
    let minutes = minutes_from_open(time, hours);
    (0..=hours.window_minutes()).contains(&minutes).then_some(minutes)
}

/// Vertical offset of `time` from the top of the grid.
pub fn time_to_offset(time: NaiveTime, hours: BusinessHours, pixels_per_minute: f64) -> f64 {
    minutes_from_open(time, hours) as f64 * pixels_per_minute
}
