//! Appointment geometry for the calendar grid.

use crate::time_grid::{checked_minutes_from_open, BusinessHours};
use bookly_common::models::Appointment;
use chrono::NaiveTime;
use serde::Serialize;
use thiserror::Error;

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BlockGeometry {
    pub top: f64,
    pub height: f64,
}

/// Upstream data that cannot be drawn. Never clamped into the grid.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("Appointment {id}: {} is outside business hours", .time.format("%H:%M"))]
    OutsideBusinessHours { id: String, time: NaiveTime },
    #[error("Appointment {id}: computed height {height} is not positive")]
    NonPositiveHeight { id: String, height: f64 },
}

/// Position of `appointment` relative to the top of the grid.
///
/// No overlap resolution happens here; appointments of one staff member on
/// one date never overlap.
pub fn layout(
    appointment: &Appointment,
    hours: BusinessHours,
    pixels_per_minute: f64,
) -> Result<BlockGeometry, LayoutError> {
    let offset = |time: NaiveTime| {
        checked_minutes_from_open(time, hours).ok_or_else(|| LayoutError::OutsideBusinessHours {
            id: appointment.id.clone(),
            time,
        })
    };
    let start = offset(appointment.start_time)?;
    let end = offset(appointment.end_time)?;

    let height = (end - start) as f64 * pixels_per_minute;
    if height <= 0.0 {
        return Err(LayoutError::NonPositiveHeight {
            id: appointment.id.clone(),
            height,
        });
    }

    Ok(BlockGeometry {
        top: start as f64 * pixels_per_minute,
        height,
    })
}
