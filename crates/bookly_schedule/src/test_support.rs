//! Builders shared by the unit tests.

use crate::time_grid::{BusinessHours, TimeGrid};
use bookly_common::models::{Appointment, AppointmentStatus, Service, StaffMember};
use chrono::{NaiveDate, NaiveTime};

pub fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

pub fn hours(start: u32, end: u32) -> BusinessHours {
    BusinessHours::new(start, end).unwrap()
}

pub fn grid(start: u32, end: u32) -> TimeGrid {
    TimeGrid::new(hours(start, end), 30, 1.0).unwrap()
}

pub fn appointment(
    id: &str,
    employee_id: &str,
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
) -> Appointment {
    Appointment {
        id: id.to_string(),
        client_id: format!("client-{}", id),
        client_name: "Ada Lovelace".to_string(),
        client_phone: "0791234567".to_string(),
        client_email: None,
        employee_id: employee_id.to_string(),
        service_id: "cut".to_string(),
        date,
        start_time: start,
        end_time: end,
        status: AppointmentStatus::Confirmed,
        price: 4500,
        comment: None,
    }
}

pub fn service(id: &str, duration_minutes: u32) -> Service {
    Service {
        id: id.to_string(),
        name: format!("Service {}", id),
        duration_minutes,
        price: 4500,
        category: None,
    }
}

pub fn staff(id: &str, service_ids: Option<&[&str]>) -> StaffMember {
    StaffMember {
        id: id.to_string(),
        name: format!("Staff {}", id),
        service_ids: service_ids.map(|ids| ids.iter().map(|s| s.to_string()).collect()),
    }
}
