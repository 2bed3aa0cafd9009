//! Domain models shared by every Bookly crate.
//!
//! Dates are calendar dates without a time component and times are wall-clock
//! times of day. Neither carries a timezone. Times travel over the wire as
//! `"HH:MM"`.

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use validator::{Validate, ValidationError};

/// Serde helpers for `"HH:MM"` times of day.
///
/// Accepts `"HH:MM:SS"` on input so values written by other tools still parse.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%H:%M";

    pub fn format(time: &NaiveTime) -> String {
        time.format(FORMAT).to_string()
    }

    pub fn parse(value: &str) -> Result<NaiveTime, chrono::ParseError> {
        NaiveTime::parse_from_str(value, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
    }

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// A bookable service offered by the business.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub name: String,
    /// Length of one appointment in minutes, always positive.
    pub duration_minutes: u32,
    /// Price in the smallest currency unit (e.g. cents).
    pub price: i64,
    pub category: Option<String>,
}

impl Service {
    pub fn duration(&self) -> Duration {
        Duration::minutes(i64::from(self.duration_minutes))
    }
}

/// A staff member who can be booked.
///
/// `service_ids` of `None` means the member performs every service. `Some`
/// restricts the member to exactly the listed services.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub service_ids: Option<Vec<String>>,
}

impl StaffMember {
    pub fn can_perform(&self, service_id: &str) -> bool {
        match &self.service_ids {
            None => true,
            Some(ids) => ids.iter().any(|id| id == service_id),
        }
    }
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Arrived,
    NoShow,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Arrived => "arrived",
            AppointmentStatus::NoShow => "no_show",
        }
    }

    /// Arrived and no-show are outcomes; once recorded they do not change.
    pub fn is_final(&self) -> bool {
        matches!(self, AppointmentStatus::Arrived | AppointmentStatus::NoShow)
    }

    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        *self == next || !self.is_final()
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown appointment status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for AppointmentStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AppointmentStatus::Pending),
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "arrived" => Ok(AppointmentStatus::Arrived),
            "no_show" | "no-show" => Ok(AppointmentStatus::NoShow),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("appointment status cannot change from {from} to {to}")]
pub struct StatusTransitionError {
    pub from: AppointmentStatus,
    pub to: AppointmentStatus,
}

/// A booked appointment.
///
/// `price` is the service price at booking time. `end_time` is always later
/// than `start_time`.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub client_id: String,
    pub client_name: String,
    pub client_phone: String,
    pub client_email: Option<String>,
    pub employee_id: String,
    pub service_id: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "10:00"))]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "11:00"))]
    pub end_time: NaiveTime,
    pub status: AppointmentStatus,
    pub price: i64,
    pub comment: Option<String>,
}

impl Appointment {
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }

    /// Returns a copy carrying `status`, or an error if the change is not allowed.
    pub fn with_status(&self, status: AppointmentStatus) -> Result<Self, StatusTransitionError> {
        if !self.status.can_transition_to(status) {
            return Err(StatusTransitionError {
                from: self.status,
                to: status,
            });
        }
        Ok(Self {
            status,
            ..self.clone()
        })
    }

    pub fn with_comment(&self, comment: Option<String>) -> Self {
        Self {
            comment: comment.filter(|c| !c.trim().is_empty()),
            ..self.clone()
        }
    }
}

/// Payload for creating an appointment.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAppointment {
    /// Known client, if any. Stores assign one when absent.
    #[serde(default)]
    pub client_id: Option<String>,
    pub client_name: String,
    pub client_phone: String,
    #[serde(default)]
    pub client_email: Option<String>,
    pub employee_id: String,
    pub service_id: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "10:00"))]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "11:00"))]
    pub end_time: NaiveTime,
    pub price: i64,
    #[serde(default)]
    pub comment: Option<String>,
}

impl NewAppointment {
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }

    pub fn into_appointment(self, id: String, client_id: String) -> Appointment {
        Appointment {
            id,
            client_id,
            client_name: self.client_name,
            client_phone: self.client_phone,
            client_email: self.client_email,
            employee_id: self.employee_id,
            service_id: self.service_id,
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            status: AppointmentStatus::Pending,
            price: self.price,
            comment: self.comment,
        }
    }
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormType {
    General,
    Employee,
}

/// What the booking link tells the public form about its business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingLinkContext {
    pub business_id: String,
    pub form_type: FormType,
    /// Set when `form_type` is `Employee`.
    pub staff: Option<StaffMember>,
}

impl BookingLinkContext {
    pub fn general(business_id: impl Into<String>) -> Self {
        Self {
            business_id: business_id.into(),
            form_type: FormType::General,
            staff: None,
        }
    }

    pub fn for_employee(business_id: impl Into<String>, staff: StaffMember) -> Self {
        Self {
            business_id: business_id.into(),
            form_type: FormType::Employee,
            staff: Some(staff),
        }
    }

    /// The staff member the link pins the booking to, if any.
    pub fn pinned_staff(&self) -> Option<&StaffMember> {
        match self.form_type {
            FormType::Employee => self.staff.as_ref(),
            FormType::General => None,
        }
    }
}

/// Minimum number of digits a phone number must carry once separators are stripped.
pub const MIN_PHONE_DIGITS: usize = 10;

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("must not be empty".into()));
    }
    Ok(())
}

/// Accepts digits plus the usual separators (spaces, dashes, dots, parentheses, leading `+`).
fn validate_phone(value: &str) -> Result<(), ValidationError> {
    let allowed = |c: char| c.is_ascii_digit() || matches!(c, ' ' | '-' | '.' | '(' | ')' | '+');
    if !value.chars().all(allowed) {
        return Err(ValidationError::new("phone_chars")
            .with_message("may only contain digits and separators".into()));
    }
    let digits = value.chars().filter(|c| c.is_ascii_digit()).count();
    if digits < MIN_PHONE_DIGITS {
        return Err(ValidationError::new("phone_digits")
            .with_message(format!("needs at least {} digits", MIN_PHONE_DIGITS).into()));
    }
    Ok(())
}

/// Contact fields entered on the details step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ClientDetails {
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    pub comment: Option<String>,
}

impl ClientDetails {
    /// Runs the field checks and flattens failures into one readable message.
    pub fn check(&self) -> Result<(), String> {
        self.validate().map_err(|errors| {
            let mut messages: Vec<String> = errors
                .field_errors()
                .iter()
                .flat_map(|(field, errs)| {
                    errs.iter().map(move |e| match &e.message {
                        Some(msg) => format!("{}: {}", field, msg),
                        None => format!("{}: invalid", field),
                    })
                })
                .collect();
            messages.sort();
            messages.join("; ")
        })
    }
}

/// Inclusive range of calendar dates.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn appointment(status: AppointmentStatus) -> Appointment {
        Appointment {
            id: "a1".to_string(),
            client_id: "c1".to_string(),
            client_name: "Ada".to_string(),
            client_phone: "0791234567".to_string(),
            client_email: None,
            employee_id: "e1".to_string(),
            service_id: "s1".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            status,
            price: 5000,
            comment: None,
        }
    }

    #[test]
    fn test_staff_without_service_list_performs_everything() {
        let staff = StaffMember {
            id: "e1".to_string(),
            name: "Bea".to_string(),
            service_ids: None,
        };
        assert!(staff.can_perform("anything"));
    }

    #[test]
    fn test_staff_with_empty_service_list_performs_nothing() {
        let staff = StaffMember {
            id: "e1".to_string(),
            name: "Bea".to_string(),
            service_ids: Some(vec![]),
        };
        assert!(!staff.can_perform("s1"));
    }

    #[test]
    fn test_status_transitions() {
        let pending = appointment(AppointmentStatus::Pending);
        let confirmed = pending.with_status(AppointmentStatus::Confirmed).unwrap();
        let arrived = confirmed.with_status(AppointmentStatus::Arrived).unwrap();
        assert_eq!(arrived.status, AppointmentStatus::Arrived);

        let err = arrived.with_status(AppointmentStatus::Pending).unwrap_err();
        assert_eq!(err.from, AppointmentStatus::Arrived);
        assert!(arrived.with_status(AppointmentStatus::Arrived).is_ok());
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [
            AppointmentStatus::Pending,
            AppointmentStatus::Confirmed,
            AppointmentStatus::Arrived,
            AppointmentStatus::NoShow,
        ] {
            assert_eq!(status.as_str().parse::<AppointmentStatus>(), Ok(status));
        }
        assert!("cancelled".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn test_appointment_serializes_times_as_hhmm() {
        let json = serde_json::to_value(appointment(AppointmentStatus::NoShow)).unwrap();
        assert_eq!(json["start_time"], "10:00");
        assert_eq!(json["end_time"], "11:00");
        assert_eq!(json["date"], "2025-06-02");
        assert_eq!(json["status"], "no_show");
    }

    fn details(name: &str, phone: &str, email: Option<&str>) -> ClientDetails {
        ClientDetails {
            name: name.to_string(),
            phone: phone.to_string(),
            email: email.map(str::to_string),
            comment: None,
        }
    }

    #[test]
    fn test_client_details_accept_separated_phone() {
        assert!(details("Ada", "+41 (79) 123-45.67", Some("ada@example.com"))
            .check()
            .is_ok());
        assert!(details("Ada", "0791234567", None).check().is_ok());
    }

    #[test]
    fn test_client_details_rejections() {
        let err = details("  ", "0791234567", None).check().unwrap_err();
        assert!(err.starts_with("name"), "{}", err);

        let err = details("Ada", "079 123 45", None).check().unwrap_err();
        assert!(err.contains("phone"), "{}", err);

        let err = details("Ada", "079-12a-4567", None).check().unwrap_err();
        assert!(err.contains("phone"), "{}", err);

        let err = details("Ada", "0791234567", Some("not-an-email")).check().unwrap_err();
        assert!(err.contains("email"), "{}", err);
    }

    #[test]
    fn test_blank_comment_is_cleared() {
        let updated = appointment(AppointmentStatus::Pending).with_comment(Some("  ".to_string()));
        assert_eq!(updated.comment, None);
    }
}
