use crate::availability::{available_slots, check_slot, SlotRejection};
use crate::calendar_view::{build_week, week_range, CalendarWeek};
use crate::time_grid::TimeGrid;
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use bookly_common::models::{
    hhmm, Appointment, AppointmentStatus, ClientDetails, DateRange, NewAppointment,
};
use bookly_common::services::AppointmentStore;
use bookly_common::{conflict, not_found, validation_error, BooklyError};
use chrono::{Duration, Local, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Shared state of the schedule routes.
#[derive(Clone)]
pub struct ScheduleState {
    pub grid: TimeGrid,
    pub store: Arc<dyn AppointmentStore>,
    /// Overrides the local calendar date used to reject past bookings.
    fixed_today: Option<NaiveDate>,
}

impl ScheduleState {
    pub fn new(grid: TimeGrid, store: Arc<dyn AppointmentStore>) -> Self {
        Self {
            grid,
            store,
            fixed_today: None,
        }
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.fixed_today = Some(today);
        self
    }

    /// Earliest bookable date.
    pub fn today(&self) -> NaiveDate {
        self.fixed_today
            .unwrap_or_else(|| Local::now().date_naive())
    }
}

#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams, utoipa::ToSchema))]
#[derive(Deserialize, Debug)]
pub struct AvailabilityQuery {
    pub service_id: String,
    pub employee_id: String,
    /// YYYY-MM-DD
    pub date: NaiveDate,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct AvailabilityResponse {
    #[cfg_attr(feature = "openapi", schema(value_type = Vec<String>, example = json!(["09:00", "09:30"])))]
    pub slots: Vec<String>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams, utoipa::ToSchema))]
#[derive(Deserialize, Debug)]
pub struct WeekQuery {
    /// Any date inside the requested week.
    pub date: NaiveDate,
    pub employee_id: Option<String>,
}

/// Booking request as submitted by a client. The end time and price come
/// from the service record, never from the request.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CreateAppointmentRequest {
    pub service_id: String,
    pub employee_id: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "10:00"))]
    pub start_time: NaiveTime,
    #[serde(default)]
    pub client_id: Option<String>,
    pub client_name: String,
    pub client_phone: String,
    #[serde(default)]
    pub client_email: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Deserialize, Serialize, Debug)]
pub struct StatusUpdateRequest {
    pub status: AppointmentStatus,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Deserialize, Serialize, Debug)]
pub struct CommentUpdateRequest {
    pub comment: Option<String>,
}

fn rejection_error(rejection: SlotRejection) -> BooklyError {
    match rejection {
        SlotRejection::Conflict(c) => conflict(format!("Slot no longer available: {}", c)),
        other => validation_error(other.to_string()),
    }
}

/// Candidate start times for one service, staff member and date.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/businesses/{business_id}/availability",
    params(("business_id" = String, Path, description = "Business id"), AvailabilityQuery),
    responses(
        (status = 200, description = "Bookable start times", body = AvailabilityResponse),
        (status = 404, description = "Unknown service or staff member"),
        (status = 502, description = "Store unavailable")
    ),
    tag = "Schedule"
))]
pub async fn get_availability_handler(
    State(state): State<Arc<ScheduleState>>,
    Path(business_id): Path<String>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, BooklyError> {
    let services = state.store.list_services(&business_id).await?;
    let service = services
        .into_iter()
        .find(|s| s.id == query.service_id)
        .ok_or_else(|| not_found(format!("service {}", query.service_id)))?;

    let staff = state.store.list_staff(&business_id).await?;
    let member = staff
        .into_iter()
        .find(|m| m.id == query.employee_id)
        .ok_or_else(|| not_found(format!("staff member {}", query.employee_id)))?;

    if !member.can_perform(&service.id) {
        debug!("{} does not offer {}, no slots", member.id, service.id);
        return Ok(Json(AvailabilityResponse { slots: Vec::new() }));
    }

    let existing = state
        .store
        .list_appointments(&business_id, Some(&member.id), DateRange::single(query.date))
        .await?;
    let slots = available_slots(
        state.grid.hours,
        state.grid.granularity_minutes,
        service.duration_minutes,
        &existing,
    );

    Ok(Json(AvailabilityResponse {
        slots: slots.iter().map(hhmm::format).collect(),
    }))
}

/// Week grid for the calendar, optionally for one staff member.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/businesses/{business_id}/calendar/week",
    params(("business_id" = String, Path, description = "Business id"), WeekQuery),
    responses(
        (status = 200, description = "Positioned appointments of the week", body = CalendarWeek),
        (status = 502, description = "Store unavailable")
    ),
    tag = "Schedule"
))]
pub async fn get_week_handler(
    State(state): State<Arc<ScheduleState>>,
    Path(business_id): Path<String>,
    Query(query): Query<WeekQuery>,
) -> Result<Json<CalendarWeek>, BooklyError> {
    let appointments = state
        .store
        .list_appointments(
            &business_id,
            query.employee_id.as_deref(),
            week_range(query.date),
        )
        .await?;
    Ok(Json(build_week(
        query.date,
        &appointments,
        query.employee_id.as_deref(),
        &state.grid,
    )))
}

/// Books a slot. The start time is checked against business hours, the slot
/// grid and the staff member's existing appointments.
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/businesses/{business_id}/appointments",
    params(("business_id" = String, Path, description = "Business id")),
    request_body = CreateAppointmentRequest,
    responses(
        (status = 200, description = "Created appointment", body = Appointment),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Unknown service or staff member"),
        (status = 409, description = "Slot no longer available")
    ),
    tag = "Schedule"
))]
pub async fn create_appointment_handler(
    State(state): State<Arc<ScheduleState>>,
    Path(business_id): Path<String>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<Json<Appointment>, BooklyError> {
    let details = ClientDetails {
        name: request.client_name.trim().to_string(),
        phone: request.client_phone.trim().to_string(),
        email: request
            .client_email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty()),
        comment: request.comment,
    };
    details.check().map_err(validation_error)?;
    let today = state.today();
    if request.date < today {
        return Err(validation_error(format!(
            "{} is in the past, the earliest bookable date is {}",
            request.date, today
        )));
    }

    let services = state.store.list_services(&business_id).await?;
    let service = services
        .into_iter()
        .find(|s| s.id == request.service_id)
        .ok_or_else(|| not_found(format!("service {}", request.service_id)))?;
    let staff = state.store.list_staff(&business_id).await?;
    let member = staff
        .into_iter()
        .find(|m| m.id == request.employee_id)
        .ok_or_else(|| not_found(format!("staff member {}", request.employee_id)))?;
    if !member.can_perform(&service.id) {
        return Err(validation_error(format!(
            "{} does not offer {}",
            member.name, service.name
        )));
    }

    let existing = state
        .store
        .list_appointments(&business_id, Some(&member.id), DateRange::single(request.date))
        .await?;
    check_slot(
        &state.grid,
        request.start_time,
        service.duration_minutes,
        &existing,
    )
    .map_err(rejection_error)?;

    let payload = NewAppointment {
        client_id: request.client_id,
        client_name: details.name,
        client_phone: details.phone,
        client_email: details.email,
        employee_id: member.id,
        service_id: service.id,
        date: request.date,
        start_time: request.start_time,
        end_time: request.start_time + Duration::minutes(i64::from(service.duration_minutes)),
        price: service.price,
        comment: details.comment,
    };
    let created = state
        .store
        .create_appointment(&business_id, payload)
        .await?;
    info!("Booked appointment {} via HTTP", created.id);
    Ok(Json(created))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    patch,
    path = "/appointments/{appointment_id}/status",
    params(("appointment_id" = String, Path, description = "Appointment id")),
    request_body = StatusUpdateRequest,
    responses(
        (status = 200, description = "Updated appointment", body = Appointment),
        (status = 400, description = "Transition not allowed"),
        (status = 404, description = "Appointment not found")
    ),
    tag = "Schedule"
))]
pub async fn update_status_handler(
    State(state): State<Arc<ScheduleState>>,
    Path(appointment_id): Path<String>,
    Json(request): Json<StatusUpdateRequest>,
) -> Result<Json<Appointment>, BooklyError> {
    let updated = state
        .store
        .update_appointment_status(&appointment_id, request.status)
        .await?;
    Ok(Json(updated))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    patch,
    path = "/appointments/{appointment_id}/comment",
    params(("appointment_id" = String, Path, description = "Appointment id")),
    request_body = CommentUpdateRequest,
    responses(
        (status = 200, description = "Updated appointment", body = Appointment),
        (status = 404, description = "Appointment not found")
    ),
    tag = "Schedule"
))]
pub async fn update_comment_handler(
    State(state): State<Arc<ScheduleState>>,
    Path(appointment_id): Path<String>,
    Json(request): Json<CommentUpdateRequest>,
) -> Result<Json<Appointment>, BooklyError> {
    let updated = state
        .store
        .update_appointment_comment(&appointment_id, request.comment)
        .await?;
    Ok(Json(updated))
}
