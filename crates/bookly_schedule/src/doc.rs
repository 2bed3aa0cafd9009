#![cfg(feature = "openapi")]
use crate::calendar_view::{CalendarWeek, PositionedAppointment};
use crate::handlers::{
    AvailabilityQuery, AvailabilityResponse, CommentUpdateRequest, CreateAppointmentRequest,
    StatusUpdateRequest, WeekQuery,
};
use bookly_common::models::{Appointment, AppointmentStatus};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::get_availability_handler,
        crate::handlers::get_week_handler,
        crate::handlers::create_appointment_handler,
        crate::handlers::update_status_handler,
        crate::handlers::update_comment_handler
    ),
    components(
        schemas(
            AvailabilityQuery,
            AvailabilityResponse,
            WeekQuery,
            CalendarWeek,
            PositionedAppointment,
            CreateAppointmentRequest,
            StatusUpdateRequest,
            CommentUpdateRequest,
            Appointment,
            AppointmentStatus
        )
    ),
    tags(
        (name = "Schedule", description = "Availability, calendar and booking API")
    ),
    servers(
        (url = "/api", description = "Bookly API server")
    )
)]
pub struct ScheduleApiDoc;
