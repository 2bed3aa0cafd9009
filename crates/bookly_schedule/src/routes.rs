use crate::handlers::{
    create_appointment_handler, get_availability_handler, get_week_handler,
    update_comment_handler, update_status_handler, ScheduleState,
};
use axum::{
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;

/// Creates a router containing all scheduling routes.
///
/// Paths are relative; the backend nests them under `/api`.
pub fn routes(state: Arc<ScheduleState>) -> Router {
    Router::new()
        .route(
            "/businesses/{business_id}/availability",
            get(get_availability_handler),
        )
        .route(
            "/businesses/{business_id}/calendar/week",
            get(get_week_handler),
        )
        .route(
            "/businesses/{business_id}/appointments",
            post(create_appointment_handler),
        )
        .route(
            "/appointments/{appointment_id}/status",
            patch(update_status_handler),
        )
        .route(
            "/appointments/{appointment_id}/comment",
            patch(update_comment_handler),
        )
        .with_state(state)
}
