// File: services/bookly_backend/src/main.rs
use axum::{routing::get, Router};
use bookly_common::{init as init_logging, routes as common_routes, BooklyError, Context};
use bookly_config::load_config;
use bookly_schedule::routes::routes as schedule_routes;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

mod app_state;

use app_state::AppState;

/// Assembles the full HTTP surface under `/api`.
fn build_app(state: &AppState) -> Router {
    let api_router = Router::new()
        .route("/", get(|| async { "Welcome to the Bookly API!" }))
        .merge(common_routes())
        .merge(schedule_routes(state.schedule.clone()));

    #[allow(unused_mut)] // mutated when openapi is enabled
    let mut app = Router::new().nest("/api", api_router);

    #[cfg(feature = "openapi")]
    {
        use bookly_schedule::doc::ScheduleApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "Bookly API",
                version = "0.1.0",
                description = "Appointment booking and scheduling API",
                license(name = "MIT", url = "https://opensource.org/licenses/MIT")
            ),
            servers( (url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(ScheduleApiDoc::openapi());
        info!("Adding Swagger UI at /api/docs");
        app = app.merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc));
    }

    app.layer(TraceLayer::new_for_http())
}

#[tokio::main]
async fn main() -> Result<(), BooklyError> {
    init_logging();

    let config = Arc::new(load_config().map_err(|e| BooklyError::ConfigError(e.to_string()))?);
    let state = AppState::new(config).await?;
    let app = build_app(&state);

    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app.into_make_service())
        .await
        .context("Server terminated")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use bookly_schedule::{InMemoryAppointmentStore, TimeGrid};
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let config = Arc::new(bookly_config::AppConfig::default());
        let grid = TimeGrid::from_config(&config.schedule).unwrap();
        AppState::with_store(config, grid, Arc::new(InMemoryAppointmentStore::new()))
    }

    #[tokio::test]
    async fn test_health_is_mounted_under_api() {
        let app = build_app(&test_state());
        let response = app
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_schedule_routes_are_mounted() {
        let app = build_app(&test_state());
        let response = app
            .oneshot(
                Request::get("/api/businesses/salon/calendar/week?date=2025-06-02")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
