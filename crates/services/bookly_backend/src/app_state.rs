use bookly_common::services::AppointmentStore;
use bookly_common::BooklyError;
use bookly_config::AppConfig;
use bookly_schedule::{InMemoryAppointmentStore, ScheduleState, TimeGrid};
use std::sync::Arc;
use tracing::warn;

/// Application state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub schedule: Arc<ScheduleState>,
}

impl AppState {
    /// Builds the state from configuration, connecting the SQL store when a
    /// `database` section is present.
    pub async fn new(config: Arc<AppConfig>) -> Result<Self, BooklyError> {
        let grid = TimeGrid::from_config(&config.schedule)
            .map_err(|e| BooklyError::ConfigError(e.to_string()))?;
        let store = connect_store(&config).await?;
        Ok(Self::with_store(config, grid, store))
    }

    pub fn with_store(
        config: Arc<AppConfig>,
        grid: TimeGrid,
        store: Arc<dyn AppointmentStore>,
    ) -> Self {
        Self {
            config,
            schedule: Arc::new(ScheduleState::new(grid, store)),
        }
    }
}

#[cfg(feature = "database")]
async fn connect_store(config: &AppConfig) -> Result<Arc<dyn AppointmentStore>, BooklyError> {
    use bookly_common::log_result;
    use bookly_db::{DbClient, SqlAppointmentStore};

    if config.database.is_none() {
        warn!("No database configured, appointments are kept in memory");
        return Ok(Arc::new(InMemoryAppointmentStore::new()));
    }
    let client = DbClient::new(config)
        .await
        .map_err(|e| BooklyError::DatabaseError(e.to_string()))?;
    let store = SqlAppointmentStore::new(client);
    log_result(
        store.init_schema().await,
        "Appointment store ready",
        "Failed to initialize appointment schema",
    )
    .map_err(|e| BooklyError::DatabaseError(e.to_string()))?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "database"))]
async fn connect_store(_config: &AppConfig) -> Result<Arc<dyn AppointmentStore>, BooklyError> {
    warn!("Built without the database feature, appointments are kept in memory");
    Ok(Arc::new(InMemoryAppointmentStore::new()))
}
