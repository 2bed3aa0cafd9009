use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

// --- Database Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String, // e.g. sqlite://data/bookly.db, overridable via BOOKLY__DATABASE__URL
}

/// Opening window of the business, in whole hours of the day (24h clock).
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct BusinessHoursConfig {
    pub start: u32,
    pub end: u32,
}

impl Default for BusinessHoursConfig {
    fn default() -> Self {
        Self { start: 9, end: 18 }
    }
}

/// Step between candidate start times when none is configured.
pub const DEFAULT_SLOT_GRANULARITY_MINUTES: u32 = 30;

fn default_slot_granularity() -> u32 {
    DEFAULT_SLOT_GRANULARITY_MINUTES
}

fn default_pixels_per_minute() -> f64 {
    1.0
}

// --- Scheduling Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ScheduleConfig {
    #[serde(default)]
    pub business_hours: BusinessHoursConfig,
    /// Step between candidate start times, in minutes.
    #[serde(default = "default_slot_granularity")]
    pub slot_granularity_minutes: u32,
    /// Display scale handed to the calendar layout.
    #[serde(default = "default_pixels_per_minute")]
    pub pixels_per_minute: f64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            business_hours: BusinessHoursConfig::default(),
            slot_granularity_minutes: default_slot_granularity(),
            pixels_per_minute: default_pixels_per_minute(),
        }
    }
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    // Server config is mandatory in files, defaulted for tests
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: Option<DatabaseConfig>,

    #[serde(default)]
    pub schedule: ScheduleConfig,
}
