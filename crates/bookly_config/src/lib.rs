//! Configuration loading for Bookly.
//!
//! Sources are layered in this order, later ones winning:
//! `config/default.toml`, `config/{RUN_ENV}.toml`, then environment variables
//! prefixed with `BOOKLY` and separated by `__` (e.g. `BOOKLY__SERVER__PORT`).

use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

pub mod models;
pub use models::*;

/// The prefix for configuration environment variables
pub const DEFAULT_PREFIX: &str = "BOOKLY";

/// The separator for configuration environment variables
pub const CONFIG_SEPARATOR: &str = "__";

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Ensures that the dotenv file is loaded into the environment variables.
///
/// The file name comes from `DOTENV_OVERRIDE` and falls back to `.env`. The
/// file is read at most once per process; a missing file is not an error.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path = env::var("DOTENV_OVERRIDE").unwrap_or_else(|_| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}

/// Directory holding the layered config files, `BOOKLY_CONFIG_DIR` or `./config`.
pub fn config_dir() -> PathBuf {
    env::var("BOOKLY_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config"))
}

/// Loads the application configuration from the default config directory.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();
    load_config_from(&config_dir())
}

/// Loads the application configuration from `dir`.
pub fn load_config_from(dir: &Path) -> Result<AppConfig, ConfigError> {
    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let prefix = env::var("PREFIX").unwrap_or_else(|_| DEFAULT_PREFIX.to_string());

    let default_path = dir.join("default");
    let env_path = dir.join(&run_env);
    debug!(
        "Loading config from {} and {} (prefix {})",
        default_path.display(),
        env_path.display(),
        prefix
    );

    let builder = Config::builder()
        .add_source(File::from(default_path).required(false))
        .add_source(File::from(env_path).required(false))
        .add_source(Environment::with_prefix(&prefix).separator(CONFIG_SEPARATOR));

    builder.build()?.try_deserialize()
}

/// Convert a configuration path to an environment variable name
///
/// `"server.port"` becomes `"BOOKLY__SERVER__PORT"`.
pub fn config_path_to_env_var(path: &str) -> String {
    let path = path.replace('.', CONFIG_SEPARATOR);
    format!("{}{}{}", DEFAULT_PREFIX, CONFIG_SEPARATOR, path).to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("bookly-config-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_defaults_without_files() {
        let dir = scratch_dir("defaults");
        let config = load_config_from(dir.as_path()).unwrap();
        assert_eq!(config.schedule.business_hours, BusinessHoursConfig { start: 9, end: 18 });
        assert_eq!(config.schedule.slot_granularity_minutes, 30);
        assert!(config.database.is_none());
    }

    #[test]
    fn test_default_file_is_read() {
        let dir = scratch_dir("default_file");
        fs::write(
            dir.as_path().join("default.toml"),
            r#"
[server]
host = "0.0.0.0"
port = 9000

[schedule]
slot_granularity_minutes = 15

[schedule.business_hours]
start = 8
end = 20
"#,
        )
        .unwrap();

        let config = load_config_from(dir.as_path()).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.schedule.slot_granularity_minutes, 15);
        assert_eq!(config.schedule.business_hours.start, 8);
        assert_eq!(config.schedule.business_hours.end, 20);
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = scratch_dir("env_override");
        fs::write(
            dir.as_path().join("default.toml"),
            "[schedule]\nslot_granularity_minutes = 15\n",
        )
        .unwrap();
        env::set_var("BOOKLY__SCHEDULE__PIXELS_PER_MINUTE", "2.5");
        let config = load_config_from(dir.as_path());
        env::remove_var("BOOKLY__SCHEDULE__PIXELS_PER_MINUTE");

        let config = config.unwrap();
        assert_eq!(config.schedule.slot_granularity_minutes, 15);
        assert_eq!(config.schedule.pixels_per_minute, 2.5);
    }

    #[test]
    fn test_config_path_to_env_var() {
        assert_eq!(config_path_to_env_var("server.port"), "BOOKLY__SERVER__PORT");
        assert_eq!(
            config_path_to_env_var("schedule.business_hours.start"),
            "BOOKLY__SCHEDULE__BUSINESS_HOURS__START"
        );
    }
}
