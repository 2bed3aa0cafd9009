//! Logging utilities for Bookly.
//!
//! Every crate logs through `tracing`. Binaries call [`init`] or
//! [`init_with_level`] once at startup to install the subscriber.

use tracing::{error, info, Level};
use tracing_subscriber::{filter::Directive, fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber at INFO.
pub fn init() {
    init_with_level(Level::INFO);
}

/// Initialize the tracing subscriber with a specific log level.
///
/// `RUST_LOG` directives still apply; the `bookly` target is pinned to
/// `level`. Calling this twice keeps the first subscriber.
pub fn init_with_level(level: Level) {
    let directive: Directive = format!("bookly={}", level)
        .parse()
        .unwrap_or_else(|_| Level::INFO.into());
    let filter = EnvFilter::from_default_env().add_directive(directive);

    let result = tracing_subscriber::registry()
        .with(fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_thread_ids(true))
        .with(filter)
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }
}

/// Log a result, with different messages for success and error cases.
///
/// Returns the original result so it can be used in a chain.
pub fn log_result<T, E: std::fmt::Display>(
    result: Result<T, E>,
    success_message: &str,
    error_context: &str,
) -> Result<T, E> {
    match &result {
        Ok(_) => info!("{}", success_message),
        Err(e) => error!("{}: {}", error_context, e),
    }
    result
}
