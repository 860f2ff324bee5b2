//! Logging setup for applications embedding salat-sdk
//!
//! The library only emits `tracing` events; nothing is printed unless the
//! host installs a subscriber, either its own or one from this module.

use tracing_subscriber::{fmt, EnvFilter};

/// Logging mode for different use cases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingMode {
    /// No subscriber is installed
    Silent,
    /// Compact stderr output, `info` by default
    Development,
    /// Pretty output with source locations, `debug` by default
    Debug,
    /// One JSON object per line, `info` by default
    Json,
}

impl LoggingMode {
    /// Parse a `SALAT_LOG_MODE` value; unknown values are silent
    pub fn from_env_value(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => LoggingMode::Development,
            "debug" => LoggingMode::Debug,
            "json" => LoggingMode::Json,
            _ => LoggingMode::Silent,
        }
    }
}

/// Logging configuration error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),

    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),
}

/// Install a global subscriber for `mode`
///
/// # Environment Variables
///
/// - `SALAT_LOG_LEVEL`: filter directive (e.g. `debug`, `salat_stream=trace`)
/// - `RUST_LOG`: used when `SALAT_LOG_LEVEL` is unset
///
/// ```rust,ignore
/// salat_sdk::logging::init_logging(LoggingMode::Development)?;
/// ```
pub fn init_logging(mode: LoggingMode) -> Result<(), LoggingError> {
    let installed = match mode {
        LoggingMode::Silent => return Ok(()),
        LoggingMode::Development => fmt()
            .with_env_filter(create_env_filter("info")?)
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
            .try_init(),
        LoggingMode::Debug => fmt()
            .with_env_filter(create_env_filter("debug")?)
            .with_writer(std::io::stderr)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init(),
        LoggingMode::Json => fmt()
            .with_env_filter(create_env_filter("info")?)
            .json()
            .with_current_span(false)
            .try_init(),
    };
    installed.map_err(|e| LoggingError::TracingInit(e.to_string()))
}

/// Install a subscriber chosen by `SALAT_LOG_MODE`
///
/// `development`, `debug` or `json`; anything else (or unset) is silent.
pub fn init_logging_from_env() -> Result<(), LoggingError> {
    let mode = std::env::var("SALAT_LOG_MODE")
        .map(|value| LoggingMode::from_env_value(&value))
        .unwrap_or(LoggingMode::Silent);
    init_logging(mode)
}

fn create_env_filter(default_level: &str) -> Result<EnvFilter, LoggingError> {
    let directive = std::env::var("SALAT_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| default_level.to_string());
    EnvFilter::try_new(&directive).map_err(|e| LoggingError::InvalidFilter(format!("{directive}: {e}")))
}

/// Check if a global subscriber has been installed
pub fn is_initialized() -> bool {
    tracing::dispatcher::has_been_set()
}

pub fn init_silent() -> Result<(), LoggingError> {
    init_logging(LoggingMode::Silent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_silent_mode() {
        assert!(init_logging(LoggingMode::Silent).is_ok());
        assert!(init_silent().is_ok());
    }

    #[rstest]
    #[case("debug", LoggingMode::Debug)]
    #[case(" Development ", LoggingMode::Development)]
    #[case("dev", LoggingMode::Development)]
    #[case("json", LoggingMode::Json)]
    #[case("loud", LoggingMode::Silent)]
    #[case("", LoggingMode::Silent)]
    fn test_mode_from_env_value(#[case] value: &str, #[case] expected: LoggingMode) {
        assert_eq!(LoggingMode::from_env_value(value), expected);
    }
}
