//! Calculation settings on disk
//!
//! A JSON file holding a [`CalculationConfig`]. The date is optional in the
//! file; a missing date means "today" at load time.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use salat_times::CalculationConfig;
use serde::Deserialize;

use crate::error::{Result, SdkError};

/// File shape: the calculation config with an optional date
#[derive(Deserialize)]
struct ConfigFile {
    date: Option<NaiveDate>,
    #[serde(flatten)]
    rest: serde_json::Map<String, serde_json::Value>,
}

/// `<config dir>/salat-sdk/config.json`
pub fn default_config_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("salat-sdk").join("config.json"))
        .ok_or(SdkError::NoConfigDir)
}

/// Read and validate a configuration file
pub fn load_config(path: impl AsRef<Path>) -> Result<CalculationConfig> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| SdkError::ConfigFile {
        path: path.to_path_buf(),
        source,
    })?;
    let format_error = |source| SdkError::ConfigFormat {
        path: path.to_path_buf(),
        source,
    };

    let file: ConfigFile = serde_json::from_str(&text).map_err(format_error)?;
    if !file.rest.contains_key("method") {
        tracing::warn!("No calculation method in {}, using Umm al-Qura", path.display());
    }

    let mut fields = file.rest;
    let date = file.date.unwrap_or_else(|| Local::now().date_naive());
    fields.insert("date".to_string(), serde_json::Value::String(date.to_string()));
    let config: CalculationConfig =
        serde_json::from_value(serde_json::Value::Object(fields)).map_err(format_error)?;

    config.validate()?;
    tracing::debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// [`load_config`] on [`default_config_path`]
pub fn load_default_config() -> Result<CalculationConfig> {
    load_config(default_config_path()?)
}

/// Write `config` as pretty JSON, creating parent directories
pub fn save_config(config: &CalculationConfig, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let io_error = |source| SdkError::ConfigFile {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    let json = serde_json::to_string_pretty(config).map_err(|source| SdkError::ConfigFormat {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(io_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use salat_times::{AsrTime, CalcError, Method};

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = CalculationConfig::for_date(NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(), 2.9213, 101.6559)
            .with_method(Method::Singapore);

        save_config(&config, &path).unwrap();
        assert_eq!(load_config(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_date_and_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"latitude": 21.42, "longitude": 39.82, "asrTime": "hanafi"}"#).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.date, Local::now().date_naive());
        assert_eq!(config.method, Method::UmmAlQura);
        assert_eq!(config.asr_time, AsrTime::Hanafi);
        assert_eq!(config.iqama.fajr, 20);
    }

    #[test]
    fn test_invalid_files() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("absent.json");
        assert!(matches!(load_config(&missing), Err(SdkError::ConfigFile { .. })));

        let garbage = dir.path().join("garbage.json");
        fs::write(&garbage, "not json").unwrap();
        assert!(matches!(load_config(&garbage), Err(SdkError::ConfigFormat { .. })));

        let out_of_range = dir.path().join("range.json");
        fs::write(&out_of_range, r#"{"latitude": 95, "longitude": 0}"#).unwrap();
        assert!(matches!(
            load_config(&out_of_range),
            Err(SdkError::Config(CalcError::InvalidLatitude(_)))
        ));
    }
}
