//! Error types for configuration validation and time calculation

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use crate::prayer::TimeName;

/// Errors raised while validating a configuration or computing times
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    #[error("You must provide a valid date: {0}")]
    InvalidDate(String),

    #[error("Latitude must be between -90 and 90, got {0}")]
    InvalidLatitude(f64),

    #[error("Longitude must be between -180 and 180, got {0}")]
    InvalidLongitude(f64),

    #[error("Invalid calculation method: {0}")]
    InvalidMethod(String),

    #[error("Cannot resolve {name} on {date} at latitude {latitude} (polar circle)")]
    Unresolved {
        name: TimeName,
        date: NaiveDate,
        latitude: f64,
    },

    #[error("{later} ({later_time}) is not after {earlier} ({earlier_time})")]
    NotChronological {
        earlier: TimeName,
        earlier_time: DateTime<Utc>,
        later: TimeName,
        later_time: DateTime<Utc>,
    },
}

impl CalcError {
    /// True for errors that come from bad input rather than from the calculation
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            CalcError::InvalidDate(_)
                | CalcError::InvalidLatitude(_)
                | CalcError::InvalidLongitude(_)
                | CalcError::InvalidMethod(_)
        )
    }
}

/// Result type for calculation operations
pub type Result<T> = std::result::Result<T, CalcError>;
