//! Prayer Time Calculation
//!
//! Data model and calculation layer for salat-sdk: what a day's prayer
//! times look like, how a calculation is configured, and how the instants
//! are derived from the sun's position.
//!
//! # Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use salat_times::{CalculationConfig, Method, Prayer, SolarCalculator, TimesCalculator};
//!
//! let date = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
//! let config = CalculationConfig::for_date(date, 2.9213, 101.6559)
//!     .with_method(Method::Singapore);
//!
//! let times = SolarCalculator.day_times(&config).unwrap();
//! assert!(times.time(Prayer::Fajr) < times.time(Prayer::Sunrise));
//! ```
//!
//! # Architecture
//!
//! ```text
//! CalculationConfig ──(Patchable)──► config_store::ConfigStore
//!     │
//!     └── TimesCalculator::day_times ──► PrayerTimeSet
//!             │                              │
//!             │ SolarCalculator              └── NightMilestoneSet (today maghrib → tomorrow fajr)
//!             ├── solar: declination, equation of time, hour angles
//!             ├── method: angles, intervals, adjustments, rounding
//!             └── hijri: Ramadan isha extension
//! ```

// Modules
pub mod config;
pub mod engine;
pub mod error;
pub mod hijri;
pub mod method;
pub mod prayer;
pub mod qibla;
pub mod solar;
pub mod times;

// Re-exports - Public API
pub use config::{
    CalculationConfig, ConfigField, ConfigPatch, ConfigValue, Coordinates, IqamaWaits,
};
pub use engine::{SolarCalculator, TimesCalculator};
pub use error::{CalcError, Result};
pub use hijri::HijriDate;
pub use method::{
    AsrTime, CustomMethod, HighLatitudeRule, Method, MethodParameters, PolarCircleResolution,
    PrayerAdjustments, Rounding,
};
pub use prayer::{Prayer, TimeName};
pub use qibla::qibla;
pub use times::{NightMilestoneSet, PrayerTime, PrayerTimeSet};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{CalculationConfig, ConfigPatch, IqamaWaits};
    pub use crate::engine::{SolarCalculator, TimesCalculator};
    pub use crate::method::{AsrTime, Method, PrayerAdjustments};
    pub use crate::prayer::{Prayer, TimeName};
    pub use crate::times::{NightMilestoneSet, PrayerTimeSet};
}
