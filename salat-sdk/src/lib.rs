//! # salat-sdk - reactive prayer-time events
//!
//! Computes the daily prayer times for a location and turns them into
//! event streams that keep following the calendar:
//!
//! ```rust,no_run
//! use salat_sdk::{CalculationConfig, ConfigPatch, Method, ReactiveCalculator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), salat_sdk::SdkError> {
//!     salat_sdk::logging::init_logging_from_env().ok();
//!
//!     let config = CalculationConfig::new(21.4225, 39.8262).with_method(Method::UmmAlQura);
//!     let calculator = ReactiveCalculator::new(config)?;
//!
//!     println!("Next: {:?}", calculator.next_prayer());
//!     println!("Qibla: {:.1}°", calculator.qibla_direction());
//!
//!     let mut adhan = calculator.adhan_events()?;
//!     let mut days = calculator.new_day_events()?;
//!
//!     // Switching method recomputes and re-arms before returning
//!     calculator.set_calculation_options(ConfigPatch::new().method(Method::MuslimWorldLeague))?;
//!
//!     tokio::select! {
//!         Some(event) = adhan.recv() => println!("{}", event),
//!         Some(tick) = days.recv() => println!("new day at {}", tick.time),
//!         else => {}
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Streams
//!
//! - `adhan_events()` - the six daily instants, fajr through isha
//! - `iqama_events()` - congregational start after each prayer but sunrise
//! - `prayer_events()` - adhan and iqama merged
//! - `qiyam_events()` - middle and last third of each night
//! - `new_day_events()` - local midnight, then every 24h + 1min
//! - `new_night_events()` - last third of each night
//!
//! ## Architecture
//!
//! ```text
//! salat-sdk (ReactiveCalculator, config files, logging)
//!     ↓
//! salat-stream (schedulers, registry, buses)
//!     ↓
//! salat-times (solar calculation, methods)   config-store (patch + notify)
//! ```

pub mod calculator;
pub mod config;
mod error;
pub mod logging;

pub use calculator::{ReactiveCalculator, ReactiveCalculatorBuilder};
pub use config::{default_config_path, load_config, load_default_config, save_config};
pub use error::{Result, SdkError};

pub use salat_stream::{
    Clock, DayTick, EventKind, EventStream, RegistryStats, SystemClock, TimeEvent, TokioClock,
};
pub use salat_times::{
    AsrTime, CalcError, CalculationConfig, ConfigField, ConfigPatch, CustomMethod,
    HighLatitudeRule, HijriDate, IqamaWaits, Method, NightMilestoneSet, PolarCircleResolution,
    Prayer, PrayerAdjustments, PrayerTime, PrayerTimeSet, Rounding, SolarCalculator,
    TimeName, TimesCalculator,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        CalculationConfig, ConfigPatch, EventKind, Method, Prayer, ReactiveCalculator, SdkError,
        TimeEvent, TimeName,
    };
}
