//! Where schedulers get their instants from

use std::sync::Arc;

use chrono::NaiveDate;
use config_store::ConfigStore;
use salat_times::{
    CalcError, CalculationConfig, IqamaWaits, NightMilestoneSet, PrayerTimeSet, TimesCalculator,
};

/// Read side of the calculation used by the schedulers
///
/// Every call computes from the current configuration; schedulers never
/// hold on to a set across a rearm.
pub trait TimesSource: Send + Sync + 'static {
    /// Times for the configured calculation date
    fn prayer_times(&self) -> Result<PrayerTimeSet, CalcError>;

    /// Times for another date, all other settings unchanged
    fn prayer_times_on(&self, date: NaiveDate) -> Result<PrayerTimeSet, CalcError>;

    /// Night starting at the configured date's maghrib
    fn night_times(&self) -> Result<NightMilestoneSet, CalcError>;

    fn night_times_on(&self, date: NaiveDate) -> Result<NightMilestoneSet, CalcError>;

    fn iqama_waits(&self) -> IqamaWaits;
}

/// A [`TimesSource`] backed by a configuration store and a calculator
#[derive(Clone)]
pub struct ConfiguredSource {
    store: ConfigStore<CalculationConfig>,
    calculator: Arc<dyn TimesCalculator>,
}

impl ConfiguredSource {
    pub fn new(store: ConfigStore<CalculationConfig>, calculator: Arc<dyn TimesCalculator>) -> Self {
        Self { store, calculator }
    }

    pub fn store(&self) -> &ConfigStore<CalculationConfig> {
        &self.store
    }
}

impl TimesSource for ConfiguredSource {
    fn prayer_times(&self) -> Result<PrayerTimeSet, CalcError> {
        self.store.with(|config| self.calculator.day_times(config))
    }

    fn prayer_times_on(&self, date: NaiveDate) -> Result<PrayerTimeSet, CalcError> {
        let config = self.store.with(|config| config.on(date));
        self.calculator.day_times(&config)
    }

    fn night_times(&self) -> Result<NightMilestoneSet, CalcError> {
        self.store.with(|config| self.calculator.night_times(config))
    }

    fn night_times_on(&self, date: NaiveDate) -> Result<NightMilestoneSet, CalcError> {
        let config = self.store.with(|config| config.on(date));
        self.calculator.night_times(&config)
    }

    fn iqama_waits(&self) -> IqamaWaits {
        self.store.with(|config| config.iqama)
    }
}
