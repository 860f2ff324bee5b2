//! Calculation configuration and partial updates

use chrono::{Local, NaiveDate};
use config_store::{FieldChange, Patchable};
use serde::{Deserialize, Serialize};

use crate::error::{CalcError, Result};
use crate::method::{AsrTime, HighLatitudeRule, Method, PolarCircleResolution, PrayerAdjustments};
use crate::prayer::Prayer;

/// Geographic position in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(CalcError::InvalidLatitude(self.latitude));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(CalcError::InvalidLongitude(self.longitude));
        }
        Ok(())
    }
}

/// Minutes between adhan and iqama for each congregational prayer
///
/// Keys missing from a serialized map fall back to the defaults, so the
/// struct is always fully populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IqamaWaits {
    /// Default: 20
    pub fajr: u32,
    /// Default: 10
    pub dhuhr: u32,
    /// Default: 10
    pub asr: u32,
    /// Default: 5
    pub maghrib: u32,
    /// Default: 15
    pub isha: u32,
}

impl Default for IqamaWaits {
    fn default() -> Self {
        Self {
            fajr: 20,
            dhuhr: 10,
            asr: 10,
            maghrib: 5,
            isha: 15,
        }
    }
}

impl IqamaWaits {
    /// Wait in minutes; `None` for sunrise
    pub fn minutes(&self, prayer: Prayer) -> Option<u32> {
        match prayer {
            Prayer::Fajr => Some(self.fajr),
            Prayer::Sunrise => None,
            Prayer::Dhuhr => Some(self.dhuhr),
            Prayer::Asr => Some(self.asr),
            Prayer::Maghrib => Some(self.maghrib),
            Prayer::Isha => Some(self.isha),
        }
    }
}

// ============================================================================
// CalculationConfig
// ============================================================================

/// Everything the calculator needs to produce a day's times
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationConfig {
    /// Calendar date whose times are computed
    pub date: NaiveDate,
    pub latitude: f64,
    pub longitude: f64,
    /// Default: Umm al-Qura
    #[serde(default)]
    pub method: Method,
    #[serde(default)]
    pub adjustments: PrayerAdjustments,
    #[serde(default)]
    pub asr_time: AsrTime,
    #[serde(default)]
    pub high_latitude_rule: HighLatitudeRule,
    #[serde(default)]
    pub polar_circle_resolution: PolarCircleResolution,
    #[serde(default)]
    pub iqama: IqamaWaits,
    /// Extend isha during Ramadan even for methods other than Umm al-Qura
    #[serde(default)]
    pub adjust_for_ramadan: bool,
}

impl CalculationConfig {
    /// Configuration for today's local date with default settings
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self::for_date(Local::now().date_naive(), latitude, longitude)
    }

    pub fn for_date(date: NaiveDate, latitude: f64, longitude: f64) -> Self {
        Self {
            date,
            latitude,
            longitude,
            method: Method::default(),
            adjustments: PrayerAdjustments::default(),
            asr_time: AsrTime::default(),
            high_latitude_rule: HighLatitudeRule::default(),
            polar_circle_resolution: PolarCircleResolution::default(),
            iqama: IqamaWaits::default(),
            adjust_for_ramadan: false,
        }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_adjustments(mut self, adjustments: PrayerAdjustments) -> Self {
        self.adjustments = adjustments;
        self
    }

    pub fn with_iqama(mut self, iqama: IqamaWaits) -> Self {
        self.iqama = iqama;
        self
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    /// Check ranges before anything is computed
    pub fn validate(&self) -> Result<()> {
        self.coordinates().validate()?;
        self.method.validate()
    }

    /// Same configuration for another date
    pub fn on(&self, date: NaiveDate) -> Self {
        Self {
            date,
            ..self.clone()
        }
    }
}

// ============================================================================
// Partial updates
// ============================================================================

/// Identifies one field of [`CalculationConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigField {
    Date,
    Latitude,
    Longitude,
    Method,
    Adjustments,
    AsrTime,
    HighLatitudeRule,
    PolarCircleResolution,
    Iqama,
    AdjustForRamadan,
}

impl ConfigField {
    /// Fields that change the computed instants
    pub fn affects_calculation(self) -> bool {
        self != ConfigField::Iqama
    }
}

/// Value of any [`ConfigField`]
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Date(NaiveDate),
    Latitude(f64),
    Longitude(f64),
    Method(Method),
    Adjustments(PrayerAdjustments),
    AsrTime(AsrTime),
    HighLatitudeRule(HighLatitudeRule),
    PolarCircleResolution(PolarCircleResolution),
    Iqama(IqamaWaits),
    AdjustForRamadan(bool),
}

/// Partial configuration; `None` leaves the field untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigPatch {
    pub date: Option<NaiveDate>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub method: Option<Method>,
    pub adjustments: Option<PrayerAdjustments>,
    pub asr_time: Option<AsrTime>,
    pub high_latitude_rule: Option<HighLatitudeRule>,
    pub polar_circle_resolution: Option<PolarCircleResolution>,
    pub iqama: Option<IqamaWaits>,
    pub adjust_for_ramadan: Option<bool>,
}

impl ConfigPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn location(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn adjustments(mut self, adjustments: PrayerAdjustments) -> Self {
        self.adjustments = Some(adjustments);
        self
    }

    pub fn asr_time(mut self, asr_time: AsrTime) -> Self {
        self.asr_time = Some(asr_time);
        self
    }

    pub fn high_latitude_rule(mut self, rule: HighLatitudeRule) -> Self {
        self.high_latitude_rule = Some(rule);
        self
    }

    pub fn polar_circle_resolution(mut self, resolution: PolarCircleResolution) -> Self {
        self.polar_circle_resolution = Some(resolution);
        self
    }

    pub fn iqama(mut self, iqama: IqamaWaits) -> Self {
        self.iqama = Some(iqama);
        self
    }

    pub fn adjust_for_ramadan(mut self, enabled: bool) -> Self {
        self.adjust_for_ramadan = Some(enabled);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn replace<T: Clone + PartialEq>(
    slot: &mut T,
    value: Option<T>,
    field: ConfigField,
    wrap: fn(T) -> ConfigValue,
    changes: &mut Vec<FieldChange<ConfigField, ConfigValue>>,
) {
    if let Some(value) = value {
        if *slot != value {
            let old = std::mem::replace(slot, value.clone());
            changes.push(FieldChange::new(field, wrap(old), wrap(value)));
        }
    }
}

impl Patchable for CalculationConfig {
    type Patch = ConfigPatch;
    type Field = ConfigField;
    type Value = ConfigValue;

    fn merge(&mut self, patch: ConfigPatch) -> Vec<FieldChange<ConfigField, ConfigValue>> {
        let mut changes = Vec::new();
        replace(&mut self.date, patch.date, ConfigField::Date, ConfigValue::Date, &mut changes);
        replace(
            &mut self.latitude,
            patch.latitude,
            ConfigField::Latitude,
            ConfigValue::Latitude,
            &mut changes,
        );
        replace(
            &mut self.longitude,
            patch.longitude,
            ConfigField::Longitude,
            ConfigValue::Longitude,
            &mut changes,
        );
        replace(
            &mut self.method,
            patch.method,
            ConfigField::Method,
            ConfigValue::Method,
            &mut changes,
        );
        replace(
            &mut self.adjustments,
            patch.adjustments,
            ConfigField::Adjustments,
            ConfigValue::Adjustments,
            &mut changes,
        );
        replace(
            &mut self.asr_time,
            patch.asr_time,
            ConfigField::AsrTime,
            ConfigValue::AsrTime,
            &mut changes,
        );
        replace(
            &mut self.high_latitude_rule,
            patch.high_latitude_rule,
            ConfigField::HighLatitudeRule,
            ConfigValue::HighLatitudeRule,
            &mut changes,
        );
        replace(
            &mut self.polar_circle_resolution,
            patch.polar_circle_resolution,
            ConfigField::PolarCircleResolution,
            ConfigValue::PolarCircleResolution,
            &mut changes,
        );
        replace(&mut self.iqama, patch.iqama, ConfigField::Iqama, ConfigValue::Iqama, &mut changes);
        replace(
            &mut self.adjust_for_ramadan,
            patch.adjust_for_ramadan,
            ConfigField::AdjustForRamadan,
            ConfigValue::AdjustForRamadan,
            &mut changes,
        );
        changes
    }
}
