//! Calculation methods and the parameters they resolve to
//!
//! A [`Method`] is either one of the named presets or a [`CustomMethod`]
//! carrying its own angles. Either way it resolves to a
//! [`MethodParameters`] value consumed by the solar calculator.

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CalcError, Result};
use crate::prayer::Prayer;

// ============================================================================
// Per-prayer minute adjustments
// ============================================================================

/// Minutes added to each computed instant (may be negative)
///
/// Missing keys deserialize as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PrayerAdjustments {
    pub fajr: i32,
    pub sunrise: i32,
    pub dhuhr: i32,
    pub asr: i32,
    pub maghrib: i32,
    pub isha: i32,
}

impl PrayerAdjustments {
    pub fn get(&self, prayer: Prayer) -> i32 {
        match prayer {
            Prayer::Fajr => self.fajr,
            Prayer::Sunrise => self.sunrise,
            Prayer::Dhuhr => self.dhuhr,
            Prayer::Asr => self.asr,
            Prayer::Maghrib => self.maghrib,
            Prayer::Isha => self.isha,
        }
    }

    /// Field-wise sum
    pub fn plus(&self, other: &PrayerAdjustments) -> PrayerAdjustments {
        PrayerAdjustments {
            fajr: self.fajr + other.fajr,
            sunrise: self.sunrise + other.sunrise,
            dhuhr: self.dhuhr + other.dhuhr,
            asr: self.asr + other.asr,
            maghrib: self.maghrib + other.maghrib,
            isha: self.isha + other.isha,
        }
    }
}

// ============================================================================
// Conventions
// ============================================================================

/// Asr shadow-length convention
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AsrTime {
    /// Shadow equals object length (majority of schools)
    #[default]
    Jumhoor,
    /// Shadow equals twice the object length
    Hanafi,
}

impl AsrTime {
    pub fn shadow_factor(self) -> f64 {
        match self {
            AsrTime::Jumhoor => 1.0,
            AsrTime::Hanafi => 2.0,
        }
    }
}

/// Bound on fajr and isha where twilight never fully ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HighLatitudeRule {
    #[default]
    MiddleOfTheNight,
    SeventhOfTheNight,
    TwilightAngle,
}

impl HighLatitudeRule {
    /// Fraction of the night allowed between fajr and sunrise (or sunset and isha)
    pub fn night_portion(self, angle: f64) -> f64 {
        match self {
            HighLatitudeRule::MiddleOfTheNight => 1.0 / 2.0,
            HighLatitudeRule::SeventhOfTheNight => 1.0 / 7.0,
            HighLatitudeRule::TwilightAngle => angle / 60.0,
        }
    }
}

/// What to do when the sun does not rise or set on the requested day
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PolarCircleResolution {
    /// Fail with [`CalcError::Unresolved`]
    #[default]
    Unresolved,
    /// Use the closest latitude where the sun rises and sets
    AqrabBalad,
    /// Use the closest day where the sun rises and sets
    AqrabYaum,
}

/// Rounding applied to every final instant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Rounding {
    #[default]
    Nearest,
    Up,
    None,
}

impl Rounding {
    pub fn apply(self, time: DateTime<Utc>) -> DateTime<Utc> {
        let seconds = time.second();
        let truncated = time
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(time);
        match self {
            Rounding::None => time,
            Rounding::Nearest if seconds >= 30 => truncated + Duration::minutes(1),
            Rounding::Nearest => truncated,
            Rounding::Up if time != truncated => truncated + Duration::minutes(1),
            Rounding::Up => truncated,
        }
    }
}

// ============================================================================
// Methods
// ============================================================================

/// User-defined angle set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomMethod {
    /// Sun depression at fajr, degrees. Default: 18
    pub fajr_angle: f64,
    /// Sun depression at isha, degrees. Default: 18
    pub isha_angle: f64,
    /// Minutes after sunset for isha; overrides `isha_angle` when non-zero. Default: 0
    pub isha_interval: u32,
    /// Sun depression at maghrib, degrees. Default: none (maghrib = sunset)
    pub maghrib_angle: Option<f64>,
    /// Method-level minute adjustments
    pub method_adjustments: PrayerAdjustments,
}

impl Default for CustomMethod {
    fn default() -> Self {
        Self {
            fajr_angle: 18.0,
            isha_angle: 18.0,
            isha_interval: 0,
            maghrib_angle: None,
            method_adjustments: PrayerAdjustments::default(),
        }
    }
}

/// Named presets plus a custom angle set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Method {
    MuslimWorldLeague,
    Egyptian,
    Karachi,
    #[default]
    UmmAlQura,
    Dubai,
    MoonsightingCommittee,
    NorthAmerica,
    Kuwait,
    Qatar,
    Singapore,
    Tehran,
    Turkey,
    Standard,
    Jordan,
    Libya,
    Palestine,
    Sudan,
    Algeria,
    Bahrain,
    Brunei,
    Indonesia,
    Malaysia,
    France,
    Germany,
    Iraq,
    Morocco,
    Russia,
    Oman,
    Syria,
    Tunisia,
    Yemen,
    Custom(CustomMethod),
}

/// Resolved parameters of a method
#[derive(Debug, Clone, PartialEq)]
pub struct MethodParameters {
    pub fajr_angle: f64,
    pub isha_angle: f64,
    /// Minutes after sunset; zero means isha is angle based
    pub isha_interval: u32,
    pub maghrib_angle: Option<f64>,
    pub method_adjustments: PrayerAdjustments,
    pub rounding: Rounding,
}

impl MethodParameters {
    fn angles(fajr_angle: f64, isha_angle: f64) -> Self {
        Self {
            fajr_angle,
            isha_angle,
            isha_interval: 0,
            maghrib_angle: None,
            method_adjustments: PrayerAdjustments::default(),
            rounding: Rounding::Nearest,
        }
    }

    fn interval(mut self, minutes: u32) -> Self {
        self.isha_interval = minutes;
        self
    }

    fn adjust(mut self, adjustments: PrayerAdjustments) -> Self {
        self.method_adjustments = adjustments;
        self
    }

    pub fn uses_isha_interval(&self) -> bool {
        self.isha_interval > 0
    }
}

fn adj(sunrise: i32, dhuhr: i32, asr: i32, maghrib: i32) -> PrayerAdjustments {
    PrayerAdjustments {
        sunrise,
        dhuhr,
        asr,
        maghrib,
        ..PrayerAdjustments::default()
    }
}

impl Method {
    /// Resolve to concrete angles, interval and adjustments
    pub fn parameters(&self) -> MethodParameters {
        use Method::*;
        match self {
            MuslimWorldLeague => MethodParameters::angles(18.0, 17.0).adjust(adj(0, 1, 0, 0)),
            Egyptian => MethodParameters::angles(19.5, 17.5).adjust(adj(0, 1, 0, 0)),
            Karachi => MethodParameters::angles(18.0, 18.0).adjust(adj(0, 1, 0, 0)),
            UmmAlQura => MethodParameters::angles(18.5, 0.0).interval(90),
            Dubai => MethodParameters::angles(18.2, 18.2).adjust(adj(-3, 3, 3, 3)),
            MoonsightingCommittee => MethodParameters::angles(18.0, 18.0).adjust(adj(0, 5, 0, 3)),
            NorthAmerica => MethodParameters::angles(15.0, 15.0).adjust(adj(0, 1, 0, 0)),
            Kuwait => MethodParameters::angles(18.0, 17.5),
            Qatar => MethodParameters::angles(18.0, 0.0).interval(90),
            Singapore => MethodParameters {
                rounding: Rounding::Up,
                ..MethodParameters::angles(20.0, 18.0).adjust(adj(0, 1, 0, 0))
            },
            Tehran => MethodParameters {
                maghrib_angle: Some(4.5),
                ..MethodParameters::angles(17.7, 14.0)
            },
            Turkey => MethodParameters::angles(18.0, 17.0).adjust(adj(-7, 5, 4, 7)),
            Standard | Jordan | Libya | Palestine | Sudan => MethodParameters::angles(18.0, 18.0),
            Algeria => MethodParameters::angles(18.0, 17.0).adjust(adj(0, 0, 0, 3)),
            Bahrain => MethodParameters::angles(18.0, 0.0).interval(90),
            Brunei | Indonesia | Malaysia => {
                MethodParameters::angles(20.0, 18.0).adjust(adj(0, 1, 0, 0))
            }
            France => MethodParameters::angles(12.0, 12.0),
            Germany => MethodParameters::angles(18.0, 16.5),
            Iraq => MethodParameters::angles(19.5, 17.5).adjust(adj(0, 7, 7, 4)),
            Morocco => MethodParameters::angles(19.0, 17.0).adjust(adj(0, 5, 0, 2)),
            Russia => MethodParameters::angles(16.0, 15.0),
            Oman => MethodParameters::angles(18.0, 18.0).adjust(adj(0, 5, 5, 5)),
            Syria => MethodParameters::angles(18.5, 17.5).adjust(adj(-7, 5, 3, 7)),
            Tunisia => MethodParameters::angles(18.0, 18.0).adjust(adj(0, 7, 0, 2)),
            Yemen => MethodParameters::angles(18.0, 17.0).adjust(adj(0, 2, 0, 0)),
            Custom(custom) => MethodParameters {
                maghrib_angle: custom.maghrib_angle,
                ..MethodParameters::angles(custom.fajr_angle, custom.isha_angle)
                    .interval(custom.isha_interval)
                    .adjust(custom.method_adjustments)
            },
        }
    }

    /// Reject custom angles outside the horizon-to-nadir range
    pub fn validate(&self) -> Result<()> {
        let Method::Custom(custom) = self else {
            return Ok(());
        };
        let valid = |angle: f64| angle.is_finite() && (0.0..90.0).contains(&angle);
        if !valid(custom.fajr_angle) {
            return Err(CalcError::InvalidMethod(format!(
                "fajr angle {} out of range",
                custom.fajr_angle
            )));
        }
        if custom.isha_interval == 0 && !valid(custom.isha_angle) {
            return Err(CalcError::InvalidMethod(format!(
                "isha angle {} out of range",
                custom.isha_angle
            )));
        }
        if let Some(angle) = custom.maghrib_angle {
            if !valid(angle) {
                return Err(CalcError::InvalidMethod(format!(
                    "maghrib angle {} out of range",
                    angle
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    #[case(Method::Singapore, 20.0, 18.0, 0)]
    #[case(Method::UmmAlQura, 18.5, 0.0, 90)]
    #[case(Method::Bahrain, 18.0, 0.0, 90)]
    #[case(Method::Germany, 18.0, 16.5, 0)]
    #[case(Method::France, 12.0, 12.0, 0)]
    fn test_method_angles(
        #[case] method: Method,
        #[case] fajr: f64,
        #[case] isha: f64,
        #[case] interval: u32,
    ) {
        let params = method.parameters();
        assert_eq!(params.fajr_angle, fajr);
        assert_eq!(params.isha_angle, isha);
        assert_eq!(params.isha_interval, interval);
    }

    #[test]
    fn test_syria_adjustments() {
        let params = Method::Syria.parameters();
        assert_eq!(params.method_adjustments.sunrise, -7);
        assert_eq!(params.method_adjustments.maghrib, 7);
    }

    #[test]
    fn test_custom_method_passes_through() {
        let method = Method::Custom(CustomMethod {
            fajr_angle: 15.0,
            isha_angle: 14.0,
            maghrib_angle: Some(4.0),
            ..CustomMethod::default()
        });
        let params = method.parameters();
        assert_eq!(params.fajr_angle, 15.0);
        assert_eq!(params.maghrib_angle, Some(4.0));
        assert!(method.validate().is_ok());
    }

    #[test]
    fn test_custom_method_rejects_bad_angle() {
        let method = Method::Custom(CustomMethod {
            fajr_angle: 95.0,
            ..CustomMethod::default()
        });
        assert!(matches!(method.validate(), Err(CalcError::InvalidMethod(_))));
    }

    #[test]
    fn test_rounding() {
        let t = Utc.with_ymd_and_hms(2022, 1, 1, 5, 20, 31).unwrap();
        assert_eq!(Rounding::Nearest.apply(t).minute(), 21);
        assert_eq!(Rounding::Up.apply(t).minute(), 21);

        let t = Utc.with_ymd_and_hms(2022, 1, 1, 5, 20, 1).unwrap();
        assert_eq!(Rounding::Nearest.apply(t).minute(), 20);
        assert_eq!(Rounding::Up.apply(t).minute(), 21);

        let exact = Utc.with_ymd_and_hms(2022, 1, 1, 5, 20, 0).unwrap();
        assert_eq!(Rounding::Up.apply(exact), exact);
        assert_eq!(Rounding::None.apply(t), t);
    }

    #[test]
    fn test_method_serde_names() {
        let json = serde_json::to_string(&Method::UmmAlQura).unwrap();
        assert_eq!(json, "\"ummAlQura\"");
        let parsed: Method = serde_json::from_str("\"singapore\"").unwrap();
        assert_eq!(parsed, Method::Singapore);
    }
}
