//! The calculation seam and its default solar implementation

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::config::CalculationConfig;
use crate::error::{CalcError, Result};
use crate::hijri::HijriDate;
use crate::method::{Method, MethodParameters, PolarCircleResolution};
use crate::prayer::{Prayer, TimeName};
use crate::solar::{SolarDay, RISE_SET_ANGLE};
use crate::times::{NightMilestoneSet, PrayerTimeSet};

/// Latitude below which the sun always rises and sets
const UNSAFE_LATITUDE: f64 = 65.0;
const LATITUDE_VARIATION_STEP: f64 = 0.5;
/// Furthest day searched by `PolarCircleResolution::AqrabYaum`
const MAX_DAY_SEARCH: i64 = 183;
/// Interval-based isha during Ramadan, minutes
const RAMADAN_ISHA_INTERVAL: u32 = 120;
/// Extra delay of angle-based isha during Ramadan, minutes
const RAMADAN_ISHA_DELAY: i64 = 30;

/// Computes the instants of a day and of the night that follows it
///
/// Implementations must be deterministic and side-effect free: the
/// schedulers call them whenever they (re)arm.
pub trait TimesCalculator: Send + Sync {
    /// The six prayer instants of `config.date`
    fn day_times(&self, config: &CalculationConfig) -> Result<PrayerTimeSet>;

    /// Night milestones of the night beginning at `config.date`'s maghrib
    fn night_times(&self, config: &CalculationConfig) -> Result<NightMilestoneSet> {
        let today = self.day_times(config)?;
        let next = config
            .date
            .succ_opt()
            .ok_or_else(|| CalcError::InvalidDate(config.date.to_string()))?;
        let tomorrow = self.day_times(&config.on(next))?;
        NightMilestoneSet::from_prayer_times(&today, &tomorrow)
    }
}

/// Prayer times from the sun's position
#[derive(Debug, Clone, Copy, Default)]
pub struct SolarCalculator;

impl SolarCalculator {
    pub fn new() -> Self {
        Self
    }
}

/// Local solar hours before high-latitude bounds are applied
#[derive(Debug, Clone, Copy)]
struct Estimate {
    fajr: Option<f64>,
    sunrise: Option<f64>,
    dhuhr: f64,
    asr: Option<f64>,
    sunset: Option<f64>,
    isha: Option<f64>,
}

impl Estimate {
    fn compute(day: &SolarDay, params: &MethodParameters, shadow_factor: f64) -> Self {
        let mut estimate = Estimate {
            fajr: Some(5.0),
            sunrise: Some(6.0),
            dhuhr: 12.0,
            asr: Some(13.0),
            sunset: Some(18.0),
            isha: Some(18.0),
        };
        for _ in 0..2 {
            estimate = Estimate {
                fajr: estimate
                    .fajr
                    .and_then(|h| day.time_for_angle(params.fajr_angle, h, true)),
                sunrise: estimate
                    .sunrise
                    .and_then(|h| day.time_for_angle(RISE_SET_ANGLE, h, true)),
                dhuhr: day.transit(estimate.dhuhr),
                asr: estimate.asr.and_then(|h| day.asr(shadow_factor, h)),
                sunset: estimate
                    .sunset
                    .and_then(|h| day.time_for_angle(RISE_SET_ANGLE, h, false)),
                isha: estimate
                    .isha
                    .and_then(|h| day.time_for_angle(params.isha_angle, h, false)),
            };
        }
        estimate
    }

    fn resolves(&self) -> bool {
        self.sunrise.is_some() && self.sunset.is_some()
    }
}

/// A solved day, possibly borrowed from another latitude or date
struct Solved {
    day: SolarDay,
    estimate: Estimate,
    /// Date whose midnight the hours are measured from
    date: NaiveDate,
}

impl SolarCalculator {
    fn solve(
        &self,
        config: &CalculationConfig,
        params: &MethodParameters,
        shadow_factor: f64,
    ) -> Result<Solved> {
        let attempt = |date: NaiveDate, latitude: f64| {
            let day = SolarDay::new(date, latitude, config.longitude);
            let estimate = Estimate::compute(&day, params, shadow_factor);
            estimate.resolves().then_some(Solved {
                day,
                estimate,
                date,
            })
        };

        if let Some(solved) = attempt(config.date, config.latitude) {
            return Ok(solved);
        }

        let resolved = match config.polar_circle_resolution {
            PolarCircleResolution::Unresolved => None,
            PolarCircleResolution::AqrabBalad => {
                let mut latitude = config.latitude;
                let mut found = None;
                while found.is_none() && latitude.abs() >= UNSAFE_LATITUDE {
                    latitude -= latitude.signum() * LATITUDE_VARIATION_STEP;
                    found = attempt(config.date, latitude);
                }
                if found.is_some() {
                    tracing::debug!("resolved polar day at latitude {}", latitude);
                }
                found
            }
            PolarCircleResolution::AqrabYaum => (1..=MAX_DAY_SEARCH)
                .flat_map(|days| [days, -days])
                .filter_map(|offset| config.date.checked_add_signed(Duration::days(offset)))
                .find_map(|date| attempt(date, config.latitude)),
        };

        resolved.ok_or(CalcError::Unresolved {
            name: TimeName::Sunrise,
            date: config.date,
            latitude: config.latitude,
        })
    }
}

fn is_ramadan_extended(config: &CalculationConfig) -> bool {
    HijriDate::from_gregorian(config.date).is_ramadan()
        && (config.method == Method::UmmAlQura || config.adjust_for_ramadan)
}

fn unresolved(config: &CalculationConfig, prayer: Prayer) -> CalcError {
    CalcError::Unresolved {
        name: prayer.into(),
        date: config.date,
        latitude: config.latitude,
    }
}

impl TimesCalculator for SolarCalculator {
    fn day_times(&self, config: &CalculationConfig) -> Result<PrayerTimeSet> {
        config.validate()?;

        let params = config.method.parameters();
        let rule = config.high_latitude_rule;
        let ramadan = is_ramadan_extended(config);
        let solved = self.solve(config, &params, config.asr_time.shadow_factor())?;
        let Solved { day, estimate, date } = solved;

        let sunrise = estimate.sunrise.ok_or_else(|| unresolved(config, Prayer::Sunrise))?;
        let sunset = estimate.sunset.ok_or_else(|| unresolved(config, Prayer::Maghrib))?;
        let asr = estimate.asr.ok_or_else(|| unresolved(config, Prayer::Asr))?;
        let night = (sunrise - sunset).rem_euclid(24.0);

        let fajr_portion = rule.night_portion(params.fajr_angle) * night;
        let fajr = match estimate.fajr {
            Some(fajr) if sunrise - fajr <= fajr_portion => fajr,
            _ => sunrise - fajr_portion,
        };

        let isha = if params.uses_isha_interval() {
            let interval = if ramadan {
                RAMADAN_ISHA_INTERVAL
            } else {
                params.isha_interval
            };
            sunset + f64::from(interval) / 60.0
        } else {
            let isha_portion = rule.night_portion(params.isha_angle) * night;
            let isha = match estimate.isha {
                Some(isha) if isha - sunset <= isha_portion => isha,
                _ => sunset + isha_portion,
            };
            if ramadan {
                isha + RAMADAN_ISHA_DELAY as f64 / 60.0
            } else {
                isha
            }
        };

        let maghrib = params
            .maghrib_angle
            .and_then(|angle| day.time_for_angle(angle, sunset, false))
            .filter(|&m| m > sunset && m < isha)
            .unwrap_or(sunset);

        let hours = [fajr, sunrise, estimate.dhuhr, asr, maghrib, isha];
        let adjustments = params.method_adjustments.plus(&config.adjustments);
        let shift = config.date.signed_duration_since(date);
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| CalcError::InvalidDate(date.to_string()))?
            .and_utc();

        let mut times: [DateTime<Utc>; 6] = [midnight; 6];
        for prayer in Prayer::ALL {
            let utc_hours = day.to_utc_hours(hours[prayer.index()]);
            let base = midnight + shift + Duration::milliseconds((utc_hours * 3_600_000.0).round() as i64);
            let adjusted = base + Duration::minutes(i64::from(adjustments.get(prayer)));
            times[prayer.index()] = params.rounding.apply(adjusted);
        }

        tracing::debug!(
            "computed day times for {} at ({}, {}) with {:?}",
            config.date,
            config.latitude,
            config.longitude,
            config.method
        );
        PrayerTimeSet::new(config.date, times)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::{HighLatitudeRule, PrayerAdjustments};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_interval_isha() {
        let config = CalculationConfig::for_date(date(2022, 1, 10), 21.4225, 39.8262);
        let times = SolarCalculator.day_times(&config).unwrap();
        let gap = times.time(Prayer::Isha) - times.time(Prayer::Maghrib);
        // both instants are rounded to the minute
        assert!((gap.num_minutes() - 90).abs() <= 1, "{}", gap);
    }

    #[test]
    fn test_ramadan_extends_umm_al_qura_isha() {
        let config = CalculationConfig::for_date(date(2023, 4, 5), 21.4225, 39.8262);
        let times = SolarCalculator.day_times(&config).unwrap();
        let gap = times.time(Prayer::Isha) - times.time(Prayer::Maghrib);
        assert!((gap.num_minutes() - 120).abs() <= 1, "{}", gap);
    }

    #[test]
    fn test_ramadan_flag_delays_angle_isha() {
        let base = CalculationConfig::for_date(date(2023, 4, 5), 2.9213, 101.6559)
            .with_method(Method::Singapore);
        let mut flagged = base.clone();
        flagged.adjust_for_ramadan = true;

        let plain = SolarCalculator.day_times(&base).unwrap();
        let extended = SolarCalculator.day_times(&flagged).unwrap();
        let delta = extended.time(Prayer::Isha) - plain.time(Prayer::Isha);
        assert_eq!(delta.num_minutes(), 30);
    }

    #[test]
    fn test_hanafi_asr_is_later() {
        let base = CalculationConfig::for_date(date(2022, 3, 1), 24.86, 67.0)
            .with_method(Method::Karachi);
        let mut hanafi = base.clone();
        hanafi.asr_time = crate::method::AsrTime::Hanafi;

        let jumhoor = SolarCalculator.day_times(&base).unwrap();
        let hanafi = SolarCalculator.day_times(&hanafi).unwrap();
        assert!(hanafi.time(Prayer::Asr) > jumhoor.time(Prayer::Asr));
    }

    #[test]
    fn test_adjustments_shift_minutes() {
        let base = CalculationConfig::for_date(date(2022, 1, 1), 2.9213, 101.6559)
            .with_method(Method::Kuwait);
        let adjusted = base.clone().with_adjustments(PrayerAdjustments {
            maghrib: 4,
            ..PrayerAdjustments::default()
        });

        let a = SolarCalculator.day_times(&base).unwrap();
        let b = SolarCalculator.day_times(&adjusted).unwrap();
        assert_eq!((b.time(Prayer::Maghrib) - a.time(Prayer::Maghrib)).num_minutes(), 4);
        assert_eq!(b.time(Prayer::Fajr), a.time(Prayer::Fajr));
    }

    #[test]
    fn test_polar_night_unresolved_errors() {
        let config = CalculationConfig::for_date(date(2022, 12, 21), 78.22, 15.65)
            .with_method(Method::MuslimWorldLeague);
        let err = SolarCalculator.day_times(&config).unwrap_err();
        assert!(matches!(err, CalcError::Unresolved { .. }));
    }

    #[test]
    fn test_polar_night_resolutions() {
        let mut config = CalculationConfig::for_date(date(2022, 12, 21), 78.22, 15.65)
            .with_method(Method::MuslimWorldLeague);
        config.high_latitude_rule = HighLatitudeRule::SeventhOfTheNight;

        config.polar_circle_resolution = PolarCircleResolution::AqrabBalad;
        let balad = SolarCalculator.day_times(&config).unwrap();
        assert_eq!(balad.date(), config.date);

        config.polar_circle_resolution = PolarCircleResolution::AqrabYaum;
        let yaum = SolarCalculator.day_times(&config).unwrap();
        assert_eq!(yaum.date(), config.date);
        assert_eq!(
            yaum.time(Prayer::Dhuhr).date_naive(),
            config.date,
            "borrowed times are moved back onto the requested date"
        );
    }

    #[test]
    fn test_high_latitude_summer_bounds_fajr() {
        // Twilight never ends at 57N in late June
        let config = CalculationConfig::for_date(date(2022, 6, 21), 57.7, 11.97)
            .with_method(Method::MuslimWorldLeague);
        let times = SolarCalculator.day_times(&config).unwrap();
        assert!(times.time(Prayer::Fajr) < times.time(Prayer::Sunrise));
        assert!(times.time(Prayer::Isha) > times.time(Prayer::Maghrib));
    }

    #[test]
    fn test_night_times_follow_maghrib() {
        let config = CalculationConfig::for_date(date(2022, 1, 1), 2.9213, 101.6559)
            .with_method(Method::Singapore);
        let day = SolarCalculator.day_times(&config).unwrap();
        let night = SolarCalculator.night_times(&config).unwrap();
        assert!(night.middle_of_the_night() > day.time(Prayer::Isha));
        assert!(night.last_third_of_the_night() > night.middle_of_the_night());
    }

    #[test]
    fn test_invalid_config_rejected_before_calculation() {
        let config = CalculationConfig::for_date(date(2022, 1, 1), 95.0, 0.0);
        assert_eq!(
            SolarCalculator.day_times(&config).unwrap_err(),
            CalcError::InvalidLatitude(95.0)
        );
    }
}
