//! Low-precision solar position and the times the sun crosses given altitudes
//!
//! Times are expressed in fractional hours of local mean solar time for the
//! calculation date; `to_utc_hours` converts them for the observer longitude.

use chrono::{Datelike, NaiveDate};

/// Apparent altitude of the sun's upper limb at sunrise and sunset, degrees below horizon
pub const RISE_SET_ANGLE: f64 = 0.833;

const J2000: f64 = 2_451_545.0;

fn fix(value: f64, period: f64) -> f64 {
    value.rem_euclid(period)
}

fn sin_deg(d: f64) -> f64 {
    d.to_radians().sin()
}

fn cos_deg(d: f64) -> f64 {
    d.to_radians().cos()
}

/// Julian date at 0h UT of a Gregorian calendar date
pub fn julian_date(date: NaiveDate) -> f64 {
    let (mut year, mut month) = (f64::from(date.year()), f64::from(date.month()));
    if month <= 2.0 {
        year -= 1.0;
        month += 12.0;
    }
    let a = (year / 100.0).floor();
    let b = 2.0 - a + (a / 4.0).floor();
    (365.25 * (year + 4716.0)).floor() + (30.6001 * (month + 1.0)).floor()
        + f64::from(date.day())
        + b
        - 1524.5
}

/// Declination and equation of time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunPosition {
    /// Degrees
    pub declination: f64,
    /// Hours
    pub equation_of_time: f64,
}

impl SunPosition {
    pub fn at(jd: f64) -> Self {
        let d = jd - J2000;
        let g = fix(357.529 + 0.985_600_28 * d, 360.0);
        let q = fix(280.459 + 0.985_647_36 * d, 360.0);
        let l = fix(q + 1.915 * sin_deg(g) + 0.020 * sin_deg(2.0 * g), 360.0);
        let e = 23.439 - 0.000_000_36 * d;

        let right_ascension = (cos_deg(e) * sin_deg(l)).atan2(cos_deg(l)).to_degrees() / 15.0;
        let equation_of_time = q / 15.0 - fix(right_ascension, 24.0);
        let declination = (sin_deg(e) * sin_deg(l)).asin().to_degrees();

        Self {
            declination,
            equation_of_time,
        }
    }
}

/// Solar day at one place
#[derive(Debug, Clone, Copy)]
pub struct SolarDay {
    /// Julian date of local mean midnight
    jd: f64,
    latitude: f64,
    longitude: f64,
}

impl SolarDay {
    pub fn new(date: NaiveDate, latitude: f64, longitude: f64) -> Self {
        Self {
            jd: julian_date(date) - longitude / (15.0 * 24.0),
            latitude,
            longitude,
        }
    }

    fn position(&self, hours: f64) -> SunPosition {
        SunPosition::at(self.jd + hours / 24.0)
    }

    /// Solar noon, refined around the `hours` estimate
    pub fn transit(&self, hours: f64) -> f64 {
        fix(12.0 - self.position(hours).equation_of_time, 24.0)
    }

    /// Time the sun is `depression` degrees below the horizon
    ///
    /// `morning` selects the crossing before noon. `None` when the sun never
    /// reaches that altitude on this day.
    pub fn time_for_angle(&self, depression: f64, hours: f64, morning: bool) -> Option<f64> {
        let declination = self.position(hours).declination;
        let noon = self.transit(hours);
        let cos_h = (-sin_deg(depression) - sin_deg(declination) * sin_deg(self.latitude))
            / (cos_deg(declination) * cos_deg(self.latitude));
        if !(-1.0..=1.0).contains(&cos_h) {
            return None;
        }
        let h = cos_h.acos().to_degrees() / 15.0;
        Some(if morning { noon - h } else { noon + h })
    }

    /// Afternoon time when shadows reach `shadow_factor` times object length plus the noon shadow
    pub fn asr(&self, shadow_factor: f64, hours: f64) -> Option<f64> {
        let declination = self.position(hours).declination;
        let altitude = (1.0 / (shadow_factor + (self.latitude - declination).abs().to_radians().tan()))
            .atan()
            .to_degrees();
        self.time_for_angle(-altitude, hours, false)
    }

    /// Convert local mean solar hours to UTC hours from 0h of the date
    pub fn to_utc_hours(&self, hours: f64) -> f64 {
        hours - self.longitude / 15.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_julian_date_of_j2000() {
        let jd = julian_date(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());
        assert_eq!(jd, 2_451_544.5);
    }

    #[test]
    fn test_declination_near_solstices() {
        let june = SunPosition::at(julian_date(NaiveDate::from_ymd_opt(2022, 6, 21).unwrap()));
        let december =
            SunPosition::at(julian_date(NaiveDate::from_ymd_opt(2022, 12, 21).unwrap()));
        assert!((june.declination - 23.44).abs() < 0.1);
        assert!((december.declination + 23.44).abs() < 0.1);
    }

    #[test]
    fn test_polar_night_has_no_sunrise() {
        let tromso = SolarDay::new(NaiveDate::from_ymd_opt(2022, 12, 21).unwrap(), 69.65, 18.96);
        assert!(tromso.time_for_angle(RISE_SET_ANGLE, 6.0, true).is_none());
    }

    #[test]
    fn test_noon_near_twelve_at_greenwich() {
        let greenwich = SolarDay::new(NaiveDate::from_ymd_opt(2022, 4, 15).unwrap(), 51.48, 0.0);
        let noon = greenwich.transit(12.0);
        assert!((noon - 12.0).abs() < 0.1, "{}", noon);
    }
}
