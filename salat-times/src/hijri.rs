//! Tabular Islamic calendar, enough to tell whether a date falls in Ramadan

use std::fmt;

use chrono::{Datelike, NaiveDate};

/// Month number of Ramadan
pub const RAMADAN: u32 = 9;

/// A date in the tabular (arithmetic) Hijri calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HijriDate {
    pub year: i64,
    pub month: u32,
    pub day: u32,
}

impl HijriDate {
    /// Convert from the Gregorian calendar
    ///
    /// The tabular calendar can differ by a day from sighting-based calendars.
    pub fn from_gregorian(date: NaiveDate) -> Self {
        // Julian day number at noon of `date`
        let jd = i64::from(date.num_days_from_ce()) + 1_721_425;

        let mut l = jd - 1_948_440 + 10_632;
        let n = (l - 1) / 10_631;
        l = l - 10_631 * n + 354;
        let j = ((10_985 - l) / 5_316) * ((50 * l) / 17_719) + (l / 5_670) * ((43 * l) / 15_238);
        l = l - ((30 - j) / 15) * ((17_719 * j) / 50) - (j / 16) * ((15_238 * j) / 43) + 29;
        let month = (24 * l) / 709;
        let day = l - (709 * month) / 24;
        let year = 30 * n + j - 30;

        Self {
            year,
            month: month as u32,
            day: day as u32,
        }
    }

    pub fn is_ramadan(&self) -> bool {
        self.month == RAMADAN
    }
}

impl fmt::Display for HijriDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}-{:02} AH", self.year, self.month, self.day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_dates() {
        let d = HijriDate::from_gregorian(NaiveDate::from_ymd_opt(2023, 4, 5).unwrap());
        assert_eq!(d, HijriDate { year: 1444, month: 9, day: 14 });
        assert!(d.is_ramadan());
        assert_eq!(d.to_string(), "1444-09-14 AH");

        let d = HijriDate::from_gregorian(NaiveDate::from_ymd_opt(2022, 1, 1).unwrap());
        assert_eq!((d.year, d.month), (1443, 5));
        assert!(!d.is_ramadan());
    }
}
