//! Computed instants for one day and one night

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::error::{CalcError, Result};
use crate::method::Rounding;
use crate::prayer::{Prayer, TimeName};

/// One prayer and its instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PrayerTime {
    pub prayer: Prayer,
    pub time: DateTime<Utc>,
}

// ============================================================================
// PrayerTimeSet
// ============================================================================

/// The six instants of a calculation date, strictly increasing
///
/// Built once by a calculator and never mutated; a new configuration
/// produces a new set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrayerTimeSet {
    date: NaiveDate,
    times: [DateTime<Utc>; 6],
}

impl PrayerTimeSet {
    /// Build a set, rejecting instants that are not strictly increasing
    pub fn new(date: NaiveDate, times: [DateTime<Utc>; 6]) -> Result<Self> {
        for pair in Prayer::ALL.windows(2) {
            let (earlier, later) = (pair[0], pair[1]);
            if times[later.index()] <= times[earlier.index()] {
                return Err(CalcError::NotChronological {
                    earlier: earlier.into(),
                    earlier_time: times[earlier.index()],
                    later: later.into(),
                    later_time: times[later.index()],
                });
            }
        }
        Ok(Self { date, times })
    }

    /// Calculation date the set belongs to
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn time(&self, prayer: Prayer) -> DateTime<Utc> {
        self.times[prayer.index()]
    }

    /// Prayers with their instants, in chronological order
    pub fn iter(&self) -> impl Iterator<Item = PrayerTime> + '_ {
        Prayer::ALL.iter().map(move |&prayer| PrayerTime {
            prayer,
            time: self.time(prayer),
        })
    }

    /// The last prayer whose instant is at or before `now`
    ///
    /// `None` before fajr.
    pub fn current_prayer(&self, now: DateTime<Utc>) -> Option<PrayerTime> {
        self.iter().filter(|p| p.time <= now).last()
    }

    /// The first prayer whose instant is after `now`
    ///
    /// `None` after isha.
    pub fn next_prayer(&self, now: DateTime<Utc>) -> Option<PrayerTime> {
        self.iter().find(|p| p.time > now)
    }
}

// ============================================================================
// NightMilestoneSet
// ============================================================================

/// Middle and last third of the night starting at a day's maghrib
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NightMilestoneSet {
    middle_of_the_night: DateTime<Utc>,
    last_third_of_the_night: DateTime<Utc>,
}

impl NightMilestoneSet {
    pub fn new(middle: DateTime<Utc>, last_third: DateTime<Utc>) -> Result<Self> {
        if last_third <= middle {
            return Err(CalcError::NotChronological {
                earlier: TimeName::MiddleOfTheNight,
                earlier_time: middle,
                later: TimeName::LastThirdOfTheNight,
                later_time: last_third,
            });
        }
        Ok(Self {
            middle_of_the_night: middle,
            last_third_of_the_night: last_third,
        })
    }

    /// Derive from today's maghrib and tomorrow's fajr
    pub fn from_prayer_times(today: &PrayerTimeSet, tomorrow: &PrayerTimeSet) -> Result<Self> {
        let maghrib = today.time(Prayer::Maghrib);
        let night = tomorrow.time(Prayer::Fajr) - maghrib;
        let middle = Rounding::Nearest.apply(maghrib + night / 2);
        let last_third = Rounding::Nearest.apply(maghrib + night * 2 / 3);
        Self::new(middle, last_third)
    }

    pub fn middle_of_the_night(&self) -> DateTime<Utc> {
        self.middle_of_the_night
    }

    pub fn last_third_of_the_night(&self) -> DateTime<Utc> {
        self.last_third_of_the_night
    }

    /// Both milestones in order
    pub fn iter(&self) -> impl Iterator<Item = (TimeName, DateTime<Utc>)> {
        [
            (TimeName::MiddleOfTheNight, self.middle_of_the_night),
            (TimeName::LastThirdOfTheNight, self.last_third_of_the_night),
        ]
        .into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn day(date: NaiveDate, base: DateTime<Utc>) -> PrayerTimeSet {
        let offsets = [0, 84, 446, 650, 801, 878];
        let times = offsets.map(|m| base + Duration::minutes(m));
        PrayerTimeSet::new(date, times).unwrap()
    }

    fn jan(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 1, d).unwrap()
    }

    #[test]
    fn test_rejects_unordered_times() {
        let base = Utc.with_ymd_and_hms(2021, 12, 31, 21, 55, 0).unwrap();
        let mut times = [base; 6];
        for (i, t) in times.iter_mut().enumerate() {
            *t = base + Duration::hours(i as i64);
        }
        times[3] = times[2];

        let err = PrayerTimeSet::new(jan(1), times).unwrap_err();
        assert!(matches!(
            err,
            CalcError::NotChronological {
                earlier: TimeName::Dhuhr,
                later: TimeName::Asr,
                ..
            }
        ));
    }

    #[test]
    fn test_current_and_next_prayer() {
        let base = Utc.with_ymd_and_hms(2021, 12, 31, 21, 55, 0).unwrap();
        let set = day(jan(1), base);

        assert!(set.current_prayer(base - Duration::minutes(1)).is_none());
        assert_eq!(set.next_prayer(base - Duration::minutes(1)).unwrap().prayer, Prayer::Fajr);

        let after_dhuhr = set.time(Prayer::Dhuhr) + Duration::minutes(5);
        assert_eq!(set.current_prayer(after_dhuhr).unwrap().prayer, Prayer::Dhuhr);
        assert_eq!(set.next_prayer(after_dhuhr).unwrap().prayer, Prayer::Asr);

        let at_isha = set.time(Prayer::Isha);
        assert_eq!(set.current_prayer(at_isha).unwrap().prayer, Prayer::Isha);
        assert!(set.next_prayer(at_isha).is_none());
    }

    #[test]
    fn test_night_from_maghrib_and_next_fajr() {
        let base = Utc.with_ymd_and_hms(2021, 12, 31, 21, 55, 0).unwrap();
        let today = day(jan(1), base);
        let tomorrow = day(jan(2), base + Duration::days(1));

        let night = NightMilestoneSet::from_prayer_times(&today, &tomorrow).unwrap();
        let maghrib = today.time(Prayer::Maghrib);
        let length = tomorrow.time(Prayer::Fajr) - maghrib;

        assert_eq!(
            night.middle_of_the_night(),
            Rounding::Nearest.apply(maghrib + length / 2)
        );
        assert!(night.middle_of_the_night() < night.last_third_of_the_night());
        assert!(night.last_third_of_the_night() < tomorrow.time(Prayer::Fajr));
    }
}
