//! What a chain will emit for one day or night, as plain data
//!
//! Planning is separate from sleeping so the emission rules can be checked
//! without a runtime.

use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use salat_times::{IqamaWaits, NightMilestoneSet, Prayer, PrayerTimeSet, TimeName};

/// One scheduled emission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Planned {
    pub name: TimeName,
    /// Instant the emission stands for
    pub at: DateTime<Utc>,
    /// Time from arming until the emission
    pub delay: Duration,
    /// Emitting this one ends the chain's day
    pub completes: bool,
}

impl Planned {
    /// `None` when `at` is already behind `t0`
    fn schedule(name: TimeName, at: DateTime<Utc>, t0: DateTime<Utc>, completes: bool) -> Option<Self> {
        (at - t0).to_std().ok().map(|delay| Self {
            name,
            at,
            delay,
            completes,
        })
    }
}

/// Adhan emissions of `times` still ahead of `t0`
pub fn plan_adhan(times: &PrayerTimeSet, t0: DateTime<Utc>) -> Vec<Planned> {
    times
        .iter()
        .filter_map(|p| Planned::schedule(p.prayer.into(), p.time, t0, p.prayer == Prayer::Isha))
        .collect()
}

/// Iqama emissions of `times` still ahead of `t0`, ordered by fire instant
///
/// Sunrise has no iqama.
pub fn plan_iqama(times: &PrayerTimeSet, waits: &IqamaWaits, t0: DateTime<Utc>) -> Vec<Planned> {
    let mut planned: Vec<Planned> = times
        .iter()
        .filter_map(|p| {
            let wait = waits.minutes(p.prayer)?;
            let fire = p.time + ChronoDuration::minutes(i64::from(wait));
            Planned::schedule(p.prayer.into(), fire, t0, p.prayer == Prayer::Isha)
        })
        .collect();
    planned.sort_by_key(|entry| entry.at);
    planned
}

/// Night milestones of `night` still ahead of `t0`
pub fn plan_qiyam(night: &NightMilestoneSet, t0: DateTime<Utc>) -> Vec<Planned> {
    night
        .iter()
        .filter_map(|(name, at)| Planned::schedule(name, at, t0, false))
        .collect()
}
