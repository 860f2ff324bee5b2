//! Names of the daily prayers and nightly milestones

use serde::{Deserialize, Serialize};
use std::fmt;

/// The six daily instants, in chronological order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Prayer {
    Fajr,
    Sunrise,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl Prayer {
    /// All six instants in chronological order
    pub const ALL: [Prayer; 6] = [
        Prayer::Fajr,
        Prayer::Sunrise,
        Prayer::Dhuhr,
        Prayer::Asr,
        Prayer::Maghrib,
        Prayer::Isha,
    ];

    /// Prayers that have a congregational iqama (everything except sunrise)
    pub const CONGREGATIONAL: [Prayer; 5] = [
        Prayer::Fajr,
        Prayer::Dhuhr,
        Prayer::Asr,
        Prayer::Maghrib,
        Prayer::Isha,
    ];

    /// Position in [`Prayer::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Wire name
    pub fn name(self) -> &'static str {
        match self {
            Prayer::Fajr => "fajr",
            Prayer::Sunrise => "sunrise",
            Prayer::Dhuhr => "dhuhr",
            Prayer::Asr => "asr",
            Prayer::Maghrib => "maghrib",
            Prayer::Isha => "isha",
        }
    }

    pub fn is_congregational(self) -> bool {
        self != Prayer::Sunrise
    }
}

impl fmt::Display for Prayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Name carried by a time event: a prayer or one of the two night milestones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimeName {
    Fajr,
    Sunrise,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
    MiddleOfTheNight,
    LastThirdOfTheNight,
}

impl TimeName {
    /// The prayer this name refers to, if any
    pub fn as_prayer(self) -> Option<Prayer> {
        match self {
            TimeName::Fajr => Some(Prayer::Fajr),
            TimeName::Sunrise => Some(Prayer::Sunrise),
            TimeName::Dhuhr => Some(Prayer::Dhuhr),
            TimeName::Asr => Some(Prayer::Asr),
            TimeName::Maghrib => Some(Prayer::Maghrib),
            TimeName::Isha => Some(Prayer::Isha),
            TimeName::MiddleOfTheNight | TimeName::LastThirdOfTheNight => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TimeName::MiddleOfTheNight => "middleOfTheNight",
            TimeName::LastThirdOfTheNight => "lastThirdOfTheNight",
            other => other.as_prayer().map(Prayer::name).unwrap_or_default(),
        }
    }
}

impl From<Prayer> for TimeName {
    fn from(prayer: Prayer) -> Self {
        match prayer {
            Prayer::Fajr => TimeName::Fajr,
            Prayer::Sunrise => TimeName::Sunrise,
            Prayer::Dhuhr => TimeName::Dhuhr,
            Prayer::Asr => TimeName::Asr,
            Prayer::Maghrib => TimeName::Maghrib,
            Prayer::Isha => TimeName::Isha,
        }
    }
}

impl fmt::Display for TimeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
