//! Values emitted by the schedulers

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use salat_times::{Prayer, TimeName};

/// What a [`TimeEvent`] announces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    /// Start of a prayer's time
    Adhan,
    /// Start of the congregational prayer
    Iqama,
    /// A night milestone
    Transient,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Adhan => write!(f, "ADHAN"),
            EventKind::Iqama => write!(f, "IQAMA"),
            EventKind::Transient => write!(f, "TRANSIENT"),
        }
    }
}

/// A timed notification, created at emission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeEvent {
    pub name: TimeName,
    pub kind: EventKind,
    pub time: DateTime<Utc>,
}

impl TimeEvent {
    pub fn adhan(prayer: Prayer, time: DateTime<Utc>) -> Self {
        Self {
            name: prayer.into(),
            kind: EventKind::Adhan,
            time,
        }
    }

    pub fn iqama(prayer: Prayer, time: DateTime<Utc>) -> Self {
        Self {
            name: prayer.into(),
            kind: EventKind::Iqama,
            time,
        }
    }

    pub fn transient(name: TimeName, time: DateTime<Utc>) -> Self {
        Self {
            name,
            kind: EventKind::Transient,
            time,
        }
    }

    pub fn prayer(&self) -> Option<Prayer> {
        self.name.as_prayer()
    }
}

impl fmt::Display for TimeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} at {}", self.kind, self.name, self.time)
    }
}

/// One solar-day boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayTick {
    /// 0 for the first boundary after subscription, then 1, 2, ...
    pub index: u64,
    /// Wall time of the tick
    pub time: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_event_display() {
        let time = Utc.with_ymd_and_hms(2022, 1, 1, 5, 21, 0).unwrap();
        let event = TimeEvent::adhan(Prayer::Dhuhr, time);
        assert_eq!(event.to_string(), "ADHAN dhuhr at 2022-01-01 05:21:00 UTC");
        assert_eq!(event.prayer(), Some(Prayer::Dhuhr));

        let event = TimeEvent::transient(TimeName::MiddleOfTheNight, time);
        assert_eq!(event.prayer(), None);
        assert_eq!(event.kind, EventKind::Transient);
    }
}
