//! Wall-clock abstraction
//!
//! Schedulers read "now" and the local UTC offset through [`Clock`] and
//! wait with `tokio::time`. [`TokioClock`] ties the two together so that a
//! paused Tokio runtime also moves the wall clock, which makes multi-day
//! schedules testable in milliseconds.

use chrono::{DateTime, Duration as ChronoDuration, FixedOffset, Local, NaiveDate, Utc};
use std::time::Duration;

/// Source of the current instant and the host's UTC offset
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;

    /// Offset used to find local midnight and the local date
    fn offset(&self) -> FixedOffset;

    /// Local calendar date of `at`
    fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset()).date_naive()
    }

    fn today(&self) -> NaiveDate {
        self.local_date(self.now())
    }
}

/// The host clock and time zone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn offset(&self) -> FixedOffset {
        *Local::now().offset()
    }
}

/// A wall clock that advances with `tokio::time::Instant`
///
/// Under `#[tokio::test(start_paused = true)]` time only moves when the
/// runtime is idle or `tokio::time::advance` is called, so
/// `anchor + elapsed` is fully deterministic.
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    anchor: DateTime<Utc>,
    base: tokio::time::Instant,
    offset: FixedOffset,
}

impl TokioClock {
    /// Start at `anchor`, measured from the current Tokio instant
    pub fn new(anchor: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self {
            anchor,
            base: tokio::time::Instant::now(),
            offset,
        }
    }

    /// Start at a local wall time in `offset`
    pub fn at_local(local: DateTime<FixedOffset>) -> Self {
        Self::new(local.with_timezone(&Utc), *local.offset())
    }
}

impl Clock for TokioClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = tokio::time::Instant::now().duration_since(self.base);
        self.anchor + ChronoDuration::from_std(elapsed).unwrap_or(ChronoDuration::zero())
    }

    fn offset(&self) -> FixedOffset {
        self.offset
    }
}

/// First local midnight strictly after `now`
pub fn next_local_midnight(now: DateTime<Utc>, offset: FixedOffset) -> DateTime<Utc> {
    let local_date = now.with_timezone(&offset).date_naive();
    local_date
        .succ_opt()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .and_then(|midnight| midnight.and_local_timezone(offset).single())
        .map(|midnight| midnight.with_timezone(&Utc))
        .unwrap_or(now + ChronoDuration::days(1))
}

/// Time from `now` until `target`; zero when `target` is not in the future
pub fn delay_until(target: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (target - now).to_std().unwrap_or(Duration::ZERO)
}
