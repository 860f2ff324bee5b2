//! Last-third-of-the-night ticks

use std::sync::Arc;

use chrono::{DateTime, Duration as ChronoDuration, FixedOffset, Utc};
use salat_times::{CalcError, NightMilestoneSet, TimeName};
use tokio::time::Instant;

use super::{sleep_until, spawn_chain, subscribe_with, DayBoundaryScheduler, Emitter};
use crate::clock::{next_local_midnight, Clock};
use crate::error::StreamResult;
use crate::event::TimeEvent;
use crate::handle::{ShutdownSignal, SubscriptionHandle};
use crate::source::TimesSource;
use crate::stream::EventStream;

/// Signed time from `now` until `last_third`
///
/// Measured through the next local midnight, which cancels out to
/// `last_third - now`. A negative result means the instant has passed and
/// the tick is due immediately.
pub fn night_boundary_delay(
    last_third: DateTime<Utc>,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> ChronoDuration {
    let midnight = next_local_midnight(now, offset);
    (midnight - now) + (last_third - midnight)
}

/// The next night whose last third is still ahead of `now`
///
/// Tries the night starting on the local date of `now`, then the one after.
pub fn upcoming_night(
    source: &dyn TimesSource,
    clock: &dyn Clock,
    now: DateTime<Utc>,
) -> Result<NightMilestoneSet, CalcError> {
    let date = clock.local_date(now);
    let night = source.night_times_on(date)?;
    if night.last_third_of_the_night() > now {
        return Ok(night);
    }
    match date.succ_opt() {
        Some(next) => source.night_times_on(next),
        None => Err(CalcError::InvalidDate(format!("no date after {date}"))),
    }
}

/// Emits the last third of each night as a transient [`TimeEvent`]
#[derive(Clone)]
pub struct NightBoundaryScheduler {
    clock: Arc<dyn Clock>,
    source: Arc<dyn TimesSource>,
}

impl NightBoundaryScheduler {
    pub fn new(clock: Arc<dyn Clock>, source: Arc<dyn TimesSource>) -> Self {
        Self { clock, source }
    }

    pub fn spawn(&self, signal: ShutdownSignal, emit: Emitter<TimeEvent>) -> StreamResult<SubscriptionHandle> {
        let clock = Arc::clone(&self.clock);
        let source = Arc::clone(&self.source);
        let chain_signal = signal.clone();
        spawn_chain("night boundary", signal, async move {
            let signal = chain_signal;
            let mut night = source.night_times();
            loop {
                match night {
                    Ok(current) => {
                        let now = clock.now();
                        let last_third = current.last_third_of_the_night();
                        let delay = night_boundary_delay(last_third, now, clock.offset())
                            .to_std()
                            .unwrap_or_default();
                        tracing::debug!("night boundary armed for {} (in {:?})", last_third, delay);
                        if !sleep_until(&signal, Instant::now() + delay).await {
                            return;
                        }
                        emit(TimeEvent::transient(TimeName::LastThirdOfTheNight, last_third));
                    }
                    Err(e) => {
                        tracing::error!("night boundary calculation failed: {}", e);
                        let boundary = DayBoundaryScheduler::new(Arc::clone(&clock));
                        if !boundary.next_boundary(&signal).await {
                            return;
                        }
                    }
                }
                night = upcoming_night(source.as_ref(), clock.as_ref(), clock.now());
            }
        })
    }

    pub fn subscribe(&self) -> StreamResult<EventStream<TimeEvent>> {
        self.subscribe_with(ShutdownSignal::new())
    }

    pub fn subscribe_with(&self, signal: ShutdownSignal) -> StreamResult<EventStream<TimeEvent>> {
        subscribe_with(signal, |signal, emit| self.spawn(signal, emit))
    }
}
