//! Local-midnight ticks

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Utc};
use tokio::time::Instant;

use super::{sleep_until, spawn_chain, subscribe_with, Emitter};
use crate::clock::{delay_until, next_local_midnight, Clock};
use crate::error::StreamResult;
use crate::event::DayTick;
use crate::handle::{ShutdownSignal, SubscriptionHandle};
use crate::stream::EventStream;

/// Spacing of ticks after the first one
///
/// One minute over a day so a tick never lands just before a midnight it
/// was meant to follow.
pub const DAY_PERIOD: Duration = Duration::from_secs(24 * 60 * 60 + 60);

/// Time from `now` until the next local midnight
pub fn initial_delay(now: DateTime<Utc>, offset: FixedOffset) -> Duration {
    delay_until(next_local_midnight(now, offset), now)
}

/// Emits a [`DayTick`] at the next local midnight and every [`DAY_PERIOD`]
/// after that
#[derive(Clone)]
pub struct DayBoundaryScheduler {
    clock: Arc<dyn Clock>,
}

impl DayBoundaryScheduler {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Delay from now until the first tick
    pub fn initial_delay(&self) -> Duration {
        initial_delay(self.clock.now(), self.clock.offset())
    }

    /// Wait for the first tick only; false if `signal` was raised first
    pub async fn next_boundary(&self, signal: &ShutdownSignal) -> bool {
        let deadline = Instant::now() + self.initial_delay();
        sleep_until(signal, deadline).await
    }

    pub fn spawn(&self, signal: ShutdownSignal, emit: Emitter<DayTick>) -> StreamResult<SubscriptionHandle> {
        let clock = Arc::clone(&self.clock);
        let first = Instant::now() + self.initial_delay();
        let chain_signal = signal.clone();
        spawn_chain("day boundary", signal, async move {
            let mut index = 0u64;
            let mut deadline = first;
            while sleep_until(&chain_signal, deadline).await {
                let tick = DayTick {
                    index,
                    time: clock.now(),
                };
                tracing::debug!("day boundary tick {} at {}", tick.index, tick.time);
                emit(tick);
                index += 1;
                deadline += DAY_PERIOD;
            }
        })
    }

    /// A stream of ticks that stops when dropped
    pub fn subscribe(&self) -> StreamResult<EventStream<DayTick>> {
        self.subscribe_with(ShutdownSignal::new())
    }

    /// Like [`subscribe`](Self::subscribe), driven by a caller-provided signal
    pub fn subscribe_with(&self, signal: ShutdownSignal) -> StreamResult<EventStream<DayTick>> {
        subscribe_with(signal, |signal, emit| self.spawn(signal, emit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn plus8() -> FixedOffset {
        FixedOffset::east_opt(8 * 3600).unwrap()
    }

    #[test]
    fn test_initial_delay() {
        let at_midnight = plus8().with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            initial_delay(at_midnight.with_timezone(&Utc), plus8()),
            Duration::from_secs(24 * 3600)
        );

        let evening = plus8().with_ymd_and_hms(2022, 1, 1, 22, 30, 0).unwrap();
        assert_eq!(
            initial_delay(evening.with_timezone(&Utc), plus8()),
            Duration::from_secs(90 * 60)
        );
    }

    #[test]
    fn test_period_is_a_day_and_a_minute() {
        assert_eq!(DAY_PERIOD.as_secs(), 86_460);
    }
}
