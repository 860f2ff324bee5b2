//! Qiyam chain

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::{
    night_boundary_delay, plan_qiyam, sleep_until, spawn_chain, subscribe_with, upcoming_night,
    DayBoundaryScheduler, Emitter,
};
use crate::clock::Clock;
use crate::error::StreamResult;
use crate::event::TimeEvent;
use crate::handle::{ShutdownSignal, SubscriptionHandle};
use crate::source::TimesSource;
use crate::stream::EventStream;

/// Milestone timers of the chain; aborted together when dropped
#[derive(Default)]
struct TimerSet {
    timers: Vec<JoinHandle<()>>,
}

impl TimerSet {
    fn arm(&mut self, signal: &ShutdownSignal, deadline: Instant, event: TimeEvent, emit: &Emitter<TimeEvent>) {
        self.timers.retain(|timer| !timer.is_finished());
        let signal = signal.clone();
        let emit = Arc::clone(emit);
        self.timers.push(tokio::spawn(async move {
            if sleep_until(&signal, deadline).await {
                tracing::debug!("emit {}", event);
                emit(event);
            }
        }));
    }
}

impl Drop for TimerSet {
    fn drop(&mut self) {
        for timer in &self.timers {
            timer.abort();
        }
    }
}

/// Emits the middle and the last third of each night
///
/// Both milestones get their own timer; the chain itself only waits for the
/// last third and then moves on to the next night.
#[derive(Clone)]
pub struct QiyamScheduler {
    clock: Arc<dyn Clock>,
    source: Arc<dyn TimesSource>,
}

impl QiyamScheduler {
    pub fn new(clock: Arc<dyn Clock>, source: Arc<dyn TimesSource>) -> Self {
        Self { clock, source }
    }

    pub fn spawn(&self, signal: ShutdownSignal, emit: Emitter<TimeEvent>) -> StreamResult<SubscriptionHandle> {
        let clock = Arc::clone(&self.clock);
        let source = Arc::clone(&self.source);
        let chain_signal = signal.clone();
        spawn_chain("qiyam", signal, async move {
            let signal = chain_signal;
            let mut timers = TimerSet::default();
            let mut night = source.night_times();
            loop {
                match night {
                    Ok(current) => {
                        let t0 = clock.now();
                        let base = Instant::now();
                        for entry in plan_qiyam(&current, t0) {
                            timers.arm(
                                &signal,
                                base + entry.delay,
                                TimeEvent::transient(entry.name, entry.at),
                                &emit,
                            );
                        }
                        let wait = night_boundary_delay(current.last_third_of_the_night(), t0, clock.offset())
                            .to_std()
                            .unwrap_or_default();
                        tracing::debug!("qiyam armed, next night in {:?}", wait);
                        if !sleep_until(&signal, base + wait).await {
                            return;
                        }
                    }
                    Err(e) => {
                        tracing::error!("qiyam calculation failed: {}", e);
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
