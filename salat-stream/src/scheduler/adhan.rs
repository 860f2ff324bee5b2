//! Adhan chain

use std::sync::Arc;

use super::{plan_adhan, run_daily, spawn_chain, subscribe_with, Emitter};
use crate::clock::Clock;
use crate::error::StreamResult;
use crate::event::{EventKind, TimeEvent};
use crate::handle::{ShutdownSignal, SubscriptionHandle};
use crate::source::TimesSource;
use crate::stream::EventStream;

/// Emits an adhan event at each of the day's six instants
///
/// Instants already behind the arming moment are skipped. Isha ends the
/// day; the chain then waits for local midnight and recomputes.
///
/// The midnight waited for is the first one after isha. Where isha falls
/// past local midnight (high latitudes in summer, or a host offset far
/// from the location's), that is the midnight of the day after, so the
/// calendar day in between gets no events.
#[derive(Clone)]
pub struct AdhanScheduler {
    clock: Arc<dyn Clock>,
    source: Arc<dyn TimesSource>,
}

impl AdhanScheduler {
    pub fn new(clock: Arc<dyn Clock>, source: Arc<dyn TimesSource>) -> Self {
        Self { clock, source }
    }

    pub fn spawn(&self, signal: ShutdownSignal, emit: Emitter<TimeEvent>) -> StreamResult<SubscriptionHandle> {
        let chain = run_daily(
            EventKind::Adhan,
            Arc::clone(&self.clock),
            Arc::clone(&self.source),
            signal.clone(),
            |_, times, t0| plan_adhan(times, t0),
            emit,
        );
        spawn_chain("adhan", signal, chain)
    }

    pub fn subscribe(&self) -> StreamResult<EventStream<TimeEvent>> {
        self.subscribe_with(ShutdownSignal::new())
    }

    pub fn subscribe_with(&self, signal: ShutdownSignal) -> StreamResult<EventStream<TimeEvent>> {
        subscribe_with(signal, |signal, emit| self.spawn(signal, emit))
    }
}
