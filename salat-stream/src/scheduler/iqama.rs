//! Iqama chain

use std::sync::Arc;

use super::{plan_iqama, run_daily, spawn_chain, subscribe_with, Emitter};
use crate::clock::Clock;
use crate::error::StreamResult;
use crate::event::{EventKind, TimeEvent};
use crate::handle::{ShutdownSignal, SubscriptionHandle};
use crate::source::TimesSource;
use crate::stream::EventStream;

/// Emits an iqama event a configured number of minutes after each prayer
///
/// Sunrise has no iqama. Waits are read from the source each day, so a
/// re-armed chain picks up new values. Days roll over as for
/// [`AdhanScheduler`](super::AdhanScheduler), including the skipped day
/// when the last iqama falls after local midnight.
#[derive(Clone)]
pub struct IqamaScheduler {
    clock: Arc<dyn Clock>,
    source: Arc<dyn TimesSource>,
}

impl IqamaScheduler {
    pub fn new(clock: Arc<dyn Clock>, source: Arc<dyn TimesSource>) -> Self {
        Self { clock, source }
    }

    pub fn spawn(&self, signal: ShutdownSignal, emit: Emitter<TimeEvent>) -> StreamResult<SubscriptionHandle> {
        let chain = run_daily(
            EventKind::Iqama,
            Arc::clone(&self.clock),
            Arc::clone(&self.source),
            signal.clone(),
            |source, times, t0| plan_iqama(times, &source.iqama_waits(), t0),
            emit,
        );
        spawn_chain("iqama", signal, chain)
    }

    pub fn subscribe(&self) -> StreamResult<EventStream<TimeEvent>> {
        self.subscribe_with(ShutdownSignal::new())
    }

    pub fn subscribe_with(&self, signal: ShutdownSignal) -> StreamResult<EventStream<TimeEvent>> {
        subscribe_with(signal, |signal, emit| self.spawn(signal, emit))
    }
}
