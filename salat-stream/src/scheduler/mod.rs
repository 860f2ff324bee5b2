//! Timer chains
//!
//! Each scheduler runs as one spawned task that sleeps on `tokio::time`
//! deadlines measured from the instant it armed, emits through an
//! [`Emitter`], and re-arms itself from freshly read times.
//!
//! - [`DayBoundaryScheduler`]: local midnight, then every 24h + 1min
//! - [`NightBoundaryScheduler`]: last third of each night
//! - [`AdhanScheduler`]: the six prayer instants of each day
//! - [`IqamaScheduler`]: congregational start after each prayer but sunrise
//! - [`QiyamScheduler`]: middle and last third of each night

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use salat_times::PrayerTimeSet;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::clock::Clock;
use crate::error::{require_runtime, StreamResult};
use crate::event::{EventKind, TimeEvent};
use crate::handle::{ShutdownSignal, SubscriptionHandle};
use crate::source::TimesSource;
use crate::stream::EventStream;

mod adhan;
mod day_boundary;
mod iqama;
mod night_boundary;
pub mod plan;
mod qiyam;

pub use adhan::AdhanScheduler;
pub use day_boundary::{initial_delay, DayBoundaryScheduler, DAY_PERIOD};
pub use iqama::IqamaScheduler;
pub use night_boundary::{night_boundary_delay, upcoming_night, NightBoundaryScheduler};
pub use plan::{plan_adhan, plan_iqama, plan_qiyam, Planned};
pub use qiyam::QiyamScheduler;

/// Callback a chain emits through
pub type Emitter<T> = Arc<dyn Fn(T) + Send + Sync>;

/// Sleep until `deadline` unless `signal` is raised first
///
/// Returns true only when the deadline passed and the signal is still down,
/// so a caller may emit.
pub(crate) async fn sleep_until(signal: &ShutdownSignal, deadline: Instant) -> bool {
    if signal.is_triggered() {
        return false;
    }
    tokio::select! {
        _ = tokio::time::sleep_until(deadline) => !signal.is_triggered(),
        _ = signal.triggered() => false,
    }
}

/// Spawn `chain` as the task behind a new handle
pub(crate) fn spawn_chain<F>(
    name: &'static str,
    signal: ShutdownSignal,
    chain: F,
) -> StreamResult<SubscriptionHandle>
where
    F: Future<Output = ()> + Send + 'static,
{
    require_runtime()?;
    tracing::debug!("{} chain armed", name);
    let task = tokio::spawn(async move {
        chain.await;
        tracing::debug!("{} chain stopped", name);
    });
    Ok(SubscriptionHandle::new(signal, task))
}

/// The daily prayer loop shared by adhan and iqama chains
///
/// Arms with the configured date's times, emits each planned entry at its
/// deadline, and after the completing entry (or an empty plan) waits for the
/// next local midnight and re-arms for the local date of that moment. When
/// the completing entry is itself past midnight, the date it ran into is
/// never armed.
pub(crate) async fn run_daily<P>(
    kind: EventKind,
    clock: Arc<dyn Clock>,
    source: Arc<dyn TimesSource>,
    signal: ShutdownSignal,
    plan: P,
    emit: Emitter<TimeEvent>,
) where
    P: Fn(&dyn TimesSource, &PrayerTimeSet, DateTime<Utc>) -> Vec<Planned> + Send + Sync + 'static,
{
    let mut first = true;
    loop {
        let t0 = clock.now();
        let base = Instant::now();
        let times = if first {
            source.prayer_times()
        } else {
            source.prayer_times_on(clock.local_date(t0))
        };
        first = false;

        match times {
            Ok(times) => {
                let planned = plan(source.as_ref(), &times, t0);
                tracing::debug!(
                    "{} armed for {}: {} pending",
                    kind,
                    times.date(),
                    planned.len()
                );
                for entry in planned {
                    if !sleep_until(&signal, base + entry.delay).await {
                        return;
                    }
                    let time = match kind {
                        EventKind::Iqama => clock.now(),
                        _ => entry.at,
                    };
                    let event = TimeEvent {
                        name: entry.name,
                        kind,
                        time,
                    };
                    tracing::debug!("emit {}", event);
                    emit(event);
                    if entry.completes {
                        break;
                    }
                }
            }
            Err(e) => tracing::error!("{} calculation failed: {}", kind, e),
        }

        let boundary = DayBoundaryScheduler::new(Arc::clone(&clock));
        if !boundary.next_boundary(&signal).await {
            return;
        }
        tracing::debug!("{} rearming at {}", kind, clock.now());
    }
}

/// Run `spawn` with an emitter feeding a fresh stream that owns the chain
pub(crate) fn subscribe_with<T, S>(signal: ShutdownSignal, spawn: S) -> StreamResult<EventStream<T>>
where
    T: Send + 'static,
    S: FnOnce(ShutdownSignal, Emitter<T>) -> StreamResult<SubscriptionHandle>,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let emit: Emitter<T> = Arc::new(move |item| {
        let _ = tx.send(item);
    });
    let handle = spawn(signal, emit)?;
    Ok(EventStream::with_handle(rx, handle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_sleep_until_reports_cancellation() {
        let signal = ShutdownSignal::new();
        let deadline = Instant::now() + Duration::from_secs(60);
        assert!(sleep_until(&signal, deadline).await);

        let waiter = tokio::spawn({
            let signal = signal.clone();
            async move { sleep_until(&signal, Instant::now() + Duration::from_secs(3600)).await }
        });
        tokio::task::yield_now().await;
        signal.trigger();
        assert!(!waiter.await.unwrap());
    }

    #[tokio::test]
    async fn test_stream_owns_chain() {
        let signal = ShutdownSignal::new();
        let mut stream = subscribe_with::<u32, _>(signal.clone(), |signal, emit| {
            spawn_chain("test", signal.clone(), async move {
                emit(1);
                signal.triggered().await;
            })
        })
        .unwrap();

        assert_eq!(stream.recv().await, Some(1));
        assert!(!signal.is_triggered());

        drop(stream);
        assert!(signal.is_triggered());
    }
}
