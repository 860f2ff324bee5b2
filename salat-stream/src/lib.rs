//! # salat-stream
//!
//! Timer chains that turn computed prayer and night instants into event
//! streams, plus the bookkeeping to cancel and replace them.
//!
//! Every scheduler reads its instants through a [`TimesSource`] and the
//! current wall time through a [`Clock`], so the same chain runs against the
//! host clock in production and against Tokio's paused clock in tests.
//!
//! ```text
//! TimesSource ─┬─► AdhanScheduler ──────┐
//!              ├─► IqamaScheduler ──────┤  Emitter ─► EventBus ─► EventStream
//!              ├─► QiyamScheduler ──────┤
//!              └─► NightBoundaryScheduler
//! Clock ─────────► DayBoundaryScheduler ┘
//!
//! SubscriptionRegistry: Slot ─► SubscriptionHandle (replace = cancel old)
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use salat_stream::{DayBoundaryScheduler, SystemClock};
//!
//! # async fn run() -> salat_stream::StreamResult<()> {
//! let days = DayBoundaryScheduler::new(Arc::new(SystemClock));
//! let mut ticks = days.subscribe()?;
//! while let Some(tick) = ticks.recv().await {
//!     println!("day {} began at {}", tick.index, tick.time);
//! }
//! # Ok(())
//! # }
//! ```

mod bus;
mod clock;
mod error;
mod event;
mod handle;
mod registry;
mod scheduler;
mod source;
mod stream;

pub use bus::EventBus;
pub use clock::{delay_until, next_local_midnight, Clock, SystemClock, TokioClock};
pub use error::{StreamError, StreamResult};
pub use event::{DayTick, EventKind, TimeEvent};
pub use handle::{ShutdownSignal, SubscriptionHandle};
pub use registry::{RegistryStats, Slot, SubscriptionRegistry};
pub use scheduler::{
    initial_delay, night_boundary_delay, plan_adhan, plan_iqama, plan_qiyam, upcoming_night,
    AdhanScheduler, DayBoundaryScheduler, Emitter, IqamaScheduler, NightBoundaryScheduler,
    Planned, QiyamScheduler, DAY_PERIOD,
};
pub use source::{ConfiguredSource, TimesSource};
pub use stream::EventStream;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::clock::{Clock, SystemClock, TokioClock};
    pub use crate::event::{DayTick, EventKind, TimeEvent};
    pub use crate::scheduler::{
        AdhanScheduler, DayBoundaryScheduler, IqamaScheduler, NightBoundaryScheduler,
        QiyamScheduler,
    };
    pub use crate::stream::EventStream;
}
