//! ReactiveCalculator - prayer and night events that follow the calendar
//!
//! The calculator owns two configuration stores that start out equal:
//! the prayer store drives the day (NewDay, Adhan, Iqama slots) and the
//! night store drives the night (NewNight, Qiyam slots). Each store rolls
//! its own date forward at its own boundary, local midnight for the day and
//! the last third of the night for the night.
//!
//! ```text
//!  set_calculation_options(patch)          (write lock held throughout)
//!        │ validate + compute both candidates
//!        ▼
//!  prayer store.try_set ──changes──► cache + rearm NewDay/Adhan/Iqama
//!  night store.set      ──changes──► cache + rearm NewNight/Qiyam
//!
//!  NewDay tick   ─► compute today ─► prayer store date = today ─► rearm NewDay
//!  NewNight tick ─► compute today ─► night store date = today  ─► rearm NewNight
//!
//!  Adhan/Iqama/Qiyam chains ─► EventBus ─► EventStream (one per subscriber)
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use config_store::{ConfigStore, FieldChange, Patchable};
use parking_lot::{Mutex, RwLock};
use salat_stream::{
    AdhanScheduler, Clock, ConfiguredSource, DayBoundaryScheduler, DayTick, EventBus, EventStream,
    IqamaScheduler, NightBoundaryScheduler, QiyamScheduler, RegistryStats, ShutdownSignal, Slot,
    StreamResult, SubscriptionHandle, SubscriptionRegistry, SystemClock, TimeEvent, TimesSource,
};
use salat_times::{
    CalcError, CalculationConfig, ConfigField, ConfigPatch, ConfigValue, HijriDate,
    NightMilestoneSet, Prayer, PrayerTime, PrayerTimeSet, SolarCalculator, TimesCalculator,
};
use tokio::runtime::Handle;

use crate::error::{Result, SdkError};

/// Which of the two stores a change belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Schedule {
    Day,
    Night,
}

/// What one committed write asks of one schedule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Rearm {
    calculation: bool,
    iqama: bool,
}

impl Rearm {
    fn from_changes(changes: &[FieldChange<ConfigField, ConfigValue>]) -> Self {
        changes.iter().fold(Rearm::default(), |rearm, change| {
            if change.field.affects_calculation() {
                Rearm {
                    calculation: true,
                    ..rearm
                }
            } else {
                Rearm {
                    iqama: true,
                    ..rearm
                }
            }
        })
    }
}

struct Inner {
    runtime: Handle,
    clock: Arc<dyn Clock>,
    calculator: Arc<dyn TimesCalculator>,

    prayer_source: Arc<ConfiguredSource>,
    night_source: Arc<ConfiguredSource>,
    /// Held from commit to rearm by every writer: user writes, rollovers, disposal
    writes: Mutex<()>,

    prayer_times: RwLock<PrayerTimeSet>,
    night_times: RwLock<NightMilestoneSet>,

    registry: SubscriptionRegistry,
    adhan_bus: Arc<EventBus<TimeEvent>>,
    iqama_bus: Arc<EventBus<TimeEvent>>,
    qiyam_bus: Arc<EventBus<TimeEvent>>,

    root: ShutdownSignal,
    disposed: AtomicBool,
}

impl Inner {
    fn store(&self, schedule: Schedule) -> &ConfigStore<CalculationConfig> {
        match schedule {
            Schedule::Day => self.prayer_source.store(),
            Schedule::Night => self.night_source.store(),
        }
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Spawn the chain for `slot`, replacing the running one
    fn arm(self: &Arc<Self>, slot: Slot) -> StreamResult<()> {
        let signal = self.root.child();
        let clock = Arc::clone(&self.clock);
        let prayer_source: Arc<dyn TimesSource> = self.prayer_source.clone();
        let night_source: Arc<dyn TimesSource> = self.night_source.clone();

        let handle: SubscriptionHandle = match slot {
            Slot::NewDay => {
                let weak = Arc::downgrade(self);
                DayBoundaryScheduler::new(clock).spawn(
                    signal,
                    Arc::new(move |tick: DayTick| {
                        if let Some(inner) = weak.upgrade() {
                            inner.roll_over(Schedule::Day, tick.time);
                        }
                    }),
                )?
            }
            Slot::NewNight => {
                let weak = Arc::downgrade(self);
                NightBoundaryScheduler::new(clock, night_source).spawn(
                    signal,
                    Arc::new(move |event: TimeEvent| {
                        if let Some(inner) = weak.upgrade() {
                            inner.roll_over(Schedule::Night, event.time);
                        }
                    }),
                )?
            }
            Slot::Adhan => {
                let bus = Arc::clone(&self.adhan_bus);
                AdhanScheduler::new(clock, prayer_source).spawn(
                    signal,
                    Arc::new(move |event| {
                        bus.publish(event);
                    }),
                )?
            }
            Slot::Iqama => {
                let bus = Arc::clone(&self.iqama_bus);
                IqamaScheduler::new(clock, prayer_source).spawn(
                    signal,
                    Arc::new(move |event| {
                        bus.publish(event);
                    }),
                )?
            }
            Slot::Qiyam => {
                let bus = Arc::clone(&self.qiyam_bus);
                QiyamScheduler::new(clock, night_source).spawn(
                    signal,
                    Arc::new(move |event| {
                        bus.publish(event);
                    }),
                )?
            }
        };
        self.registry.set(slot, handle);
        Ok(())
    }

    fn arm_all(self: &Arc<Self>, slots: &[Slot]) {
        for &slot in slots {
            if let Err(e) = self.arm(slot) {
                tracing::error!("Failed to arm {}: {}", slot, e);
            }
        }
    }

    /// Boundary tick: move the store's date to the local date of now
    ///
    /// The date only moves when the new day computes, so the cached sets
    /// always belong to the stored date. A failed rollover keeps the
    /// boundary chain running and is retried at its next tick.
    fn roll_over(self: &Arc<Self>, schedule: Schedule, at: DateTime<Utc>) {
        let _write = self.writes.lock();
        if self.is_disposed() {
            return;
        }
        let today = self.clock.today();
        let candidate = self.store(schedule).with(|config| config.on(today));
        if let Err(e) = self.refresh_cache(schedule, &candidate) {
            tracing::error!("{:?} rollover to {} failed, date unchanged: {}", schedule, today, e);
            return;
        }
        tracing::debug!("{:?} rollover at {} to {}", schedule, at, today);
        let changes = self.store(schedule).set(ConfigPatch::new().date(today));
        self.rearm(schedule, Rearm::from_changes(&changes), true);
    }

    /// Recreate the slots a committed write affects
    ///
    /// A rollover only recreates the boundary slot; the event chains
    /// advance to the new date on their own.
    fn rearm(self: &Arc<Self>, schedule: Schedule, rearm: Rearm, rollover: bool) {
        let slots: &[Slot] = match (schedule, rearm.calculation, rearm.iqama, rollover) {
            (Schedule::Day, true, _, true) => &[Slot::NewDay],
            (Schedule::Day, true, _, false) => &[Slot::NewDay, Slot::Adhan, Slot::Iqama],
            (Schedule::Day, false, true, _) => &[Slot::Iqama],
            (Schedule::Night, true, _, true) => &[Slot::NewNight],
            (Schedule::Night, true, _, false) => &[Slot::NewNight, Slot::Qiyam],
            _ => &[],
        };
        self.arm_all(slots);
    }

    fn refresh_cache(
        &self,
        schedule: Schedule,
        config: &CalculationConfig,
    ) -> std::result::Result<(), CalcError> {
        match schedule {
            Schedule::Day => *self.prayer_times.write() = self.calculator.day_times(config)?,
            Schedule::Night => *self.night_times.write() = self.calculator.night_times(config)?,
        }
        Ok(())
    }

    fn shut_down(&self) -> bool {
        let _write = self.writes.lock();
        if self.disposed.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.root.trigger();
        let cancelled = self.registry.cancel_all();
        for bus in [&self.adhan_bus, &self.iqama_bus, &self.qiyam_bus] {
            bus.close();
        }
        tracing::info!("Calculator disposed, {} chains cancelled", cancelled);
        true
    }
}

/// Prayer-time event source that keeps itself on the current day
///
/// Must be created inside a Tokio runtime (or given a [`Handle`]); every
/// chain is a task on that runtime. Dropping the calculator disposes it.
///
/// # Example
///
/// ```rust,no_run
/// use salat_sdk::{CalculationConfig, Method, ReactiveCalculator};
///
/// #[tokio::main]
/// async fn main() -> Result<(), salat_sdk::SdkError> {
///     let config = CalculationConfig::new(2.9213, 101.6559).with_method(Method::Singapore);
///     let calculator = ReactiveCalculator::new(config)?;
///
///     let mut events = calculator.prayer_events()?;
///     while let Some(event) = events.recv().await {
///         println!("{}", event);
///     }
///     Ok(())
/// }
/// ```
pub struct ReactiveCalculator {
    inner: Arc<Inner>,
}

impl ReactiveCalculator {
    pub fn new(config: CalculationConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    pub fn builder(config: CalculationConfig) -> ReactiveCalculatorBuilder {
        ReactiveCalculatorBuilder {
            config,
            clock: None,
            calculator: None,
            runtime: None,
        }
    }

    fn active(&self) -> Result<&Arc<Inner>> {
        if self.inner.is_disposed() {
            Err(SdkError::Disposed)
        } else {
            Ok(&self.inner)
        }
    }

    // ------------------------------------------------------------------
    // Subscriptions
    // ------------------------------------------------------------------

    /// Ticks at every local midnight after subscription, then every 24h + 1min
    pub fn new_day_events(&self) -> Result<EventStream<DayTick>> {
        let inner = self.active()?;
        let _guard = inner.runtime.enter();
        let stream = DayBoundaryScheduler::new(Arc::clone(&inner.clock)).subscribe_with(inner.root.child())?;
        Ok(stream)
    }

    /// The last third of each night
    pub fn new_night_events(&self) -> Result<EventStream<TimeEvent>> {
        let inner = self.active()?;
        let _guard = inner.runtime.enter();
        let source: Arc<dyn TimesSource> = inner.night_source.clone();
        let stream = NightBoundaryScheduler::new(Arc::clone(&inner.clock), source)
            .subscribe_with(inner.root.child())?;
        Ok(stream)
    }

    pub fn adhan_events(&self) -> Result<EventStream<TimeEvent>> {
        Ok(self.active()?.adhan_bus.subscribe()?)
    }

    pub fn iqama_events(&self) -> Result<EventStream<TimeEvent>> {
        Ok(self.active()?.iqama_bus.subscribe()?)
    }

    /// Middle and last third of each night
    pub fn qiyam_events(&self) -> Result<EventStream<TimeEvent>> {
        Ok(self.active()?.qiyam_bus.subscribe()?)
    }

    /// Adhan and iqama events in one stream
    pub fn prayer_events(&self) -> Result<EventStream<TimeEvent>> {
        let inner = self.active()?;
        Ok(EventBus::merge(&[inner.adhan_bus.as_ref(), inner.iqama_bus.as_ref()])?)
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Settings of the day schedule
    pub fn calculation_options(&self) -> CalculationConfig {
        self.inner.prayer_source.store().get()
    }

    pub fn prayer_times(&self) -> PrayerTimeSet {
        self.inner.prayer_times.read().clone()
    }

    pub fn prayer_time(&self, prayer: Prayer) -> DateTime<Utc> {
        self.inner.prayer_times.read().time(prayer)
    }

    /// Latest prayer already started; `None` before fajr
    pub fn current_prayer(&self) -> Option<PrayerTime> {
        let now = self.inner.clock.now();
        self.inner.prayer_times.read().current_prayer(now)
    }

    /// Next prayer today; `None` after isha
    pub fn next_prayer(&self) -> Option<PrayerTime> {
        let now = self.inner.clock.now();
        self.inner.prayer_times.read().next_prayer(now)
    }

    pub fn night_times(&self) -> NightMilestoneSet {
        *self.inner.night_times.read()
    }

    pub fn middle_of_the_night(&self) -> DateTime<Utc> {
        self.inner.night_times.read().middle_of_the_night()
    }

    pub fn last_third_of_the_night(&self) -> DateTime<Utc> {
        self.inner.night_times.read().last_third_of_the_night()
    }

    /// Bearing to the Kaaba in degrees clockwise from true north
    pub fn qibla_direction(&self) -> f64 {
        let coordinates = self.inner.prayer_source.store().with(|config| config.coordinates());
        salat_times::qibla(coordinates)
    }

    /// Hijri date of the day schedule
    pub fn hijri_date(&self) -> HijriDate {
        let date = self.inner.prayer_source.store().with(|config| config.date);
        HijriDate::from_gregorian(date)
    }

    /// Arm/cancel counters of the internal chains
    pub fn registry_stats(&self) -> RegistryStats {
        self.inner.registry.stats()
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.is_disposed()
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Merge `patch` into both schedules
    ///
    /// The merged configuration is validated and both day and night times
    /// are computed before anything is committed; on error nothing changes.
    /// Returns the fields that actually changed; an empty result means the
    /// write was a no-op and no chain was touched.
    pub fn set_calculation_options(&self, patch: ConfigPatch) -> Result<Vec<ConfigField>> {
        let _write = self.inner.writes.lock();
        let inner = self.active()?;
        let _guard = inner.runtime.enter();

        let calculator = Arc::clone(&inner.calculator);
        let mut night_candidate = inner.night_source.store().get();
        let night_changed = !night_candidate.merge(patch.clone()).is_empty();
        let check_night = || -> std::result::Result<(), CalcError> {
            night_candidate.validate()?;
            calculator.night_times(&night_candidate)?;
            Ok(())
        };

        let day_changes = inner.prayer_source.store().try_set(patch.clone(), |candidate| {
            candidate.validate()?;
            calculator.day_times(candidate)?;
            check_night()
        })?;
        if day_changes.is_empty() {
            if !night_changed {
                tracing::debug!("Calculation options unchanged");
                return Ok(Vec::new());
            }
            check_night()?;
        }
        let night_changes = inner.night_source.store().set(patch);

        let committed = [(Schedule::Day, &day_changes), (Schedule::Night, &night_changes)];
        for (schedule, changes) in committed {
            let rearm = Rearm::from_changes(changes);
            if rearm.calculation {
                let config = inner.store(schedule).get();
                if let Err(e) = inner.refresh_cache(schedule, &config) {
                    tracing::error!("{:?} recalculation failed: {}", schedule, e);
                }
            }
            inner.rearm(schedule, rearm, false);
        }
        tracing::debug!("Reconfigured: {}", inner.registry.stats());

        let mut fields: Vec<ConfigField> = day_changes.iter().map(|change| change.field).collect();
        for change in &night_changes {
            if !fields.contains(&change.field) {
                fields.push(change.field);
            }
        }
        Ok(fields)
    }

    /// Cancel every chain and end every open stream
    ///
    /// Later subscriptions and writes fail with [`SdkError::Disposed`].
    /// Calling it again does nothing.
    pub fn dispose(&self) {
        self.inner.shut_down();
    }
}

impl Drop for ReactiveCalculator {
    fn drop(&mut self) {
        self.inner.shut_down();
    }
}

impl std::fmt::Debug for ReactiveCalculator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReactiveCalculator")
            .field("date", &self.inner.prayer_source.store().with(|c| c.date))
            .field("registry", &self.inner.registry.stats())
            .field("disposed", &self.inner.is_disposed())
            .finish()
    }
}

/// Builder for [`ReactiveCalculator`]
pub struct ReactiveCalculatorBuilder {
    config: CalculationConfig,
    clock: Option<Arc<dyn Clock>>,
    calculator: Option<Arc<dyn TimesCalculator>>,
    runtime: Option<Handle>,
}

impl ReactiveCalculatorBuilder {
    /// Wall clock and time zone; defaults to the host's
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Times calculator; defaults to [`SolarCalculator`]
    pub fn calculator(mut self, calculator: Arc<dyn TimesCalculator>) -> Self {
        self.calculator = Some(calculator);
        self
    }

    /// Runtime the chains run on; defaults to the current one
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Validate, compute, and arm every slot
    pub fn build(self) -> Result<ReactiveCalculator> {
        let runtime = match self.runtime {
            Some(handle) => handle,
            None => Handle::try_current().map_err(|_| SdkError::NoRuntime)?,
        };
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let calculator = self.calculator.unwrap_or_else(|| Arc::new(SolarCalculator::new()));

        self.config.validate()?;
        let prayer_times = calculator.day_times(&self.config)?;
        let night_times = calculator.night_times(&self.config)?;

        let prayer_store = ConfigStore::new(self.config.clone());
        let night_store = ConfigStore::new(self.config);
        let inner = Arc::new(Inner {
            runtime,
            clock,
            prayer_source: Arc::new(ConfiguredSource::new(prayer_store, Arc::clone(&calculator))),
            night_source: Arc::new(ConfiguredSource::new(night_store, Arc::clone(&calculator))),
            calculator,
            writes: Mutex::new(()),
            prayer_times: RwLock::new(prayer_times),
            night_times: RwLock::new(night_times),
            registry: SubscriptionRegistry::new(),
            adhan_bus: Arc::new(EventBus::new("adhan")),
            iqama_bus: Arc::new(EventBus::new("iqama")),
            qiyam_bus: Arc::new(EventBus::new("qiyam")),
            root: ShutdownSignal::new(),
            disposed: AtomicBool::new(false),
        });

        {
            let _guard = inner.runtime.enter();
            for slot in Slot::ALL {
                inner.arm(slot)?;
            }
        }

        tracing::info!(
            "Calculator ready for {} at ({}, {}), {}",
            inner.prayer_times.read().date(),
            inner.prayer_source.store().with(|c| c.latitude),
            inner.prayer_source.store().with(|c| c.longitude),
            inner.registry.stats()
        );
        Ok(ReactiveCalculator { inner })
    }
}
