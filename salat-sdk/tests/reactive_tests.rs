//! ReactiveCalculator end to end, on Tokio's paused clock
//!
//! Reference location: Kuala Lumpur (2.9213, 101.6559), Singapore method,
//! adjustments dhuhr +3, asr +3, isha +2, local time UTC+8.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use salat_sdk::*;

fn plus8() -> FixedOffset {
    FixedOffset::east_opt(8 * 3600).unwrap()
}

fn kuala_lumpur(date: NaiveDate) -> CalculationConfig {
    CalculationConfig::for_date(date, 2.9213, 101.6559)
        .with_method(Method::Singapore)
        .with_adjustments(PrayerAdjustments {
            dhuhr: 3,
            asr: 3,
            isha: 2,
            ..PrayerAdjustments::default()
        })
}

fn local(y: i32, m: u32, d: u32, h: u32, mi: u32) -> DateTime<FixedOffset> {
    plus8().with_ymd_and_hms(y, m, d, h, mi, 0).unwrap()
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Calculator for 2022-01-01 on a paused clock starting at `start`
fn calculator_at(start: DateTime<FixedOffset>) -> (ReactiveCalculator, Arc<TokioClock>) {
    let clock = Arc::new(TokioClock::at_local(start));
    let calculator = ReactiveCalculator::builder(kuala_lumpur(ymd(2022, 1, 1)))
        .clock(clock.clone())
        .build()
        .unwrap();
    (calculator, clock)
}

fn within(actual: DateTime<Utc>, expected: DateTime<Utc>, tolerance_secs: i64) -> bool {
    (actual - expected).num_seconds().abs() <= tolerance_secs
}

async fn sleep_hours(hours: u64) {
    tokio::time::sleep(Duration::from_secs(hours * 3600)).await;
}

// ============================================================================
// Reference fixture
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_three_days_of_ticks_and_adhan() {
    let (calculator, _clock) = calculator_at(local(2022, 1, 1, 0, 0));
    let mut days = calculator.new_day_events().unwrap();
    let mut adhan = calculator.adhan_events().unwrap();

    sleep_hours(72).await;

    let ticks = days.drain();
    assert_eq!(ticks.len(), 2);
    assert!(within(ticks[0].time, local(2022, 1, 2, 0, 0).with_timezone(&Utc), 1));
    assert!(within(ticks[1].time, local(2022, 1, 3, 0, 1).with_timezone(&Utc), 1));

    let events = adhan.drain();
    assert_eq!(events.len(), 18);
    assert!(events.iter().all(|e| e.kind == EventKind::Adhan));
    assert!(events.windows(2).all(|w| w[0].time < w[1].time));

    let names: Vec<TimeName> = events.iter().take(6).map(|e| e.name).collect();
    assert_eq!(
        names,
        vec![
            TimeName::Fajr,
            TimeName::Sunrise,
            TimeName::Dhuhr,
            TimeName::Asr,
            TimeName::Maghrib,
            TimeName::Isha
        ]
    );
    let reference = [
        Utc.with_ymd_and_hms(2021, 12, 31, 21, 55, 0).unwrap(),
        Utc.with_ymd_and_hms(2021, 12, 31, 23, 19, 0).unwrap(),
        Utc.with_ymd_and_hms(2022, 1, 1, 5, 21, 0).unwrap(),
        Utc.with_ymd_and_hms(2022, 1, 1, 8, 45, 0).unwrap(),
        Utc.with_ymd_and_hms(2022, 1, 1, 11, 16, 0).unwrap(),
        Utc.with_ymd_and_hms(2022, 1, 1, 12, 33, 0).unwrap(),
    ];
    for (event, expected) in events.iter().zip(reference) {
        assert!(within(event.time, expected, 120), "{} vs {}", event, expected);
    }

    for (day, chunk) in events.chunks(6).enumerate() {
        let date = ymd(2022, 1, 1 + day as u32);
        assert!(chunk
            .iter()
            .all(|e| e.time.with_timezone(&plus8()).date_naive() == date));
    }
}

#[tokio::test(start_paused = true)]
async fn test_rollover_moves_date_without_touching_event_chains() {
    let (calculator, _clock) = calculator_at(local(2022, 1, 1, 23, 0));
    assert_eq!(calculator.registry_stats().armed, 5);

    sleep_hours(2).await;
    assert_eq!(calculator.calculation_options().date, ymd(2022, 1, 2));
    assert_eq!(calculator.prayer_times().date(), ymd(2022, 1, 2));
    let stats = calculator.registry_stats();
    assert_eq!((stats.armed, stats.cancelled, stats.active), (6, 1, 5));

    // past the last third of the night of 2022-01-01
    sleep_hours(3).await;
    let stats = calculator.registry_stats();
    assert_eq!((stats.armed, stats.cancelled), (7, 2));
    assert!(calculator.last_third_of_the_night() > local(2022, 1, 2, 4, 0).with_timezone(&Utc));
}

// ============================================================================
// Feeds
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_prayer_events_interleave_adhan_and_iqama() {
    let (calculator, _clock) = calculator_at(local(2022, 1, 1, 0, 0));
    let mut prayers = calculator.prayer_events().unwrap();
    let fajr = calculator.prayer_time(Prayer::Fajr);

    tokio::time::sleep(Duration::from_secs(6 * 3600 + 30 * 60)).await;
    let events = prayers.drain();

    assert_eq!(events.len(), 2);
    assert_eq!((events[0].name, events[0].kind), (TimeName::Fajr, EventKind::Adhan));
    assert_eq!((events[1].name, events[1].kind), (TimeName::Fajr, EventKind::Iqama));
    assert_eq!(events[0].time, fajr);
    assert!(within(events[1].time, fajr + chrono::Duration::minutes(20), 1));
}

#[tokio::test(start_paused = true)]
async fn test_iqama_feed_skips_sunrise() {
    let (calculator, _clock) = calculator_at(local(2022, 1, 1, 0, 0));
    let mut iqama = calculator.iqama_events().unwrap();

    sleep_hours(24).await;
    let names: Vec<TimeName> = iqama.drain().into_iter().map(|e| e.name).collect();
    assert_eq!(
        names,
        vec![
            TimeName::Fajr,
            TimeName::Dhuhr,
            TimeName::Asr,
            TimeName::Maghrib,
            TimeName::Isha
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_qiyam_and_night_boundary() {
    let (calculator, _clock) = calculator_at(local(2022, 1, 1, 12, 0));
    let middle = calculator.middle_of_the_night();
    let last_third = calculator.last_third_of_the_night();
    let mut qiyam = calculator.qiyam_events().unwrap();
    let mut nights = calculator.new_night_events().unwrap();

    sleep_hours(18).await;

    let events = qiyam.drain();
    assert_eq!(events.len(), 2);
    assert_eq!((events[0].name, events[0].time), (TimeName::MiddleOfTheNight, middle));
    assert_eq!((events[1].name, events[1].time), (TimeName::LastThirdOfTheNight, last_third));
    assert!(events.iter().all(|e| e.kind == EventKind::Transient));

    let boundaries = nights.drain();
    assert_eq!(boundaries.len(), 1);
    assert_eq!(boundaries[0].time, last_third);
}

#[tokio::test(start_paused = true)]
async fn test_late_subscriber_waits_for_next_day() {
    let (calculator, _clock) = calculator_at(local(2022, 1, 1, 22, 0));
    let mut adhan = calculator.adhan_events().unwrap();

    sleep_hours(4).await;
    assert!(adhan.drain().is_empty());

    sleep_hours(4).await;
    let events = adhan.drain();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].name, TimeName::Fajr);
    assert_eq!(
        events[0].time.with_timezone(&plus8()).date_naive(),
        ymd(2022, 1, 2)
    );
}

#[tokio::test(start_paused = true)]
async fn test_current_and_next_prayer() {
    let (calculator, _clock) = calculator_at(local(2022, 1, 1, 12, 0));
    assert_eq!(calculator.current_prayer().map(|p| p.prayer), Some(Prayer::Sunrise));
    assert_eq!(calculator.next_prayer().map(|p| p.prayer), Some(Prayer::Dhuhr));
}

// ============================================================================
// Reconfiguration
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_equal_writes_touch_nothing() {
    let (calculator, _clock) = calculator_at(local(2022, 1, 1, 0, 0));
    let mut adhan = calculator.adhan_events().unwrap();
    let before = calculator.registry_stats();

    assert!(calculator.set_calculation_options(ConfigPatch::new()).unwrap().is_empty());
    let same = ConfigPatch::new()
        .method(Method::Singapore)
        .location(2.9213, 101.6559)
        .date(ymd(2022, 1, 1));
    assert!(calculator.set_calculation_options(same).unwrap().is_empty());
    assert_eq!(calculator.registry_stats(), before);

    sleep_hours(24).await;
    assert_eq!(adhan.drain().len(), 6);
}

#[tokio::test(start_paused = true)]
async fn test_method_change_rearms_day_and_night() {
    let (calculator, _clock) = calculator_at(local(2022, 1, 1, 0, 0));
    let before = calculator.prayer_times();

    let changed = calculator
        .set_calculation_options(ConfigPatch::new().method(Method::MuslimWorldLeague))
        .unwrap();
    assert_eq!(changed, vec![ConfigField::Method]);

    let stats = calculator.registry_stats();
    assert_eq!((stats.armed, stats.cancelled, stats.active), (10, 5, 5));
    assert_ne!(calculator.prayer_times().time(Prayer::Fajr), before.time(Prayer::Fajr));
    assert_eq!(calculator.calculation_options().method, Method::MuslimWorldLeague);
}

#[tokio::test(start_paused = true)]
async fn test_iqama_change_rearms_iqama_only() {
    let (calculator, _clock) = calculator_at(local(2022, 1, 1, 0, 0));
    let mut iqama = calculator.iqama_events().unwrap();

    let waits = IqamaWaits {
        fajr: 30,
        ..IqamaWaits::default()
    };
    let changed = calculator
        .set_calculation_options(ConfigPatch::new().iqama(waits))
        .unwrap();
    assert_eq!(changed, vec![ConfigField::Iqama]);
    let stats = calculator.registry_stats();
    assert_eq!((stats.armed, stats.cancelled), (6, 1));

    let fajr = calculator.prayer_time(Prayer::Fajr);
    let first = iqama.recv().await.unwrap();
    assert!(within(first.time, fajr + chrono::Duration::minutes(30), 1));
}

#[tokio::test(start_paused = true)]
async fn test_invalid_write_surfaces_synchronously() {
    let (calculator, _clock) = calculator_at(local(2022, 1, 1, 0, 0));
    let before = calculator.registry_stats();

    let err = calculator
        .set_calculation_options(ConfigPatch::new().location(-91.0, 0.0))
        .unwrap_err();
    assert!(matches!(err, SdkError::Config(CalcError::InvalidLatitude(_))));
    assert_eq!(calculator.registry_stats(), before);
    assert_eq!(calculator.calculation_options().latitude, 2.9213);
}

// ============================================================================
// Disposal
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_dispose_ends_streams_and_rejects_use() {
    let (calculator, _clock) = calculator_at(local(2022, 1, 1, 0, 0));
    let mut adhan = calculator.adhan_events().unwrap();
    let mut days = calculator.new_day_events().unwrap();

    calculator.dispose();
    calculator.dispose();

    assert!(calculator.is_disposed());
    assert_eq!(adhan.recv().await, None);
    assert_eq!(days.recv().await, None);
    assert_eq!(calculator.registry_stats().active, 0);

    assert!(matches!(calculator.adhan_events(), Err(SdkError::Disposed)));
    assert!(matches!(calculator.new_day_events(), Err(SdkError::Disposed)));
    assert!(matches!(
        calculator.set_calculation_options(ConfigPatch::new().method(Method::Karachi)),
        Err(SdkError::Disposed)
    ));
}

#[tokio::test(start_paused = true)]
async fn test_drop_disposes() {
    let (calculator, _clock) = calculator_at(local(2022, 1, 1, 0, 0));
    let mut qiyam = calculator.qiyam_events().unwrap();
    drop(calculator);
    assert_eq!(qiyam.recv().await, None);
}
