//! Basic usage of the reactive calculator
//!
//! Prints today's times, then every adhan, iqama and night milestone as it
//! happens. Reads `<config dir>/salat-sdk/config.json` when present and
//! falls back to Makkah.
//!
//! Run with: SALAT_LOG_MODE=development cargo run -p salat-sdk --example basic_usage

use salat_sdk::{load_default_config, CalculationConfig, Method, ReactiveCalculator, SdkError};

#[tokio::main]
async fn main() -> Result<(), SdkError> {
    salat_sdk::logging::init_logging_from_env().ok();

    let config = load_default_config().unwrap_or_else(|e| {
        println!("Using Makkah defaults ({})", e);
        CalculationConfig::new(21.4225, 39.8262).with_method(Method::UmmAlQura)
    });

    let calculator = ReactiveCalculator::new(config)?;

    println!("Prayer times for {} ({})", calculator.prayer_times().date(), calculator.hijri_date());
    println!("==============================");
    for p in calculator.prayer_times().iter() {
        println!("   {:<8} {}", p.prayer.to_string(), p.time.with_timezone(&chrono::Local).format("%H:%M"));
    }
    println!("   Qibla    {:.1}°", calculator.qibla_direction());

    if let Some(next) = calculator.next_prayer() {
        println!("\nNext: {} at {}", next.prayer, next.time.with_timezone(&chrono::Local).format("%H:%M"));
    }

    let mut prayers = calculator.prayer_events()?;
    let mut night = calculator.qiyam_events()?;
    let mut days = calculator.new_day_events()?;

    println!("\nWaiting for events (Ctrl+C to stop)...");
    loop {
        tokio::select! {
            Some(event) = prayers.recv() => println!("   {}", event),
            Some(event) = night.recv() => println!("   {}", event),
            Some(tick) = days.recv() => println!("   new day #{} at {}", tick.index, tick.time),
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    calculator.dispose();
    Ok(())
}
