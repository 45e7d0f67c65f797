//! Tick task for the render loop
//!
//! Provides periodic ticks to the controller for animation advancement
//! and display refresh.

use defmt::*;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant, Ticker};

/// Render loop rate in frames per second
pub const TICK_RATE_HZ: u64 = 45;

/// Signal to notify the controller of a tick, carrying elapsed milliseconds
pub static TICK_SIGNAL: Signal<CriticalSectionRawMutex, u64> = Signal::new();

/// Tick task - sends periodic tick signals with timestamp
#[embassy_executor::task]
pub async fn tick_task() {
    info!("Tick task started");

    let mut ticker = Ticker::every(Duration::from_hz(TICK_RATE_HZ));

    loop {
        ticker.next().await;

        // Milliseconds since boot. A missed deadline collapses into the
        // latest value; the controller only ever wants the newest
        // timestamp.
        TICK_SIGNAL.signal(Instant::now().as_millis());
    }
}
