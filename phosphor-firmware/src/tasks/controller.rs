//! Main controller task
//!
//! Owns the animation registry and the matrix driver. Receives tick
//! signals and parsed commands, advances playback, and pushes the
//! composited buffer to the chain.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_rp::clocks::RoscRng;
use embassy_rp::gpio::Output;
use embassy_rp::peripherals::SPI1;
use embassy_rp::spi::{Blocking, Spi};
use embassy_time::Instant;

use phosphor_core::animation::{Animation, Registry};
use phosphor_drivers::Matrix;
use phosphor_protocol::AnimationRecord;

use crate::channels::COMMAND_CHANNEL;
use crate::tasks::tick::TICK_SIGNAL;

/// The concrete matrix driver for this board
pub type SignMatrix = Matrix<Spi<'static, SPI1, Blocking>, Output<'static>>;

/// Baked animations compiled into the firmware
const PRELOADED_ANIMATIONS: &[&str] = &[
    include_str!("../../data/heartbeat.json"),
    include_str!("../../data/scan.json"),
];

/// Controller task - main coordination loop
#[embassy_executor::task]
pub async fn controller_task(mut matrix: SignMatrix, running: bool) {
    info!("Controller task started");

    let mut rng = RoscRng;
    let mut registry = Registry::new();

    if running {
        preload(&mut registry);
    } else {
        info!("Run gate is off, nothing plays until commanded");
    }

    loop {
        match select(TICK_SIGNAL.wait(), COMMAND_CHANNEL.receive()).await {
            Either::First(now_ms) => {
                registry.tick(now_ms, matrix.bitmap_mut(), &mut rng);
                if matrix.show(false).is_err() {
                    warn!("Display transfer failed");
                }
            }
            Either::Second(command) => {
                let now_ms = Instant::now().as_millis();
                if let Err(e) = registry.apply(&command, matrix.bitmap_mut(), now_ms) {
                    warn!("Command rejected: {:?}", e);
                }
                // Push the effect immediately rather than waiting a tick
                if matrix.show(false).is_err() {
                    warn!("Display transfer failed");
                }
            }
        }
    }
}

/// Load the embedded baked animations and start them
fn preload(registry: &mut Registry) {
    let now_ms = Instant::now().as_millis();
    for text in PRELOADED_ANIMATIONS {
        let record = match AnimationRecord::from_json(text) {
            Ok(record) => record,
            Err(_) => {
                error!("Embedded animation is not valid JSON");
                continue;
            }
        };
        match Animation::from_record(&record) {
            Ok(mut animation) => {
                animation.play(now_ms);
                registry.add(animation);
            }
            Err(e) => error!("Embedded animation has bad frame data: {:?}", e),
        }
    }
    info!("Preloaded {} animations", registry.len());
}
