//! Phosphor - Programmable LED Sign Firmware
//!
//! Main firmware binary for RP2040-boarded signs built from cascaded
//! MAX7219 8x8 matrices. Plays baked animations composited onto the
//! grid and accepts JSON commands over UART.

#![no_std]
#![no_main]

extern crate alloc;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::UART0;
use embassy_rp::spi::{self, Spi};
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embedded_alloc::LlffHeap as Heap;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use phosphor_drivers::Matrix;

mod channels;
mod config;
mod tasks;

// Heap allocator for JSON parsing and frame storage
#[global_allocator]
static HEAP: Heap = Heap::empty();

// Heap size: 64KB
const HEAP_SIZE: usize = 64 * 1024;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 1024]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Phosphor firmware starting...");

    // Initialize heap allocator
    init_heap();

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let sign_config = config::load();
    info!(
        "Sign: {}x{} devices, brightness {}, running={}",
        sign_config.cols, sign_config.rows, sign_config.brightness, sign_config.running
    );

    // Setup UART for the command link
    let uart_config = UartConfig::default(); // 115200 baud default

    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 1024]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (_tx, rx) = uart.split();

    info!("UART initialized for command link");

    // Setup SPI1 for the MAX7219 chain
    // Pin assignments are board-specific: SCK=GPIO10, MOSI=GPIO11, CS=GPIO13
    let mut spi_config = spi::Config::default();
    spi_config.frequency = 10_000_000;
    let spi = Spi::new_blocking_txonly(p.SPI1, p.PIN_10, p.PIN_11, spi_config);
    let cs = Output::new(p.PIN_13, Level::High);

    let mut matrix = unwrap!(Matrix::new(spi, cs, config::matrix_config(&sign_config)));
    if matrix.brightness(sign_config.brightness).is_err() {
        warn!(
            "Brightness {} out of range, falling back to default",
            sign_config.brightness
        );
        unwrap!(matrix.brightness(7));
    }

    // Blank any stale chip row RAM before the first composite
    unwrap!(matrix.show(true));

    info!(
        "Matrix initialized: {}x{} pixels across {} devices",
        matrix.width(),
        matrix.height(),
        matrix.device_count()
    );

    // Spawn tasks
    spawner.spawn(tasks::tick_task()).unwrap();
    spawner.spawn(tasks::command_rx_task(rx)).unwrap();
    spawner
        .spawn(tasks::controller_task(matrix, sign_config.running))
        .unwrap();

    info!("All tasks spawned, firmware running");

    // Main task has nothing else to do - all work happens in spawned tasks
    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

/// Initialize the heap allocator
fn init_heap() {
    use core::mem::MaybeUninit;
    static mut HEAP_MEM: [MaybeUninit<u8>; HEAP_SIZE] = [MaybeUninit::uninit(); HEAP_SIZE];
    #[allow(static_mut_refs)]
    unsafe {
        HEAP.init(HEAP_MEM.as_ptr() as usize, HEAP_SIZE)
    }
}
