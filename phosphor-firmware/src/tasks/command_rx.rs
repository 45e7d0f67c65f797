//! Serial command receive task
//!
//! Receives newline-delimited JSON commands over UART and dispatches the
//! parsed commands to the controller.

use alloc::vec::Vec;

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;

use phosphor_protocol::Command;

use crate::channels::COMMAND_CHANNEL;

/// Buffer size for UART reads
const RX_BUF_SIZE: usize = 64;

/// Upper bound on one command line; a `load` carrying base64 frames is
/// the largest message we accept
const MAX_LINE_LEN: usize = 8 * 1024;

/// Command RX task - accumulates lines and parses them as commands
#[embassy_executor::task]
pub async fn command_rx_task(mut rx: BufferedUartRx) {
    info!("Command RX task started");

    let mut line: Vec<u8> = Vec::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                trace!("RX: {} bytes", n);
                for &byte in &buf[..n] {
                    match byte {
                        b'\n' => {
                            handle_line(&line).await;
                            line.clear();
                        }
                        b'\r' => {}
                        _ => {
                            if line.len() < MAX_LINE_LEN {
                                line.push(byte);
                            } else {
                                warn!("Command line too long, dropping");
                                line.clear();
                            }
                        }
                    }
                }
            }
            Ok(_) => {
                // No bytes read, continue
            }
            Err(e) => {
                warn!("UART read error: {:?}", e);
            }
        }
    }
}

/// Parse one accumulated line and forward the command
async fn handle_line(line: &[u8]) {
    if line.is_empty() {
        return;
    }
    let Ok(text) = core::str::from_utf8(line) else {
        warn!("Command line is not valid UTF-8");
        return;
    };
    match Command::from_json(text) {
        Ok(command) => {
            debug!("Command received");
            // Send to command channel, dropping if full
            if COMMAND_CHANNEL.try_send(command).is_err() {
                warn!("Command channel full, dropping command");
            }
        }
        Err(_) => {
            warn!("Failed to parse command");
        }
    }
}
