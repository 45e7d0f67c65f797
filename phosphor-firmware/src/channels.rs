//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.
//! Uses embassy-sync primitives for safe async communication.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use phosphor_protocol::Command;

/// Channel capacity for commands from the serial link
const COMMAND_CHANNEL_SIZE: usize = 8;

/// Parsed commands from the serial link, consumed by the controller
pub static COMMAND_CHANNEL: Channel<CriticalSectionRawMutex, Command, COMMAND_CHANNEL_SIZE> =
    Channel::new();
