//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod command_rx;
pub mod controller;
pub mod tick;

pub use command_rx::command_rx_task;
pub use controller::{controller_task, SignMatrix};
pub use tick::tick_task;
