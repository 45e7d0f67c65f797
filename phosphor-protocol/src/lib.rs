//! Control protocol for the Phosphor sign
//!
//! The sign is driven by newline-delimited JSON control messages:
//!
//! ```text
//! {"command": "<name>", "payload": { ... }}
//! ```
//!
//! Each message mutates the active animation set (load/play/stop/pause/
//! resume/clear/test). The `load` payload embeds a full baked-animation
//! record as produced by the offline baking tool, with frame pixel data
//! packed 1-bpp and base64 encoded.
//!
//! Parsing a message yields a closed [`Command`] variant; execution is a
//! single `match` in the controller. A malformed message fails parsing of
//! that message only and never carries state into the next one.

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

pub mod baked;
pub mod command;

pub use baked::{AnimationRecord, FrameRecord, HoldRange, RegionRecord};
pub use command::{ClearRect, ClearTarget, Command};
