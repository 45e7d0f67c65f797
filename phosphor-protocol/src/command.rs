//! Control message parsing
//!
//! One JSON message maps to one [`Command`] variant. The `command` field
//! selects the variant and `payload` carries its fields, so missing
//! required payload fields and unrecognized command names both surface as
//! deserialization errors confined to the offending message.

use alloc::string::String;
use alloc::vec::Vec;

use serde::Deserialize;

use crate::baked::AnimationRecord;

/// A parsed control message
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "command", content = "payload", rename_all = "lowercase")]
pub enum Command {
    /// Clear animations and display, then fill every pixel as a self-test
    Test,
    /// Start an animation from its first frame
    Play { animation: String },
    /// Stop an animation and rewind it
    Stop { animation: String },
    /// Freeze an animation in place
    Pause { animation: String },
    /// Continue a paused animation where it left off
    Resume { animation: String },
    /// Insert (or replace) a baked animation, optionally playing it at once
    Load {
        animation: AnimationRecord,
        #[serde(default)]
        play: bool,
    },
    /// Clear the display, a set of rectangles, or the whole animation set
    Clear {
        #[serde(default)]
        target: ClearTarget,
        #[serde(default)]
        regions: Vec<ClearRect>,
    },
}

impl Command {
    /// Parse one control message from its JSON text
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// What a `clear` message clears
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "lowercase")]
pub enum ClearTarget {
    #[default]
    Display,
    Region,
    Animations,
}

/// A rectangle to clear; `w`/`h` of 0 mean full display width/height
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClearRect {
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    #[serde(default)]
    pub w: usize,
    #[serde(default)]
    pub h: usize,
}
