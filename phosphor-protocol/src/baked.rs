//! Baked animation records
//!
//! The offline baking tool converts source images into JSON records of
//! this shape. Field names and defaults match its output exactly; frame
//! pixel data is base64 of the packed 1-bpp rows and is decoded while the
//! record is deserialized.

use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Deserializer};

/// A full baked animation as emitted by the baking tool
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnimationRecord {
    /// Registry key; loading a second record with the same name replaces the first
    #[serde(default = "default_name")]
    pub name: String,
    /// Pixel width of every frame
    #[serde(default = "default_side")]
    pub width: usize,
    /// Pixel height of every frame
    #[serde(default = "default_side")]
    pub height: usize,
    /// Placements of this animation on the grid
    #[serde(default)]
    pub regions: Vec<RegionRecord>,
    /// Ordered frames
    #[serde(default)]
    pub frames: Vec<FrameRecord>,
    /// Playback duration in seconds (one full cycle, including the return
    /// trip when `reverse` is set)
    #[serde(default)]
    pub duration: f32,
    /// Fixed hold at the terminal frame, in seconds (0 = unset)
    #[serde(default)]
    pub hold: f32,
    /// Random hold range in seconds; used only when `hold` is 0
    #[serde(default, rename = "randomHold")]
    pub random_hold: HoldRange,
    /// Restart after the last frame
    #[serde(default, rename = "loop")]
    pub looping: bool,
    /// Play forward then backward as one round trip
    #[serde(default)]
    pub reverse: bool,
}

impl AnimationRecord {
    /// Parse a record from its JSON text
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// A placement of the animation on the physical grid
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegionRecord {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    /// Mirror the frames horizontally
    #[serde(default)]
    pub mirror: bool,
    /// Flip the frames vertically
    #[serde(default)]
    pub flip: bool,
}

/// One frame: stable id plus packed 1-bpp pixel rows
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FrameRecord {
    pub id: u32,
    /// Packed pixel data, base64 in the JSON
    #[serde(deserialize_with = "base64_bytes")]
    pub data: Vec<u8>,
}

/// Uniform random hold range in seconds, end exclusive
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct HoldRange {
    #[serde(default)]
    pub start: f32,
    #[serde(default)]
    pub end: f32,
}

fn default_name() -> String {
    String::from("default")
}

fn default_side() -> usize {
    8
}

fn base64_bytes<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    let text = String::deserialize(deserializer)?;
    STANDARD.decode(&text).map_err(serde::de::Error::custom)
}
