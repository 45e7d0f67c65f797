//! Device configuration type definitions
//!
//! The sign's persisted configuration is a JSON record consumed once at
//! startup; field names match the deployed config files.

use alloc::string::String;
use alloc::vec::Vec;

use serde::Deserialize;

/// Persisted sign configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SignConfig {
    /// Devices across
    #[serde(default)]
    pub cols: usize,
    /// Devices down
    #[serde(default)]
    pub rows: usize,
    /// Reverse device ids along the chain
    #[serde(default, rename = "reverse")]
    pub reverse_ids: bool,
    /// MAX7219 intensity, 0-15
    #[serde(default = "default_brightness")]
    pub brightness: u8,
    /// Device ids present in the chain but never transmitted to
    #[serde(default)]
    pub skip_devices: Vec<usize>,
    /// Folder of baked animations to preload at boot
    #[serde(default)]
    pub preload_animation_path: String,
    /// Master run gate for the render loop
    #[serde(default)]
    pub running: bool,
}

fn default_brightness() -> u8 {
    7
}

impl Default for SignConfig {
    fn default() -> Self {
        Self {
            cols: 0,
            rows: 0,
            reverse_ids: false,
            brightness: default_brightness(),
            skip_devices: Vec::new(),
            preload_animation_path: String::new(),
            running: false,
        }
    }
}
