//! Sign configuration loading
//!
//! The configuration is a JSON file embedded at compile time; build.rs
//! validates it so a bad file fails the build rather than the boot.

use defmt::*;

use phosphor_core::config::SignConfig;
use phosphor_drivers::matrix::MAX_SKIP_DEVICES;
use phosphor_drivers::MatrixConfig;

/// Embedded configuration (compiled into firmware)
/// Edit sign.json and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../sign.json");

/// Parse the embedded configuration
pub fn load() -> SignConfig {
    match serde_json::from_str(EMBEDDED_CONFIG) {
        Ok(config) => config,
        Err(_) => {
            // build.rs validates sign.json, so this only fires if the
            // build was somehow skipped
            error!("Embedded sign.json failed to parse, using defaults");
            SignConfig::default()
        }
    }
}

/// Derive the matrix driver geometry from the sign configuration
pub fn matrix_config(config: &SignConfig) -> MatrixConfig {
    let mut skip_devices = heapless::Vec::new();
    for &id in &config.skip_devices {
        if skip_devices.push(id).is_err() {
            warn!("Skip list truncated to {} entries", MAX_SKIP_DEVICES);
            break;
        }
    }
    MatrixConfig {
        cols: config.cols,
        rows: config.rows,
        reverse_ids: config.reverse_ids,
        skip_devices,
    }
}
