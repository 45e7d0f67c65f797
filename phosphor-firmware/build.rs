//! Build script for phosphor-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates sign.json and the embedded animation files at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

fn main() {
    setup_linker();
    validate_sign_config();
    validate_animations();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate sign.json at compile time
fn validate_sign_config() {
    println!("cargo:rerun-if-changed=sign.json");

    let config_path = Path::new("sign.json");
    if !config_path.exists() {
        panic!("sign.json not found - the firmware embeds it via include_str!");
    }

    let content = fs::read_to_string(config_path)
        .unwrap_or_else(|e| panic!("failed to read sign.json: {e}"));
    let config: serde_json::Value = serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("invalid JSON in sign.json: {e}"));

    let mut errors = Vec::new();
    for field in ["cols", "rows"] {
        match config.get(field).and_then(|v| v.as_u64()) {
            Some(0) | None => errors.push(format!("'{field}' must be a positive integer")),
            Some(_) => {}
        }
    }
    if let Some(brightness) = config.get("brightness").and_then(|v| v.as_u64()) {
        if brightness > 15 {
            errors.push("'brightness' must be 0-15".to_string());
        }
    }

    if !errors.is_empty() {
        panic!("invalid sign.json:\n  {}", errors.join("\n  "));
    }
}

/// Validate the embedded animation files under data/
fn validate_animations() {
    println!("cargo:rerun-if-changed=data");

    for entry in fs::read_dir("data").unwrap_or_else(|e| panic!("failed to read data/: {e}")) {
        let path = entry.unwrap().path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let content = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()));
        let animation: serde_json::Value = serde_json::from_str(&content)
            .unwrap_or_else(|e| panic!("invalid JSON in {}: {e}", path.display()));

        let frames = animation
            .get("frames")
            .and_then(|f| f.as_array())
            .unwrap_or_else(|| panic!("{}: missing 'frames' array", path.display()));
        if frames.is_empty() {
            panic!("{}: 'frames' must not be empty", path.display());
        }
        for (i, frame) in frames.iter().enumerate() {
            if frame.get("data").and_then(|d| d.as_str()).is_none() {
                panic!("{}: frame {i} missing base64 'data'", path.display());
            }
        }
    }
}
