//! Board-agnostic core logic for the Phosphor sign firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Packed 1-bpp raster primitives (pixel access, blit, mirror, flip)
//! - Baked frame decoding
//! - Animation playback state machine (forward / ping-pong, holds, loops)
//! - Animation registry and command dispatch
//! - Device configuration type definitions

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

pub mod animation;
pub mod config;
pub mod render;
