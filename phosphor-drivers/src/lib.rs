//! Hardware driver implementations for the Phosphor sign
//!
//! Drivers are generic over `embedded-hal` 1.0 traits so they can run on
//! any MCU HAL (and against mock buses in tests).

#![no_std]
#![deny(unsafe_code)]

pub mod matrix;

pub use matrix::{Matrix, MatrixConfig, MatrixError};
