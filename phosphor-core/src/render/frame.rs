//! Baked animation frames
//!
//! Frames arrive from the offline baking tool as a packed bit array:
//! row-major pixel order, least significant bit first within each byte.
//! Note this differs from [`Bitmap`]'s internal MSB-first row packing;
//! decoding converts between the two.

use super::Bitmap;

use alloc::vec;
use alloc::vec::Vec;

/// Errors decoding a packed frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Packed data holds fewer bits than `width * height`
    TruncatedData { expected: usize, got: usize },
}

/// One still of an animation: stable id plus an immutable raster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    id: u32,
    bitmap: Bitmap,
}

impl Frame {
    /// Decode a frame from the baking tool's packed bit stream
    pub fn from_packed(id: u32, width: usize, height: usize, data: &[u8]) -> Result<Self, FrameError> {
        let expected = (width * height).div_ceil(8);
        if data.len() < expected {
            return Err(FrameError::TruncatedData {
                expected,
                got: data.len(),
            });
        }
        let mut bitmap = Bitmap::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let bit = y * width + x;
                if data[bit / 8] & (1 << (bit % 8)) != 0 {
                    bitmap.set_pixel(x, y, true);
                }
            }
        }
        Ok(Self { id, bitmap })
    }

    /// Stable frame identifier assigned by the baking tool
    pub fn id(&self) -> u32 {
        self.id
    }

    /// The frame's pixels
    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    /// Re-encode into the baking tool's packed bit stream
    pub fn to_packed(&self) -> Vec<u8> {
        let width = self.bitmap.width();
        let height = self.bitmap.height();
        let mut data = vec![0u8; (width * height).div_ceil(8)];
        for y in 0..height {
            for x in 0..width {
                if self.bitmap.pixel(x, y) {
                    let bit = y * width + x;
                    data[bit / 8] |= 1 << (bit % 8);
                }
            }
        }
        data
    }
}
