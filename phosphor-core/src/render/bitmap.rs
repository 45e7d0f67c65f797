//! Packed 1-bpp bitmap
//!
//! Rows are byte-aligned with the most significant bit of each byte being
//! the leftmost pixel, matching the row-register layout of the MAX7219
//! chain. For a display that is `cols` devices wide the row stride is
//! exactly `cols` bytes, so the raw byte slice doubles as the wire buffer.

use alloc::vec;
use alloc::vec::Vec;

/// Packed 1-bit-per-pixel raster surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: usize,
    height: usize,
    /// Row stride in bytes
    stride: usize,
    bytes: Vec<u8>,
}

impl Bitmap {
    /// Create a new all-off bitmap
    pub fn new(width: usize, height: usize) -> Self {
        let stride = width.div_ceil(8);
        Self {
            width,
            height,
            stride,
            bytes: vec![0; stride * height],
        }
    }

    /// Width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw packed bytes, row-major with byte-aligned rows
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Get a pixel; out-of-bounds reads as off
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.bytes[y * self.stride + x / 8] & (0x80 >> (x % 8)) != 0
    }

    /// Set a pixel; out-of-bounds writes are dropped
    pub fn set_pixel(&mut self, x: usize, y: usize, on: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        let byte = &mut self.bytes[y * self.stride + x / 8];
        let mask = 0x80 >> (x % 8);
        if on {
            *byte |= mask;
        } else {
            *byte &= !mask;
        }
    }

    /// Set every pixel
    pub fn fill(&mut self, on: bool) {
        let value = if on { 0xFF } else { 0x00 };
        self.bytes.fill(value);
    }

    /// Set every pixel of a rectangle, clipped to the bitmap bounds
    pub fn fill_rect(&mut self, x: i32, y: i32, w: usize, h: usize, on: bool) {
        for dy in 0..h {
            for dx in 0..w {
                let (px, py) = (x + dx as i32, y + dy as i32);
                if px >= 0 && py >= 0 {
                    self.set_pixel(px as usize, py as usize, on);
                }
            }
        }
    }

    /// Copy `src` onto this bitmap with its top-left corner at `(x, y)`
    ///
    /// Source pixel values overwrite the destination (off pixels clear).
    /// Pixels falling outside the destination are dropped, never an error.
    pub fn blit(&mut self, src: &Bitmap, x: i32, y: i32) {
        for sy in 0..src.height {
            for sx in 0..src.width {
                let (dx, dy) = (x + sx as i32, y + sy as i32);
                if dx >= 0 && dy >= 0 {
                    self.set_pixel(dx as usize, dy as usize, src.pixel(sx, sy));
                }
            }
        }
    }

    /// Mirror horizontally in place
    pub fn mirror(&mut self) {
        for y in 0..self.height {
            for x in 0..self.width / 2 {
                let left = self.pixel(x, y);
                let right = self.pixel(self.width - x - 1, y);
                self.set_pixel(x, y, right);
                self.set_pixel(self.width - x - 1, y, left);
            }
        }
    }

    /// Flip vertically in place
    pub fn flip(&mut self) {
        for y in 0..self.height / 2 {
            for x in 0..self.width {
                let top = self.pixel(x, y);
                let bottom = self.pixel(x, self.height - y - 1);
                self.set_pixel(x, y, bottom);
                self.set_pixel(x, self.height - y - 1, top);
            }
        }
    }

    /// Copy a rectangle out into a new bitmap
    ///
    /// Pixels read from outside the source bounds come back off.
    pub fn copy_rect(&self, x: usize, y: usize, w: usize, h: usize) -> Bitmap {
        let mut copy = Bitmap::new(w, h);
        for cy in 0..h {
            for cx in 0..w {
                copy.set_pixel(cx, cy, self.pixel(x + cx, y + cy));
            }
        }
        copy
    }
}
