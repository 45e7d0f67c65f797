//! Raster primitives for the sign's 1-bit pixel surfaces
//!
//! Everything the sign draws is a packed 1-bpp raster: the shared display
//! buffer owned by the matrix driver, the baked animation frames, and the
//! per-region transformed frame copies. There is exactly one pixel format,
//! so this module is plain data plus methods rather than a trait hierarchy.

mod bitmap;
mod frame;

pub use bitmap::Bitmap;
pub use frame::{Frame, FrameError};
