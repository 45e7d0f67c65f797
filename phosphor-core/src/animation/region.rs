//! Region placements
//!
//! A region places an animation's frames somewhere on the physical grid,
//! optionally mirrored or flipped. The transform is baked into a copy of
//! each frame once, at attach time, so the per-tick composite is a plain
//! blit.

use alloc::string::String;
use alloc::vec::Vec;

use phosphor_protocol::RegionRecord;

use crate::render::{Bitmap, Frame};

/// A placement of an animation on the grid plus its geometric transform
#[derive(Debug, Clone)]
pub struct Region {
    name: String,
    x: i32,
    y: i32,
    mirror: bool,
    flip: bool,
    /// One transformed frame copy per animation frame, same order
    frames: Vec<Bitmap>,
}

impl Region {
    /// Create an empty region
    pub fn new(name: String, x: i32, y: i32, mirror: bool, flip: bool) -> Self {
        Self {
            name,
            x,
            y,
            mirror,
            flip,
            frames: Vec::new(),
        }
    }

    /// Build a region from its baked record
    pub fn from_record(record: &RegionRecord) -> Self {
        Self::new(
            record.name.clone(),
            record.x,
            record.y,
            record.mirror,
            record.flip,
        )
    }

    /// Transform a copy of `frame` by this region's flags and append it to
    /// the frame cache
    pub fn attach_frame(&mut self, frame: &Frame) {
        let mut copy = frame.bitmap().clone();
        if self.mirror {
            copy.mirror();
        }
        if self.flip {
            copy.flip();
        }
        self.frames.push(copy);
    }

    /// Cached frame at the given playback position
    pub fn frame(&self, index: usize) -> Option<&Bitmap> {
        self.frames.get(index)
    }

    /// Number of cached frames
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn mirror(&self) -> bool {
        self.mirror
    }

    pub fn flip(&self) -> bool {
        self.flip
    }
}
