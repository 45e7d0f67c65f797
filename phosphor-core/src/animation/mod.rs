//! Animation playback
//!
//! An [`Animation`] is a named, ordered set of baked frames plus one or
//! more [`Region`] placements on the grid, with its own playback clock.
//! The [`Registry`] owns every loaded animation, composites the playing
//! ones into a target bitmap each tick, and applies control commands.

mod player;
mod region;
mod registry;

pub use player::Animation;
pub use region::Region;
pub use registry::{CommandError, Registry};
