//! Animation registry and command dispatch
//!
//! The registry owns every loaded animation, keyed by name; inserting an
//! existing name replaces the previous entry. One owner drives both the
//! per-tick composite pass and control-command application, so playback
//! state is never shared across tasks.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use rand_core::RngCore;

use phosphor_protocol::{ClearRect, ClearTarget, Command};

use super::Animation;
use crate::render::{Bitmap, FrameError};

/// Non-fatal command application failures
///
/// None of these disturb the display, the other animations, or the render
/// loop; the caller reports them and drops the command.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Command referenced an animation name that is not loaded
    UnknownAnimation(String),
    /// `clear region` arrived with an empty rectangle list
    NoRegionsToClear,
    /// A baked record's frame data did not decode
    BadFrame(FrameError),
}

impl From<FrameError> for CommandError {
    fn from(e: FrameError) -> Self {
        CommandError::BadFrame(e)
    }
}

/// Name -> animation mapping plus the compositing pass
#[derive(Debug, Default)]
pub struct Registry {
    animations: BTreeMap<String, Animation>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            animations: BTreeMap::new(),
        }
    }

    /// Insert an animation, replacing any previous entry with the same name
    pub fn add(&mut self, animation: Animation) {
        self.animations
            .insert(String::from(animation.name()), animation);
    }

    /// Remove an animation by name
    pub fn remove(&mut self, name: &str) -> Option<Animation> {
        self.animations.remove(name)
    }

    /// Drop every animation
    pub fn clear(&mut self) {
        self.animations.clear();
    }

    pub fn get(&self, name: &str) -> Option<&Animation> {
        self.animations.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Animation> {
        self.animations.get_mut(name)
    }

    pub fn len(&self) -> usize {
        self.animations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }

    /// One render tick: composite every playing animation's current frame
    /// into `display`, then advance the playback clocks
    pub fn tick(&mut self, now_ms: u64, display: &mut Bitmap, rng: &mut dyn RngCore) {
        for animation in self.animations.values_mut() {
            if !animation.is_playing() {
                continue;
            }
            let index = animation.frame_index();
            for region in animation.regions() {
                if let Some(frame) = region.frame(index) {
                    display.blit(frame, region.x(), region.y());
                }
            }
            animation.advance(now_ms, rng);
        }
    }

    /// Apply one control command
    ///
    /// Errors are reference-level failures (unknown name, empty region
    /// list, undecodable frame data); the registry and display are left
    /// unchanged when one is returned.
    pub fn apply(
        &mut self,
        command: &Command,
        display: &mut Bitmap,
        now_ms: u64,
    ) -> Result<(), CommandError> {
        match command {
            Command::Test => {
                self.clear();
                display.fill(true);
                Ok(())
            }
            Command::Play { animation } => {
                self.animation_mut(animation)?.play(now_ms);
                Ok(())
            }
            Command::Stop { animation } => {
                self.animation_mut(animation)?.stop();
                Ok(())
            }
            Command::Pause { animation } => {
                self.animation_mut(animation)?.pause(now_ms);
                Ok(())
            }
            Command::Resume { animation } => {
                self.animation_mut(animation)?.resume(now_ms);
                Ok(())
            }
            Command::Load { animation, play } => {
                let mut loaded = Animation::from_record(animation)?;
                if *play {
                    loaded.play(now_ms);
                }
                self.add(loaded);
                Ok(())
            }
            Command::Clear { target, regions } => self.apply_clear(*target, regions, display),
        }
    }

    fn apply_clear(
        &mut self,
        target: ClearTarget,
        regions: &[ClearRect],
        display: &mut Bitmap,
    ) -> Result<(), CommandError> {
        match target {
            ClearTarget::Display => display.fill(false),
            ClearTarget::Animations => self.clear(),
            ClearTarget::Region => {
                if regions.is_empty() {
                    return Err(CommandError::NoRegionsToClear);
                }
                for rect in regions {
                    // Zero width/height means the full display extent
                    let w = if rect.w == 0 { display.width() } else { rect.w };
                    let h = if rect.h == 0 { display.height() } else { rect.h };
                    display.fill_rect(rect.x, rect.y, w, h, false);
                }
            }
        }
        Ok(())
    }

    fn animation_mut(&mut self, name: &str) -> Result<&mut Animation, CommandError> {
        self.get_mut(name)
            .ok_or_else(|| CommandError::UnknownAnimation(String::from(name)))
    }
}
