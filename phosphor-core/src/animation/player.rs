//! Animation playback state machine
//!
//! Timing model: an animation with `F` frames and duration `D` ms plays in
//! `F` equal steps, or `2F - 1` steps for ping-pong reverse playback (the
//! turning frame is not shown twice), so a full round trip still takes
//! `D`. Frame schedules are absolute offsets from the start timestamp; a
//! next-due time of zero means "not due", so a zero-duration animation
//! never advances on its own.
//!
//! A hold pause applies only at the terminal frame of the current
//! direction. A fixed hold always wins over the random range; the random
//! hold is drawn once when the terminal frame is reached and forgotten
//! when playback moves on. Looping always restarts in the forward
//! direction, even from the reverse leg - and the reversing loop boundary
//! lands one step early, matching the shipped behavior of the sign this
//! replaces.

use alloc::string::String;
use alloc::vec::Vec;

use rand_core::RngCore;

use phosphor_protocol::{AnimationRecord, HoldRange};

use super::Region;
use crate::render::{Frame, FrameError};

/// A named animation with its regions, frames, and playback state
#[derive(Debug, Clone)]
pub struct Animation {
    name: String,
    regions: Vec<Region>,
    frames: Vec<Frame>,
    duration_ms: u64,
    hold_ms: u64,
    random_hold_ms: (u64, u64),
    looping: bool,
    reverse: bool,
    // Playback state, touched only by the render loop
    frame_index: usize,
    playing: bool,
    reversing: bool,
    start_ms: u64,
    paused_elapsed_ms: u64,
    pending_hold_ms: Option<u64>,
}

impl Animation {
    /// Create an animation, baking every frame into every region's cache
    pub fn new(
        name: String,
        mut regions: Vec<Region>,
        frames: Vec<Frame>,
        duration_s: f32,
        hold_s: f32,
        random_hold: HoldRange,
        looping: bool,
        reverse: bool,
    ) -> Self {
        for region in &mut regions {
            for frame in &frames {
                region.attach_frame(frame);
            }
        }
        Self {
            name,
            regions,
            frames,
            duration_ms: seconds_to_ms(duration_s),
            hold_ms: seconds_to_ms(hold_s),
            random_hold_ms: (seconds_to_ms(random_hold.start), seconds_to_ms(random_hold.end)),
            looping,
            reverse,
            frame_index: 0,
            playing: false,
            reversing: false,
            start_ms: 0,
            paused_elapsed_ms: 0,
            pending_hold_ms: None,
        }
    }

    /// Build an animation from a baked record, decoding its packed frames
    pub fn from_record(record: &AnimationRecord) -> Result<Self, FrameError> {
        let frames = record
            .frames
            .iter()
            .map(|f| Frame::from_packed(f.id, record.width, record.height, &f.data))
            .collect::<Result<Vec<_>, _>>()?;
        let regions = record.regions.iter().map(Region::from_record).collect();
        Ok(Self::new(
            record.name.clone(),
            regions,
            frames,
            record.duration,
            record.hold,
            record.random_hold,
            record.looping,
            record.reverse,
        ))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_reversing(&self) -> bool {
        self.reversing
    }

    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Start playback from the first frame
    pub fn play(&mut self, now_ms: u64) {
        self.playing = true;
        self.start_ms = now_ms;
        self.frame_index = 0;
        self.reversing = false;
        self.paused_elapsed_ms = 0;
        self.pending_hold_ms = None;
    }

    /// Freeze playback without resetting the frame position
    pub fn pause(&mut self, now_ms: u64) {
        if self.playing {
            self.paused_elapsed_ms = now_ms.saturating_sub(self.start_ms);
            self.playing = false;
        }
    }

    /// Continue playback, preserving the elapsed time recorded at pause
    pub fn resume(&mut self, now_ms: u64) {
        if !self.playing {
            self.start_ms = now_ms.saturating_sub(self.paused_elapsed_ms);
            self.playing = true;
        }
    }

    /// Stop playback and rewind
    pub fn stop(&mut self) {
        self.playing = false;
        self.frame_index = 0;
        self.reversing = false;
        self.start_ms = 0;
        self.paused_elapsed_ms = 0;
        self.pending_hold_ms = None;
    }

    /// Length of one frame step in milliseconds
    fn step_ms(&self) -> u64 {
        let mut steps = self.frames.len() as u64;
        if self.reverse {
            steps = steps * 2 - 1;
        }
        if steps == 0 {
            return 0;
        }
        self.duration_ms / steps
    }

    /// Whether the current frame is the last one in the travel direction
    fn at_terminal_frame(&self) -> bool {
        if self.reversing {
            self.frame_index == 0
        } else {
            self.frame_index + 1 == self.frames.len()
        }
    }

    /// Resolve the hold for the current terminal frame
    ///
    /// A non-zero fixed hold always wins; otherwise a value is drawn from
    /// the random range once and kept until playback moves on.
    fn resolve_hold(&mut self, rng: &mut dyn RngCore) -> u64 {
        if self.hold_ms > 0 {
            return self.hold_ms;
        }
        let (start, end) = self.random_hold_ms;
        if end == 0 || start >= end {
            return 0;
        }
        *self
            .pending_hold_ms
            .get_or_insert_with(|| start + u64::from(rng.next_u32()) % (end - start))
    }

    /// Absolute elapsed-time offset at which the next frame is due, or 0
    /// when nothing is scheduled
    fn next_due_ms(&mut self, rng: &mut dyn RngCore) -> u64 {
        if !self.playing || self.frames.is_empty() {
            return 0;
        }
        if self.at_terminal_frame() {
            let hold = self.resolve_hold(rng);
            if hold > 0 {
                return hold;
            }
        }
        let step = self.step_ms();
        let next_index = (self.frame_index + 1) as u64;
        let mut next = if self.reversing {
            (self.frames.len() as u64 * 2 - next_index) * step
        } else {
            next_index * step
        };
        if self.looping && self.reversing && self.at_terminal_frame() {
            next -= step;
        }
        next
    }

    /// True when the next frame is due
    pub fn should_advance(&mut self, now_ms: u64, rng: &mut dyn RngCore) -> bool {
        if !self.playing {
            return false;
        }
        let next = self.next_due_ms(rng);
        next > 0 && now_ms.saturating_sub(self.start_ms) >= next
    }

    /// Advance the playback position if it is due
    pub fn advance(&mut self, now_ms: u64, rng: &mut dyn RngCore) {
        if !self.should_advance(now_ms, rng) {
            return;
        }
        self.pending_hold_ms = None;

        let last = self.frames.len() - 1;

        // Turning point: enter the reverse leg without re-rendering the
        // last frame a second time
        if self.frame_index == last && self.reverse && !self.reversing {
            self.reversing = true;
            self.frame_index = last.saturating_sub(1);
            return;
        }

        if self.at_terminal_frame() {
            if self.looping {
                // Loops always restart forward, even from the reverse leg
                self.reversing = false;
                self.frame_index = 0;
                self.start_ms = now_ms;
            } else {
                self.stop();
            }
            return;
        }

        if self.reversing {
            self.frame_index -= 1;
        } else {
            self.frame_index += 1;
        }
    }
}

fn seconds_to_ms(seconds: f32) -> u64 {
    (seconds * 1000.0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn animation(frames: usize, duration_s: f32, looping: bool, reverse: bool) -> Animation {
        animation_with_hold(frames, duration_s, 0.0, HoldRange::default(), looping, reverse)
    }

    fn animation_with_hold(
        frames: usize,
        duration_s: f32,
        hold_s: f32,
        random_hold: HoldRange,
        looping: bool,
        reverse: bool,
    ) -> Animation {
        let frames = (0..frames)
            .map(|i| Frame::from_packed(i as u32, 8, 8, &[i as u8; 8]).unwrap())
            .collect();
        Animation::new(
            "test".to_string(),
            vec![Region::new("r".to_string(), 0, 0, false, false)],
            frames,
            duration_s,
            hold_s,
            random_hold,
            looping,
            reverse,
        )
    }

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(0)
    }

    /// Drive the clock forward and collect the frame index after each step
    fn run(anim: &mut Animation, until_ms: u64) -> Vec<(u64, usize)> {
        let mut rng = rng();
        let mut trace = Vec::new();
        for now in 0..=until_ms {
            anim.advance(now, &mut rng);
            match trace.last() {
                Some(&(_, index)) if index == anim.frame_index() => {}
                _ if anim.is_playing() => trace.push((now, anim.frame_index())),
                _ => {}
            }
        }
        trace
    }

    #[test]
    fn test_regions_cache_every_frame() {
        let anim = animation(3, 1.0, false, false);
        assert_eq!(anim.regions()[0].frame_count(), anim.frame_count());
    }

    #[test]
    fn test_one_shot_plays_once_and_stops() {
        let mut anim = animation(4, 1.0, false, false);
        anim.play(0);
        let trace = run(&mut anim, 2000);
        assert_eq!(trace, vec![(0, 0), (250, 1), (500, 2), (750, 3)]);
        assert!(!anim.is_playing());
        assert_eq!(anim.frame_index(), 0);
    }

    #[test]
    fn test_forward_loop_is_periodic() {
        let mut anim = animation(4, 1.0, true, false);
        anim.play(0);
        let mut rng = rng();
        let mut previous = 0;
        for now in 1..=4000u64 {
            anim.advance(now, &mut rng);
            let index = anim.frame_index();
            // Strictly increasing modulo F
            assert!(index == previous || index == (previous + 1) % 4);
            previous = index;
        }
        assert!(anim.is_playing());
    }

    #[test]
    fn test_reverse_one_shot_sequence_and_timing() {
        // 4 frames over 2.0s: step = 2000 / 7 = 285 ms
        let mut anim = animation(4, 2.0, false, true);
        anim.play(0);
        let trace = run(&mut anim, 3000);
        assert_eq!(
            trace,
            vec![
                (0, 0),
                (285, 1),
                (570, 2),
                (855, 3),
                (1140, 2),
                (1425, 1),
                (1710, 0),
            ]
        );
        assert!(!anim.is_playing());
        // Full cycle ends within one step of the configured duration
        let mut check = animation(4, 2.0, false, true);
        check.play(0);
        let mut rng = rng();
        for now in 0..1995 {
            check.advance(now, &mut rng);
            assert!(check.is_playing());
        }
        check.advance(1995, &mut rng);
        assert!(!check.is_playing());
    }

    #[test]
    fn test_reverse_loop_restarts_forward() {
        // Shipped behavior: every loop iteration re-enters the forward leg
        let mut anim = animation(4, 1.4, true, true);
        anim.play(0);
        let mut rng = rng();
        // Step = 200ms; reverse leg bottoms out at frame 0, then restarts
        for now in 0..=1300u64 {
            anim.advance(now, &mut rng);
        }
        assert!(anim.is_playing());
        assert!(!anim.is_reversing());
        assert_eq!(anim.frame_index(), 0);
    }

    #[test]
    fn test_fixed_hold_delays_only_terminal_frame() {
        // 4 frames over 1.0s with a 2.0s hold at the end
        let mut anim = animation_with_hold(4, 1.0, 2.0, HoldRange::default(), true, false);
        anim.play(0);
        let trace = run(&mut anim, 1999);
        // Intermediate steps keep their 250ms schedule
        assert_eq!(trace, vec![(0, 0), (250, 1), (500, 2), (750, 3)]);
        let mut rng = rng();
        anim.advance(2000, &mut rng);
        assert_eq!(anim.frame_index(), 0); // loop restarted after the hold
    }

    #[test]
    fn test_fixed_hold_wins_over_random_range() {
        let range = HoldRange { start: 100.0, end: 200.0 };
        let mut anim = animation_with_hold(2, 0.2, 3.0, range, false, false);
        anim.play(0);
        let mut rng = rng();
        for now in 0..3000u64 {
            anim.advance(now, &mut rng);
        }
        // Still holding at the fixed 3s, not a random 100-200s value
        assert!(anim.is_playing());
        anim.advance(3000, &mut rng);
        assert!(!anim.is_playing());
    }

    #[test]
    fn test_random_hold_within_range() {
        let range = HoldRange { start: 1.0, end: 3.0 };
        let mut anim = animation_with_hold(2, 0.2, 0.0, range, false, false);
        anim.play(0);
        let mut rng = rng();
        // Reach the terminal frame
        anim.advance(100, &mut rng);
        assert_eq!(anim.frame_index(), 1);
        // Never due before the range start
        assert!(!anim.should_advance(999, &mut rng));
        // Always due by the range end
        assert!(anim.should_advance(3000, &mut rng));
    }

    #[test]
    fn test_zero_duration_never_advances() {
        let mut anim = animation(4, 0.0, true, false);
        anim.play(0);
        let mut rng = rng();
        assert!(!anim.should_advance(10_000, &mut rng));
        anim.advance(10_000, &mut rng);
        assert_eq!(anim.frame_index(), 0);
        assert!(anim.is_playing());
    }

    #[test]
    fn test_empty_animation_never_advances() {
        let mut anim = animation(0, 1.0, true, false);
        anim.play(0);
        let mut rng = rng();
        assert!(!anim.should_advance(10_000, &mut rng));
    }

    #[test]
    fn test_pause_preserves_elapsed_time() {
        let mut anim = animation(4, 1.0, false, false);
        anim.play(0);
        let mut rng = rng();
        anim.advance(250, &mut rng);
        assert_eq!(anim.frame_index(), 1);

        anim.pause(300);
        anim.advance(5000, &mut rng);
        assert_eq!(anim.frame_index(), 1); // frozen

        // Resume 5s later: 300ms of the schedule already elapsed, so the
        // next frame lands 200ms after resuming
        anim.resume(5300);
        anim.advance(5400, &mut rng);
        assert_eq!(anim.frame_index(), 1);
        anim.advance(5500, &mut rng);
        assert_eq!(anim.frame_index(), 2);
    }

    #[test]
    fn test_stop_rewinds() {
        let mut anim = animation(4, 1.0, false, false);
        anim.play(0);
        let mut rng = rng();
        anim.advance(500, &mut rng);
        assert_ne!(anim.frame_index(), 0);
        anim.stop();
        assert!(!anim.is_playing());
        assert_eq!(anim.frame_index(), 0);
        assert!(!anim.is_reversing());
    }

    #[test]
    fn test_play_restarts_from_first_frame() {
        let mut anim = animation(4, 1.0, false, false);
        anim.play(0);
        let mut rng = rng();
        anim.advance(500, &mut rng);
        anim.play(600);
        assert_eq!(anim.frame_index(), 0);
        assert!(anim.is_playing());
    }

    #[test]
    fn test_from_record() {
        let record = AnimationRecord::from_json(
            r#"{
                "name": "wave",
                "regions": [{"name": "r", "x": 1, "y": 2}],
                "frames": [
                    {"id": 0, "data": "AAAAAAAAAAA="},
                    {"id": 1, "data": "//////////8="}
                ],
                "duration": 1.0,
                "loop": true
            }"#,
        )
        .unwrap();
        let anim = Animation::from_record(&record).unwrap();
        assert_eq!(anim.name(), "wave");
        assert_eq!(anim.frame_count(), 2);
        assert_eq!(anim.regions().len(), 1);
        assert_eq!(anim.regions()[0].frame_count(), 2);
        assert!(anim.regions()[0].frame(1).unwrap().pixel(3, 3));
    }

    #[test]
    fn test_from_record_rejects_short_frame_data() {
        let record = AnimationRecord::from_json(
            r#"{"width": 16, "height": 16, "frames": [{"id": 0, "data": "AAAA"}]}"#,
        )
        .unwrap();
        assert!(Animation::from_record(&record).is_err());
    }
}
