//! Playback timing utilities

use std::time::{Duration, Instant};

/// Tracks frame-to-frame deltas for an animation update loop.
///
/// Playback state itself lives on the animation instances; this only
/// measures wall-clock time between `tick` calls.
pub struct PlaybackClock {
    last_frame: Instant,
    delta: Duration,
    elapsed: Duration,
    frame_count: u64,
}

impl PlaybackClock {
    /// Create a new clock; the first `tick` measures from this point.
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Call once per frame; returns the delta in seconds.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        self.delta = now - self.last_frame;
        self.last_frame = now;
        self.elapsed += self.delta;
        self.frame_count += 1;
        self.delta.as_secs_f32()
    }

    /// Get the last frame's delta in seconds
    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Total time accumulated over all ticks, in seconds
    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    /// Get total frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::new()
    }
}
