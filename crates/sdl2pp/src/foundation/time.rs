//! Frame timing for the poll/draw/present loop

use std::time::{Duration, Instant};

/// Frame timer
///
/// Tracks the time between successive [`Timer::update`] calls and the number of
/// frames seen so far.
pub struct Timer {
    last_frame: Instant,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new timer
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Mark the end of a frame
    pub fn update(&mut self) {
        let now = Instant::now();
        self.delta_time = now.duration_since(self.last_frame).as_secs_f32();
        self.total_time += self.delta_time;
        self.last_frame = now;
        self.frame_count += 1;
    }

    /// Seconds spent in the last frame
    pub const fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Seconds since the timer was created, summed over completed frames
    pub const fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Number of completed frames
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Time left in the current frame for a given frame-rate cap.
    ///
    /// Returns `None` when the frame has already used its budget.
    pub fn remaining_budget(&self, target_fps: u32) -> Option<Duration> {
        if target_fps == 0 {
            return None;
        }
        let budget = Duration::from_secs_f64(1.0 / f64::from(target_fps));
        budget.checked_sub(self.last_frame.elapsed()).filter(|d| !d.is_zero())
    }
}
