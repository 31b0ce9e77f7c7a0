//! Frame timing

use std::time::Instant;

/// Measures the elapsed time between consecutive frames
///
/// The first tick reports the time since the timer was created, which keeps the
/// light orbit moving from the very first frame.
#[derive(Debug, Clone)]
pub struct FrameTimer {
    last_tick: Instant,
    total_time: f32,
    frame_count: u64,
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameTimer {
    /// Create a timer starting now
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Create a timer with an explicit start instant
    pub fn starting_at(start: Instant) -> Self {
        Self {
            last_tick: start,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Advance to now and return the seconds since the previous tick
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    /// Advance to `now` and return the seconds since the previous tick
    ///
    /// An instant earlier than the previous tick yields zero.
    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let frame_time = now.saturating_duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;
        self.total_time += frame_time;
        self.frame_count += 1;
        frame_time
    }

    /// Seconds accumulated over all ticks
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Number of ticks so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}
