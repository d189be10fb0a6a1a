//! Frame timing

use std::time::{Duration, Instant};

/// Tracks per-frame and total elapsed time
#[derive(Debug, Clone)]
pub struct Time {
    start: Instant,
    last: Instant,
    delta: Duration,
    frame_count: u64,
}

impl Time {
    /// Create a timer starting now
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            delta: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Advance to the next frame; call once per tick
    pub fn update(&mut self) {
        let now = Instant::now();
        self.delta = now - self.last;
        self.last = now;
        self.frame_count += 1;
    }

    /// Time since the previous frame
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Time since the previous frame, in seconds
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Total time since engine start, in seconds
    pub fn elapsed_seconds(&self) -> f32 {
        self.last.duration_since(self.start).as_secs_f32()
    }

    /// Number of completed frames
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_advances() {
        let mut time = Time::new();
        assert_eq!(time.frame_count(), 0);
        assert_eq!(time.delta_seconds(), 0.0);

        std::thread::sleep(Duration::from_millis(2));
        time.update();

        assert_eq!(time.frame_count(), 1);
        assert!(time.delta_seconds() > 0.0);
        assert!(time.elapsed_seconds() >= time.delta_seconds());
    }
}
