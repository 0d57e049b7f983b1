//! Time management utilities
//!
//! The frame loop only needs one thing from a clock: a monotonically
//! increasing elapsed time in milliseconds, sampled once per tick.

use std::time::Instant;

/// Source of per-frame elapsed time
pub trait TimeSource {
    /// Advance to the next frame and return elapsed milliseconds since start
    fn tick(&mut self) -> f64;

    /// Number of ticks taken so far
    fn frame_count(&self) -> u64;
}

/// Wall-clock frame timer
pub struct FrameClock {
    start: Instant,
    last_elapsed_ms: f64,
    delta_ms: f64,
    frame_count: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    /// Create a new clock starting now
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            last_elapsed_ms: 0.0,
            delta_ms: 0.0,
            frame_count: 0,
        }
    }

    /// Milliseconds between the two most recent ticks
    pub fn delta_ms(&self) -> f64 {
        self.delta_ms
    }

    /// Average frames per second since the clock started
    pub fn average_fps(&self) -> f64 {
        if self.last_elapsed_ms > 0.0 {
            self.frame_count as f64 / (self.last_elapsed_ms / 1000.0)
        } else {
            0.0
        }
    }
}

impl TimeSource for FrameClock {
    fn tick(&mut self) -> f64 {
        let elapsed = self.start.elapsed().as_secs_f64() * 1000.0;
        // Instant is monotonic, but keep the contract explicit
        let elapsed = elapsed.max(self.last_elapsed_ms);
        self.delta_ms = elapsed - self.last_elapsed_ms;
        self.last_elapsed_ms = elapsed;
        self.frame_count += 1;
        elapsed
    }

    fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

/// Deterministic clock advancing a fixed step per tick
///
/// Used for headless runs and tests, where wall-clock time would make the
/// rendered transforms unreproducible.
#[derive(Debug, Clone)]
pub struct FixedStepClock {
    step_ms: f64,
    frame_count: u64,
}

impl FixedStepClock {
    /// Create a clock that advances `step_ms` per tick; the first tick reports 0
    pub fn new(step_ms: f64) -> Self {
        Self {
            step_ms: step_ms.max(0.0),
            frame_count: 0,
        }
    }

    /// Clock stepping at the common 60 Hz display refresh
    pub fn sixty_hz() -> Self {
        Self::new(1000.0 / 60.0)
    }
}

impl TimeSource for FixedStepClock {
    fn tick(&mut self) -> f64 {
        let now = self.step_ms * self.frame_count as f64;
        self.frame_count += 1;
        now
    }

    fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fixed_step_clock_is_monotonic() {
        let mut clock = FixedStepClock::new(10.0);
        assert_eq!(clock.tick(), 0.0);
        assert_eq!(clock.tick(), 10.0);
        assert_eq!(clock.tick(), 20.0);
        assert_eq!(clock.frame_count(), 3);
    }

    #[test]
    fn test_negative_step_is_clamped() {
        let mut clock = FixedStepClock::new(-5.0);
        clock.tick();
        assert_eq!(clock.tick(), 0.0);
    }

    #[test]
    fn test_sixty_hz_step() {
        let mut clock = FixedStepClock::sixty_hz();
        clock.tick();
        assert_relative_eq!(clock.tick(), 16.666_666_666_666_668, epsilon = 1e-9);
    }

    #[test]
    fn test_frame_clock_never_goes_backwards() {
        let mut clock = FrameClock::new();
        let a = clock.tick();
        let b = clock.tick();
        assert!(b >= a);
        assert!(clock.delta_ms() >= 0.0);
        assert_eq!(clock.frame_count(), 2);
    }
}
