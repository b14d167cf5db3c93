//! Frame timing.
//!
//! The event loop feeds [`FrameClock::tick`] an [`Instant`] once per frame
//! and gets back the delta since the previous frame. Taking the instant as
//! an argument keeps the clock deterministic under test.

use std::time::Instant;

/// Tracks elapsed and per-frame delta time.
pub struct FrameClock {
    start: Instant,
    last: Option<Instant>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Create a clock whose elapsed time is measured from `start`.
    pub fn starting_at(start: Instant) -> Self {
        Self { start, last: None }
    }

    /// Advance the clock to `now` and return the delta time in seconds.
    ///
    /// The first tick returns 0.0 so the first frame does not see a delta
    /// covering app startup.
    pub fn tick(&mut self, now: Instant) -> f32 {
        let dt = match self.last {
            Some(prev) => now.duration_since(prev).as_secs_f32(),
            None => 0.0,
        };
        self.last = Some(now);
        dt
    }

    /// Seconds from the clock's start to `now`.
    pub fn elapsed_at(&self, now: Instant) -> f32 {
        now.duration_since(self.start).as_secs_f32()
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn first_tick_is_zero() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        assert_eq!(clock.tick(start), 0.0);
    }

    #[test]
    fn tick_returns_interval_since_previous() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        clock.tick(start);

        let dt = clock.tick(start + Duration::from_millis(16));
        assert!((dt - 0.016).abs() < 1e-6);

        let dt = clock.tick(start + Duration::from_millis(48));
        assert!((dt - 0.032).abs() < 1e-6);
    }

    #[test]
    fn elapsed_measures_from_start() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        clock.tick(start + Duration::from_secs(1));
        let elapsed = clock.elapsed_at(start + Duration::from_secs(2));
        assert!((elapsed - 2.0).abs() < 1e-6);
    }
}
