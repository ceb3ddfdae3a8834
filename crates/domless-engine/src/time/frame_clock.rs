use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Time elapsed since the previous frame tick, in seconds.
    pub dt: f32,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

impl FrameTime {
    /// Frame delta in milliseconds, the unit every tween duration uses.
    #[inline]
    pub fn dt_ms(&self) -> f32 {
        self.dt * 1000.0
    }
}

/// Frame clock producing `FrameTime` snapshots.
///
/// Delta time is clamped to avoid pathological values when the application is paused
/// by the debugger, minimized, or stalls. A clock built with [`FrameClock::fixed`]
/// ignores wall time and always reports the same step.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
    fixed_step: Option<Duration>,
}

impl FrameClock {
    /// Creates a new clock with default clamps.
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    /// Creates a clock with custom delta-time clamps.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: Instant::now(),
            frame_index: 0,
            dt_min,
            dt_max,
            fixed_step: None,
        }
    }

    /// Creates a deterministic clock that advances by `step` every tick.
    pub fn fixed(step: Duration) -> Self {
        Self { fixed_step: Some(step), ..Self::with_clamps(step, step) }
    }

    /// Resets the clock baseline.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let dt = match self.fixed_step {
            Some(step) => step,
            None => now.saturating_duration_since(self.last).clamp(self.dt_min, self.dt_max),
        };

        self.last = now;

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            now,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
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

    #[test]
    fn fixed_clock_reports_constant_step() {
        let mut clock = FrameClock::fixed(Duration::from_millis(16));
        let a = clock.tick();
        let b = clock.tick();
        assert_eq!(a.dt_ms().round(), 16.0);
        assert_eq!(b.dt_ms().round(), 16.0);
        assert_eq!(b.frame_index, 1);
    }

    #[test]
    fn real_clock_is_clamped() {
        let mut clock = FrameClock::new();
        let t = clock.tick();
        assert!(t.dt >= 0.0001 && t.dt <= 0.25);
    }
}
