use std::time::{Duration, Instant};

/// One clock tick.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTime {
    /// Seconds since the previous tick.
    pub dt: f32,

    /// Monotonic frame counter, starting at 0.
    pub frame_index: u64,
}

/// Source of per-frame delta time. Ticked exactly once per loop iteration.
pub trait Tick {
    fn tick(&mut self) -> FrameTime;
}

/// Wall-clock timing with clamped deltas.
///
/// The clamp keeps a debugger pause or a minimized window from producing a
/// huge rotation step on the next frame.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: Instant::now(),
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Restarts the baseline, e.g. after setup so the first frame is not charged for it.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Tick for FrameClock {
    fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);
        self.last = now;

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }
}

/// Constant delta per tick, independent of wall time.
#[derive(Debug, Clone)]
pub struct FixedClock {
    dt: f32,
    frame_index: u64,
}

impl FixedClock {
    pub fn new(dt: f32) -> Self {
        Self { dt, frame_index: 0 }
    }

    /// `hz` ticks per simulated second.
    pub fn hz(hz: u32) -> Self {
        Self::new(1.0 / hz as f32)
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }
}

impl Tick for FixedClock {
    fn tick(&mut self) -> FrameTime {
        let ft = FrameTime {
            dt: self.dt,
            frame_index: self.frame_index,
        };
        self.frame_index += 1;
        ft
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_counts_frames() {
        let mut clock = FixedClock::hz(60);
        let a = clock.tick();
        let b = clock.tick();
        assert_eq!(a.frame_index, 0);
        assert_eq!(b.frame_index, 1);
        assert!((a.dt - 1.0 / 60.0).abs() < f32::EPSILON);
    }

    #[test]
    fn frame_clock_delta_is_clamped() {
        let min = Duration::from_millis(5);
        let max = Duration::from_millis(10);
        let mut clock = FrameClock::with_clamps(min, max);

        // back-to-back ticks are raised to the minimum
        let ft = clock.tick();
        assert!(ft.dt >= min.as_secs_f32());
        assert!(ft.dt <= max.as_secs_f32());

        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(clock.tick().dt, max.as_secs_f32());
    }
}
