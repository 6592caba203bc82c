//! Fixed-rate tick timing, decoupled from render rate.

#![allow(dead_code)]

use std::time::{Duration, Instant};

/// Gates updates to a fixed tick rate. Rendering may run much faster;
/// [`TickTimer::should_tick`] fires at most once per interval and re-arms
/// itself when it does.
pub struct TickTimer {
    last_tick: Instant,
    tick_len: Duration,
}

impl TickTimer {
    /// Tick length is `1000 / ticks_per_second` milliseconds, floored at
    /// one millisecond.
    pub fn new(ticks_per_second: u32) -> Self {
        let tps = u64::from(ticks_per_second.max(1));
        Self {
            last_tick: Instant::now(),
            tick_len: Duration::from_millis((1000 / tps).max(1)),
        }
    }

    pub fn should_tick(&mut self) -> bool {
        if self.last_tick.elapsed() >= self.tick_len {
            self.last_tick = Instant::now();
            true
        } else {
            false
        }
    }

    /// Elapsed fraction of the current tick, for interpolating renders
    /// between updates. May exceed 1.0 when a tick is overdue.
    pub fn partial_tick(&self) -> f32 {
        self.last_tick.elapsed().as_secs_f32() / self.tick_len.as_secs_f32()
    }

    pub fn tick_len(&self) -> Duration {
        self.tick_len
    }
}

/// One-shot deadline used for silences and fades in the sound queue.
pub struct Countdown {
    start: Instant,
    duration: Duration,
}

impl Countdown {
    pub fn new(duration: Duration) -> Self {
        Self {
            start: Instant::now(),
            duration,
        }
    }

    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    pub fn expired(&self) -> bool {
        self.start.elapsed() >= self.duration
    }

    /// Elapsed fraction in `[0, 1]`. A zero-length countdown is complete.
    pub fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.start.elapsed().as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }
}
