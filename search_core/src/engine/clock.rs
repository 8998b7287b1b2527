use std::time::{Duration, Instant};

/// Source of the time remaining before the caller must have a move ready.
pub trait Clock {
    /// Milliseconds left. Negative once the budget is blown.
    fn time_left(&self) -> f64;
}

/// Wall-clock budget that starts ticking on construction.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    start: Instant,
    limit_ms: f64,
}

impl Deadline {
    #[must_use]
    pub fn after_millis(limit_ms: u64) -> Self {
        Self {
            start: Instant::now(),
            #[allow(clippy::cast_precision_loss)]
            limit_ms: limit_ms as f64,
        }
    }

    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        duration_ms(self.start.elapsed())
    }
}

impl Clock for Deadline {
    fn time_left(&self) -> f64 {
        self.limit_ms - self.elapsed_ms()
    }
}

/// A clock that never runs out. Used for pure depth-limited searches.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unbounded;

impl Clock for Unbounded {
    fn time_left(&self) -> f64 {
        f64::INFINITY
    }
}

impl<F: Fn() -> f64> Clock for F {
    fn time_left(&self) -> f64 {
        self()
    }
}

pub(crate) fn duration_ms(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64() * 1000.0
}
