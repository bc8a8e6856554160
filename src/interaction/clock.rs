use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::Instant;

/// Millisecond time source shared by the interaction log and timers.
pub trait Clock: fmt::Debug {
    fn now_ms(&self) -> f64;
}

/// Monotonic wall clock anchored at construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Manually advanced clock for deterministic hosts and tests.
///
/// Clones share the same time cell.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: Rc<Cell<f64>>,
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_ms(&self, now_ms: f64) {
        self.now_ms.set(now_ms);
    }

    pub fn advance_ms(&self, delta_ms: f64) {
        self.now_ms.set(self.now_ms.get() + delta_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now_ms.get()
    }
}
