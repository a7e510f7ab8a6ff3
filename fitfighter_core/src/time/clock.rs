use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use atomic_float::AtomicF64;

use crate::Seconds;

/// Monotonic time source shared by the engine loop and the button producers.
pub trait Clock: Send + Sync {
    fn now(&self) -> Seconds;
}

pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Seconds {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Externally driven clock. Clones share the same time value.
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<AtomicF64>,
}

impl ManualClock {
    pub fn new(start: Seconds) -> Self {
        Self {
            now: Arc::new(AtomicF64::new(start)),
        }
    }

    pub fn set(&self, now: Seconds) {
        self.now.store(now, Ordering::Release);
    }

    pub fn advance(&self, by: Seconds) {
        self.now.fetch_add(by, Ordering::AcqRel);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Seconds {
        self.now.load(Ordering::Acquire)
    }
}
