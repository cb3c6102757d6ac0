use std::cell::Cell;
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

/// Source of time for the control loop.
///
/// Every wait in the controller goes through `sleep`, so swapping the clock
/// swaps real time for virtual time.
pub trait Clock {
    /// Monotonic time since the clock was created.
    fn now(&self) -> Duration;
    /// Block the control thread for `duration`.
    fn sleep(&self, duration: Duration);
}

/// Production clock backed by `Instant` and `thread::sleep`
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
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
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Virtual clock for tests: time only moves when somebody sleeps.
///
/// Clones share the same timeline, so scripted hardware can hold a clone and
/// answer reads as a function of the current virtual time.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, duration: Duration) {
        self.now.set(self.now.get() + duration);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}
