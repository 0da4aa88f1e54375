use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use foundation::time::Time;

/// Source of "now" for timed state machines.
///
/// Nothing in the tour engine reads wall-clock time directly; callers pass
/// `clock.now()` in, which keeps playback replayable in tests.
pub trait Clock {
    fn now(&self) -> Time;
}

/// Wall clock measured from construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub fn origin(&self) -> Instant {
        self.origin
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Time {
        Time::from_duration(self.origin.elapsed())
    }
}

/// Manually advanced clock. Clones share the same timeline.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(t: Time) -> Self {
        Self {
            now_ms: Arc::new(AtomicU64::new(t.as_millis())),
        }
    }

    pub fn advance_ms(&self, ms: u64) -> Time {
        let prev = self.now_ms.fetch_add(ms, Ordering::SeqCst);
        Time(prev.saturating_add(ms))
    }

    pub fn set(&self, t: Time) {
        self.now_ms.store(t.as_millis(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Time {
        Time(self.now_ms.load(Ordering::SeqCst))
    }
}
