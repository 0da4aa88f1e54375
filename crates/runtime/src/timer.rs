use std::time::Duration;

use foundation::time::Time;

/// Identifies one arming of a [`OneShotTimer`].
///
/// Ids are never reused by the same timer, so a stale id can't cancel or
/// match a later arming.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Fired {
    pub id: TimerId,
    /// The deadline the timer was armed for (not the time it was polled).
    pub due: Time,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct Pending {
    id: TimerId,
    due: Time,
}

/// Single-slot deferred callback.
///
/// Holds at most one pending deadline: arming replaces whatever was pending,
/// and firing or cancelling empties the slot. The owner polls it with the
/// current time; there is no background thread.
#[derive(Debug, Default)]
pub struct OneShotTimer {
    next_id: u64,
    pending: Option<Pending>,
}

impl OneShotTimer {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            pending: None,
        }
    }

    /// Arm for `now + delay`, discarding any previous deadline.
    pub fn arm(&mut self, now: Time, delay: Duration) -> TimerId {
        self.arm_at(now.after(delay))
    }

    pub fn arm_at(&mut self, due: Time) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.pending = Some(Pending { id, due });
        id
    }

    /// Returns `true` if something was pending.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn due(&self) -> Option<Time> {
        self.pending.map(|p| p.due)
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Number of pending deadlines; always 0 or 1.
    pub fn pending_count(&self) -> usize {
        usize::from(self.pending.is_some())
    }

    /// Takes the pending deadline if it's due at `now`.
    pub fn fire(&mut self, now: Time) -> Option<Fired> {
        match self.pending {
            Some(p) if p.due <= now => {
                self.pending = None;
                Some(Fired {
                    id: p.id,
                    due: p.due,
                })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::OneShotTimer;
    use foundation::time::Time;
    use std::time::Duration;

    #[test]
    fn fires_once_at_deadline() {
        let mut timer = OneShotTimer::new();
        timer.arm(Time(1_000), Duration::from_millis(500));
        assert_eq!(timer.due(), Some(Time(1_500)));
        assert!(timer.fire(Time(1_499)).is_none());
        let fired = timer.fire(Time(1_500)).unwrap();
        assert_eq!(fired.due, Time(1_500));
        assert!(timer.fire(Time(9_999)).is_none());
        assert_eq!(timer.pending_count(), 0);
    }

    #[test]
    fn rearming_replaces_previous_deadline() {
        let mut timer = OneShotTimer::new();
        let first = timer.arm(Time(0), Duration::from_millis(100));
        let second = timer.arm(Time(0), Duration::from_millis(300));
        assert_ne!(first, second);
        assert_eq!(timer.pending_count(), 1);
        assert!(timer.fire(Time(200)).is_none());
        assert_eq!(timer.fire(Time(300)).map(|f| f.id), Some(second));
    }

    #[test]
    fn cancel_discards_pending() {
        let mut timer = OneShotTimer::new();
        assert!(!timer.cancel());
        timer.arm(Time(0), Duration::from_millis(10));
        assert!(timer.cancel());
        assert!(!timer.is_armed());
        assert!(timer.fire(Time(u64::MAX)).is_none());
    }

    #[test]
    fn late_poll_reports_original_deadline() {
        let mut timer = OneShotTimer::new();
        timer.arm_at(Time(6_000));
        assert_eq!(timer.fire(Time(7_250)).map(|f| f.due), Some(Time(6_000)));
    }
}
