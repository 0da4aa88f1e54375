use std::time::Duration;

/// Monotonic timestamp in whole milliseconds since an arbitrary origin.
///
/// Integer milliseconds keep deadline comparisons exact, so a timer armed for
/// `t` is always due when a clock reports `t`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time(pub u64);

impl Time {
    pub const ZERO: Time = Time(0);

    pub fn from_millis(ms: u64) -> Self {
        Time(ms)
    }

    /// Truncates to whole milliseconds.
    pub fn from_duration(d: Duration) -> Self {
        Time(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn as_millis(self) -> u64 {
        self.0
    }

    pub fn as_duration(self) -> Duration {
        Duration::from_millis(self.0)
    }

    pub fn after(self, delay: Duration) -> Self {
        let ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        Time(self.0.saturating_add(ms))
    }

    /// Span from `earlier` to `self`, zero if `earlier` is later.
    pub fn since(self, earlier: Time) -> TimeSpan {
        TimeSpan {
            start: earlier,
            end: self.max(earlier),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TimeSpan {
    pub start: Time,
    pub end: Time,
}

impl TimeSpan {
    pub fn instant(t: Time) -> Self {
        Self { start: t, end: t }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.end.0.saturating_sub(self.start.0))
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.duration().as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::{Time, TimeSpan};
    use std::time::Duration;

    #[test]
    fn after_adds_whole_millis() {
        let t = Time::from_millis(1_000).after(Duration::from_millis(6_000));
        assert_eq!(t, Time(7_000));
        assert_eq!(Time(u64::MAX).after(Duration::from_secs(1)), Time(u64::MAX));
    }

    #[test]
    fn from_duration_truncates() {
        assert_eq!(Time::from_duration(Duration::from_micros(2_999)), Time(2));
    }

    #[test]
    fn span_never_goes_negative() {
        assert_eq!(Time(5).since(Time(9)).duration(), Duration::ZERO);
        assert_eq!(Time(9).since(Time(5)).duration(), Duration::from_millis(4));
        assert_eq!(TimeSpan::instant(Time(3)).as_secs_f64(), 0.0);
        assert_eq!(Time(14_500).since(Time(2_500)).as_secs_f64(), 12.0);
    }
}
