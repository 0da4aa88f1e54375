//! Fire-and-forget analytics hooks.
//!
//! The player calls these when a sink is attached and behaves identically
//! when none is.

use std::collections::BTreeMap;

use parking_lot::Mutex;
use tracing::info;

use crate::speed::Speed;

pub trait AnalyticsSink: Send + Sync {
    fn tour_started(&self, stops: usize, speed: Speed);
    fn tour_paused(&self, progress_percent: u8);
    fn tour_stopped(&self, progress_percent: u8);
    fn tour_completed(&self, duration_seconds: f64);
}

/// Emits each analytics event as a structured log line.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAnalytics;

impl AnalyticsSink for TracingAnalytics {
    fn tour_started(&self, stops: usize, speed: Speed) {
        info!(event = "tour_started", stops, speed = speed.as_str());
    }

    fn tour_paused(&self, progress_percent: u8) {
        info!(event = "tour_paused", progress = progress_percent);
    }

    fn tour_stopped(&self, progress_percent: u8) {
        info!(event = "tour_stopped", progress = progress_percent);
    }

    fn tour_completed(&self, duration_seconds: f64) {
        info!(event = "tour_completed", duration_s = duration_seconds);
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Histogram {
    pub count: u64,
    pub sum: i64,
    pub min: i64,
    pub max: i64,
}

impl Histogram {
    pub fn record(&mut self, value: i64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        self.sum += value;
    }
}

#[derive(Debug, Default)]
struct MetricsInner {
    counters: BTreeMap<&'static str, u64>,
    histograms: BTreeMap<&'static str, Histogram>,
}

/// Aggregates analytics events into counters and histograms.
///
/// Keys live in sorted maps so snapshots have stable ordering.
#[derive(Debug, Default)]
pub struct TourMetrics {
    inner: Mutex<MetricsInner>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub counters: Vec<(&'static str, u64)>,
    pub histograms: Vec<(&'static str, Histogram)>,
}

impl TourMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counter(&self, name: &str) -> u64 {
        self.inner.lock().counters.get(name).copied().unwrap_or(0)
    }

    pub fn histogram(&self, name: &str) -> Option<Histogram> {
        self.inner.lock().histograms.get(name).copied()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let inner = self.inner.lock();
        MetricsSnapshot {
            counters: inner.counters.iter().map(|(k, v)| (*k, *v)).collect(),
            histograms: inner.histograms.iter().map(|(k, v)| (*k, *v)).collect(),
        }
    }

    fn inc(&self, name: &'static str) {
        *self.inner.lock().counters.entry(name).or_insert(0) += 1;
    }

    fn record(&self, name: &'static str, value: i64) {
        self.inner
            .lock()
            .histograms
            .entry(name)
            .or_default()
            .record(value);
    }
}

impl AnalyticsSink for TourMetrics {
    fn tour_started(&self, stops: usize, _speed: Speed) {
        self.inc("tours_started");
        self.record("tour_stops", i64::try_from(stops).unwrap_or(i64::MAX));
    }

    fn tour_paused(&self, progress_percent: u8) {
        self.inc("tours_paused");
        self.record("pause_progress_percent", i64::from(progress_percent));
    }

    fn tour_stopped(&self, progress_percent: u8) {
        self.inc("tours_stopped");
        self.record("stop_progress_percent", i64::from(progress_percent));
    }

    fn tour_completed(&self, duration_seconds: f64) {
        self.inc("tours_completed");
        let millis = (duration_seconds * 1000.0).round() as i64;
        self.record("tour_duration_ms", millis);
    }
}

#[cfg(test)]
mod tests {
    use super::{AnalyticsSink, Histogram, TourMetrics};
    use crate::speed::Speed;
    use pretty_assertions::assert_eq;

    #[test]
    fn histogram_tracks_min_max_sum_count() {
        let mut h = Histogram::default();
        h.record(5);
        h.record(-2);
        h.record(7);
        assert_eq!(
            h,
            Histogram {
                count: 3,
                sum: 10,
                min: -2,
                max: 7,
            }
        );
    }

    #[test]
    fn metrics_count_lifecycle_events() {
        let m = TourMetrics::new();
        m.tour_started(5, Speed::Fast);
        m.tour_paused(25);
        m.tour_stopped(25);
        m.tour_started(3, Speed::Normal);
        m.tour_completed(12.0);

        assert_eq!(m.counter("tours_started"), 2);
        assert_eq!(m.counter("tours_completed"), 1);
        assert_eq!(m.counter("missing"), 0);
        assert_eq!(m.histogram("tour_duration_ms").map(|h| h.sum), Some(12_000));

        let snap = m.snapshot();
        let names: Vec<_> = snap.counters.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            names,
            vec![
                "tours_completed",
                "tours_paused",
                "tours_started",
                "tours_stopped",
            ]
        );
    }
}
