//! Timed tour playback.
//!
//! The player is a synchronous state machine. It never sleeps or spawns; the
//! owner passes the current [`Time`] into each control call and polls
//! [`TourPlayer::tick`] at or after [`TourPlayer::next_deadline`]. Exactly one
//! advance can be pending at a time because the deadline lives in a single
//! [`OneShotTimer`].

use std::sync::Arc;

use foundation::math::initial_bearing_deg;
use foundation::time::Time;
use runtime::timer::OneShotTimer;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::analytics::AnalyticsSink;
use crate::error::TourError;
use crate::observer::{ProgressObserver, TourUpdate};
use crate::speed::{Speed, SpeedTable};
use crate::surface::{RenderingSurface, SurfaceError};
use crate::waypoint::Waypoint;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TourStatus {
    #[default]
    Idle,
    Running,
    Paused,
    /// Reported only while completion is being announced; the player is idle
    /// again once `Completed` has been delivered.
    Completed,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TourState {
    pub status: TourStatus,
    pub current_index: usize,
    pub progress_percent: u8,
    pub speed: Speed,
}

#[derive(Debug)]
struct ActiveTour {
    waypoints: Vec<Waypoint>,
    started_at: Time,
    /// Step performed when the pending advance fires.
    next_index: usize,
}

pub struct TourPlayer {
    speeds: SpeedTable,
    state: TourState,
    tour: Option<ActiveTour>,
    current: Option<Waypoint>,
    timer: OneShotTimer,
    surface: Option<Arc<dyn RenderingSurface>>,
    observers: Vec<Box<dyn ProgressObserver>>,
    analytics: Option<Arc<dyn AnalyticsSink>>,
}

impl std::fmt::Debug for TourPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TourPlayer")
            .field("state", &self.state)
            .field("next_deadline", &self.timer.due())
            .field("has_surface", &self.surface.is_some())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Default for TourPlayer {
    fn default() -> Self {
        Self::new(SpeedTable::default())
    }
}

/// `round(index / (len - 1) * 100)`; a route always has at least 2 stops.
fn progress_percent(index: usize, len: usize) -> u8 {
    let last = len.saturating_sub(1).max(1) as f64;
    ((index as f64 / last) * 100.0).round().clamp(0.0, 100.0) as u8
}

impl TourPlayer {
    /// `speeds` must be monotonic (slow >= normal >= fast); tables built from
    /// [`TourConfig`](crate::config::TourConfig) are checked by `validate`.
    pub fn new(speeds: SpeedTable) -> Self {
        debug_assert!(speeds.is_monotonic(), "non-monotonic speed table");
        Self {
            speeds,
            state: TourState::default(),
            tour: None,
            current: None,
            timer: OneShotTimer::new(),
            surface: None,
            observers: Vec::new(),
            analytics: None,
        }
    }

    pub fn with_surface(mut self, surface: Arc<dyn RenderingSurface>) -> Self {
        self.surface = Some(surface);
        self
    }

    pub fn with_analytics(mut self, sink: Arc<dyn AnalyticsSink>) -> Self {
        self.analytics = Some(sink);
        self
    }

    pub fn with_observer(mut self, observer: impl ProgressObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    /// Swaps the surface; a running tour uses the new one from its next step.
    pub fn attach_surface(&mut self, surface: Arc<dyn RenderingSurface>) {
        self.surface = Some(surface);
    }

    pub fn detach_surface(&mut self) -> Option<Arc<dyn RenderingSurface>> {
        self.surface.take()
    }

    pub fn set_analytics(&mut self, sink: Option<Arc<dyn AnalyticsSink>>) {
        self.analytics = sink;
    }

    pub fn add_observer(&mut self, observer: impl ProgressObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn state(&self) -> TourState {
        self.state
    }

    pub fn speed(&self) -> Speed {
        self.state.speed
    }

    pub fn speeds(&self) -> &SpeedTable {
        &self.speeds
    }

    /// The stop the camera is at, cleared on stop and after completion.
    pub fn current_stop(&self) -> Option<&Waypoint> {
        self.current.as_ref()
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        self.tour.as_ref().map_or(&[], |t| t.waypoints.as_slice())
    }

    pub fn next_deadline(&self) -> Option<Time> {
        self.timer.due()
    }

    /// Scheduled advances; never more than one.
    pub fn pending_timers(&self) -> usize {
        self.timer.pending_count()
    }

    fn is_active(&self) -> bool {
        matches!(self.state.status, TourStatus::Running | TourStatus::Paused)
    }

    /// Starts a tour at `now`, performing step 0 immediately.
    ///
    /// Restarting a running or paused tour is equivalent to [`stop`] followed
    /// by `start`. A route or readiness error leaves the player as it was; if
    /// the surface refuses step 0 after a restart, the old tour has already
    /// been stopped and the player is idle.
    ///
    /// [`stop`]: TourPlayer::stop
    pub fn start(
        &mut self,
        waypoints: Vec<Waypoint>,
        speed: Speed,
        now: Time,
    ) -> Result<(), TourError> {
        if waypoints.len() < 2 {
            return Err(TourError::EmptyRoute {
                len: waypoints.len(),
            });
        }
        if !self.surface.as_ref().is_some_and(|s| s.is_ready()) {
            return Err(TourError::NotReady);
        }

        if self.is_active() {
            debug!("restarting tour");
            self.stop();
        }
        self.timer.cancel();

        let stops = waypoints.len();
        let previous_speed = self.state.speed;
        self.tour = Some(ActiveTour {
            waypoints,
            started_at: now,
            next_index: 0,
        });
        self.state = TourState {
            status: TourStatus::Running,
            current_index: 0,
            progress_percent: 0,
            speed,
        };

        if let Err(err) = self.step(0) {
            warn!("tour start failed on first stop: {err}");
            self.reset();
            self.state.speed = previous_speed;
            return Err(TourError::NotReady);
        }
        info!(stops, speed = speed.as_str(), "tour started");
        if let Some(sink) = &self.analytics {
            sink.tour_started(stops, speed);
        }
        self.schedule_after(0, now);
        Ok(())
    }

    /// Returns `false` (and does nothing) unless running.
    pub fn pause(&mut self) -> bool {
        if self.state.status != TourStatus::Running {
            debug!("pause ignored while {:?}", self.state.status);
            return false;
        }
        self.timer.cancel();
        self.state.status = TourStatus::Paused;
        debug!(progress = self.state.progress_percent, "tour paused");
        if let Some(sink) = &self.analytics {
            sink.tour_paused(self.state.progress_percent);
        }
        true
    }

    /// Re-arms the pending step with the full delay of the current speed.
    /// Time already waited before the pause is not credited.
    pub fn resume(&mut self, now: Time) -> bool {
        if self.state.status != TourStatus::Paused {
            debug!("resume ignored while {:?}", self.state.status);
            return false;
        }
        self.timer.cancel();
        self.state.status = TourStatus::Running;
        let delay = self.speeds.delay(self.state.speed);
        self.timer.arm(now, delay);
        debug!(delay_ms = delay.as_millis() as u64, "tour resumed");
        true
    }

    /// Returns `false` (and does nothing) unless running or paused.
    pub fn stop(&mut self) -> bool {
        if !self.is_active() {
            debug!("stop ignored while {:?}", self.state.status);
            return false;
        }
        let progress = self.state.progress_percent;
        self.reset();
        info!(progress, "tour stopped");
        self.notify(&TourUpdate::Stopped {
            progress_percent: progress,
        });
        if let Some(sink) = &self.analytics {
            sink.tour_stopped(progress);
        }
        true
    }

    /// Takes effect from the next scheduled step; a pending advance keeps
    /// its deadline.
    pub fn set_speed(&mut self, speed: Speed) {
        self.state.speed = speed;
    }

    /// Performs the pending step if it is due at `now`.
    ///
    /// The following step is scheduled a full delay after `now`, so a late
    /// poll never runs two steps back to back.
    pub fn tick(&mut self, now: Time) {
        if self.timer.fire(now).is_none() {
            return;
        }
        if let Some(index) = self.tour.as_ref().map(|t| t.next_index) {
            self.advance(index, now);
        }
    }

    fn advance(&mut self, index: usize, now: Time) {
        if let Err(err) = self.step(index) {
            self.abort(err);
            return;
        }
        if index + 1 >= self.waypoints().len() {
            self.complete(now);
        } else {
            self.schedule_after(index, now);
        }
    }

    fn schedule_after(&mut self, index: usize, now: Time) {
        if let Some(tour) = &mut self.tour {
            tour.next_index = index + 1;
        }
        self.timer.arm(now, self.speeds.delay(self.state.speed));
    }

    /// Moves the camera to stop `index` and reports it.
    fn step(&mut self, index: usize) -> Result<(), SurfaceError> {
        let Some(tour) = &self.tour else {
            return Err(SurfaceError::Unavailable);
        };
        let total = tour.waypoints.len();
        let here = tour.waypoints[index].clone();
        let heading = tour
            .waypoints
            .get(index + 1)
            .map_or(0.0, |next| {
                initial_bearing_deg(here.coordinate, next.coordinate)
            });

        let surface = self
            .surface
            .as_ref()
            .filter(|s| s.is_ready())
            .ok_or(SurfaceError::Unavailable)?;
        surface.set_position(here.coordinate)?;
        surface.set_orientation(heading)?;

        let progress = progress_percent(index, total);
        self.state.current_index = index;
        self.state.progress_percent = progress;
        self.current = Some(here.clone());
        debug!(index, total, heading, label = %here.label, "tour step");

        self.notify(&TourUpdate::Step {
            status: self.state.status,
            waypoint: here,
            index,
            total,
            progress_percent: progress,
        });
        Ok(())
    }

    fn complete(&mut self, now: Time) {
        let started_at = self.tour.as_ref().map_or(now, |t| t.started_at);
        let elapsed_seconds = now.since(started_at).as_secs_f64();
        self.timer.cancel();
        self.state.status = TourStatus::Completed;
        info!(elapsed_seconds, "tour completed");
        self.notify(&TourUpdate::Completed { elapsed_seconds });
        if let Some(sink) = &self.analytics {
            sink.tour_completed(elapsed_seconds);
        }
        self.reset();
    }

    fn abort(&mut self, err: SurfaceError) {
        let progress = self.state.progress_percent;
        self.reset();
        warn!(progress, "tour aborted: {err}");
        self.notify(&TourUpdate::Aborted {
            error: TourError::NotReady,
            progress_percent: progress,
        });
        if let Some(sink) = &self.analytics {
            sink.tour_stopped(progress);
        }
    }

    fn reset(&mut self) {
        self.timer.cancel();
        self.tour = None;
        self.current = None;
        self.state = TourState {
            speed: self.state.speed,
            ..TourState::default()
        };
    }

    fn notify(&mut self, update: &TourUpdate) {
        for observer in &mut self.observers {
            observer.on_update(update);
        }
    }
}
