use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc::UnboundedSender;

use crate::error::TourError;
use crate::player::TourStatus;
use crate::waypoint::Waypoint;

/// What a progress observer hears from the player.
#[derive(Debug, Clone, PartialEq)]
pub enum TourUpdate {
    /// Emitted on every step, including the final one.
    Step {
        status: TourStatus,
        waypoint: Waypoint,
        index: usize,
        total: usize,
        progress_percent: u8,
    },
    /// Emitted once after the final step.
    Completed { elapsed_seconds: f64 },
    /// Explicit stop (or restart) of a running or paused tour.
    Stopped { progress_percent: u8 },
    /// The surface failed mid-tour and playback was torn down.
    Aborted {
        error: TourError,
        progress_percent: u8,
    },
}

pub trait ProgressObserver: Send {
    fn on_update(&mut self, update: &TourUpdate);
}

impl<F> ProgressObserver for F
where
    F: FnMut(&TourUpdate) + Send,
{
    fn on_update(&mut self, update: &TourUpdate) {
        self(update)
    }
}

/// Forwards updates into a channel; a closed receiver is ignored.
impl ProgressObserver for UnboundedSender<TourUpdate> {
    fn on_update(&mut self, update: &TourUpdate) {
        let _ = self.send(update.clone());
    }
}

/// Shared in-memory record of updates. Clones observe the same log.
#[derive(Debug, Clone, Default)]
pub struct UpdateLog {
    updates: Arc<Mutex<Vec<TourUpdate>>>,
}

impl UpdateLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn updates(&self) -> Vec<TourUpdate> {
        self.updates.lock().clone()
    }

    pub fn drain(&self) -> Vec<TourUpdate> {
        std::mem::take(&mut *self.updates.lock())
    }

    /// Progress of every `Step` update, in order.
    pub fn progress(&self) -> Vec<u8> {
        self.updates
            .lock()
            .iter()
            .filter_map(|u| match u {
                TourUpdate::Step {
                    progress_percent, ..
                } => Some(*progress_percent),
                _ => None,
            })
            .collect()
    }

    pub fn completions(&self) -> usize {
        self.updates
            .lock()
            .iter()
            .filter(|u| matches!(u, TourUpdate::Completed { .. }))
            .count()
    }
}

impl ProgressObserver for UpdateLog {
    fn on_update(&mut self, update: &TourUpdate) {
        self.updates.lock().push(update.clone());
    }
}
