use std::sync::atomic::{AtomicBool, Ordering};

use foundation::math::Coordinate;
use parking_lot::Mutex;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// The surface was destroyed or never finished loading.
    Unavailable,
    Rejected(String),
}

impl std::fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurfaceError::Unavailable => write!(f, "rendering surface unavailable"),
            SurfaceError::Rejected(msg) => write!(f, "rendering surface rejected command: {msg}"),
        }
    }
}

impl std::error::Error for SurfaceError {}

/// The map canvas or panorama the tour moves.
///
/// The player only writes to it; `is_ready` is the one query. Implementations
/// are owned by the embedder and shared with the player by reference.
pub trait RenderingSurface: Send + Sync {
    fn is_ready(&self) -> bool;
    fn set_position(&self, at: Coordinate) -> Result<(), SurfaceError>;
    fn set_orientation(&self, heading_deg: f64) -> Result<(), SurfaceError>;
}

/// Headless surface that logs every camera command.
#[derive(Debug)]
pub struct TracingSurface {
    ready: AtomicBool,
}

impl Default for TracingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl TracingSurface {
    pub fn new() -> Self {
        Self {
            ready: AtomicBool::new(true),
        }
    }

    /// Marks the surface destroyed; later commands fail.
    pub fn tear_down(&self) {
        self.ready.store(false, Ordering::SeqCst);
    }
}

impl RenderingSurface for TracingSurface {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn set_position(&self, at: Coordinate) -> Result<(), SurfaceError> {
        if !self.is_ready() {
            return Err(SurfaceError::Unavailable);
        }
        info!(lat = at.latitude, lng = at.longitude, "camera position");
        Ok(())
    }

    fn set_orientation(&self, heading_deg: f64) -> Result<(), SurfaceError> {
        if !self.is_ready() {
            return Err(SurfaceError::Unavailable);
        }
        info!(heading = heading_deg, "camera heading");
        Ok(())
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SurfaceCommand {
    Position(Coordinate),
    Orientation(f64),
}

/// Surface that records commands in memory; handy for headless playback.
#[derive(Debug)]
pub struct RecordingSurface {
    ready: AtomicBool,
    commands: Mutex<Vec<SurfaceCommand>>,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self {
            ready: AtomicBool::new(true),
            commands: Mutex::new(Vec::new()),
        }
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    pub fn commands(&self) -> Vec<SurfaceCommand> {
        self.commands.lock().clone()
    }

    pub fn positions(&self) -> Vec<Coordinate> {
        self.commands
            .lock()
            .iter()
            .filter_map(|c| match c {
                SurfaceCommand::Position(p) => Some(*p),
                SurfaceCommand::Orientation(_) => None,
            })
            .collect()
    }

    pub fn headings(&self) -> Vec<f64> {
        self.commands
            .lock()
            .iter()
            .filter_map(|c| match c {
                SurfaceCommand::Orientation(h) => Some(*h),
                SurfaceCommand::Position(_) => None,
            })
            .collect()
    }
}

impl RenderingSurface for RecordingSurface {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn set_position(&self, at: Coordinate) -> Result<(), SurfaceError> {
        if !self.is_ready() {
            return Err(SurfaceError::Unavailable);
        }
        self.commands.lock().push(SurfaceCommand::Position(at));
        Ok(())
    }

    fn set_orientation(&self, heading_deg: f64) -> Result<(), SurfaceError> {
        if !self.is_ready() {
            return Err(SurfaceError::Unavailable);
        }
        self.commands
            .lock()
            .push(SurfaceCommand::Orientation(heading_deg));
        Ok(())
    }
}
