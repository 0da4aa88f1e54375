#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TourError {
    /// No rendering surface attached, or it isn't accepting commands.
    NotReady,
    /// A tour needs at least a start and an end.
    EmptyRoute { len: usize },
    /// Unrecognised speed key.
    InvalidSpeed(String),
}

impl std::fmt::Display for TourError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TourError::NotReady => write!(f, "rendering surface not ready"),
            TourError::EmptyRoute { len } => {
                write!(f, "route needs at least 2 waypoints, got {len}")
            }
            TourError::InvalidSpeed(key) => write!(f, "unknown tour speed: {key:?}"),
        }
    }
}

impl std::error::Error for TourError {}
