use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::TourError;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speed {
    Slow,
    #[default]
    Normal,
    Fast,
}

impl Speed {
    pub fn as_str(self) -> &'static str {
        match self {
            Speed::Slow => "slow",
            Speed::Normal => "normal",
            Speed::Fast => "fast",
        }
    }

    /// Speed is cosmetic, so an unknown key falls back to `normal`.
    pub fn parse_or_default(key: &str) -> Speed {
        key.parse().unwrap_or_else(|err: TourError| {
            warn!("{err}; using normal");
            Speed::Normal
        })
    }
}

impl FromStr for Speed {
    type Err = TourError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "slow" => Ok(Speed::Slow),
            "normal" => Ok(Speed::Normal),
            "fast" => Ok(Speed::Fast),
            _ => Err(TourError::InvalidSpeed(s.to_string())),
        }
    }
}

impl std::fmt::Display for Speed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-step dwell time for each speed, in milliseconds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedTable {
    pub slow_ms: u64,
    pub normal_ms: u64,
    pub fast_ms: u64,
}

impl Default for SpeedTable {
    fn default() -> Self {
        Self {
            slow_ms: 8_000,
            normal_ms: 6_000,
            fast_ms: 4_000,
        }
    }
}

impl SpeedTable {
    pub fn delay(&self, speed: Speed) -> Duration {
        Duration::from_millis(match speed {
            Speed::Slow => self.slow_ms,
            Speed::Normal => self.normal_ms,
            Speed::Fast => self.fast_ms,
        })
    }

    /// Slower speeds never dwell less than faster ones.
    pub fn is_monotonic(&self) -> bool {
        self.slow_ms >= self.normal_ms && self.normal_ms >= self.fast_ms
    }
}
