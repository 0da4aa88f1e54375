use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::speed::SpeedTable;

/// Limits and thresholds for route synthesis.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Places farther than this are listed elsewhere but never visited.
    pub proximity_miles: f64,
    pub max_schools: usize,
    pub max_transit: usize,
    /// Cafés are not visited unless this is raised.
    pub max_cafes: usize,
    pub max_amenities: usize,
    /// Angular offset of the cardinal stops in the no-data loop.
    pub fallback_delta_deg: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            proximity_miles: 1.0,
            max_schools: 2,
            max_transit: 1,
            max_cafes: 0,
            max_amenities: 2,
            fallback_delta_deg: 0.002,
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TourConfig {
    pub planner: PlannerConfig,
    pub speeds: SpeedTable,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidProximity(f64),
    InvalidFallbackDelta(f64),
    NonMonotonicSpeeds(SpeedTable),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidProximity(v) => {
                write!(f, "proximity threshold must be finite and >= 0, got {v}")
            }
            ConfigError::InvalidFallbackDelta(v) => {
                write!(f, "fallback delta must be finite and > 0, got {v}")
            }
            ConfigError::NonMonotonicSpeeds(t) => write!(
                f,
                "speed delays must satisfy slow >= normal >= fast (got {}/{}/{} ms)",
                t.slow_ms, t.normal_ms, t.fast_ms
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

impl TourConfig {
    /// Reads `TOUR_*` environment variables over the defaults and validates.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`TourConfig::from_env`] but with an arbitrary key lookup.
    /// Unparseable values fall back to the default for that key.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let d = TourConfig::default();
        let cfg = TourConfig {
            planner: PlannerConfig {
                proximity_miles: var_or(&lookup, "TOUR_PROXIMITY_MILES", d.planner.proximity_miles),
                max_schools: var_or(&lookup, "TOUR_MAX_SCHOOLS", d.planner.max_schools),
                max_transit: var_or(&lookup, "TOUR_MAX_TRANSIT", d.planner.max_transit),
                max_cafes: var_or(&lookup, "TOUR_MAX_CAFES", d.planner.max_cafes),
                max_amenities: var_or(&lookup, "TOUR_MAX_AMENITIES", d.planner.max_amenities),
                fallback_delta_deg: var_or(
                    &lookup,
                    "TOUR_FALLBACK_DELTA_DEG",
                    d.planner.fallback_delta_deg,
                ),
            },
            speeds: SpeedTable {
                slow_ms: var_or(&lookup, "TOUR_DELAY_SLOW_MS", d.speeds.slow_ms),
                normal_ms: var_or(&lookup, "TOUR_DELAY_NORMAL_MS", d.speeds.normal_ms),
                fast_ms: var_or(&lookup, "TOUR_DELAY_FAST_MS", d.speeds.fast_ms),
            },
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.planner;
        if !p.proximity_miles.is_finite() || p.proximity_miles < 0.0 {
            return Err(ConfigError::InvalidProximity(p.proximity_miles));
        }
        if !p.fallback_delta_deg.is_finite() || p.fallback_delta_deg <= 0.0 {
            return Err(ConfigError::InvalidFallbackDelta(p.fallback_delta_deg));
        }
        if !self.speeds.is_monotonic() {
            return Err(ConfigError::NonMonotonicSpeeds(self.speeds));
        }
        Ok(())
    }
}

fn var_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, PlannerConfig, TourConfig};
    use crate::speed::SpeedTable;
    use pretty_assertions::assert_eq;

    #[test]
    fn lookup_overrides_defaults() {
        let cfg = TourConfig::from_lookup(|key| match key {
            "TOUR_PROXIMITY_MILES" => Some("1.5".to_string()),
            "TOUR_MAX_CAFES" => Some("1".to_string()),
            "TOUR_DELAY_FAST_MS" => Some(" 2500 ".to_string()),
            "TOUR_MAX_SCHOOLS" => Some("lots".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(cfg.planner.proximity_miles, 1.5);
        assert_eq!(cfg.planner.max_cafes, 1);
        assert_eq!(cfg.planner.max_schools, 2);
        assert_eq!(cfg.speeds.fast_ms, 2_500);
    }

    #[test]
    fn rejects_non_monotonic_speeds() {
        let err = TourConfig::from_lookup(|key| {
            (key == "TOUR_DELAY_FAST_MS").then(|| "9000".to_string())
        })
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::NonMonotonicSpeeds(SpeedTable {
                slow_ms: 8_000,
                normal_ms: 6_000,
                fast_ms: 9_000,
            })
        );
    }

    #[test]
    fn rejects_bad_thresholds() {
        let mut cfg = TourConfig::default();
        cfg.planner.proximity_miles = -1.0;
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidProximity(-1.0)));
        cfg.planner = PlannerConfig {
            fallback_delta_deg: 0.0,
            ..PlannerConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidFallbackDelta(0.0)));
    }

    #[test]
    fn partial_json_uses_defaults() {
        let cfg: TourConfig = serde_json::from_str(r#"{"planner": {"max_transit": 2}}"#).unwrap();
        assert_eq!(cfg.planner.max_transit, 2);
        assert_eq!(cfg.planner.proximity_miles, 1.0);
        assert_eq!(cfg.speeds, SpeedTable::default());
    }
}
