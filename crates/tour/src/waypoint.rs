use foundation::math::Coordinate;
use places::PointOfInterest;
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaypointKind {
    Start,
    Poi,
    End,
}

/// One stop of a planned tour. Read-only once planning completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub coordinate: Coordinate,
    pub kind: WaypointKind,
    pub label: String,
    /// The place this stop visits; `None` for start, end and fallback stops.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PointOfInterest>,
    /// 0-based position in the tour.
    pub order: usize,
}

impl Waypoint {
    pub fn start(center: Coordinate) -> Self {
        Self {
            coordinate: center,
            kind: WaypointKind::Start,
            label: "Start at the property".to_string(),
            source: None,
            order: 0,
        }
    }

    pub fn end(center: Coordinate, order: usize) -> Self {
        Self {
            coordinate: center,
            kind: WaypointKind::End,
            label: "Back at the property".to_string(),
            source: None,
            order,
        }
    }

    pub fn visit(poi: &PointOfInterest, order: usize) -> Self {
        Self {
            coordinate: poi.coordinate,
            kind: WaypointKind::Poi,
            label: poi.name.clone(),
            source: Some(poi.clone()),
            order,
        }
    }

    pub fn scenic(coordinate: Coordinate, label: impl Into<String>, order: usize) -> Self {
        Self {
            coordinate,
            kind: WaypointKind::Poi,
            label: label.into(),
            source: None,
            order,
        }
    }
}
