use foundation::math::Coordinate;
use serde::{Deserialize, Serialize};

/// Walking pace used to derive `walk_time_minutes` (20 min per mile).
pub const WALK_MINUTES_PER_MILE: f64 = 20.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoiCategory {
    School,
    Transit,
    Cafe,
    Grocery,
    Park,
    Shopping,
    Other,
}

impl PoiCategory {
    pub const ALL: [PoiCategory; 7] = [
        PoiCategory::School,
        PoiCategory::Transit,
        PoiCategory::Cafe,
        PoiCategory::Grocery,
        PoiCategory::Park,
        PoiCategory::Shopping,
        PoiCategory::Other,
    ];

    /// Categories grouped under "amenities".
    pub const AMENITIES: [PoiCategory; 3] = [
        PoiCategory::Grocery,
        PoiCategory::Park,
        PoiCategory::Shopping,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PoiCategory::School => "school",
            PoiCategory::Transit => "transit",
            PoiCategory::Cafe => "cafe",
            PoiCategory::Grocery => "grocery",
            PoiCategory::Park => "park",
            PoiCategory::Shopping => "shopping",
            PoiCategory::Other => "other",
        }
    }
}

impl std::fmt::Display for PoiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category-specific extras reported by the places service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PoiDetails {
    #[default]
    None,
    School {
        #[serde(default)]
        rating: Option<u8>,
        #[serde(default)]
        school_type: Option<String>,
    },
    Transit {
        #[serde(default)]
        line: Option<String>,
        /// Ride time to the main commuter hub.
        #[serde(default)]
        minutes_to_hub: Option<u32>,
    },
}

/// A nearby place as delivered by the places service. Immutable once received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    pub name: String,
    pub category: PoiCategory,
    pub coordinate: Coordinate,
    pub distance_miles: f64,
    pub walk_time_minutes: u32,
    #[serde(default)]
    pub details: PoiDetails,
}

impl PointOfInterest {
    pub fn new(
        name: impl Into<String>,
        category: PoiCategory,
        coordinate: Coordinate,
        distance_miles: f64,
    ) -> Self {
        let distance_miles = if distance_miles.is_finite() {
            distance_miles.max(0.0)
        } else {
            distance_miles
        };
        Self {
            name: name.into(),
            category,
            coordinate,
            distance_miles,
            walk_time_minutes: walk_minutes(distance_miles),
            details: PoiDetails::None,
        }
    }

    pub fn with_details(mut self, details: PoiDetails) -> Self {
        self.details = details;
        self
    }
}

/// Whole minutes to walk `distance_miles`, rounded to nearest.
pub fn walk_minutes(distance_miles: f64) -> u32 {
    if !distance_miles.is_finite() || distance_miles <= 0.0 {
        return 0;
    }
    let minutes = (distance_miles * WALK_MINUTES_PER_MILE).round();
    if minutes >= u32::MAX as f64 {
        u32::MAX
    } else {
        minutes as u32
    }
}

/// Nearby places around one property, grouped the way the tour visits them.
///
/// Any list may be missing from the service payload; it deserializes empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NearbyPois {
    #[serde(default)]
    pub schools: Vec<PointOfInterest>,
    #[serde(default)]
    pub transit: Vec<PointOfInterest>,
    #[serde(default)]
    pub cafes: Vec<PointOfInterest>,
    #[serde(default)]
    pub amenities: Vec<PointOfInterest>,
}

impl NearbyPois {
    pub fn is_empty(&self) -> bool {
        self.schools.is_empty()
            && self.transit.is_empty()
            && self.cafes.is_empty()
            && self.amenities.is_empty()
    }

    pub fn len(&self) -> usize {
        self.schools.len() + self.transit.len() + self.cafes.len() + self.amenities.len()
    }

    /// Files a POI under the list its category belongs to.
    pub fn push(&mut self, poi: PointOfInterest) {
        match poi.category {
            PoiCategory::School => self.schools.push(poi),
            PoiCategory::Transit => self.transit.push(poi),
            PoiCategory::Cafe => self.cafes.push(poi),
            PoiCategory::Grocery
            | PoiCategory::Park
            | PoiCategory::Shopping
            | PoiCategory::Other => self.amenities.push(poi),
        }
    }
}
