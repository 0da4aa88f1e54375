use serde::{Deserialize, Serialize};

/// Mean earth radius (miles) for the spherical approximation used by tours.
pub const EARTH_RADIUS_MILES: f64 = 3_958.8;

/// Geographic position in degrees.
///
/// Serialized as `{ "lat": .., "lng": .. }` to match what geocoding and place
/// services hand back.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lng")]
    pub longitude: f64,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum CoordinateError {
    NotFinite,
    LatitudeOutOfRange(f64),
    LongitudeOutOfRange(f64),
}

impl std::fmt::Display for CoordinateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoordinateError::NotFinite => write!(f, "coordinate is not finite"),
            CoordinateError::LatitudeOutOfRange(lat) => {
                write!(f, "latitude out of range [-90, 90]: {lat}")
            }
            CoordinateError::LongitudeOutOfRange(lng) => {
                write!(f, "longitude out of range [-180, 180]: {lng}")
            }
        }
    }
}

impl std::error::Error for CoordinateError {}

impl Coordinate {
    /// Range-checked constructor. No other validation is performed.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(CoordinateError::NotFinite);
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Shift by degree deltas. Latitude is clamped to the poles and longitude
    /// wraps into (-180, 180].
    pub fn offset(self, d_lat_deg: f64, d_lng_deg: f64) -> Self {
        Self {
            latitude: (self.latitude + d_lat_deg).clamp(-90.0, 90.0),
            longitude: wrap_longitude(self.longitude + d_lng_deg),
        }
    }
}

pub fn wrap_longitude(lng: f64) -> f64 {
    let wrapped = (lng + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 { 180.0 } else { wrapped }
}

/// Initial bearing (forward azimuth) from `from` to `to`, in degrees `[0, 360)`.
///
/// Coincident points yield `0.0`.
pub fn initial_bearing_deg(from: Coordinate, to: Coordinate) -> f64 {
    let phi1 = from.latitude.to_radians();
    let phi2 = to.latitude.to_radians();
    let d_lambda = (to.longitude - from.longitude).to_radians();

    let y = d_lambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * d_lambda.cos();

    let bearing = (y.atan2(x).to_degrees() + 360.0) % 360.0;
    if bearing.is_finite() && bearing < 360.0 {
        bearing
    } else {
        0.0
    }
}

/// Great-circle distance in miles.
pub fn haversine_miles(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let d_phi = phi2 - phi1;
    let d_lambda = (b.longitude - a.longitude).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_MILES * h.sqrt().min(1.0).asin()
}

/// Point reached by travelling `distance_miles` from `from` on `bearing_deg`.
pub fn destination(from: Coordinate, bearing_deg: f64, distance_miles: f64) -> Coordinate {
    let phi1 = from.latitude.to_radians();
    let lambda1 = from.longitude.to_radians();
    let theta = bearing_deg.to_radians();
    let delta = distance_miles / EARTH_RADIUS_MILES;

    let sin_phi2 = phi1.sin() * delta.cos() + phi1.cos() * delta.sin() * theta.cos();
    let phi2 = sin_phi2.clamp(-1.0, 1.0).asin();
    let lambda2 = lambda1
        + (theta.sin() * delta.sin() * phi1.cos()).atan2(delta.cos() - phi1.sin() * sin_phi2);

    Coordinate {
        latitude: phi2.to_degrees(),
        longitude: wrap_longitude(lambda2.to_degrees()),
    }
}
