//! Collaborator interfaces for geocoding and nearby-place search.
//!
//! Implementations talk to third-party services; the tour engine only ever
//! sees their output. Methods return boxed futures for dyn-compatibility.

use std::future::Future;
use std::pin::Pin;

use foundation::math::Coordinate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::poi::{NearbyPois, PoiCategory, PointOfInterest};

/// Type alias for a boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacesError {
    /// The query ran but matched nothing.
    NotFound,
    /// The service could not be reached or returned no payload at all.
    Unavailable,
    /// The service answered with an error.
    Failed(String),
}

impl std::fmt::Display for PlacesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlacesError::NotFound => write!(f, "no match found"),
            PlacesError::Unavailable => write!(f, "places service unavailable"),
            PlacesError::Failed(msg) => write!(f, "places service error: {msg}"),
        }
    }
}

impl std::error::Error for PlacesError {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub coordinate: Coordinate,
    pub formatted_address: String,
}

pub trait Geocoder: Send + Sync {
    fn geocode<'a>(
        &'a self,
        address: &'a str,
    ) -> BoxFuture<'a, Result<GeocodeResult, PlacesError>>;
}

pub trait PlaceSearch: Send + Sync {
    fn find_nearby<'a>(
        &'a self,
        center: Coordinate,
        radius_miles: f64,
        category: PoiCategory,
    ) -> BoxFuture<'a, Result<Vec<PointOfInterest>, PlacesError>>;
}

/// Search radius of the listing pages. Wider than any walking threshold, so
/// the planner decides what is close enough to visit.
pub const LISTING_RADIUS_MILES: f64 = 5.0;

/// Categories queried for one property, in the order they're requested.
pub const GATHERED_CATEGORIES: [PoiCategory; 6] = [
    PoiCategory::School,
    PoiCategory::Transit,
    PoiCategory::Cafe,
    PoiCategory::Grocery,
    PoiCategory::Park,
    PoiCategory::Shopping,
];

/// Queries every tour category once around `center`.
///
/// A failed category contributes an empty list. Only when every query reports
/// [`PlacesError::Unavailable`] does this return `None`, which tells the
/// planner to fall back to a geometric loop.
pub async fn gather_nearby(
    search: &dyn PlaceSearch,
    center: Coordinate,
    radius_miles: f64,
) -> Option<NearbyPois> {
    let mut nearby = NearbyPois::default();
    let mut unavailable = 0usize;

    for category in GATHERED_CATEGORIES {
        match search.find_nearby(center, radius_miles, category).await {
            Ok(found) => {
                debug!("found {} {category} places", found.len());
                for mut poi in found {
                    // File under the queried category so the bundle stays consistent.
                    poi.category = category;
                    nearby.push(poi);
                }
            }
            Err(PlacesError::Unavailable) => {
                unavailable += 1;
            }
            Err(err) => {
                warn!("place search for {category} failed: {err}");
            }
        }
    }

    if unavailable == GATHERED_CATEGORIES.len() {
        warn!("place search unavailable for every category");
        return None;
    }
    Some(nearby)
}

#[cfg(test)]
mod tests {
    use super::{BoxFuture, PlaceSearch, PlacesError, gather_nearby};
    use crate::poi::{PoiCategory, PointOfInterest};
    use foundation::math::Coordinate;

    struct Scripted(fn(PoiCategory) -> Result<Vec<PointOfInterest>, PlacesError>);

    impl PlaceSearch for Scripted {
        fn find_nearby<'a>(
            &'a self,
            _center: Coordinate,
            _radius_miles: f64,
            category: PoiCategory,
        ) -> BoxFuture<'a, Result<Vec<PointOfInterest>, PlacesError>> {
            let result = (self.0)(category);
            Box::pin(async move { result })
        }
    }

    fn center() -> Coordinate {
        Coordinate::new(40.7265, -73.6345).unwrap()
    }

    #[tokio::test]
    async fn all_unavailable_means_no_data() {
        let search = Scripted(|_| Err(PlacesError::Unavailable));
        assert_eq!(gather_nearby(&search, center(), 1.0).await, None);
    }

    #[tokio::test]
    async fn zero_results_is_empty_not_missing() {
        let search = Scripted(|_| Ok(Vec::new()));
        let nearby = gather_nearby(&search, center(), 1.0).await.unwrap();
        assert!(nearby.is_empty());
    }

    #[tokio::test]
    async fn failures_become_empty_lists() {
        let search = Scripted(|category| match category {
            PoiCategory::School => Ok(vec![PointOfInterest::new(
                "Locust Elementary",
                PoiCategory::School,
                Coordinate::new(40.73, -73.63).unwrap(),
                0.5,
            )]),
            PoiCategory::Transit => Err(PlacesError::Failed("quota".into())),
            _ => Err(PlacesError::Unavailable),
        });
        let nearby = gather_nearby(&search, center(), 1.0).await.unwrap();
        assert_eq!(nearby.schools.len(), 1);
        assert!(nearby.transit.is_empty());
        assert!(nearby.amenities.is_empty());
    }
}
