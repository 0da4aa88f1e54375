//! Sample neighbourhood around Garden City, NY.
//!
//! Place distances are the ones the listing pages quote for the first sample
//! property; coordinates are laid out from that property on fixed bearings so
//! nearby search can compute real distances for any query center.

use foundation::math::{Coordinate, destination, haversine_miles};
use serde::{Deserialize, Serialize};

use crate::poi::{PoiCategory, PoiDetails, PointOfInterest};
use crate::service::{BoxFuture, GeocodeResult, Geocoder, PlaceSearch, PlacesError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleProperty {
    pub id: u32,
    pub address: String,
    pub coordinate: Coordinate,
    pub price: String,
    pub beds: u8,
    pub baths: f32,
}

const PROPERTIES: [(u32, &str, f64, f64, &str, u8, f32); 3] = [
    (
        1,
        "100 Stewart Avenue, Garden City, NY 11530",
        40.7265,
        -73.6345,
        "$1,250,000",
        4,
        2.5,
    ),
    (
        2,
        "45 Seventh Street, Garden City, NY 11530",
        40.7289,
        -73.6389,
        "$985,000",
        3,
        2.0,
    ),
    (
        3,
        "220 Cathedral Avenue, Garden City, NY 11530",
        40.7298,
        -73.6412,
        "$1,450,000",
        5,
        3.0,
    ),
];

struct PlaceSeed {
    name: &'static str,
    category: PoiCategory,
    bearing_deg: f64,
    distance_miles: f64,
}

const fn seed(
    name: &'static str,
    category: PoiCategory,
    bearing_deg: f64,
    distance_miles: f64,
) -> PlaceSeed {
    PlaceSeed {
        name,
        category,
        bearing_deg,
        distance_miles,
    }
}

const PLACES: [PlaceSeed; 11] = [
    seed("Garden City High School", PoiCategory::School, 20.0, 0.3),
    seed("Locust Elementary", PoiCategory::School, 300.0, 0.5),
    seed("St. Anne's School", PoiCategory::School, 200.0, 0.7),
    seed("Garden City LIRR Station", PoiCategory::Transit, 160.0, 0.6),
    seed("Mineola LIRR Station", PoiCategory::Transit, 340.0, 1.2),
    seed("Starbucks (7th St)", PoiCategory::Cafe, 70.0, 0.4),
    seed("Local Coffee Shop", PoiCategory::Cafe, 110.0, 0.3),
    seed("The Bryant Library Cafe", PoiCategory::Cafe, 250.0, 0.5),
    seed("Roosevelt Field Mall", PoiCategory::Shopping, 90.0, 1.5),
    seed("Eisenhower Park", PoiCategory::Park, 120.0, 2.1),
    seed("Whole Foods", PoiCategory::Grocery, 230.0, 0.8),
];

fn details_for(name: &str) -> PoiDetails {
    let school = |rating: u8, kind: &str| PoiDetails::School {
        rating: Some(rating),
        school_type: Some(kind.to_string()),
    };
    let transit = |line: &str, minutes: u32| PoiDetails::Transit {
        line: Some(line.to_string()),
        minutes_to_hub: Some(minutes),
    };
    match name {
        "Garden City High School" => school(9, "Public High School"),
        "Locust Elementary" => school(8, "Public Elementary"),
        "St. Anne's School" => school(9, "Private K-8"),
        "Garden City LIRR Station" => transit("Hempstead Branch", 35),
        "Mineola LIRR Station" => transit("Main Line", 32),
        _ => PoiDetails::None,
    }
}

/// In-memory geocoder and place index over the sample neighbourhood.
#[derive(Debug, Clone)]
pub struct SampleCatalogue {
    properties: Vec<SampleProperty>,
    places: Vec<(PoiCategory, String, Coordinate, PoiDetails)>,
    offline: bool,
}

impl Default for SampleCatalogue {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleCatalogue {
    pub fn new() -> Self {
        let properties: Vec<SampleProperty> = PROPERTIES
            .iter()
            .map(|&(id, address, lat, lng, price, beds, baths)| SampleProperty {
                id,
                address: address.to_string(),
                coordinate: Coordinate {
                    latitude: lat,
                    longitude: lng,
                },
                price: price.to_string(),
                beds,
                baths,
            })
            .collect();

        let anchor = properties[0].coordinate;
        let places = PLACES
            .iter()
            .map(|p| {
                (
                    p.category,
                    p.name.to_string(),
                    destination(anchor, p.bearing_deg, p.distance_miles),
                    details_for(p.name),
                )
            })
            .collect();

        Self {
            properties,
            places,
            offline: false,
        }
    }

    /// A catalogue whose every lookup reports the service as unavailable.
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::new()
        }
    }

    pub fn properties(&self) -> &[SampleProperty] {
        &self.properties
    }

    pub fn property(&self, id: u32) -> Option<&SampleProperty> {
        self.properties.iter().find(|p| p.id == id)
    }

    fn nearby(
        &self,
        center: Coordinate,
        radius_miles: f64,
        category: PoiCategory,
    ) -> Vec<PointOfInterest> {
        let mut found: Vec<PointOfInterest> = self
            .places
            .iter()
            .filter(|(c, ..)| *c == category)
            .filter_map(|(c, name, at, details)| {
                // Two decimals, the precision listing pages show.
                let distance = (haversine_miles(center, *at) * 100.0).round() / 100.0;
                (distance <= radius_miles).then(|| {
                    PointOfInterest::new(name.clone(), *c, *at, distance)
                        .with_details(details.clone())
                })
            })
            .collect();
        found.sort_by(|a, b| a.distance_miles.total_cmp(&b.distance_miles));
        found
    }
}

impl Geocoder for SampleCatalogue {
    fn geocode<'a>(
        &'a self,
        address: &'a str,
    ) -> BoxFuture<'a, Result<GeocodeResult, PlacesError>> {
        let result = if self.offline {
            Err(PlacesError::Unavailable)
        } else {
            let needle = address.trim().to_ascii_lowercase();
            self.properties
                .iter()
                .find(|p| {
                    !needle.is_empty() && p.address.to_ascii_lowercase().contains(&needle)
                })
                .map(|p| GeocodeResult {
                    coordinate: p.coordinate,
                    formatted_address: p.address.clone(),
                })
                .ok_or(PlacesError::NotFound)
        };
        Box::pin(async move { result })
    }
}

impl PlaceSearch for SampleCatalogue {
    fn find_nearby<'a>(
        &'a self,
        center: Coordinate,
        radius_miles: f64,
        category: PoiCategory,
    ) -> BoxFuture<'a, Result<Vec<PointOfInterest>, PlacesError>> {
        let result = if self.offline {
            Err(PlacesError::Unavailable)
        } else {
            Ok(self.nearby(center, radius_miles, category))
        };
        Box::pin(async move { result })
    }
}

#[cfg(test)]
mod tests {
    use super::SampleCatalogue;
    use crate::poi::PoiCategory;
    use crate::service::{Geocoder, LISTING_RADIUS_MILES, PlaceSearch, PlacesError, gather_nearby};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn geocodes_sample_addresses() {
        let catalogue = SampleCatalogue::new();
        let hit = catalogue.geocode("45 seventh street").await.unwrap();
        assert_eq!(
            hit.formatted_address,
            "45 Seventh Street, Garden City, NY 11530"
        );
        assert_eq!(
            catalogue.geocode("1 Nowhere Lane").await,
            Err(PlacesError::NotFound)
        );
    }

    #[tokio::test]
    async fn distances_from_first_property_match_listing() {
        let catalogue = SampleCatalogue::new();
        let home = catalogue.property(1).unwrap().coordinate;
        let schools = catalogue
            .find_nearby(home, 5.0, PoiCategory::School)
            .await
            .unwrap();
        let summary: Vec<(&str, f64, u32)> = schools
            .iter()
            .map(|p| (p.name.as_str(), p.distance_miles, p.walk_time_minutes))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Garden City High School", 0.3, 6),
                ("Locust Elementary", 0.5, 10),
                ("St. Anne's School", 0.7, 14),
            ]
        );
    }

    #[tokio::test]
    async fn radius_limits_results() {
        let catalogue = SampleCatalogue::new();
        let home = catalogue.property(1).unwrap().coordinate;
        let nearby = gather_nearby(&catalogue, home, 1.0).await.unwrap();
        assert_eq!(nearby.transit.len(), 1);
        assert_eq!(nearby.amenities.len(), 1);
        assert_eq!(nearby.amenities[0].name, "Whole Foods");
    }

    #[tokio::test]
    async fn listing_radius_reaches_beyond_walking_distance() {
        let catalogue = SampleCatalogue::new();
        let home = catalogue.property(1).unwrap().coordinate;
        let nearby = gather_nearby(&catalogue, home, LISTING_RADIUS_MILES)
            .await
            .unwrap();
        assert_eq!(nearby.len(), 11);
        let transit: Vec<_> = nearby.transit.iter().map(|p| p.distance_miles).collect();
        assert_eq!(transit, vec![0.6, 1.2]);
    }

    #[tokio::test]
    async fn offline_catalogue_reports_unavailable() {
        let catalogue = SampleCatalogue::offline();
        let home = catalogue.property(1).unwrap().coordinate;
        assert_eq!(gather_nearby(&catalogue, home, 1.0).await, None);
    }
}
