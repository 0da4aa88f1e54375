//! Route synthesis for scripted tours.
//!
//! Routes are a geometric approximation: the camera hops between the real
//! coordinates of nearby places and returns home. No street graph is involved.

use foundation::math::Coordinate;
use places::{NearbyPois, PointOfInterest};
use tracing::debug;

use crate::config::PlannerConfig;
use crate::waypoint::Waypoint;

/// Plans a closed loop around `center`.
///
/// `None` means place data is entirely unavailable and selects the fixed
/// cardinal loop; `Some` with no eligible places yields `[start, end]`.
/// The result is a pure function of its inputs.
pub fn plan(
    center: Coordinate,
    pois: Option<&NearbyPois>,
    config: &PlannerConfig,
) -> Vec<Waypoint> {
    let Some(pois) = pois else {
        debug!("no place data; planning fallback loop");
        return plan_fallback(center, config.fallback_delta_deg);
    };

    let visits: Vec<&PointOfInterest> = [
        (&pois.schools, config.max_schools),
        (&pois.transit, config.max_transit),
        (&pois.cafes, config.max_cafes),
        (&pois.amenities, config.max_amenities),
    ]
    .into_iter()
    .flat_map(|(list, limit)| {
        nearest_within(list, config.proximity_miles, limit)
    })
    .collect();

    let mut route = Vec::with_capacity(visits.len() + 2);
    route.push(Waypoint::start(center));
    for poi in visits {
        route.push(Waypoint::visit(poi, route.len()));
    }
    route.push(Waypoint::end(center, route.len()));

    debug!(
        "planned {} stops from {} nearby places (threshold {} mi)",
        route.len(),
        pois.len(),
        config.proximity_miles
    );
    route
}

/// Start, four cardinal stops `delta_deg` away (N, E, S, W), end.
pub fn plan_fallback(center: Coordinate, delta_deg: f64) -> Vec<Waypoint> {
    let stops = [
        ("North of the property", delta_deg, 0.0),
        ("East of the property", 0.0, delta_deg),
        ("South of the property", -delta_deg, 0.0),
        ("West of the property", 0.0, -delta_deg),
    ];

    let mut route = Vec::with_capacity(stops.len() + 2);
    route.push(Waypoint::start(center));
    for (label, d_lat, d_lng) in stops {
        let at = center.offset(d_lat, d_lng);
        route.push(Waypoint::scenic(at, label, route.len()));
    }
    route.push(Waypoint::end(center, route.len()));
    route
}

/// Up to `limit` places within `threshold_miles`, nearest first.
/// Ties keep their input order.
fn nearest_within(
    list: &[PointOfInterest],
    threshold_miles: f64,
    limit: usize,
) -> Vec<&PointOfInterest> {
    let mut eligible: Vec<&PointOfInterest> = list
        .iter()
        .filter(|p| {
            p.distance_miles.is_finite() && p.distance_miles <= threshold_miles
        })
        .collect();
    eligible.sort_by(|a, b| a.distance_miles.total_cmp(&b.distance_miles));
    eligible.truncate(limit);
    eligible
}

#[cfg(test)]
mod tests {
    use super::{plan, plan_fallback};
    use crate::config::PlannerConfig;
    use crate::waypoint::WaypointKind;
    use foundation::math::Coordinate;
    use places::sample::SampleCatalogue;
    use places::{LISTING_RADIUS_MILES, NearbyPois, PoiCategory, PointOfInterest, gather_nearby};
    use pretty_assertions::assert_eq;

    fn c(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng).unwrap()
    }

    fn poi(name: &str, category: PoiCategory, distance: f64) -> PointOfInterest {
        // Spread places out so coordinates are distinguishable.
        let north = if distance.is_finite() {
            distance / 69.0
        } else {
            0.0
        };
        let at = c(40.7265 + north, -73.6345 + name.len() as f64 * 1e-4);
        PointOfInterest::new(name, category, at, distance)
    }

    fn labels(route: &[crate::waypoint::Waypoint]) -> Vec<&str> {
        route.iter().map(|w| w.label.as_str()).collect()
    }

    fn garden_city() -> NearbyPois {
        NearbyPois {
            schools: vec![
                poi("St. Anne's School", PoiCategory::School, 0.7),
                poi("Garden City High School", PoiCategory::School, 0.3),
                poi("Locust Elementary", PoiCategory::School, 0.5),
            ],
            transit: vec![
                poi("Mineola LIRR Station", PoiCategory::Transit, 1.2),
                poi("Garden City LIRR Station", PoiCategory::Transit, 0.6),
            ],
            cafes: vec![poi("Local Coffee Shop", PoiCategory::Cafe, 0.3)],
            amenities: vec![
                poi("Roosevelt Field Mall", PoiCategory::Shopping, 1.5),
                poi("Whole Foods", PoiCategory::Grocery, 0.8),
                poi("Eisenhower Park", PoiCategory::Park, 2.1),
            ],
        }
    }

    #[test]
    fn starts_and_ends_at_center() {
        let cfg = PlannerConfig::default();
        let centers = [
            c(40.7265, -73.6345),
            c(-33.9, 18.4),
            c(0.0, 180.0),
            c(89.99, -179.99),
        ];
        let sets = [None, Some(NearbyPois::default()), Some(garden_city())];
        for center in centers {
            for pois in &sets {
                let route = plan(center, pois.as_ref(), &cfg);
                let first = route.first().unwrap();
                let last = route.last().unwrap();
                assert_eq!(first.coordinate, center);
                assert_eq!(last.coordinate, center);
                assert_eq!(first.kind, WaypointKind::Start);
                assert_eq!(last.kind, WaypointKind::End);
                for (i, w) in route.iter().enumerate() {
                    assert_eq!(w.order, i);
                }
            }
        }
    }

    #[test]
    fn fallback_is_always_six_stops() {
        let cfg = PlannerConfig::default();
        for center in [c(40.7265, -73.6345), c(90.0, 0.0), c(-12.0, -180.0)] {
            let route = plan(center, None, &cfg);
            assert_eq!(route.len(), 6);
        }
        let route = plan_fallback(c(10.0, 20.0), 0.002);
        let offsets: Vec<(f64, f64)> = route
            .iter()
            .map(|w| {
                let d_lat = w.coordinate.latitude - 10.0;
                let d_lng = w.coordinate.longitude - 20.0;
                ((d_lat * 1e6).round() / 1e6, (d_lng * 1e6).round() / 1e6)
            })
            .collect();
        assert_eq!(
            offsets,
            vec![
                (0.0, 0.0),
                (0.002, 0.0),
                (0.0, 0.002),
                (-0.002, 0.0),
                (0.0, -0.002),
                (0.0, 0.0),
            ]
        );
    }

    #[test]
    fn empty_lists_yield_start_and_end_only() {
        let empty = NearbyPois::default();
        let cfg = PlannerConfig::default();
        let route = plan(c(40.7265, -73.6345), Some(&empty), &cfg);
        let kinds: Vec<_> = route.iter().map(|w| w.kind).collect();
        assert_eq!(kinds, vec![WaypointKind::Start, WaypointKind::End]);
    }

    #[test]
    fn distant_transit_is_excluded() {
        let center = c(40.7265, -73.6345);
        let pois = NearbyPois {
            schools: vec![poi("Garden City High School", PoiCategory::School, 0.3)],
            transit: vec![poi("Mineola LIRR Station", PoiCategory::Transit, 1.5)],
            ..NearbyPois::default()
        };
        let route = plan(center, Some(&pois), &PlannerConfig::default());
        assert_eq!(route.len(), 3);
        assert_eq!(route[1].label, "Garden City High School");
        assert_eq!(route[1].coordinate, pois.schools[0].coordinate);
        assert_eq!(route[1].source.as_ref(), Some(&pois.schools[0]));
    }

    #[tokio::test]
    async fn listed_but_distant_places_are_not_visited() {
        let catalogue = SampleCatalogue::new();
        let home = catalogue.property(1).unwrap().coordinate;
        let listed = gather_nearby(&catalogue, home, LISTING_RADIUS_MILES)
            .await
            .unwrap();
        assert_eq!(listed.transit.len(), 2);

        let route = plan(home, Some(&listed), &PlannerConfig::default());
        let visited = labels(&route);
        assert!(visited.contains(&"Garden City LIRR Station"));
        assert!(!visited.contains(&"Mineola LIRR Station"));
        assert!(!visited.contains(&"Roosevelt Field Mall"));
        assert_eq!(route.len(), 6);
    }

    #[test]
    fn visits_nearest_per_category_in_category_order() {
        let pois = garden_city();
        let route = plan(c(40.7265, -73.6345), Some(&pois), &PlannerConfig::default());
        assert_eq!(
            labels(&route),
            vec![
                "Start at the property",
                "Garden City High School",
                "Locust Elementary",
                "Garden City LIRR Station",
                "Whole Foods",
                "Back at the property",
            ]
        );
    }

    #[test]
    fn cafes_visited_between_transit_and_amenities_when_enabled() {
        let cfg = PlannerConfig {
            max_cafes: 1,
            max_schools: 0,
            ..PlannerConfig::default()
        };
        let route = plan(c(40.7265, -73.6345), Some(&garden_city()), &cfg);
        assert_eq!(
            labels(&route)[1..4].to_vec(),
            vec![
                "Garden City LIRR Station",
                "Local Coffee Shop",
                "Whole Foods",
            ]
        );
    }

    #[test]
    fn threshold_is_inclusive_and_skips_unknown_distances() {
        let pois = NearbyPois {
            schools: vec![
                poi("Edge", PoiCategory::School, 1.0),
                poi("Unknown", PoiCategory::School, f64::NAN),
            ],
            ..NearbyPois::default()
        };
        let route = plan(c(40.0, -73.0), Some(&pois), &PlannerConfig::default());
        assert_eq!(
            labels(&route),
            vec!["Start at the property", "Edge", "Back at the property"]
        );
    }

    #[test]
    fn planning_is_deterministic() {
        let cfg = PlannerConfig::default();
        let pois = garden_city();
        let a = plan(c(40.7265, -73.6345), Some(&pois), &cfg);
        let b = plan(c(40.7265, -73.6345), Some(&pois), &cfg);
        assert_eq!(a, b);
        assert_eq!(plan(c(1.0, 2.0), None, &cfg), plan(c(1.0, 2.0), None, &cfg));
    }
}
