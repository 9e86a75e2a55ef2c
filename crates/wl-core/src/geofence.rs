//! Geofence resolution.
//!
//! A point belongs to the **first** place in the caller's list whose circle
//! covers it. Overlapping geofences are resolved by list order, not by
//! proximity, so the caller controls priority through ordering.

use crate::place::Place;
use crate::types::Coordinate;

/// Mean earth radius used for all distance calculations.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Great-circle distance between two coordinates in meters (haversine).
pub fn haversine_distance(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.latitude().to_radians();
    let phi2 = b.latitude().to_radians();
    let d_phi = (b.latitude() - a.latitude()).to_radians();
    let d_lambda = (b.longitude() - a.longitude()).to_radians();

    let h = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    // Rounding can push h a hair past 1 for antipodal points.
    let h = h.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_METERS * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Returns the first place whose geofence contains `point`.
pub fn resolve(point: Coordinate, places: &[Place]) -> Option<&Place> {
    let mut matches = matching_places(point, places);
    let first = matches.next()?;

    if let Some(other) = matches.next() {
        tracing::debug!(
            chosen = %first.id(),
            also_matched = %other.id(),
            "overlapping geofences, using first in list order"
        );
    }

    Some(first)
}

/// All places whose geofence contains `point`, in list order.
pub fn matching_places(point: Coordinate, places: &[Place]) -> impl Iterator<Item = &Place> {
    places.iter().filter(move |place| place.contains(point))
}

/// The closest place to `point` regardless of radius, with its distance.
pub fn nearest(point: Coordinate, places: &[Place]) -> Option<(&Place, f64)> {
    places
        .iter()
        .map(|place| (place, place.distance_to(point)))
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::place::PlaceKind;
    use crate::types::PlaceId;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    fn place(id: &str, center: Coordinate, radius: f64) -> Place {
        Place::new(PlaceId::new(id).unwrap(), id, center, radius, PlaceKind::Custom).unwrap()
    }

    #[test]
    #[expect(clippy::float_cmp, reason = "identity must be exactly zero")]
    fn distance_to_self_is_zero() {
        let p = coord(12.9716, 77.5946);
        assert_eq!(haversine_distance(p, p), 0.0);
    }

    #[test]
    fn identical_point_matches_any_positive_radius() {
        let p = coord(-33.8688, 151.2093);
        let places = vec![place("tiny", p, 0.001)];
        assert_eq!(resolve(p, &places).map(|p| p.id().as_str()), Some("tiny"));
    }

    #[test]
    fn known_distance_london_paris() {
        let london = coord(51.5074, -0.1278);
        let paris = coord(48.8566, 2.3522);
        let d = haversine_distance(london, paris);
        // ~343.5 km
        assert!((d - 343_556.0).abs() < 1_000.0, "got {d}");
    }

    #[test]
    fn one_degree_of_latitude() {
        let d = haversine_distance(coord(0.0, 0.0), coord(1.0, 0.0));
        let expected = EARTH_RADIUS_METERS * 1.0_f64.to_radians();
        assert!((d - expected).abs() < 1e-6, "got {d}");
    }

    #[test]
    fn antipodal_points_are_half_circumference() {
        let d = haversine_distance(coord(0.0, 0.0), coord(0.0, 180.0));
        let expected = std::f64::consts::PI * EARTH_RADIUS_METERS;
        assert!((d - expected).abs() < 1e-3, "got {d}");
    }

    #[test]
    fn radius_boundary_is_inclusive() {
        let center = coord(0.0, 0.0);
        let point = coord(0.001, 0.0);
        let d = haversine_distance(center, point);

        let exact = vec![place("exact", center, d)];
        assert!(resolve(point, &exact).is_some());

        let just_short = vec![place("short", center, d - 1e-6)];
        assert!(resolve(point, &just_short).is_none());
    }

    #[test]
    fn point_just_past_radius_is_outside() {
        let center = coord(10.0, 10.0);
        let inside = place("p", center, 100.0);
        let d = haversine_distance(center, coord(10.0009, 10.0));
        assert!(d > 100.0);
        assert!(!inside.contains(coord(10.0009, 10.0)));
    }

    #[test]
    fn first_match_beats_smaller_radius() {
        let center = coord(40.7128, -74.0060);
        let places = vec![place("wide", center, 5_000.0), place("narrow", center, 10.0)];
        let resolved = resolve(center, &places).unwrap();
        assert_eq!(resolved.id().as_str(), "wide");

        let reversed = vec![places[1].clone(), places[0].clone()];
        assert_eq!(resolve(center, &reversed).unwrap().id().as_str(), "narrow");
    }

    #[test]
    fn empty_list_resolves_to_none() {
        assert!(resolve(coord(0.0, 0.0), &[]).is_none());
        assert!(nearest(coord(0.0, 0.0), &[]).is_none());
    }

    #[test]
    fn no_match_outside_all_geofences() {
        let places = vec![place("a", coord(0.0, 0.0), 10.0)];
        assert!(resolve(coord(1.0, 1.0), &places).is_none());
    }

    #[test]
    fn matching_places_preserves_order() {
        let center = coord(1.0, 1.0);
        let places = vec![
            place("a", center, 50.0),
            place("far", coord(2.0, 2.0), 50.0),
            place("b", center, 20.0),
        ];
        let ids: Vec<_> = matching_places(center, &places)
            .map(|p| p.id().as_str())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn nearest_ignores_radius() {
        let places = vec![
            place("far", coord(10.0, 10.0), 1.0),
            place("near", coord(0.01, 0.0), 1.0),
        ];
        let (p, d) = nearest(coord(0.0, 0.0), &places).unwrap();
        assert_eq!(p.id().as_str(), "near");
        assert!(d > 1.0);
    }
}
