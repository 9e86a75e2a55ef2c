//! Resolve command: which place does a coordinate fall in?

use std::io::Write;

use anyhow::{Context, Result};
use wl_core::{Coordinate, matching_places, nearest, resolve};

use crate::store::Store;

pub fn run<W: Write>(writer: &mut W, store: &Store, lat: f64, lon: f64) -> Result<()> {
    let point = Coordinate::new(lat, lon).context("invalid coordinate")?;
    let places = store.places()?;

    if places.is_empty() {
        writeln!(writer, "No places defined.")?;
        return Ok(());
    }

    if let Some(place) = resolve(point, &places) {
        writeln!(
            writer,
            "{} ({}): {:.1} m from center, radius {:.0} m",
            place.name(),
            place.id(),
            place.distance_to(point),
            place.geofence_radius_meters()
        )?;

        let others: Vec<_> = matching_places(point, &places)
            .skip(1)
            .map(|p| p.name())
            .collect();
        if !others.is_empty() {
            writeln!(writer, "Also inside: {}", others.join(", "))?;
        }
        return Ok(());
    }

    // Places is non-empty, so there is always a nearest one.
    if let Some((place, distance)) = nearest(point, &places) {
        writeln!(
            writer,
            "unknown: nearest is {} at {:.1} m (radius {:.0} m)",
            place.name(),
            distance,
            place.geofence_radius_meters()
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_support::place;
    use insta::assert_snapshot;

    fn store(dir: &std::path::Path) -> Store {
        let store = Store::open(dir).unwrap();
        store
            .update_places(|places| {
                places.push(place("campus", "Campus", 0.0, 0.0, 500.0));
                places.push(place("lab", "Lab", 0.0, 0.0, 50.0));
                Ok(())
            })
            .unwrap();
        store
    }

    #[test]
    fn reports_first_match_and_overlaps() {
        let temp = tempfile::tempdir().unwrap();
        let store = store(temp.path());

        let mut output = Vec::new();
        run(&mut output, &store, 0.0, 0.0).unwrap();
        assert_snapshot!(String::from_utf8(output).unwrap(), @r"
        Campus (campus): 0.0 m from center, radius 500 m
        Also inside: Lab
        ");
    }

    #[test]
    fn reports_nearest_miss() {
        let temp = tempfile::tempdir().unwrap();
        let store = store(temp.path());

        let mut output = Vec::new();
        run(&mut output, &store, 0.01, 0.0).unwrap();
        assert_snapshot!(
            String::from_utf8(output).unwrap(),
            @"unknown: nearest is Campus at 1111.9 m (radius 500 m)"
        );
    }

    #[test]
    fn rejects_invalid_coordinate() {
        let temp = tempfile::tempdir().unwrap();
        let store = store(temp.path());
        assert!(run(&mut Vec::new(), &store, 95.0, 0.0).is_err());
    }
}
