//! Places command: list, add and remove geofenced places.
//!
//! The order of `places.json` is the resolution priority: when geofences
//! overlap, the place listed first wins.

use std::io::Write;

use anyhow::{Context, Result};
use wl_core::{Coordinate, Place, PlaceId, PlaceKind};

use crate::store::Store;

/// Input for `wl places add`.
#[derive(Debug, Clone)]
pub struct NewPlace {
    pub id: Option<String>,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub radius: f64,
    pub kind: String,
}

pub fn list<W: Write>(writer: &mut W, store: &Store, json: bool) -> Result<()> {
    let places = store.places()?;

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&places)?)?;
        return Ok(());
    }

    if places.is_empty() {
        writeln!(writer, "No places defined.")?;
        writeln!(writer)?;
        writeln!(
            writer,
            "Hint: Run 'wl places add --name Office --lat .. --lon .. --radius 100'"
        )?;
        return Ok(());
    }

    for (index, place) in places.iter().enumerate() {
        writeln!(
            writer,
            "{}. {} [{}] {} within {:.0} m ({})",
            index + 1,
            place.name(),
            place.kind(),
            place.center(),
            place.geofence_radius_meters(),
            place.id()
        )?;
    }

    Ok(())
}

/// Validates and appends a place at the lowest priority.
pub fn add<W: Write>(writer: &mut W, store: &Store, new: &NewPlace) -> Result<Place> {
    let id = new
        .id
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let kind: PlaceKind = new.kind.parse().context("invalid place kind")?;
    let center = Coordinate::new(new.lat, new.lon).context("invalid place center")?;
    let place = Place::new(
        PlaceId::new(id)?,
        new.name.clone(),
        center,
        new.radius,
        kind,
    )
    .context("invalid place")?;

    store.update_places(|places| {
        if places.iter().any(|p| p.id() == place.id()) {
            anyhow::bail!("place already exists: {}", place.id());
        }
        places.push(place.clone());
        Ok(())
    })?;

    tracing::info!(place_id = %place.id(), name = place.name(), "added place");
    writeln!(writer, "Added place {} ({})", place.name(), place.id())?;
    Ok(place)
}

pub fn remove<W: Write>(writer: &mut W, store: &Store, id: &str) -> Result<()> {
    let id = PlaceId::new(id).context("invalid place id")?;
    let removed = store.update_places(|places| {
        let position = places.iter().position(|p| p.id() == &id);
        Ok(position.map(|i| places.remove(i)))
    })?;

    match removed {
        Some(place) => {
            writeln!(writer, "Removed place {} ({})", place.name(), place.id())?;
            Ok(())
        }
        None => anyhow::bail!("place not found: {id}"),
    }
}
