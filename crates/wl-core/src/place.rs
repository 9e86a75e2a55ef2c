//! Named places with circular geofences.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::geofence::haversine_distance;
use crate::types::{Coordinate, PlaceId, ValidationError};

/// What sort of place a geofence marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceKind {
    Office,
    Home,
    Client,
    #[default]
    Custom,
}

impl PlaceKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Office => "office",
            Self::Home => "home",
            Self::Client => "client",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for PlaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlaceKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "office" => Ok(Self::Office),
            "home" => Ok(Self::Home),
            "client" => Ok(Self::Client),
            "custom" => Ok(Self::Custom),
            _ => Err(ValidationError::UnknownPlaceKind {
                value: s.to_string(),
            }),
        }
    }
}

/// A named place whose geofence is a circle around `center`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPlace", into = "RawPlace")]
pub struct Place {
    id: PlaceId,
    name: String,
    center: Coordinate,
    geofence_radius_meters: f64,
    kind: PlaceKind,
}

/// A place as submitted, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPlace {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(alias = "geofence_radius")]
    pub geofence_radius_meters: f64,
    #[serde(default = "default_kind", alias = "type")]
    pub kind: String,
}

fn default_kind() -> String {
    PlaceKind::default().as_str().to_string()
}

fn validate_radius(radius: f64) -> Result<f64, ValidationError> {
    if radius.is_finite() && radius > 0.0 {
        Ok(radius)
    } else {
        Err(ValidationError::NonPositiveRadius { value: radius })
    }
}

fn validate_name(name: String) -> Result<String, ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::Empty {
            field: "place name",
        });
    }
    Ok(name)
}

impl Place {
    /// Creates a place, validating its name and radius.
    pub fn new(
        id: PlaceId,
        name: impl Into<String>,
        center: Coordinate,
        geofence_radius_meters: f64,
        kind: PlaceKind,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id,
            name: validate_name(name.into())?,
            center,
            geofence_radius_meters: validate_radius(geofence_radius_meters)?,
            kind,
        })
    }

    pub const fn id(&self) -> &PlaceId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn center(&self) -> Coordinate {
        self.center
    }

    pub const fn geofence_radius_meters(&self) -> f64 {
        self.geofence_radius_meters
    }

    pub const fn kind(&self) -> PlaceKind {
        self.kind
    }

    pub fn rename(&mut self, name: impl Into<String>) -> Result<(), ValidationError> {
        self.name = validate_name(name.into())?;
        Ok(())
    }

    pub const fn set_center(&mut self, center: Coordinate) {
        self.center = center;
    }

    pub fn set_geofence_radius(&mut self, meters: f64) -> Result<(), ValidationError> {
        self.geofence_radius_meters = validate_radius(meters)?;
        Ok(())
    }

    /// Great-circle distance from the center to `point`, in meters.
    pub fn distance_to(&self, point: Coordinate) -> f64 {
        haversine_distance(self.center, point)
    }

    /// Whether `point` lies inside the geofence. The boundary counts as inside.
    pub fn contains(&self, point: Coordinate) -> bool {
        self.distance_to(point) <= self.geofence_radius_meters
    }
}

impl TryFrom<RawPlace> for Place {
    type Error = ValidationError;

    fn try_from(raw: RawPlace) -> Result<Self, Self::Error> {
        Self::new(
            PlaceId::new(raw.id)?,
            raw.name,
            Coordinate::new(raw.lat, raw.lon)?,
            raw.geofence_radius_meters,
            raw.kind.parse()?,
        )
    }
}

impl From<Place> for RawPlace {
    fn from(place: Place) -> Self {
        Self {
            id: place.id.into(),
            name: place.name,
            lat: place.center.latitude(),
            lon: place.center.longitude(),
            geofence_radius_meters: place.geofence_radius_meters,
            kind: place.kind.as_str().to_string(),
        }
    }
}
