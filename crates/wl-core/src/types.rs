//! Core value types with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors raised at the boundary, before data reaches the resolver
/// or the aggregator.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// Latitude outside \[-90, 90\] or NaN.
    #[error("latitude must be between -90 and 90 degrees, got {value}")]
    LatitudeOutOfRange { value: f64 },

    /// Longitude outside \[-180, 180\] or NaN.
    #[error("longitude must be between -180 and 180 degrees, got {value}")]
    LongitudeOutOfRange { value: f64 },

    /// A negative event duration.
    #[error("duration_minutes cannot be negative, got {value}")]
    NegativeDuration { value: i64 },

    /// An event duration that does not fit the stored representation.
    #[error("duration_minutes is too large: {value}")]
    DurationTooLarge { value: i64 },

    /// A geofence radius that is zero, negative, or not finite.
    #[error("geofence radius must be a positive number of meters, got {value}")]
    NonPositiveRadius { value: f64 },

    /// Event kind string not recognised.
    #[error("unknown event kind: {value}")]
    UnknownEventKind { value: String },

    /// Place kind string not recognised.
    #[error("unknown place kind: {value}")]
    UnknownPlaceKind { value: String },

    /// Event mode string not recognised.
    #[error("unknown event mode: {value}")]
    UnknownMode { value: String },
}

/// A point on the earth's surface, in degrees.
///
/// Only constructed through [`Coordinate::new`], so latitude is always within
/// \[-90, 90\] and longitude within \[-180, 180\].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CoordinateRepr", into = "CoordinateRepr")]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

#[derive(Serialize, Deserialize)]
struct CoordinateRepr {
    lat: f64,
    lon: f64,
}

impl Coordinate {
    /// Creates a coordinate after range validation.
    pub fn new(lat: f64, lon: f64) -> Result<Self, ValidationError> {
        if lat.is_nan() || !(-90.0..=90.0).contains(&lat) {
            return Err(ValidationError::LatitudeOutOfRange { value: lat });
        }
        if lon.is_nan() || !(-180.0..=180.0).contains(&lon) {
            return Err(ValidationError::LongitudeOutOfRange { value: lon });
        }
        Ok(Self { lat, lon })
    }

    #[must_use]
    pub const fn latitude(self) -> f64 {
        self.lat
    }

    #[must_use]
    pub const fn longitude(self) -> f64 {
        self.lon
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lon)
    }
}

impl TryFrom<CoordinateRepr> for Coordinate {
    type Error = ValidationError;

    fn try_from(repr: CoordinateRepr) -> Result<Self, Self::Error> {
        Self::new(repr.lat, repr.lon)
    }
}

impl From<Coordinate> for CoordinateRepr {
    fn from(c: Coordinate) -> Self {
        Self {
            lat: c.lat,
            lon: c.lon,
        }
    }
}

/// Converts a submitted duration into stored minutes.
pub fn duration_minutes(value: i64) -> Result<u32, ValidationError> {
    if value < 0 {
        return Err(ValidationError::NegativeDuration { value });
    }
    u32::try_from(value).map_err(|_| ValidationError::DurationTooLarge { value })
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// A validated event identifier.
    ///
    /// Event IDs must be non-empty strings. Uniqueness is the store's concern.
    EventId, "event ID"
);

define_string_id!(
    /// A validated place identifier.
    ///
    /// Events reference places by this ID.
    PlaceId, "place ID"
);
