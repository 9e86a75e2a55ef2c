//! Core domain logic for the work logger.
//!
//! This crate contains the fundamental types and logic for:
//! - Geofence resolution: matching a coordinate to the first place that covers it
//! - Session aggregation: deriving sessions, breaks and worked hours for a day
//! - Summaries: event counts by kind and place
//!
//! Everything here is a pure function of its inputs. Dates, UTC offsets and
//! coordinates are always supplied by the caller.

pub mod aggregate;
pub mod event;
pub mod event_kind;
pub mod geofence;
pub mod place;
pub mod summary;
pub mod types;

pub use aggregate::{
    Break, DailyLog, DayStatus, Session, Task, TaskCompletion, aggregate, aggregate_days,
    hours_by_place, sessions,
};
pub use event::{Event, EventFilter, RawEvent, events_on, minutes_since_last_arrive, sort_events};
pub use event_kind::{EventKind, EventMode};
pub use geofence::{EARTH_RADIUS_METERS, haversine_distance, matching_places, nearest, resolve};
pub use place::{Place, PlaceKind, RawPlace};
pub use summary::{EventSummary, UNKNOWN_PLACE, summarize};
pub use types::{Coordinate, EventId, PlaceId, ValidationError};
