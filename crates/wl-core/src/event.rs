//! Logged work events.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::event_kind::{EventKind, EventMode};
use crate::types::{Coordinate, EventId, PlaceId, ValidationError, duration_minutes};

/// A validated event from the activity log.
///
/// Deserialization goes through [`RawEvent`], so every `Event` satisfies the
/// coordinate, kind, mode and duration invariants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEvent", into = "RawEvent")]
pub struct Event {
    pub id: EventId,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    pub kind: EventKind,
    /// Where the event was recorded.
    pub coordinate: Coordinate,
    /// The place this event is attributed to, if any geofence matched.
    pub place_id: Option<PlaceId>,
    pub notes: String,
    pub duration_minutes: u32,
    pub mode: EventMode,
}

/// An event as submitted by a client, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEvent {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(alias = "event")]
    pub kind: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub duration_minutes: i64,
    #[serde(default = "default_mode")]
    pub mode: String,
}

fn default_mode() -> String {
    EventMode::default().as_str().to_string()
}

impl TryFrom<RawEvent> for Event {
    type Error = ValidationError;

    fn try_from(raw: RawEvent) -> Result<Self, Self::Error> {
        let place_id = match raw.place_id {
            Some(id) if !id.is_empty() => Some(PlaceId::new(id)?),
            _ => None,
        };

        Ok(Self {
            id: EventId::new(raw.id)?,
            timestamp: raw.timestamp,
            kind: raw.kind.parse()?,
            coordinate: Coordinate::new(raw.lat, raw.lon)?,
            place_id,
            notes: raw.notes,
            duration_minutes: duration_minutes(raw.duration_minutes)?,
            mode: raw.mode.parse()?,
        })
    }
}

impl From<Event> for RawEvent {
    fn from(event: Event) -> Self {
        Self {
            id: event.id.into(),
            timestamp: event.timestamp,
            kind: event.kind.as_str().to_string(),
            lat: event.coordinate.latitude(),
            lon: event.coordinate.longitude(),
            place_id: event.place_id.map(String::from),
            notes: event.notes,
            duration_minutes: i64::from(event.duration_minutes),
            mode: event.mode.as_str().to_string(),
        }
    }
}

impl Event {
    /// The calendar date of this event as seen from `offset`.
    pub fn local_date(&self, offset: FixedOffset) -> NaiveDate {
        self.timestamp.with_timezone(&offset).date_naive()
    }
}

/// Sorts events by timestamp. The sort is stable, so ties keep insertion order.
pub fn sort_events(events: &mut [Event]) {
    events.sort_by_key(|e| e.timestamp);
}

/// Events whose local date (in `offset`) is `date`, in input order.
pub fn events_on(
    events: &[Event],
    date: NaiveDate,
    offset: FixedOffset,
) -> impl Iterator<Item = &Event> {
    events.iter().filter(move |e| e.local_date(offset) == date)
}

/// Whole minutes between the latest arrive at or before `at` and `at`.
///
/// Used to fill in the duration of an exit that was logged without one.
/// Returns `None` when there is no earlier arrive.
pub fn minutes_since_last_arrive(events: &[Event], at: DateTime<Utc>) -> Option<u32> {
    let arrived = events
        .iter()
        .filter(|e| e.kind == EventKind::Arrive && e.timestamp <= at)
        .map(|e| e.timestamp)
        .max()?;

    let minutes = (at - arrived).num_minutes().max(0);
    Some(u32::try_from(minutes).unwrap_or(u32::MAX))
}

/// Optional filters for listing events. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub date: Option<NaiveDate>,
    pub kind: Option<EventKind>,
    pub place_id: Option<PlaceId>,
}

impl EventFilter {
    pub fn matches(&self, event: &Event, offset: FixedOffset) -> bool {
        self.date.is_none_or(|d| event.local_date(offset) == d)
            && self.kind.is_none_or(|k| event.kind == k)
            && self
                .place_id
                .as_ref()
                .is_none_or(|p| event.place_id.as_ref() == Some(p))
    }
}
