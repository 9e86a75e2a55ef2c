//! Event log statistics for dashboards.

use std::collections::BTreeMap;

use chrono::{FixedOffset, NaiveDate};
use serde::Serialize;

use crate::event::Event;
use crate::event_kind::EventKind;

/// Key used for events that matched no place.
pub const UNKNOWN_PLACE: &str = "unknown";

/// Counts and totals over an event log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventSummary {
    pub total_events: usize,
    /// Events whose local date is the reference day.
    pub today_events: usize,
    pub distinct_kinds: usize,
    /// Sum of every event's recorded duration, in hours.
    pub total_duration_hours: f64,
    pub by_kind: BTreeMap<EventKind, usize>,
    /// Keyed by place ID, with [`UNKNOWN_PLACE`] for unattributed events.
    pub by_place: BTreeMap<String, usize>,
}

/// Summarizes `events`, counting those on `today` in `offset` as today's.
pub fn summarize(events: &[Event], today: NaiveDate, offset: FixedOffset) -> EventSummary {
    let mut by_kind = BTreeMap::new();
    let mut by_place = BTreeMap::new();
    let mut total_minutes: u64 = 0;
    let mut today_events = 0;

    for event in events {
        *by_kind.entry(event.kind).or_insert(0) += 1;

        let place = event
            .place_id
            .as_ref()
            .map_or(UNKNOWN_PLACE, |id| id.as_str());
        *by_place.entry(place.to_string()).or_insert(0) += 1;

        total_minutes += u64::from(event.duration_minutes);
        if event.local_date(offset) == today {
            today_events += 1;
        }
    }

    #[expect(
        clippy::cast_precision_loss,
        reason = "minute totals stay far below f64's exact integer range"
    )]
    let total_duration_hours = total_minutes as f64 / 60.0;

    EventSummary {
        total_events: events.len(),
        today_events,
        distinct_kinds: by_kind.len(),
        total_duration_hours,
        by_kind,
        by_place,
    }
}
