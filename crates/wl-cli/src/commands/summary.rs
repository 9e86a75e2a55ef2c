//! Summary command: event counts by kind and place.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, FixedOffset, Utc};
use wl_core::{UNKNOWN_PLACE, summarize};

use crate::store::Store;

pub fn run<W: Write>(
    writer: &mut W,
    store: &Store,
    json: bool,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Result<()> {
    let events = store.events()?;
    let today = now.with_timezone(&offset).date_naive();
    let summary = summarize(&events, today, offset);

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&summary)?)?;
        return Ok(());
    }

    let places = store.places()?;

    writeln!(writer, "Total events:   {}", summary.total_events)?;
    writeln!(writer, "Today:          {}", summary.today_events)?;
    writeln!(writer, "Distinct kinds: {}", summary.distinct_kinds)?;
    writeln!(writer, "Total duration: {:.2}h", summary.total_duration_hours)?;

    if !summary.by_kind.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "By kind:")?;
        for (kind, count) in &summary.by_kind {
            writeln!(writer, "  {:<14} {count}", kind.as_str())?;
        }
    }

    if !summary.by_place.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "By place:")?;
        for (key, count) in &summary.by_place {
            // Places removed since the events were logged fall back to their ID.
            let name = if key == UNKNOWN_PLACE {
                UNKNOWN_PLACE
            } else {
                places
                    .iter()
                    .find(|p| p.id().as_str() == key)
                    .map_or(key.as_str(), |p| p.name())
            };
            writeln!(writer, "  {name:<14} {count}")?;
        }
    }

    Ok(())
}
