//! Events command: list logged events, or delete one.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::FixedOffset;
use wl_core::{EventFilter, EventId, EventKind, PlaceId};

use crate::commands::util::{parse_ymd, place_name};
use crate::store::Store;

/// Builds a filter from the command-line options.
pub fn build_filter(
    date: Option<&str>,
    kind: Option<&str>,
    place: Option<&str>,
) -> Result<EventFilter> {
    let date = date.map(parse_ymd).transpose().context("invalid --date")?;
    let kind = kind
        .map(str::parse::<EventKind>)
        .transpose()
        .context("invalid --kind")?;
    let place_id = place.map(PlaceId::new).transpose().context("invalid --place")?;

    Ok(EventFilter {
        date,
        kind,
        place_id,
    })
}

/// Writes matching events, newest first. JSON output is one event per line.
pub fn run<W: Write>(
    writer: &mut W,
    store: &Store,
    filter: &EventFilter,
    json: bool,
    offset: FixedOffset,
) -> Result<()> {
    let places = store.places()?;
    let mut events: Vec<_> = store
        .events()?
        .into_iter()
        .filter(|e| filter.matches(e, offset))
        .collect();
    wl_core::sort_events(&mut events);
    events.reverse();

    if json {
        for event in &events {
            writeln!(writer, "{}", serde_json::to_string(event)?)?;
        }
        return Ok(());
    }

    if events.is_empty() {
        writeln!(writer, "No events found.")?;
        return Ok(());
    }

    for event in &events {
        let local = event.timestamp.with_timezone(&offset);
        write!(
            writer,
            "{}  {:<13} {:<12} {}",
            local.format("%Y-%m-%d %H:%M"),
            event.kind.as_str(),
            place_name(&places, event.place_id.as_ref()),
            event.id
        )?;
        if event.duration_minutes > 0 {
            write!(writer, "  {}m", event.duration_minutes)?;
        }
        if !event.notes.is_empty() {
            write!(writer, "  {}", event.notes)?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

/// Deletes one event by ID.
pub fn delete<W: Write>(writer: &mut W, store: &Store, id: &str) -> Result<()> {
    let id = EventId::new(id).context("invalid event id")?;
    if !store.delete_event(&id)? {
        anyhow::bail!("event not found: {id}");
    }
    writeln!(writer, "Deleted event {id}")?;
    Ok(())
}
