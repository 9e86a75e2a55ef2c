//! Log command: validate an event, attribute it to a place, and append it.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Utc};
use wl_core::{Event, EventKind, RawEvent, minutes_since_last_arrive, resolve};

use crate::cli::LogArgs;
use crate::commands::util::{format_time, parse_datetime, place_name};
use crate::store::Store;

/// Validates and stores one event, returning what was written.
///
/// An explicit `--place` must name a known place; otherwise the first place
/// whose geofence covers the coordinate is used. An exit logged without a
/// duration gets the minutes since the latest arrive.
pub fn run<W: Write>(
    writer: &mut W,
    store: &Store,
    args: &LogArgs,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Result<Event> {
    let timestamp = match args.at.as_deref() {
        Some(at) => parse_datetime(at, now)?,
        None => now,
    };

    let raw = RawEvent {
        id: uuid::Uuid::new_v4().to_string(),
        timestamp,
        kind: args.kind.clone(),
        lat: args.lat,
        lon: args.lon,
        place_id: args.place.clone(),
        notes: args.notes.clone(),
        duration_minutes: args.duration,
        mode: args.mode.clone(),
    };
    let mut event = Event::try_from(raw).context("invalid event")?;

    let places = store.places()?;
    match &event.place_id {
        Some(id) => {
            if !places.iter().any(|p| p.id() == id) {
                anyhow::bail!("unknown place: {id}");
            }
        }
        None => {
            event.place_id = resolve(event.coordinate, &places).map(|p| p.id().clone());
        }
    }

    if event.kind == EventKind::Exit && event.duration_minutes == 0 {
        let history = store.events()?;
        if let Some(minutes) = minutes_since_last_arrive(&history, event.timestamp) {
            event.duration_minutes = minutes;
        }
    }

    store.append_event(&event)?;
    tracing::info!(event_id = %event.id, kind = %event.kind, "logged event");

    writeln!(
        writer,
        "Logged {} at {} ({})",
        event.kind,
        format_time(event.timestamp, offset),
        place_name(&places, event.place_id.as_ref())
    )?;

    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_support::place;
    use chrono::TimeZone;
    use insta::assert_snapshot;
    use wl_core::ValidationError;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 17, 0, 0).unwrap()
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn args(kind: &str, lat: f64, lon: f64) -> LogArgs {
        LogArgs {
            kind: kind.to_string(),
            lat,
            lon,
            place: None,
            notes: String::new(),
            duration: 0,
            mode: "manual".to_string(),
            at: None,
        }
    }

    fn store_with_office(dir: &std::path::Path) -> Store {
        let store = Store::open(dir).unwrap();
        store
            .update_places(|places| {
                places.push(place("office", "Office", 51.5074, -0.1278, 100.0));
                Ok(())
            })
            .unwrap();
        store
    }

    #[test]
    fn resolves_place_from_coordinate() {
        let temp = tempfile::tempdir().unwrap();
        let store = store_with_office(temp.path());

        let mut output = Vec::new();
        let a = args("arrive", 51.5074, -0.1278);
        let event = run(&mut output, &store, &a, now(), utc()).unwrap();

        assert_eq!(event.place_id.unwrap().as_str(), "office");
        assert_snapshot!(String::from_utf8(output).unwrap(), @"Logged arrive at 17:00 (Office)");
        assert_eq!(store.events().unwrap().len(), 1);
    }

    #[test]
    fn outside_every_geofence_is_unknown() {
        let temp = tempfile::tempdir().unwrap();
        let store = store_with_office(temp.path());

        let mut output = Vec::new();
        let a = args("meeting", 48.8566, 2.3522);
        let event = run(&mut output, &store, &a, now(), utc()).unwrap();

        assert!(event.place_id.is_none());
        assert_snapshot!(String::from_utf8(output).unwrap(), @"Logged meeting at 17:00 (unknown)");
    }

    #[test]
    fn explicit_place_must_exist() {
        let temp = tempfile::tempdir().unwrap();
        let store = store_with_office(temp.path());

        let mut a = args("arrive", 0.0, 0.0);
        a.place = Some("office".to_string());
        let event = run(&mut Vec::new(), &store, &a, now(), utc()).unwrap();
        assert_eq!(event.place_id.unwrap().as_str(), "office");

        a.place = Some("moon-base".to_string());
        let err = run(&mut Vec::new(), &store, &a, now(), utc()).unwrap_err();
        assert!(err.to_string().contains("unknown place: moon-base"));
    }

    #[test]
    fn negative_duration_never_reaches_the_log() {
        let temp = tempfile::tempdir().unwrap();
        let store = store_with_office(temp.path());

        let mut a = args("break_start", 51.5074, -0.1278);
        a.duration = -1;
        let err = run(&mut Vec::new(), &store, &a, now(), utc()).unwrap_err();

        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::NegativeDuration { value: -1 })
        );
        assert!(store.events().unwrap().is_empty());
    }

    #[test]
    fn exit_duration_is_filled_from_last_arrive() {
        let temp = tempfile::tempdir().unwrap();
        let store = store_with_office(temp.path());

        let mut arrive = args("arrive", 51.5074, -0.1278);
        arrive.at = Some("2025-03-10T09:00:00Z".to_string());
        run(&mut Vec::new(), &store, &arrive, now(), utc()).unwrap();

        let a = args("leave", 51.5074, -0.1278);
        let exit = run(&mut Vec::new(), &store, &a, now(), utc()).unwrap();
        assert_eq!(exit.kind, EventKind::Exit);
        assert_eq!(exit.duration_minutes, 480);
    }

    #[test]
    fn relative_at_is_resolved_against_now() {
        let temp = tempfile::tempdir().unwrap();
        let store = Store::open(temp.path()).unwrap();

        let mut a = args("new_task", 0.0, 0.0);
        a.at = Some("30 minutes ago".to_string());
        let event = run(&mut Vec::new(), &store, &a, now(), utc()).unwrap();
        assert_eq!(event.timestamp, Utc.with_ymd_and_hms(2025, 3, 10, 16, 30, 0).unwrap());
    }
}
