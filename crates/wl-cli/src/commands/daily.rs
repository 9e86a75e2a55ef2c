//! Daily command: aggregate the event log into per-day work summaries.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{Days, FixedOffset, NaiveDate};
use wl_core::{DailyLog, Place, aggregate_days, hours_by_place};

use crate::commands::util::{format_minutes, format_time, place_name};
use crate::store::Store;

/// Longest range `wl daily --days` accepts.
pub const MAX_DAYS: u32 = 366;

/// The `days` dates ending at `last`, oldest first.
pub fn date_range(last: NaiveDate, days: u32) -> Result<Vec<NaiveDate>> {
    if !(1..=MAX_DAYS).contains(&days) {
        anyhow::bail!("--days must be between 1 and {MAX_DAYS}, got {days}");
    }
    (0..days)
        .rev()
        .map(|back| {
            last.checked_sub_days(Days::new(u64::from(back)))
                .with_context(|| format!("{days} days before {last} is out of range"))
        })
        .collect()
}

pub fn run<W: Write>(
    writer: &mut W,
    store: &Store,
    dates: &[NaiveDate],
    json: bool,
    offset: FixedOffset,
) -> Result<()> {
    let events = store.events()?;
    let completions = store.completions()?;
    let mut logs = aggregate_days(dates, &events, offset);
    for log in &mut logs {
        log.apply_completions(&completions);
    }
    tracing::debug!(days = logs.len(), events = events.len(), "aggregated daily logs");

    if json {
        let out = match logs.as_slice() {
            [single] => serde_json::to_string_pretty(single)?,
            _ => serde_json::to_string_pretty(&logs)?,
        };
        writeln!(writer, "{out}")?;
        return Ok(());
    }

    let places = store.places()?;
    for (index, log) in logs.iter().enumerate() {
        if index > 0 {
            writeln!(writer)?;
        }
        write_daily_log(writer, log, &places, offset)?;
    }

    Ok(())
}

/// Writes the human-readable form of one day.
pub fn write_daily_log<W: Write>(
    writer: &mut W,
    log: &DailyLog,
    places: &[Place],
    offset: FixedOffset,
) -> Result<()> {
    let time_or_dash = |t: Option<chrono::DateTime<chrono::Utc>>| {
        t.map_or_else(|| "-".to_string(), |t| format_time(t, offset))
    };

    writeln!(writer, "DAILY LOG: {}", log.date.format("%A, %b %-d, %Y"))?;
    writeln!(writer, "Status:      {}", log.status)?;
    writeln!(writer, "Start:       {}", time_or_dash(log.start_time))?;
    writeln!(writer, "End:         {}", time_or_dash(log.end_time))?;
    writeln!(writer, "Total hours: {:.2}", log.total_hours)?;

    if !log.breaks.is_empty() {
        writeln!(
            writer,
            "Breaks:      {} ({})",
            log.breaks.len(),
            format_minutes(log.break_minutes())
        )?;
    }

    if !log.sessions.is_empty() {
        writeln!(writer, "Sessions:")?;
        for session in &log.sessions {
            let start = format_time(session.start, offset);
            let span = match session.end {
                Some(end) => format!("{start}-{}", format_time(end, offset)),
                None => format!("{start}-open "),
            };
            let worked = session.duration().map_or_else(
                || "-".to_string(),
                |d| format_minutes(u32::try_from(d.num_minutes()).unwrap_or(u32::MAX)),
            );
            writeln!(
                writer,
                "  {span}  {:<12} {worked}",
                place_name(places, session.place_id.as_ref())
            )?;
        }

        let by_place = hours_by_place(&log.sessions);
        if by_place.len() > 1 {
            writeln!(writer, "By place:")?;
            for (place_id, hours) in &by_place {
                writeln!(
                    writer,
                    "  {:<12} {hours:.2}h",
                    place_name(places, place_id.as_ref())
                )?;
            }
        }
    }

    if !log.tasks.is_empty() {
        writeln!(writer, "Tasks:")?;
        for task in &log.tasks {
            let mark = if task.completed { "x" } else { " " };
            write!(writer, "  {}. [{mark}] {}", task.id, task.description)?;
            if task.duration_minutes > 0 {
                write!(writer, " ({})", format_minutes(task.duration_minutes))?;
            }
            writeln!(writer)?;
        }
    }

    if !log.notes.is_empty() {
        writeln!(writer, "Notes:")?;
        for line in log.notes.lines() {
            writeln!(writer, "  {line}")?;
        }
    }

    if !log.unmatched_exits.is_empty() {
        let times: Vec<_> = log
            .unmatched_exits
            .iter()
            .map(|t| format_time(*t, offset))
            .collect();
        writeln!(writer, "Unmatched exits: {}", times.join(", "))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_support::{event, place};
    use insta::assert_snapshot;
    use wl_core::EventKind;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn seeded_store(dir: &std::path::Path) -> Store {
        let store = Store::open(dir).unwrap();
        store
            .update_places(|places| {
                places.push(place("office", "Office", 51.5074, -0.1278, 100.0));
                places.push(place("client", "Acme", 51.52, -0.08, 100.0));
                Ok(())
            })
            .unwrap();

        let mut brk = event("e3", EventKind::BreakStart, "2025-03-10T12:00:00Z", Some("office"));
        brk.duration_minutes = 30;
        let mut task = event("e2", EventKind::NewTask, "2025-03-10T09:30:00Z", Some("office"));
        task.notes = "triage inbox".to_string();
        task.duration_minutes = 20;
        let mut meeting = event("e7", EventKind::Meeting, "2025-03-10T15:00:00Z", Some("client"));
        meeting.notes = "quarterly review".to_string();

        for e in [
            event("e0", EventKind::Exit, "2025-03-10T08:00:00Z", None),
            event("e1", EventKind::Arrive, "2025-03-10T09:00:00Z", Some("office")),
            task,
            brk,
            event("e4", EventKind::BreakEnd, "2025-03-10T12:30:00Z", Some("office")),
            event("e5", EventKind::Exit, "2025-03-10T13:00:00Z", Some("office")),
            event("e6", EventKind::Arrive, "2025-03-10T14:00:00Z", Some("client")),
            meeting,
            event("e8", EventKind::Exit, "2025-03-10T17:00:00Z", Some("client")),
        ] {
            store.append_event(&e).unwrap();
        }
        store
    }

    #[test]
    fn date_range_is_oldest_first() {
        let range = date_range(day(), 3).unwrap();
        assert_eq!(
            range,
            vec![
                NaiveDate::from_ymd_opt(2025, 3, 8).unwrap(),
                NaiveDate::from_ymd_opt(2025, 3, 9).unwrap(),
                day(),
            ]
        );
        assert!(date_range(day(), 0).is_err());
    }

    #[test]
    fn date_range_rejects_huge_or_out_of_range_spans() {
        assert!(date_range(day(), 200_000_000).is_err());
        assert!(date_range(day(), MAX_DAYS + 1).is_err());
        assert_eq!(date_range(day(), MAX_DAYS).unwrap().len(), 366);
        assert!(date_range(NaiveDate::MIN, 2).is_err());
        assert_eq!(date_range(NaiveDate::MIN, 1).unwrap(), vec![NaiveDate::MIN]);
    }

    #[test]
    fn renders_a_full_day() {
        let temp = tempfile::tempdir().unwrap();
        let store = seeded_store(temp.path());

        let mut output = Vec::new();
        run(&mut output, &store, &[day()], false, utc()).unwrap();

        assert_snapshot!(String::from_utf8(output).unwrap(), @r"
        DAILY LOG: Monday, Mar 10, 2025
        Status:      offline
        Start:       09:00
        End:         17:00
        Total hours: 7.50
        Breaks:      1 (30m)
        Sessions:
          09:00-13:00  Office       3h 30m
          14:00-17:00  Acme         3h 0m
        By place:
          Acme         3.00h
          Office       3.50h
        Tasks:
          1. [ ] triage inbox (20m)
        Notes:
          quarterly review
        Unmatched exits: 08:00
        ");
    }

    #[test]
    fn renders_an_empty_day() {
        let temp = tempfile::tempdir().unwrap();
        let store = Store::open(temp.path()).unwrap();

        let mut output = Vec::new();
        run(&mut output, &store, &[day()], false, utc()).unwrap();

        assert_snapshot!(String::from_utf8(output).unwrap(), @r"
        DAILY LOG: Monday, Mar 10, 2025
        Status:      offline
        Start:       -
        End:         -
        Total hours: 0.00
        ");
    }

    #[test]
    fn json_for_one_day_is_an_object() {
        let temp = tempfile::tempdir().unwrap();
        let store = seeded_store(temp.path());

        let mut output = Vec::new();
        run(&mut output, &store, &[day()], true, utc()).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(parsed["status"], "offline");
        assert_eq!(parsed["total_hours"], 7.5);
        assert_eq!(parsed["sessions"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn json_for_several_days_is_an_array() {
        let temp = tempfile::tempdir().unwrap();
        let store = seeded_store(temp.path());

        let mut output = Vec::new();
        let dates = date_range(day(), 2).unwrap();
        run(&mut output, &store, &dates, true, utc()).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
        let days = parsed.as_array().unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0]["date"], "2025-03-09");
        assert_eq!(days[0]["total_hours"], 0.0);
    }
}
