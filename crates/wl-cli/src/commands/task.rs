//! Task command: mark a day's tasks completed or open again.
//!
//! Tasks are numbered per day from the `new_task` events, so a completion is
//! stored against the date and that number.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use wl_core::{Task, TaskCompletion, aggregate_days};

use crate::store::Store;

/// Looks up task `id` on `date` as the daily log would number it.
fn find_task(store: &Store, date: NaiveDate, id: u32, offset: FixedOffset) -> Result<Task> {
    let events = store.events()?;
    aggregate_days(&[date], &events, offset)
        .into_iter()
        .flat_map(|log| log.tasks)
        .find(|t| t.id == id)
        .ok_or_else(|| anyhow::anyhow!("no task {id} on {date}"))
}

pub fn complete<W: Write>(
    writer: &mut W,
    store: &Store,
    date: NaiveDate,
    id: u32,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Result<()> {
    let task = find_task(store, date, id, offset)?;

    let added = store.update_completions(|completions| {
        if completions.iter().any(|c| c.date == date && c.task_id == id) {
            return Ok(false);
        }
        completions.push(TaskCompletion {
            date,
            task_id: id,
            completed_at: now,
        });
        Ok(true)
    })?;

    if added {
        tracing::info!(%date, task_id = id, "completed task");
        writeln!(writer, "Completed task {id} on {date}: {}", task.description)?;
    } else {
        writeln!(writer, "Task {id} on {date} is already completed")?;
    }
    Ok(())
}

pub fn reopen<W: Write>(writer: &mut W, store: &Store, date: NaiveDate, id: u32) -> Result<()> {
    let removed = store.update_completions(|completions| {
        let before = completions.len();
        completions.retain(|c| !(c.date == date && c.task_id == id));
        Ok(completions.len() != before)
    })?;

    if !removed {
        anyhow::bail!("task {id} on {date} is not completed");
    }
    writeln!(writer, "Reopened task {id} on {date}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::daily;
    use crate::store::test_support::event;
    use chrono::TimeZone;
    use insta::assert_snapshot;
    use wl_core::EventKind;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 18, 0, 0).unwrap()
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn store_with_tasks(dir: &std::path::Path) -> Store {
        let store = Store::open(dir).unwrap();
        for (id, ts, notes) in [
            ("t1", "2025-03-10T09:30:00Z", "triage inbox"),
            ("t2", "2025-03-10T11:00:00Z", "write report"),
        ] {
            let mut e = event(id, EventKind::NewTask, ts, None);
            e.notes = notes.to_string();
            store.append_event(&e).unwrap();
        }
        store
    }

    fn render(store: &Store) -> String {
        let mut output = Vec::new();
        daily::run(&mut output, store, &[day()], false, utc()).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn completion_survives_later_daily_runs() {
        let temp = tempfile::tempdir().unwrap();
        let store = store_with_tasks(temp.path());

        let mut output = Vec::new();
        complete(&mut output, &store, day(), 2, now(), utc()).unwrap();
        assert_snapshot!(
            String::from_utf8(output).unwrap(),
            @"Completed task 2 on 2025-03-10: write report"
        );

        let first = render(&store);
        assert!(first.contains("  1. [ ] triage inbox"));
        assert!(first.contains("  2. [x] write report"));
        assert_eq!(render(&store), first);
    }

    #[test]
    fn completing_twice_is_reported() {
        let temp = tempfile::tempdir().unwrap();
        let store = store_with_tasks(temp.path());

        complete(&mut Vec::new(), &store, day(), 1, now(), utc()).unwrap();
        let mut output = Vec::new();
        complete(&mut output, &store, day(), 1, now(), utc()).unwrap();
        assert_snapshot!(
            String::from_utf8(output).unwrap(),
            @"Task 1 on 2025-03-10 is already completed"
        );
        assert_eq!(store.completions().unwrap().len(), 1);
    }

    #[test]
    fn unknown_task_is_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let store = store_with_tasks(temp.path());

        let err = complete(&mut Vec::new(), &store, day(), 3, now(), utc()).unwrap_err();
        assert_eq!(err.to_string(), "no task 3 on 2025-03-10");

        let next_day = day().succ_opt().unwrap();
        assert!(complete(&mut Vec::new(), &store, next_day, 1, now(), utc()).is_err());
        assert!(store.completions().unwrap().is_empty());
    }

    #[test]
    fn reopen_clears_completion() {
        let temp = tempfile::tempdir().unwrap();
        let store = store_with_tasks(temp.path());

        complete(&mut Vec::new(), &store, day(), 1, now(), utc()).unwrap();
        reopen(&mut Vec::new(), &store, day(), 1).unwrap();
        assert!(render(&store).contains("  1. [ ] triage inbox"));
        assert!(reopen(&mut Vec::new(), &store, day(), 1).is_err());
    }
}
