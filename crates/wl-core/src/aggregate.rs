//! Session aggregation.
//!
//! Derives sessions, breaks, tasks and worked hours for a day from the raw
//! event log.
//!
//! # Algorithm Summary
//!
//! 1. Order events by timestamp (stable, so ties keep input order)
//! 2. Walk them through an `Offline`/`Online` state machine: `arrive` opens a
//!    session, `exit` closes it
//! 3. Pair `break_start`/`break_end` independently of the session state
//! 4. `total_hours` = (last exit - first arrive) - breaks, clamped at zero
//!
//! An `exit` while offline and a second `arrive` while online do not move the
//! day's boundaries: the first arrive of the day is the start, the latest exit
//! is the end.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::event::{Event, events_on};
use crate::event_kind::EventKind;
use crate::types::PlaceId;

/// Whether the user is currently clocked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayStatus {
    Online,
    #[default]
    Offline,
}

impl DayStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
        }
    }
}

impl std::fmt::Display for DayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task recorded during the day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Sequence number within the day, starting at 1.
    pub id: u32,
    pub description: String,
    pub duration_minutes: u32,
    pub timestamp: DateTime<Utc>,
    /// Only set by [`DailyLog::complete_task`]; never inferred from events.
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// A stored completion for a derived task.
///
/// Tasks are rebuilt from the event log on every aggregation, so completion
/// lives outside it, keyed by local date and the task's sequence id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCompletion {
    pub date: NaiveDate,
    pub task_id: u32,
    pub completed_at: DateTime<Utc>,
}

/// A break built from a `break_start`/`break_end` pair.
///
/// Either side may be missing when the log has an orphan start or end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Break {
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_minutes: u32,
}

impl Break {
    /// The instant used to place the break inside a session.
    fn anchor(&self) -> Option<DateTime<Utc>> {
        self.started_at.or(self.ended_at)
    }

    pub const fn is_paired(&self) -> bool {
        self.started_at.is_some() && self.ended_at.is_some()
    }
}

/// A work session: an arrive and its matching exit, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    /// Place of the arrive event that opened the session.
    pub place_id: Option<PlaceId>,
    /// Breaks anchored within \[start, end). A break anchored exactly at the
    /// exit belongs here only if no later session starts at that instant.
    pub breaks: Vec<Break>,
}

impl Session {
    pub const fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// Worked time net of breaks. `None` while the session is open.
    pub fn duration(&self) -> Option<Duration> {
        let end = self.end?;
        let breaks = Duration::minutes(i64::from(break_minutes(&self.breaks)));
        let worked = end - self.start - breaks;
        Some(worked.max(Duration::zero()))
    }
}

/// The derived summary of a single calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyLog {
    pub date: NaiveDate,
    /// First arrive of the day.
    pub start_time: Option<DateTime<Utc>>,
    /// Latest exit that closed a session.
    pub end_time: Option<DateTime<Utc>>,
    pub status: DayStatus,
    pub total_hours: f64,
    pub sessions: Vec<Session>,
    pub tasks: Vec<Task>,
    pub breaks: Vec<Break>,
    pub notes: String,
    /// Exits seen while offline. They are kept for display only.
    pub unmatched_exits: Vec<DateTime<Utc>>,
}

impl DailyLog {
    /// An empty, offline day.
    pub const fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            start_time: None,
            end_time: None,
            status: DayStatus::Offline,
            total_hours: 0.0,
            sessions: Vec::new(),
            tasks: Vec::new(),
            breaks: Vec::new(),
            notes: String::new(),
            unmatched_exits: Vec::new(),
        }
    }

    /// Marks the task with sequence id `id` as completed.
    ///
    /// Returns `false` if no such task exists.
    pub fn complete_task(&mut self, id: u32) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.completed = true;
                true
            }
            None => false,
        }
    }

    /// Applies the stored completions for this date.
    ///
    /// Returns how many matched a task. Completions for other dates, or for
    /// ids the day no longer has, are ignored.
    pub fn apply_completions(&mut self, completions: &[TaskCompletion]) -> usize {
        let mut applied = 0;
        for completion in completions.iter().filter(|c| c.date == self.date) {
            if let Some(task) = self.tasks.iter_mut().find(|t| t.id == completion.task_id) {
                task.completed = true;
                task.completed_at = Some(completion.completed_at);
                applied += 1;
            }
        }
        applied
    }

    pub fn break_minutes(&self) -> u32 {
        break_minutes(&self.breaks)
    }
}

fn break_minutes(breaks: &[Break]) -> u32 {
    breaks
        .iter()
        .fold(0u32, |acc, b| acc.saturating_add(b.duration_minutes))
}

/// Hours between `start` and `end` minus `break_minutes`, never negative.
#[expect(
    clippy::cast_precision_loss,
    reason = "millisecond spans of a day fit exactly in f64"
)]
fn net_hours(start: DateTime<Utc>, end: DateTime<Utc>, break_minutes: u32) -> f64 {
    let span_hours = (end - start).num_milliseconds() as f64 / 3_600_000.0;
    (span_hours - f64::from(break_minutes) / 60.0).max(0.0)
}

/// Current session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum SessionState {
    #[default]
    Offline,
    Online,
}

/// A `break_start` waiting for its end.
#[derive(Debug, Clone, Copy)]
struct OpenBreak {
    started_at: DateTime<Utc>,
    recorded_minutes: u32,
}

impl OpenBreak {
    /// Closes the break at `end`, preferring any explicitly recorded duration.
    fn close(self, end: &Event) -> Break {
        let duration_minutes = if self.recorded_minutes > 0 {
            self.recorded_minutes
        } else if end.duration_minutes > 0 {
            end.duration_minutes
        } else {
            let elapsed = (end.timestamp - self.started_at).num_minutes().max(0);
            u32::try_from(elapsed).unwrap_or(u32::MAX)
        };

        Break {
            started_at: Some(self.started_at),
            ended_at: Some(end.timestamp),
            duration_minutes,
        }
    }

    /// A break that never ended keeps whatever duration was recorded.
    const fn unterminated(self) -> Break {
        Break {
            started_at: Some(self.started_at),
            ended_at: None,
            duration_minutes: self.recorded_minutes,
        }
    }
}

/// Running state while walking a day's events.
#[derive(Debug, Default)]
struct Scan {
    state: SessionState,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    open_session: Option<(DateTime<Utc>, Option<PlaceId>)>,
    sessions: Vec<Session>,
    open_break: Option<OpenBreak>,
    breaks: Vec<Break>,
    tasks: Vec<Task>,
    notes: Vec<String>,
    unmatched_exits: Vec<DateTime<Utc>>,
}

impl Scan {
    fn run<'a>(events: impl IntoIterator<Item = &'a Event>) -> Self {
        let mut ordered: Vec<&Event> = events.into_iter().collect();
        ordered.sort_by_key(|e| e.timestamp);

        let mut scan = Self::default();
        for event in ordered {
            scan.apply(event);
        }
        scan.finish();
        scan
    }

    fn apply(&mut self, event: &Event) {
        match event.kind {
            EventKind::Arrive => self.arrive(event),
            EventKind::Exit => self.exit(event),
            EventKind::BreakStart => {
                if let Some(previous) = self.open_break.take() {
                    tracing::debug!(
                        started_at = %previous.started_at,
                        "break started again before it ended"
                    );
                    self.breaks.push(previous.unterminated());
                }
                self.open_break = Some(OpenBreak {
                    started_at: event.timestamp,
                    recorded_minutes: event.duration_minutes,
                });
            }
            EventKind::BreakEnd => {
                let closed = match self.open_break.take() {
                    Some(open) => open.close(event),
                    None => {
                        tracing::debug!(event_id = %event.id, "break end without a start");
                        Break {
                            started_at: None,
                            ended_at: Some(event.timestamp),
                            duration_minutes: event.duration_minutes,
                        }
                    }
                };
                self.breaks.push(closed);
            }
            EventKind::NewTask => {
                let id = u32::try_from(self.tasks.len() + 1).unwrap_or(u32::MAX);
                self.tasks.push(Task {
                    id,
                    description: event.notes.clone(),
                    duration_minutes: event.duration_minutes,
                    timestamp: event.timestamp,
                    completed: false,
                    completed_at: None,
                });
            }
            EventKind::TaskComplete | EventKind::Meeting | EventKind::Other => {
                if !event.notes.trim().is_empty() {
                    self.notes.push(event.notes.clone());
                }
            }
        }
    }

    fn arrive(&mut self, event: &Event) {
        match self.state {
            SessionState::Offline => {
                self.state = SessionState::Online;
                self.start_time.get_or_insert(event.timestamp);
                self.open_session = Some((event.timestamp, event.place_id.clone()));
            }
            SessionState::Online => {
                tracing::debug!(
                    event_id = %event.id,
                    "arrive while already online, keeping session start"
                );
            }
        }
    }

    fn exit(&mut self, event: &Event) {
        match (self.state, self.open_session.take()) {
            (SessionState::Online, Some((start, place_id))) => {
                self.state = SessionState::Offline;
                self.end_time = Some(event.timestamp);
                self.sessions.push(Session {
                    start,
                    end: Some(event.timestamp),
                    place_id,
                    breaks: Vec::new(),
                });
            }
            _ => {
                tracing::debug!(event_id = %event.id, "exit without a matching arrive");
                self.unmatched_exits.push(event.timestamp);
            }
        }
    }

    fn finish(&mut self) {
        if let Some(open) = self.open_break.take() {
            self.breaks.push(open.unterminated());
        }
        if let Some((start, place_id)) = self.open_session.take() {
            self.sessions.push(Session {
                start,
                end: None,
                place_id,
                breaks: Vec::new(),
            });
        }

        // Each break joins at most one session, so per-session hours never
        // subtract it twice when an exit and the next arrive share an instant.
        let sessions = &mut self.sessions;
        for brk in &self.breaks {
            let Some(t) = brk.anchor() else {
                continue;
            };
            let index = sessions
                .iter()
                .position(|s| t >= s.start && s.end.is_none_or(|end| t < end))
                .or_else(|| sessions.iter().position(|s| s.end == Some(t)));
            if let Some(index) = index {
                sessions[index].breaks.push(brk.clone());
            }
        }
    }

    fn into_daily_log(self, date: NaiveDate) -> DailyLog {
        let status = match self.state {
            SessionState::Online => DayStatus::Online,
            SessionState::Offline => DayStatus::Offline,
        };

        let total_hours = match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => net_hours(start, end, break_minutes(&self.breaks)),
            _ => 0.0,
        };

        DailyLog {
            date,
            start_time: self.start_time,
            end_time: self.end_time,
            status,
            total_hours,
            sessions: self.sessions,
            tasks: self.tasks,
            breaks: self.breaks,
            notes: self.notes.join("\n"),
            unmatched_exits: self.unmatched_exits,
        }
    }
}

/// Aggregates one day's events into a [`DailyLog`].
///
/// `events` should already be limited to `date`; they need not be sorted.
/// This never fails: an empty slice yields an offline day with zero hours.
pub fn aggregate(date: NaiveDate, events: &[Event]) -> DailyLog {
    Scan::run(events).into_daily_log(date)
}

/// Sessions derived from `events` by the same state machine as [`aggregate`].
pub fn sessions(events: &[Event]) -> Vec<Session> {
    Scan::run(events).sessions
}

/// Worked hours of closed sessions, attributed to the place of their arrive.
///
/// `None` collects sessions that started outside every geofence.
#[expect(
    clippy::cast_precision_loss,
    reason = "millisecond spans of a day fit exactly in f64"
)]
pub fn hours_by_place(sessions: &[Session]) -> BTreeMap<Option<PlaceId>, f64> {
    let mut hours = BTreeMap::new();
    for session in sessions {
        if let Some(worked) = session.duration() {
            *hours.entry(session.place_id.clone()).or_insert(0.0) +=
                worked.num_milliseconds() as f64 / 3_600_000.0;
        }
    }
    hours
}

/// Aggregates several days at once, bucketing events by their local date.
///
/// Days are processed in parallel; the result follows the order of `dates`.
pub fn aggregate_days(
    dates: &[NaiveDate],
    events: &[Event],
    offset: FixedOffset,
) -> Vec<DailyLog> {
    dates
        .par_iter()
        .map(|&date| Scan::run(events_on(events, date, offset)).into_daily_log(date))
        .collect()
}
