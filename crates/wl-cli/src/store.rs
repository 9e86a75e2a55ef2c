//! File-backed store for places, events and task completions.
//!
//! Events are appended to `events.jsonl`, one JSON object per line. Places
//! live in `places.json` as an array whose order is the geofence priority.
//! Task completions live in `completions.json`. Every access holds a lock on
//! `.lock` in the data directory, and whole-file rewrites go through a
//! temporary file that is renamed into place.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use wl_core::{Event, EventId, Place, TaskCompletion};

/// Handle to a data directory.
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    /// Opens the store, creating the data directory if needed.
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create data directory {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn events_path(&self) -> PathBuf {
        self.dir.join("events.jsonl")
    }

    fn places_path(&self) -> PathBuf {
        self.dir.join("places.json")
    }

    fn completions_path(&self) -> PathBuf {
        self.dir.join("completions.json")
    }

    /// Acquires the store lock. It is released when the returned file drops.
    fn lock(&self, exclusive: bool) -> Result<File> {
        let lock_file =
            File::create(self.dir.join(".lock")).context("failed to create lock file")?;
        let locked = if exclusive {
            FileExt::lock_exclusive(&lock_file)
        } else {
            FileExt::lock_shared(&lock_file)
        };
        locked.context("failed to acquire lock")?;
        Ok(lock_file)
    }

    /// All events in the order they were logged.
    ///
    /// An unparsable final line without a trailing newline is an interrupted
    /// append; it is skipped with a warning. Any other bad line is an error.
    pub fn events(&self) -> Result<Vec<Event>> {
        let _lock = self.lock(false)?;
        self.read_events()
    }

    fn read_events(&self) -> Result<Vec<Event>> {
        let content = match fs::read(self.events_path()) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e).context("failed to read events file"),
        };

        let mut events = Vec::new();
        for (index, line) in content.split_inclusive(|b| *b == b'\n').enumerate() {
            if line.trim_ascii().is_empty() {
                continue;
            }
            match serde_json::from_slice::<Event>(line) {
                Ok(event) => events.push(event),
                Err(e) if !line.ends_with(b"\n") => {
                    tracing::warn!(
                        line = index + 1,
                        error = %e,
                        "skipping incomplete final event line"
                    );
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("invalid event on line {}", index + 1));
                }
            }
        }

        Ok(events)
    }

    /// Appends one event.
    pub fn append_event(&self, event: &Event) -> Result<()> {
        let _lock = self.lock(true)?;

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(self.events_path())
            .context("failed to open events file")?;
        seal_tail(&mut file)?;

        let json = serde_json::to_string(event).context("failed to serialize event")?;
        writeln!(file, "{json}").context("failed to write event")?;

        tracing::debug!(event_id = %event.id, kind = %event.kind, "appended event");
        Ok(())
    }

    /// Removes the event with `id`. Returns `false` if it was not found.
    pub fn delete_event(&self, id: &EventId) -> Result<bool> {
        let _lock = self.lock(true)?;

        let mut events = self.read_events()?;
        let before = events.len();
        events.retain(|e| &e.id != id);
        if events.len() == before {
            return Ok(false);
        }

        let mut content = String::new();
        for event in &events {
            content.push_str(&serde_json::to_string(event).context("failed to serialize event")?);
            content.push('\n');
        }
        write_atomic(&self.events_path(), content.as_bytes())?;

        tracing::info!(event_id = %id, "deleted event");
        Ok(true)
    }

    /// All places in priority order.
    pub fn places(&self) -> Result<Vec<Place>> {
        let _lock = self.lock(false)?;
        read_list(&self.places_path(), "places")
    }

    /// Runs `f` on the place list under an exclusive lock and saves the result.
    pub fn update_places<T>(&self, f: impl FnOnce(&mut Vec<Place>) -> Result<T>) -> Result<T> {
        let _lock = self.lock(true)?;
        update_list(&self.places_path(), "places", f)
    }

    /// All stored task completions.
    pub fn completions(&self) -> Result<Vec<TaskCompletion>> {
        let _lock = self.lock(false)?;
        read_list(&self.completions_path(), "completions")
    }

    /// Runs `f` on the completion list under an exclusive lock and saves the result.
    pub fn update_completions<T>(
        &self,
        f: impl FnOnce(&mut Vec<TaskCompletion>) -> Result<T>,
    ) -> Result<T> {
        let _lock = self.lock(true)?;
        update_list(&self.completions_path(), "completions", f)
    }
}

/// Reads a JSON array file, treating a missing file as empty.
fn read_list<T: DeserializeOwned>(path: &Path, what: &str) -> Result<Vec<T>> {
    match fs::read_to_string(path) {
        Ok(content) => {
            serde_json::from_str(&content).with_context(|| format!("failed to parse {what} file"))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e).with_context(|| format!("failed to read {what} file")),
    }
}

/// Loads a JSON array, lets `f` edit it, and writes it back if `f` succeeds.
fn update_list<T, R>(
    path: &Path,
    what: &str,
    f: impl FnOnce(&mut Vec<T>) -> Result<R>,
) -> Result<R>
where
    T: Serialize + DeserializeOwned,
{
    let mut items = read_list(path, what)?;
    let result = f(&mut items)?;

    let json = serde_json::to_string_pretty(&items)
        .with_context(|| format!("failed to serialize {what}"))?;
    write_atomic(path, json.as_bytes())?;

    Ok(result)
}

/// Writes `content` to a temporary file next to `path`, then renames it over
/// `path` so readers see either the old file or the new one.
fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let tmp_path = path.with_extension("tmp");

    fs::write(&tmp_path, content)
        .with_context(|| format!("failed to write {}", tmp_path.display()))?;

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e).with_context(|| format!("failed to replace {}", path.display()));
    }

    Ok(())
}

/// Makes sure the next append starts on a fresh line.
///
/// A final line without a newline is kept if it parses as an event and
/// truncated away if it is the remains of an interrupted append.
fn seal_tail(file: &mut File) -> Result<()> {
    let mut content = Vec::new();
    file.read_to_end(&mut content)
        .context("failed to read events file")?;
    if content.is_empty() || content.ends_with(b"\n") {
        return Ok(());
    }

    let tail_start = content
        .iter()
        .rposition(|b| *b == b'\n')
        .map_or(0, |i| i + 1);
    let tail = &content[tail_start..];

    if serde_json::from_slice::<Event>(tail).is_ok() {
        file.write_all(b"\n").context("failed to write event")?;
    } else {
        tracing::warn!(bytes = tail.len(), "dropping incomplete final event line");
        let len = u64::try_from(tail_start).context("events file too large")?;
        file.set_len(len).context("failed to truncate events file")?;
    }

    Ok(())
}
