//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Geofenced work logger.
///
/// Records arrivals, exits, breaks, tasks and notes against named places,
/// and turns them into daily work logs.
#[derive(Debug, Parser)]
#[command(name = "wl", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Log an event at a coordinate.
    Log(LogArgs),

    /// Delete a logged event by ID.
    Delete {
        /// The event ID.
        id: String,
    },

    /// List logged events, newest first.
    Events {
        /// Only events on this local date (YYYY-MM-DD).
        #[arg(long)]
        date: Option<String>,

        /// Only events of this kind.
        #[arg(long)]
        kind: Option<String>,

        /// Only events at this place ID.
        #[arg(long)]
        place: Option<String>,

        /// Output one JSON object per line.
        #[arg(long)]
        json: bool,
    },

    /// Manage geofenced places.
    #[command(subcommand)]
    Places(PlacesAction),

    /// Show which place a coordinate resolves to.
    Resolve {
        /// Latitude in degrees.
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        /// Longitude in degrees.
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
    },

    /// Show the daily work log.
    Daily {
        /// The local date to show (YYYY-MM-DD, defaults to today).
        #[arg(long)]
        date: Option<String>,

        /// Number of days ending at --date.
        #[arg(long, default_value_t = 1)]
        days: u32,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show event counts by kind and place.
    Summary {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Mark a day's tasks completed or open.
    #[command(subcommand)]
    Task(TaskAction),
}

/// Arguments for `wl log`.
#[derive(Debug, Clone, Args)]
pub struct LogArgs {
    /// Event kind: arrive, exit (or leave), new_task, task_complete,
    /// break_start, break_end, meeting, other.
    pub kind: String,

    /// Latitude in degrees.
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,

    /// Longitude in degrees.
    #[arg(long, allow_negative_numbers = true)]
    pub lon: f64,

    /// Attribute the event to this place ID instead of resolving it.
    #[arg(long)]
    pub place: Option<String>,

    /// Free-text notes (task description, meeting notes).
    #[arg(long, default_value = "")]
    pub notes: String,

    /// Duration in minutes.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub duration: i64,

    /// How the event was captured: manual or device.
    #[arg(long, default_value = "manual")]
    pub mode: String,

    /// When the event happened (ISO 8601 or e.g. "2 hours ago", defaults to now).
    #[arg(long)]
    pub at: Option<String>,
}

/// Task completion actions. Tasks are numbered per day as `wl daily` shows them.
#[derive(Debug, Subcommand)]
pub enum TaskAction {
    /// Mark a task completed.
    Complete {
        /// The task number from the daily log.
        id: u32,

        /// The local date of the task (YYYY-MM-DD, defaults to today).
        #[arg(long)]
        date: Option<String>,
    },

    /// Mark a completed task open again.
    Reopen {
        /// The task number from the daily log.
        id: u32,

        /// The local date of the task (YYYY-MM-DD, defaults to today).
        #[arg(long)]
        date: Option<String>,
    },
}

/// Place management actions.
#[derive(Debug, Subcommand)]
pub enum PlacesAction {
    /// List places in resolution order.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Add a place at the lowest priority.
    Add {
        /// Place ID (generated if omitted).
        #[arg(long)]
        id: Option<String>,

        /// Display name.
        #[arg(long)]
        name: String,

        /// Latitude of the center in degrees.
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        /// Longitude of the center in degrees.
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        /// Geofence radius in meters.
        #[arg(long)]
        radius: f64,

        /// Place kind: office, home, client, custom.
        #[arg(long, default_value = "custom")]
        kind: String,
    },

    /// Remove a place by ID.
    Remove {
        /// The place ID.
        id: String,
    },
}
