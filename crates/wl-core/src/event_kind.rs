//! Event kind and mode enums as the single source of truth for their strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::ValidationError;

/// What a logged event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    Arrive,
    Exit,
    NewTask,
    TaskComplete,
    BreakStart,
    BreakEnd,
    Meeting,
    Other,
}

impl EventKind {
    /// All kinds, in display order.
    pub const ALL: [Self; 8] = [
        Self::Arrive,
        Self::Exit,
        Self::NewTask,
        Self::TaskComplete,
        Self::BreakStart,
        Self::BreakEnd,
        Self::Meeting,
        Self::Other,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Arrive => "arrive",
            Self::Exit => "exit",
            Self::NewTask => "new_task",
            Self::TaskComplete => "task_complete",
            Self::BreakStart => "break_start",
            Self::BreakEnd => "break_end",
            Self::Meeting => "meeting",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "arrive" => Ok(Self::Arrive),
            // Older web clients posted "leave" for exits.
            "exit" | "leave" => Ok(Self::Exit),
            "new_task" => Ok(Self::NewTask),
            "task_complete" => Ok(Self::TaskComplete),
            "break_start" => Ok(Self::BreakStart),
            "break_end" => Ok(Self::BreakEnd),
            "meeting" => Ok(Self::Meeting),
            "other" => Ok(Self::Other),
            _ => Err(ValidationError::UnknownEventKind {
                value: s.to_string(),
            }),
        }
    }
}

impl Serialize for EventKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// How an event was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventMode {
    /// Entered by hand.
    #[default]
    Manual,
    /// Sent by a phone automation or other device.
    Device,
}

impl EventMode {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Device => "device",
        }
    }
}

impl fmt::Display for EventMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "manual" => Ok(Self::Manual),
            "device" | "iphone" => Ok(Self::Device),
            _ => Err(ValidationError::UnknownMode {
                value: s.to_string(),
            }),
        }
    }
}
