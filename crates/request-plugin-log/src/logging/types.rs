//! Core types for the logging module.
//!
//! - LogLevel: the three severities a [`Logger`](super::Logger) exposes
//! - LogMetadata: timing record stored under the [`LOG`](super::LOG) key
//! - MissingStartPolicy: what a terminal hook does when `start` is missing

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::clock::Timestamp;

/// Severity of a logger call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Unfiltered detail channel. Ignores the silent flag.
    Debug,
    /// Lifecycle events of non-silent requests.
    Info,
    /// Failures of non-silent requests.
    Error,
}

impl LogLevel {
    /// Lowercase name of the level.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Timing record of one request.
///
/// `end` and `duration` stay unset until a terminal hook runs; afterwards
/// `duration == end - start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogMetadata {
    /// When `init` ran.
    pub start: Timestamp,
    /// When the terminal hook ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<Timestamp>,
    /// `end - start` in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
}

impl LogMetadata {
    /// A record for a request that started at `start`.
    pub fn started(start: Timestamp) -> Self {
        Self {
            start,
            end: None,
            duration: None,
        }
    }

    /// Returns this record finished at `end`.
    ///
    /// `end - start` must fit in an `i64`; use [`checked_finish`](Self::checked_finish)
    /// when `start` was read back from metadata.
    pub fn finish(self, end: Timestamp) -> Self {
        Self {
            start: self.start,
            end: Some(end),
            duration: Some(end - self.start),
        }
    }

    /// Like [`finish`](Self::finish), returning `None` if the duration overflows.
    pub fn checked_finish(self, end: Timestamp) -> Option<Self> {
        let duration = end.checked_sub(self.start)?;
        Some(Self {
            start: self.start,
            end: Some(end),
            duration: Some(duration),
        })
    }

    /// Returns true once `end` and `duration` are set.
    pub fn is_finished(&self) -> bool {
        self.end.is_some() && self.duration.is_some()
    }

    /// Reads a record back from a metadata slot.
    pub fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }

    /// JSON object holding only the fields that are set.
    pub fn to_value(&self) -> Value {
        let mut fields = Map::new();
        fields.insert("start".to_string(), Value::from(self.start));
        if let Some(end) = self.end {
            fields.insert("end".to_string(), Value::from(end));
        }
        if let Some(duration) = self.duration {
            fields.insert("duration".to_string(), Value::from(duration));
        }
        Value::Object(fields)
    }
}

/// What a terminal hook does when no `start` timestamp was recorded.
///
/// This happens when a request fails before the log plugin's `init` ran.
/// Either way a warning is emitted and the pipeline continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingStartPolicy {
    /// Use the terminal timestamp as `start`, giving a zero duration.
    #[default]
    ZeroDuration,
    /// Leave the metadata slot untouched.
    LeaveUnset,
}
