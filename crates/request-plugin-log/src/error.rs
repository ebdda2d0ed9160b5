//! Error types for request lifecycle logging
//!
//! Two families live here:
//!
//! - [`RequestError`] is the failure a host pipeline records on the request
//!   state. The log plugin only observes it: it is serialized into the
//!   `error` log call and never transformed, wrapped, or cleared.
//! - [`TimingError`] and [`PipelineError`] are raised by this crate's own
//!   helpers. Hooks never return them; they are surfaced through `tracing`
//!   diagnostics or through the [`Pipeline`](crate::Pipeline) driver.
//!
//! # Example
//! ```rust,ignore
//! use request_plugin_log::{RequestError, RequestErrorCode};
//!
//! let error = RequestError::new(RequestErrorCode::Timeout, "upstream did not answer");
//! let error = RequestError::timeout("upstream did not answer"); // Convenience method
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

use crate::context::LifecycleStatus;

/// Categories of request failure a host can report.
///
/// Serialized as SCREAMING_SNAKE_CASE (e.g., `BadResponse` becomes
/// `"BAD_RESPONSE"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum RequestErrorCode {
    /// The request could not be sent or the connection dropped
    Network,
    /// No response arrived within the allotted time
    Timeout,
    /// The request was cancelled before it finished
    Aborted,
    /// The response arrived but could not be accepted (status, body, parse)
    BadResponse,
    /// A plugin in the pipeline rejected the request
    PluginError,
    /// Anything the host could not categorize
    Unknown,
}

impl RequestErrorCode {
    /// Returns the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "NETWORK",
            Self::Timeout => "TIMEOUT",
            Self::Aborted => "ABORTED",
            Self::BadResponse => "BAD_RESPONSE",
            Self::PluginError => "PLUGIN_ERROR",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for RequestErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A request failure as recorded on the pipeline state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("[{code}] {message}")]
pub struct RequestError {
    /// Failure category
    pub code: RequestErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional structured details (status code, response body, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl RequestError {
    /// Create a new error with code and message.
    pub fn new(code: RequestErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Add details to the error.
    pub fn with_details(mut self, details: impl Serialize) -> Self {
        self.details = serde_json::to_value(details).ok();
        self
    }

    /// Create a NETWORK error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(RequestErrorCode::Network, message)
    }

    /// Create a TIMEOUT error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(RequestErrorCode::Timeout, message)
    }

    /// Create an ABORTED error.
    pub fn aborted(message: impl Into<String>) -> Self {
        Self::new(RequestErrorCode::Aborted, message)
    }

    /// Create a BAD_RESPONSE error.
    pub fn bad_response(message: impl Into<String>) -> Self {
        Self::new(RequestErrorCode::BadResponse, message)
    }

    /// Create a PLUGIN_ERROR error.
    pub fn plugin(message: impl Into<String>) -> Self {
        Self::new(RequestErrorCode::PluginError, message)
    }

    /// Create an UNKNOWN error.
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(RequestErrorCode::Unknown, message)
    }
}

/// Failures of the duration computation.
///
/// Produced when a terminal hook runs against a context whose timing slot was
/// never initialised or was overwritten with something unreadable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimingError {
    /// No `start` timestamp under the metadata key
    #[error("no start timestamp recorded under metadata key '{key}'")]
    MissingStart {
        /// Metadata key that was read
        key: &'static str,
    },
    /// The metadata slot exists but is not shaped like timing metadata
    #[error("metadata under key '{key}' is not valid timing metadata: {value}")]
    InvalidStart {
        /// Metadata key that was read
        key: &'static str,
        /// The offending value
        value: Value,
    },
}

/// Failures raised by the sequential [`Pipeline`](crate::Pipeline) driver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// The requested phase is not reachable from the context's current status
    #[error("cannot move request from {from} to {to}")]
    InvalidTransition {
        /// Status before the attempted phase
        from: LifecycleStatus,
        /// Status the phase would have produced
        to: LifecycleStatus,
    },
    /// A plugin returned without calling `next`
    #[error("plugin #{plugin_index} did not call next during {phase}")]
    Halted {
        /// Position of the plugin in the pipeline
        plugin_index: usize,
        /// Phase being run
        phase: &'static str,
    },
}

/// Result alias for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
