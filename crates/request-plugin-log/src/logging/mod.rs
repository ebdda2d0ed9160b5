//! Request Lifecycle Logging
//!
//! Logs a request as it moves through the pipeline and records how long it
//! took.
//!
//! # Features
//!
//! - **Timing**: `start`, `end` and `duration` stored under the `"log"`
//!   external metadata key, driven by an injectable [`Clock`](crate::Clock)
//! - **Severity channels**: info for lifecycle events, error for failures,
//!   debug for full snapshots
//! - **Silent requests**: `silent: true` suppresses info and error output;
//!   debug output is unaffected
//! - **Field projection**: info and error output only carry `url`, `query`
//!   and `payload`
//! - **Pluggable loggers**: any [`Logger`] built by a [`LoggerFactory`]
//! - **Optional redaction** of projected fields
//!
//! # Architecture
//!
//! - **types**: LogLevel, LogMetadata, MissingStartPolicy
//! - **config**: LogPluginConfig with builder pattern
//! - **constants**: metadata key, logger name prefix, defaults
//! - **logger**: Logger trait and implementations
//! - **projection**: url/query/payload projection
//! - **redaction**: redaction engine for projected fields
//! - **timing**: start/end/duration bookkeeping
//! - **hooks**: the LogPlugin lifecycle hooks
//!
//! # Basic Usage
//!
//! ```rust,ignore
//! use request_plugin_log::logging::{LogPlugin, LogPluginConfig};
//!
//! let plugin = LogPlugin::new(LogPluginConfig::new().with_name("users"));
//! // Logger is bound as "request.users"
//! ```
//!
//! # Custom Logger
//!
//! ```rust,ignore
//! use request_plugin_log::logging::{JsonLogger, LogPluginConfig, logger_factory};
//!
//! let config = LogPluginConfig::new()
//!     .with_name("users")
//!     .with_logger_factory(logger_factory(JsonLogger::new));
//! ```
//!
//! ## Redacting Projected Fields
//!
//! ```rust,ignore
//! let config = LogPluginConfig::new()
//!     .redact_field("password")
//!     .redact_field("token");
//! ```

// =============================================================================
// Submodules
// =============================================================================

mod config;
mod constants;
mod hooks;
mod logger;
mod projection;
mod redaction;
mod timing;
mod types;

// =============================================================================
// Public API Re-exports
// =============================================================================

// Constants
pub use constants::{DEFAULT_REDACTION_REPLACEMENT, JSON_LOG_TARGET, LOG, LOGGER_NAME_PREFIX};

// Core Types
pub use types::{LogLevel, LogMetadata, MissingStartPolicy};

// Configuration
pub use config::{LogPluginConfig, LogPluginOptions};

// Logger Trait and Implementations
pub use logger::{
    JsonLogger, Logger, LoggerFactory, NoopLogger, TracingLogger, default_logger_factory,
    logger_factory,
};

// Projection and Redaction
pub use projection::{project, project_with};
pub use redaction::RedactionEngine;

// Timing
pub use timing::{fill_duration, log_meta_snapshot, read_start, record_start};

// Hooks
pub use hooks::{LogPlugin, log_plugin};

// Test utilities (only exported in test builds)
#[cfg(test)]
pub use logger::{LoggedCall, MockLogger};
