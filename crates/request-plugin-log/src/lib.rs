#![warn(missing_docs)]
//! # Request Log Plugin
//!
//! Lifecycle logging and timing for request pipelines.
//!
//! ## Overview
//!
//! A pipeline calls three hooks on every plugin for each request:
//! `init` when the request enters, then exactly one of `complete` or
//! `error`. [`LogPlugin`] uses them to:
//!
//! - record `start`, `end` and `duration` under the `"log"` external
//!   metadata key,
//! - log lifecycle events at info level and failures at error level, unless
//!   the request is marked `silent`,
//! - log full state snapshots at debug level, always.
//!
//! Every hook hands control back to the pipeline exactly once. Logging
//! never alters, suppresses, or delays the request.
//!
//! ## Lifecycle
//!
//! ```text
//!   NEW ──init──▶ STARTED ──complete──▶ COMPLETED
//!    │               │
//!    │               └──────error─────▶ FAILED
//!    └─────────────error──────────────▶ FAILED
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use request_plugin_log::prelude::*;
//! use serde_json::json;
//!
//! let pipeline = Pipeline::new()
//!     .plugin(LogPlugin::new(LogPluginConfig::new().with_name("users")));
//!
//! let mut ctx = Context::new(
//!     Request::new("/users").with_query(json!({ "page": 1 })),
//! );
//!
//! pipeline.init(&mut ctx)?;
//! // ... perform the request ...
//! pipeline.complete(&mut ctx)?;
//!
//! let timing = LogMetadata::from_value(ctx.external_meta(LOG).unwrap());
//! ```
//!
//! ## Custom Loggers
//!
//! Anything implementing [`Logger`] can be injected through a
//! [`LoggerFactory`]; the factory receives the full logger name
//! (`request.<name>`).
//!
//! ```rust,ignore
//! struct Stderr(String);
//!
//! impl Logger for Stderr {
//!     fn info(&self, message: &str, args: &[Value]) {
//!         eprintln!("{} {} {:?}", self.0, message, args);
//!     }
//!     // ...
//! }
//!
//! let config = LogPluginConfig::new()
//!     .with_logger_factory(logger_factory(|name| Stderr(name.to_string())));
//! ```
//!
//! ## Deterministic Time
//!
//! ```rust,ignore
//! let clock = ManualClock::new(1_000);
//! let plugin = LogPlugin::new(LogPluginConfig::new().with_clock(clock.clone()));
//! clock.advance(250);
//! ```
//!
//! ## Module Structure
//!
//! - [`logging`] - LogPlugin, Logger implementations, configuration
//! - [`Plugin`] / [`Next`] - hook contract
//! - [`RequestContext`] / [`Context`] - per-request carrier
//! - [`Pipeline`] - sequential driver
//! - [`Clock`] - time sources
//! - [`RequestError`] - failures observed on the state

mod clock;
mod context;
mod error;
pub mod logging;
mod pipeline;
mod plugin;
mod request;

#[cfg(test)]
mod tests;

// Public API
pub use clock::{Clock, ManualClock, SystemClock, Timestamp};
pub use context::{Context, LifecycleStatus, RequestContext, merge_meta};
pub use error::{PipelineError, PipelineResult, RequestError, RequestErrorCode, TimingError};
pub use logging::{
    JsonLogger, LOG, LogLevel, LogMetadata, LogPlugin, LogPluginConfig, LogPluginOptions, Logger,
    LoggerFactory, MissingStartPolicy, NoopLogger, TracingLogger, log_plugin, logger_factory,
};
pub use pipeline::Pipeline;
pub use plugin::{Next, Phase, Plugin, dispatch};
pub use request::{Request, State};

/// Prelude for convenient imports
///
/// ```rust,ignore
/// use request_plugin_log::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Time
        Clock,
        // Context
        Context,
        // Logging
        JsonLogger,
        LOG,
        LifecycleStatus,
        LogLevel,
        LogMetadata,
        LogPlugin,
        LogPluginConfig,
        Logger,
        LoggerFactory,
        ManualClock,
        MissingStartPolicy,
        Next,
        NoopLogger,
        Phase,
        // Pipeline
        Pipeline,
        PipelineError,
        Plugin,
        // Request
        Request,
        RequestContext,
        RequestError,
        RequestErrorCode,
        State,
        SystemClock,
        TracingLogger,
        // Functions
        log_plugin,
        logger_factory,
    };
}
