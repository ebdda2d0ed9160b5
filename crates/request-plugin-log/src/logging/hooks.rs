use crate::clock::Clock;
use crate::context::RequestContext;
use crate::logging::config::LogPluginConfig;
use crate::logging::constants::LOG;
use crate::logging::logger::Logger;
use crate::logging::projection::project_with;
use crate::logging::redaction::RedactionEngine;
use crate::logging::timing::{fill_duration, log_meta_snapshot, record_start};
use crate::logging::types::{LogMetadata, MissingStartPolicy};
use crate::plugin::{Next, Phase, Plugin};
use crate::request::Request;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;

// =============================================================================
// Helper Functions
// =============================================================================

/// Serializes a log argument, substituting a placeholder on failure.
fn snapshot<T: Serialize>(value: &T, logger_name: &str) -> Value {
    match serde_json::to_value(value) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(
                logger = %logger_name,
                error = %e,
                "Failed to serialize log argument"
            );
            Value::String("[serialization error]".to_string())
        }
    }
}

// =============================================================================
// LogPlugin
// =============================================================================

/// Lifecycle hooks that log a request and time it.
///
/// `init` records `start` under the [`LOG`] metadata key; whichever terminal
/// hook runs adds `end` and `duration`. Info and error output carry only the
/// projected `url`/`query`/`payload` and are skipped for silent requests.
/// Debug output carries full snapshots and is always emitted. Every hook
/// calls `next` exactly once.
///
/// # Example
///
/// ```rust,ignore
/// let plugin = LogPlugin::new(LogPluginConfig::new().with_name("api"));
///
/// let pipeline = Pipeline::new().plugin(plugin);
/// ```
pub struct LogPlugin {
    logger: Arc<dyn Logger>,
    logger_name: String,
    clock: Arc<dyn Clock>,
    missing_start: MissingStartPolicy,
    redaction: Option<RedactionEngine>,
}

impl LogPlugin {
    /// Builds the plugin, binding one logger named `request.<name>`.
    pub fn new(config: LogPluginConfig) -> Self {
        let logger_name = config.logger_name();
        let logger = (config.logger)(&logger_name);
        let redaction = RedactionEngine::from_config(&config);

        Self {
            logger,
            logger_name,
            clock: config.clock,
            missing_start: config.missing_start,
            redaction,
        }
    }

    /// Name the logger was bound with.
    pub fn logger_name(&self) -> &str {
        &self.logger_name
    }

    fn projected(&self, request: &Request) -> Value {
        project_with(request, self.redaction.as_ref())
    }

    /// Terminal timing shared by `complete` and `error`.
    fn finish_timing(&self, ctx: &mut dyn RequestContext) {
        let Err(error) = fill_duration(ctx, self.clock.as_ref()) else {
            return;
        };

        tracing::warn!(
            logger = %self.logger_name,
            error = %error,
            policy = ?self.missing_start,
            "Terminal hook ran without a usable start timestamp"
        );

        if self.missing_start == MissingStartPolicy::ZeroDuration {
            let end = self.clock.now();
            ctx.update_external_meta(LOG, LogMetadata::started(end).finish(end).to_value());
        }
    }
}

impl std::fmt::Debug for LogPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogPlugin")
            .field("logger_name", &self.logger_name)
            .field("missing_start", &self.missing_start)
            .field("redaction", &self.redaction.is_some())
            .finish_non_exhaustive()
    }
}

/// Builds a [`LogPlugin`] from configuration.
pub fn log_plugin(config: LogPluginConfig) -> LogPlugin {
    LogPlugin::new(config)
}

impl Plugin for LogPlugin {
    fn init(&self, ctx: &mut dyn RequestContext, next: Next<'_>) {
        let start = self.clock.now();
        let request = ctx.request();

        if !request.is_silent() {
            self.logger.info(Phase::Init.as_str(), &[self.projected(request)]);
        }

        self.logger.debug(Phase::Init.as_str(), &[snapshot(request, &self.logger_name)]);

        record_start(ctx, start);

        next();
    }

    fn complete(&self, ctx: &mut dyn RequestContext, next: Next<'_>) {
        self.finish_timing(ctx);

        let request = ctx.request();
        let external = Value::Object(ctx.external_meta_map().clone());

        if !request.is_silent() {
            self.logger.info(
                Phase::Complete.as_str(),
                &[self.projected(request), external.clone()],
            );
        }

        self.logger.debug(
            Phase::Complete.as_str(),
            &[
                snapshot(ctx.state(), &self.logger_name),
                external,
                Value::Object(ctx.internal_meta_map().clone()),
            ],
        );

        next();
    }

    fn error(&self, ctx: &mut dyn RequestContext, next: Next<'_>) {
        self.finish_timing(ctx);

        let state = ctx.state();
        let log_meta = log_meta_snapshot(&*ctx);

        if !state.request.is_silent() {
            let error = state
                .error
                .as_ref()
                .map_or(Value::Null, |error| snapshot(error, &self.logger_name));

            let mut nested = Map::new();
            nested.insert(LOG.to_string(), log_meta.clone());

            self.logger.error(
                Phase::Error.as_str(),
                &[self.projected(&state.request), error, Value::Object(nested)],
            );
        }

        self.logger.debug(
            Phase::Error.as_str(),
            &[
                snapshot(state, &self.logger_name),
                log_meta,
                Value::Object(ctx.internal_meta_map().clone()),
            ],
        );

        next();
    }
}
