//! Configuration types for the log plugin.
//!
//! - LogPluginOptions: loosely-typed options as a host would pass them
//! - LogPluginConfig: the full configuration, with builder methods
//!
//! Defaults are applied at construction: an empty name, a tracing-backed
//! logger, the system clock, and no redaction.

use super::constants::{DEFAULT_REDACTION_REPLACEMENT, LOGGER_NAME_PREFIX};
use super::logger::{Logger, LoggerFactory, default_logger_factory};
use super::types::MissingStartPolicy;
use crate::clock::{Clock, SystemClock};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

/// Options recognised when configuring the plugin from untyped input.
///
/// Only `name` is read. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogPluginOptions {
    /// Suffix of the logger name (`request.<name>`).
    #[serde(default)]
    pub name: String,
}

/// Configuration for the log plugin.
#[derive(Clone)]
pub struct LogPluginConfig {
    /// Suffix of the logger name (`request.<name>`).
    pub name: String,
    /// Builds the logger the plugin writes to.
    pub logger: LoggerFactory,
    /// Time source for `start` and `end`.
    pub clock: Arc<dyn Clock>,
    /// What terminal hooks do when `start` is missing.
    pub missing_start: MissingStartPolicy,
    /// Keys redacted from projected `query` and `payload`.
    pub redacted_fields: HashSet<String>,
    /// Replacement string for redacted values.
    pub redaction_replacement: String,
}

impl Default for LogPluginConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            logger: default_logger_factory(),
            clock: Arc::new(SystemClock),
            missing_start: MissingStartPolicy::default(),
            redacted_fields: HashSet::new(),
            redaction_replacement: DEFAULT_REDACTION_REPLACEMENT.to_string(),
        }
    }
}

impl std::fmt::Debug for LogPluginConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogPluginConfig")
            .field("name", &self.name)
            .field("missing_start", &self.missing_start)
            .field("redacted_fields", &self.redacted_fields)
            .field("redaction_replacement", &self.redaction_replacement)
            .finish_non_exhaustive()
    }
}

impl LogPluginConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration from parsed options.
    pub fn from_options(options: LogPluginOptions) -> Self {
        Self::new().with_name(options.name)
    }

    /// Creates a configuration from an untyped options object.
    ///
    /// Fails only when a recognised key has the wrong type.
    pub fn from_value(options: Value) -> Result<Self, serde_json::Error> {
        let options: LogPluginOptions = serde_json::from_value(options)?;
        Ok(Self::from_options(options))
    }

    /// Sets the logger name suffix.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the logger factory.
    pub fn with_logger_factory(mut self, factory: LoggerFactory) -> Self {
        self.logger = factory;
        self
    }

    /// Uses an already-built logger, ignoring the bound name.
    pub fn with_logger<L: Logger + 'static>(mut self, logger: L) -> Self {
        let logger: Arc<dyn Logger> = Arc::new(logger);
        self.logger = Arc::new(move |_name: &str| Arc::clone(&logger));
        self
    }

    /// Sets the time source.
    pub fn with_clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Sets the missing-start policy.
    pub fn with_missing_start(mut self, policy: MissingStartPolicy) -> Self {
        self.missing_start = policy;
        self
    }

    /// Adds a key to redact from projected fields.
    ///
    /// Matching is case-insensitive and uses substring matching.
    pub fn redact_field(mut self, field: impl Into<String>) -> Self {
        self.redacted_fields.insert(field.into());
        self
    }

    /// Adds multiple keys to redact from projected fields.
    pub fn redact_fields(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        for field in fields {
            self.redacted_fields.insert(field.into());
        }
        self
    }

    /// Sets the replacement string for redacted values.
    pub fn with_redaction_replacement(mut self, replacement: impl Into<String>) -> Self {
        self.redaction_replacement = replacement.into();
        self
    }

    /// Full name of the bound logger: `request.<name>`.
    pub fn logger_name(&self) -> String {
        format!("{LOGGER_NAME_PREFIX}{}", self.name)
    }
}
