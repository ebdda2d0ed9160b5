//! Constants and default values for the logging module.

/// External metadata key owned by the log plugin.
///
/// Other plugins may read the value stored here but must not write it.
pub const LOG: &str = "log";

/// Prefix prepended to the configured name when building the bound logger.
pub const LOGGER_NAME_PREFIX: &str = "request.";

/// Tracing target used by [`JsonLogger`](super::JsonLogger).
pub const JSON_LOG_TARGET: &str = "request_json";

/// Default replacement string for redacted values.
pub const DEFAULT_REDACTION_REPLACEMENT: &str = "[REDACTED]";
