use crate::logging::constants::JSON_LOG_TARGET;
use crate::logging::types::LogLevel;
use serde_json::{Value, json};
use std::sync::Arc;

// =============================================================================
// Logger Trait
// =============================================================================

/// Sink for lifecycle log calls.
///
/// Each operation takes the hook name as `message` and the hook's arguments
/// as JSON values, the Rust rendition of a variadic logging call. Calls are
/// synchronous; whatever latency an implementation adds is paid by the
/// pipeline.
pub trait Logger: Send + Sync {
    /// Lifecycle events of non-silent requests.
    fn info(&self, message: &str, args: &[Value]);

    /// Full request detail, emitted regardless of the silent flag.
    fn debug(&self, message: &str, args: &[Value]);

    /// Failures of non-silent requests.
    fn error(&self, message: &str, args: &[Value]);
}

impl<L: Logger + ?Sized> Logger for Arc<L> {
    fn info(&self, message: &str, args: &[Value]) {
        (**self).info(message, args);
    }

    fn debug(&self, message: &str, args: &[Value]) {
        (**self).debug(message, args);
    }

    fn error(&self, message: &str, args: &[Value]) {
        (**self).error(message, args);
    }
}

/// Builds the logger bound to a plugin from its full name (`request.<name>`).
pub type LoggerFactory = Arc<dyn Fn(&str) -> Arc<dyn Logger> + Send + Sync>;

/// Wraps a closure as a [`LoggerFactory`].
pub fn logger_factory<F, L>(factory: F) -> LoggerFactory
where
    F: Fn(&str) -> L + Send + Sync + 'static,
    L: Logger + 'static,
{
    Arc::new(move |name: &str| Arc::new(factory(name)) as Arc<dyn Logger>)
}

/// Factory used when none is configured: a [`TracingLogger`] per name.
pub fn default_logger_factory() -> LoggerFactory {
    logger_factory(TracingLogger::new)
}

fn render_args(args: &[Value]) -> String {
    Value::Array(args.to_vec()).to_string()
}

// =============================================================================
// TracingLogger
// =============================================================================

/// Default logger: one `tracing` event per call.
///
/// The bound name goes in the `logger` field, the hook name is the event
/// message and the arguments are rendered as a JSON array in `args`.
#[derive(Debug, Clone)]
pub struct TracingLogger {
    name: String,
}

impl TracingLogger {
    /// Creates a logger bound to `name`.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    /// Name every event is prefixed with.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Logger for TracingLogger {
    fn info(&self, message: &str, args: &[Value]) {
        tracing::info!(logger = %self.name, args = %render_args(args), "{}", message);
    }

    fn debug(&self, message: &str, args: &[Value]) {
        tracing::debug!(logger = %self.name, args = %render_args(args), "{}", message);
    }

    fn error(&self, message: &str, args: &[Value]) {
        tracing::error!(logger = %self.name, args = %render_args(args), "{}", message);
    }
}

// =============================================================================
// JsonLogger
// =============================================================================

/// A logger that emits each call as a single JSON document.
///
/// Output goes to the `request_json` tracing target, which log shippers can
/// route separately from human-readable output.
#[derive(Debug, Clone)]
pub struct JsonLogger {
    name: String,
}

impl JsonLogger {
    /// Creates a logger bound to `name`.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    /// Builds the JSON document for one call.
    pub fn document(&self, level: LogLevel, message: &str, args: &[Value]) -> Value {
        json!({
            "logger": self.name,
            "level": level,
            "message": message,
            "args": args,
        })
    }
}

impl Logger for JsonLogger {
    fn info(&self, message: &str, args: &[Value]) {
        let document = self.document(LogLevel::Info, message, args);
        tracing::info!(target: JSON_LOG_TARGET, "{}", document);
    }

    fn debug(&self, message: &str, args: &[Value]) {
        let document = self.document(LogLevel::Debug, message, args);
        tracing::debug!(target: JSON_LOG_TARGET, "{}", document);
    }

    fn error(&self, message: &str, args: &[Value]) {
        let document = self.document(LogLevel::Error, message, args);
        tracing::error!(target: JSON_LOG_TARGET, "{}", document);
    }
}

// =============================================================================
// NoopLogger
// =============================================================================

/// Discards every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn info(&self, _message: &str, _args: &[Value]) {}

    fn debug(&self, _message: &str, _args: &[Value]) {}

    fn error(&self, _message: &str, _args: &[Value]) {}
}

// =============================================================================
// MockLogger (for testing)
// =============================================================================

#[cfg(test)]
use std::sync::Mutex;

/// One captured logger call.
#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedCall {
    /// Operation that was called
    pub level: LogLevel,
    /// Hook name
    pub message: String,
    /// Arguments, in call order
    pub args: Vec<Value>,
}

/// A mock logger that captures calls for testing.
///
/// Clones share storage, so the handle kept by a test sees the calls made
/// through the copy handed to the plugin.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MockLogger {
    calls: Arc<Mutex<Vec<LoggedCall>>>,
    names: Arc<Mutex<Vec<String>>>,
}

#[cfg(test)]
impl MockLogger {
    /// Creates a new mock logger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory that records the requested name and hands out this logger.
    pub fn factory(&self) -> LoggerFactory {
        let logger = self.clone();
        Arc::new(move |name: &str| {
            logger.names.lock().unwrap().push(name.to_string());
            Arc::new(logger.clone()) as Arc<dyn Logger>
        })
    }

    /// Names the factory was called with.
    pub fn names(&self) -> Vec<String> {
        self.names.lock().unwrap().clone()
    }

    /// Returns all captured calls.
    pub fn calls(&self) -> Vec<LoggedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Captured calls at one level.
    pub fn calls_at(&self, level: LogLevel) -> Vec<LoggedCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.level == level)
            .collect()
    }

    /// Most recent call at one level.
    pub fn last_at(&self, level: LogLevel) -> Option<LoggedCall> {
        self.calls_at(level).pop()
    }

    /// Clears all captured calls.
    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, level: LogLevel, message: &str, args: &[Value]) {
        self.calls.lock().unwrap().push(LoggedCall {
            level,
            message: message.to_string(),
            args: args.to_vec(),
        });
    }
}

#[cfg(test)]
impl Logger for MockLogger {
    fn info(&self, message: &str, args: &[Value]) {
        self.record(LogLevel::Info, message, args);
    }

    fn debug(&self, message: &str, args: &[Value]) {
        self.record(LogLevel::Debug, message, args);
    }

    fn error(&self, message: &str, args: &[Value]) {
        self.record(LogLevel::Error, message, args);
    }
}
