//! Opt-in redaction of projected request fields.
//!
//! Applied to `query` and `payload` before they reach info and error output.
//! Keys are matched case-insensitively by substring, at any depth. Debug
//! output is never redacted: it is the full-detail channel.

use super::config::LogPluginConfig;
use serde_json::Value;
use std::collections::HashSet;

/// Redaction engine with pre-lowercased field names.
#[derive(Debug, Clone)]
pub struct RedactionEngine {
    sensitive_fields_lower: HashSet<String>,
    replacement: String,
}

impl RedactionEngine {
    /// Creates an engine for the given field names and replacement.
    pub fn new<I, S>(fields: I, replacement: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            sensitive_fields_lower: fields
                .into_iter()
                .map(|field| field.as_ref().to_lowercase())
                .collect(),
            replacement: replacement.into(),
        }
    }

    /// Creates an engine from plugin configuration, or `None` when no field
    /// is configured.
    pub fn from_config(config: &LogPluginConfig) -> Option<Self> {
        if config.redacted_fields.is_empty() {
            return None;
        }
        Some(Self::new(
            &config.redacted_fields,
            config.redaction_replacement.clone(),
        ))
    }

    /// Redacts sensitive fields from a JSON value.
    pub fn redact(&self, value: &Value) -> Value {
        self.redact_internal(value).unwrap_or_else(|| value.clone())
    }

    fn is_sensitive(&self, key: &str) -> bool {
        let key_lower = key.to_lowercase();
        self.sensitive_fields_lower
            .iter()
            .any(|field| key_lower.contains(field.as_str()))
    }

    /// Returns `None` when nothing below `value` needed redaction.
    fn redact_internal(&self, value: &Value) -> Option<Value> {
        match value {
            Value::Object(map) => {
                let mut redacted = serde_json::Map::new();
                let mut any_changed = false;

                for (key, val) in map {
                    if self.is_sensitive(key) {
                        redacted.insert(key.clone(), Value::String(self.replacement.clone()));
                        any_changed = true;
                    } else if let Some(redacted_val) = self.redact_internal(val) {
                        redacted.insert(key.clone(), redacted_val);
                        any_changed = true;
                    } else {
                        redacted.insert(key.clone(), val.clone());
                    }
                }

                any_changed.then_some(Value::Object(redacted))
            }
            Value::Array(arr) => {
                let mut any_changed = false;
                let redacted: Vec<Value> = arr
                    .iter()
                    .map(|val| match self.redact_internal(val) {
                        Some(redacted_val) => {
                            any_changed = true;
                            redacted_val
                        }
                        None => val.clone(),
                    })
                    .collect();

                any_changed.then_some(Value::Array(redacted))
            }
            _ => None,
        }
    }
}
