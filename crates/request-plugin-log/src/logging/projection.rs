//! Field projection for info and error output.

use serde_json::{Map, Value};

use super::redaction::RedactionEngine;
use crate::request::Request;

/// Selects `url`, `query` and `payload` from a request.
///
/// Absent `query` or `payload` are left out of the object. No other request
/// field is ever copied.
pub fn project(request: &Request) -> Value {
    project_with(request, None)
}

/// Like [`project`], passing `query` and `payload` through `redaction`.
pub fn project_with(request: &Request, redaction: Option<&RedactionEngine>) -> Value {
    let scrub = |value: &Value| match redaction {
        Some(engine) => engine.redact(value),
        None => value.clone(),
    };

    let mut fields = Map::new();
    fields.insert("url".to_string(), Value::String(request.url.clone()));
    if let Some(query) = &request.query {
        fields.insert("query".to_string(), scrub(query));
    }
    if let Some(payload) = &request.payload {
        fields.insert("payload".to_string(), scrub(payload));
    }
    Value::Object(fields)
}
