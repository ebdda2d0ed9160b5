//! Request and pipeline state types
//!
//! [`Request`] keeps the three fields the log plugin projects (`url`, `query`,
//! `payload`) and the `silent` flag as typed members. Everything else a host
//! attaches travels in [`Request::extra`] and is flattened back on
//! serialization, so debug output shows the request exactly as the host built it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RequestError;

/// A request travelling through the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Target URL
    #[serde(default)]
    pub url: String,
    /// Query parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Value>,
    /// Request body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    /// Suppress info/error level logging for this request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub silent: Option<bool>,
    /// Host-specific fields, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Request {
    /// Creates a request for the given URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Sets the query parameters.
    pub fn with_query(mut self, query: Value) -> Self {
        self.query = Some(query);
        self
    }

    /// Sets the request body.
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Sets the silent flag.
    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = Some(silent);
        self
    }

    /// Attaches an additional host-specific field.
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Returns true when info/error logging is suppressed. Absent means false.
    pub fn is_silent(&self) -> bool {
        self.silent.unwrap_or(false)
    }
}

/// Pipeline state for one request: the request and, once it failed, the error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Current request
    pub request: Request,
    /// Failure recorded by the host, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RequestError>,
}

impl State {
    /// Creates a state holding the given request and no error.
    pub fn new(request: Request) -> Self {
        Self {
            request,
            error: None,
        }
    }

    /// Sets the recorded failure.
    pub fn with_error(mut self, error: RequestError) -> Self {
        self.error = Some(error);
        self
    }
}
