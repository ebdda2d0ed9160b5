//! Per-request context
//!
//! [`RequestContext`] is the contract a host pipeline exposes to plugins.
//! [`Context`] is the in-memory implementation used by the bundled
//! [`Pipeline`](crate::Pipeline) and by tests.
//!
//! External metadata is a map from metatype key to an arbitrary JSON value.
//! Updates shallow-merge: keys already stored under a metatype survive unless
//! the update overwrites them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::RequestError;
use crate::request::{Request, State};

/// Where a request is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleStatus {
    /// No hook has run yet
    #[default]
    New,
    /// `init` ran
    Started,
    /// `complete` ran
    Completed,
    /// `error` ran
    Failed,
}

impl LifecycleStatus {
    /// Returns true for `Completed` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Checks whether `self -> next` is a legal move.
    ///
    /// `New -> Failed` is allowed because a host may fail a request before
    /// any `init` hook ran.
    pub fn can_transition_to(&self, next: LifecycleStatus) -> bool {
        matches!(
            (self, next),
            (Self::New, Self::Started)
                | (Self::New, Self::Failed)
                | (Self::Started, Self::Completed)
                | (Self::Started, Self::Failed)
        )
    }
}

impl fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => write!(f, "new"),
            Self::Started => write!(f, "started"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Host contract consumed by plugins.
pub trait RequestContext {
    /// Current pipeline state.
    fn state(&self) -> &State;

    /// Current request.
    fn request(&self) -> &Request {
        &self.state().request
    }

    /// Value stored under one metatype key.
    fn external_meta(&self, key: &str) -> Option<&Value>;

    /// The whole external metadata map.
    fn external_meta_map(&self) -> &Map<String, Value>;

    /// Shallow-merges `partial` into the value at `key`, creating it if absent.
    fn update_external_meta(&mut self, key: &str, partial: Value);

    /// Diagnostic metadata, not meant for other plugins.
    fn internal_meta_map(&self) -> &Map<String, Value>;

    /// Lifecycle status tracked by the host.
    fn status(&self) -> LifecycleStatus;

    /// Records a new lifecycle status.
    fn set_status(&mut self, status: LifecycleStatus);
}

/// Merges `partial` into `slot`.
///
/// When both sides are objects, keys from `partial` overwrite and all other
/// keys are kept. Any other combination replaces the slot.
pub fn merge_meta(slot: &mut Value, partial: Value) {
    match (slot, partial) {
        (Value::Object(existing), Value::Object(incoming)) => {
            for (key, value) in incoming {
                existing.insert(key, value);
            }
        }
        (slot, partial) => *slot = partial,
    }
}

/// In-memory request context.
#[derive(Debug, Clone, Default)]
pub struct Context {
    state: State,
    external_meta: Map<String, Value>,
    internal_meta: Map<String, Value>,
    status: LifecycleStatus,
}

impl Context {
    /// Creates a context for the given request.
    pub fn new(request: Request) -> Self {
        Self {
            state: State::new(request),
            ..Self::default()
        }
    }

    /// Replaces the pipeline state.
    pub fn set_state(&mut self, state: State) {
        self.state = state;
    }

    /// Records a failure on the state.
    pub fn set_error(&mut self, error: RequestError) {
        self.state.error = Some(error);
    }

    /// Shallow-merges `partial` into the internal metadata slot at `key`.
    pub fn update_internal_meta(&mut self, key: &str, partial: Value) {
        match self.internal_meta.get_mut(key) {
            Some(slot) => merge_meta(slot, partial),
            None => {
                self.internal_meta.insert(key.to_string(), partial);
            }
        }
    }
}

impl RequestContext for Context {
    fn state(&self) -> &State {
        &self.state
    }

    fn external_meta(&self, key: &str) -> Option<&Value> {
        self.external_meta.get(key)
    }

    fn external_meta_map(&self) -> &Map<String, Value> {
        &self.external_meta
    }

    fn update_external_meta(&mut self, key: &str, partial: Value) {
        match self.external_meta.get_mut(key) {
            Some(slot) => merge_meta(slot, partial),
            None => {
                self.external_meta.insert(key.to_string(), partial);
            }
        }
    }

    fn internal_meta_map(&self) -> &Map<String, Value> {
        &self.internal_meta
    }

    fn status(&self) -> LifecycleStatus {
        self.status
    }

    fn set_status(&mut self, status: LifecycleStatus) {
        self.status = status;
    }
}
