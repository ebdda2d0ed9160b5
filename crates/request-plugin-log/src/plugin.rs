//! Plugin contract for lifecycle hooks

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::context::{LifecycleStatus, RequestContext};

/// Continuation handed to every hook.
///
/// A hook signals the pipeline to move on by calling it. `FnOnce` makes a
/// second call impossible; a hook that returns without calling it halts the
/// pipeline.
pub type Next<'a> = Box<dyn FnOnce() + 'a>;

/// Lifecycle phase a hook belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Request entered the pipeline
    Init,
    /// Request finished successfully
    Complete,
    /// Request failed
    Error,
}

impl Phase {
    /// Hook name, also used as the log message.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Complete => "complete",
            Self::Error => "error",
        }
    }

    /// Status a context is in once this phase ran.
    pub fn target_status(&self) -> LifecycleStatus {
        match self {
            Self::Init => LifecycleStatus::Started,
            Self::Complete => LifecycleStatus::Completed,
            Self::Error => LifecycleStatus::Failed,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit exposing lifecycle hooks to the pipeline.
///
/// Every hook must call `next` exactly once before returning. The default
/// bodies only pass control on, so a plugin implements just the hooks it
/// cares about.
///
/// # Example
/// ```rust,ignore
/// struct Tagger;
///
/// impl Plugin for Tagger {
///     fn init(&self, ctx: &mut dyn RequestContext, next: Next<'_>) {
///         ctx.update_external_meta("tag", json!({ "source": "tagger" }));
///         next();
///     }
/// }
/// ```
pub trait Plugin: Send + Sync {
    /// Called when a request enters the pipeline.
    fn init(&self, _ctx: &mut dyn RequestContext, next: Next<'_>) {
        next();
    }

    /// Called when a request finished successfully.
    fn complete(&self, _ctx: &mut dyn RequestContext, next: Next<'_>) {
        next();
    }

    /// Called when a request failed.
    fn error(&self, _ctx: &mut dyn RequestContext, next: Next<'_>) {
        next();
    }
}

/// Invokes the hook of `plugin` matching `phase`.
pub fn dispatch(plugin: &dyn Plugin, phase: Phase, ctx: &mut dyn RequestContext, next: Next<'_>) {
    match phase {
        Phase::Init => plugin.init(ctx, next),
        Phase::Complete => plugin.complete(ctx, next),
        Phase::Error => plugin.error(ctx, next),
    }
}
