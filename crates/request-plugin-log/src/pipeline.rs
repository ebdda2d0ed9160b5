//! Sequential pipeline driver
//!
//! Runs one lifecycle phase across an ordered list of plugins. Each plugin
//! receives a [`Next`](crate::Next) continuation; the driver moves on to the
//! following plugin only once the continuation was called.
//!
//! # Example
//! ```rust,ignore
//! let pipeline = Pipeline::new()
//!     .plugin(LogPlugin::new(LogPluginConfig::new().with_name("api")))
//!     .plugin(Tagger);
//!
//! let mut ctx = Context::new(Request::new("/users"));
//! pipeline.init(&mut ctx)?;
//! // ... host performs the request ...
//! pipeline.complete(&mut ctx)?;
//! ```

use std::cell::Cell;
use std::sync::Arc;

use crate::context::RequestContext;
use crate::error::{PipelineError, PipelineResult};
use crate::plugin::{Phase, Plugin, dispatch};

/// Ordered list of plugins driven phase by phase.
#[derive(Clone, Default)]
pub struct Pipeline {
    plugins: Vec<Arc<dyn Plugin>>,
}

impl Pipeline {
    /// Creates an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a plugin. Plugins run in registration order.
    pub fn plugin<P: Plugin + 'static>(mut self, plugin: P) -> Self {
        self.plugins.push(Arc::new(plugin));
        self
    }

    /// Appends a shared plugin.
    pub fn shared_plugin(mut self, plugin: Arc<dyn Plugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    /// Number of registered plugins.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Returns true if no plugin is registered.
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Runs `phase` across all plugins.
    ///
    /// The context's status is checked and advanced before any hook runs, so
    /// hooks observe the status of the phase they belong to. Stops at the
    /// first plugin that returns without calling `next`.
    pub fn run(&self, phase: Phase, ctx: &mut dyn RequestContext) -> PipelineResult<()> {
        let from = ctx.status();
        let to = phase.target_status();
        if !from.can_transition_to(to) {
            return Err(PipelineError::InvalidTransition { from, to });
        }
        ctx.set_status(to);

        for (plugin_index, plugin) in self.plugins.iter().enumerate() {
            let proceed = Cell::new(false);
            tracing::trace!(phase = %phase, plugin_index, "Dispatching hook");

            dispatch(plugin.as_ref(), phase, ctx, Box::new(|| proceed.set(true)));

            if !proceed.get() {
                tracing::debug!(phase = %phase, plugin_index, "Plugin halted pipeline");
                return Err(PipelineError::Halted {
                    plugin_index,
                    phase: phase.as_str(),
                });
            }
        }

        Ok(())
    }

    /// Runs the `init` phase.
    pub fn init(&self, ctx: &mut dyn RequestContext) -> PipelineResult<()> {
        self.run(Phase::Init, ctx)
    }

    /// Runs the `complete` phase.
    pub fn complete(&self, ctx: &mut dyn RequestContext) -> PipelineResult<()> {
        self.run(Phase::Complete, ctx)
    }

    /// Runs the `error` phase.
    pub fn error(&self, ctx: &mut dyn RequestContext) -> PipelineResult<()> {
        self.run(Phase::Error, ctx)
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("plugins", &self.plugins.len())
            .finish()
    }
}
