//! Plot Engine - Component arena, lifecycle and scheduling context.
//!
//! The engine bundles the three long-lived objects a plot needs:
//! - [`RenderController`]: batches layout/render work and flushes it
//! - [`ResizeBroadcaster`]: fans viewport resizes out to root components
//! - [`ComponentTree`]: owns every component, keyed by [`ComponentId`]
//!
//! # Architecture
//!
//! Components are NOT objects holding each other. They are slots in an arena:
//!
//! ```text
//! #0 Table (parent=-, children=[#1, #2, #3])
//! #1 Axis  (parent=#0, fixed width)
//! #2 Plot  (parent=#0, greedy)
//! #3 Label (parent=#0, fixed height)
//! ```
//!
//! Parent/child links and listener registrations are ids, so there are no
//! reference cycles and a detached node can never be reached by a stale
//! callback.

pub(crate) mod binding;
pub(crate) mod component;
pub(crate) mod registry;
mod tree;

use std::rc::Rc;

pub use component::{Layoutable, RenderFrame};
pub use tree::ComponentTree;

use crate::config::EngineConfig;
use crate::error::PlotResult;
use crate::pipeline::{FlushStats, RenderController, ResizeBroadcaster, Viewport};

/// One independent plotting context.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    scheduler: Rc<RenderController>,
    resize: Rc<ResizeBroadcaster>,
    tree: Rc<ComponentTree>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> PlotResult<Self> {
        let scheduler = Rc::new(RenderController::from_config(&config)?);
        let (width, height) = config.initial_viewport;
        let resize = Rc::new(ResizeBroadcaster::new(
            &scheduler,
            Viewport::new(width, height),
        ));
        let tree = ComponentTree::new(&scheduler, &resize, config.table_iteration_limit);
        tracing::debug!(policy = ?config.render_policy, "engine created");
        Ok(Self {
            config,
            scheduler,
            resize,
            tree,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn tree(&self) -> &Rc<ComponentTree> {
        &self.tree
    }

    pub fn scheduler(&self) -> &Rc<RenderController> {
        &self.scheduler
    }

    pub fn resize_broadcaster(&self) -> &Rc<ResizeBroadcaster> {
        &self.resize
    }

    pub fn viewport(&self) -> &Viewport {
        self.resize.viewport()
    }

    /// Run all pending work now.
    pub fn flush(&self) -> PlotResult<FlushStats> {
        self.scheduler.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::RenderPolicy;

    #[test]
    fn test_engine_wires_tree_to_scheduler() {
        let engine = Engine::new(EngineConfig::default()).unwrap();
        assert_eq!(engine.scheduler().policy(), RenderPolicy::AnimationFrame);
        assert_eq!(engine.viewport().width(), 80);
        assert_eq!(engine.tree().len(), 0);
        assert_eq!(engine.flush().unwrap(), FlushStats::default());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EngineConfig::default().with_table_iteration_limit(0);
        assert!(Engine::new(config).is_err());
    }

    #[test]
    fn test_engines_are_independent() {
        let a = Engine::new(EngineConfig::default()).unwrap();
        let b = Engine::new(EngineConfig::default()).unwrap();
        a.resize_broadcaster().handle_resize(10, 10);
        assert_eq!(b.viewport().width(), 80);
    }
}
