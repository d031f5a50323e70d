//! Listener bindings - a component's subscriptions to external broadcasters.
//!
//! Bindings are declared once and follow the anchor state: they register
//! when the component is anchored and deregister when it is detached, so a
//! torn-down node never receives a stale callback.

use std::rc::{Rc, Weak};

use crate::broadcast::{Listenable, ListenerKey};
use crate::pipeline::RenderController;
use crate::types::{ComponentId, Invalidation};

pub(crate) trait ListenerBinding {
    fn attach(&self, id: ComponentId, scheduler: &Rc<RenderController>);
    fn detach(&self, id: ComponentId);
}

/// Invalidate a component whenever `L` broadcasts.
pub(crate) struct BroadcastBinding<L: Listenable> {
    source: Weak<L>,
    invalidation: Invalidation,
}

impl<L: Listenable> BroadcastBinding<L> {
    pub fn new(source: &Rc<L>, invalidation: Invalidation) -> Self {
        Self {
            source: Rc::downgrade(source),
            invalidation,
        }
    }
}

impl<L: Listenable> ListenerBinding for BroadcastBinding<L> {
    fn attach(&self, id: ComponentId, scheduler: &Rc<RenderController>) {
        let Some(source) = self.source.upgrade() else {
            return;
        };
        let scheduler = Rc::downgrade(scheduler);
        let invalidation = self.invalidation;
        source
            .broadcaster()
            .register_listener(ListenerKey::Component(id), move |_: &L, _: &L::Args| {
                if let Some(scheduler) = scheduler.upgrade() {
                    match invalidation {
                        Invalidation::Render => scheduler.register_to_render(id),
                        Invalidation::Layout => scheduler.register_to_compute_layout(id),
                    }
                }
                Ok(())
            });
    }

    fn detach(&self, id: ComponentId) {
        if let Some(source) = self.source.upgrade() {
            source
                .broadcaster()
                .deregister_listener(&ListenerKey::Component(id));
        }
    }
}
