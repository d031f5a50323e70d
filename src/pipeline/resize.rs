//! ResizeBroadcaster - Fans viewport resizes out to root components.
//!
//! Roots that opted into auto-resize are queued for layout whenever the
//! viewport changes size. While that relayout is pending, [`resizing`]
//! reports true so elements can skip animations; the flag clears when the
//! next flush completes.
//!
//! [`resizing`]: ResizeBroadcaster::resizing

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use indexmap::IndexSet;

use super::render_controller::RenderController;
use super::viewport::Viewport;
use crate::broadcast::{Listenable, ListenerKey};
use crate::types::ComponentId;

pub struct ResizeBroadcaster {
    scheduler: Rc<RenderController>,
    viewport: Viewport,
    roots: RefCell<IndexSet<ComponentId>>,
    resizing: Rc<Cell<bool>>,
    subscribed: Cell<bool>,
}

impl std::fmt::Debug for ResizeBroadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResizeBroadcaster")
            .field("viewport", &self.viewport)
            .field("roots", &self.roots.borrow())
            .field("resizing", &self.resizing.get())
            .finish()
    }
}

impl ResizeBroadcaster {
    pub fn new(scheduler: &Rc<RenderController>, viewport: Viewport) -> Self {
        Self {
            scheduler: scheduler.clone(),
            viewport,
            roots: RefCell::new(IndexSet::new()),
            resizing: Rc::new(Cell::new(false)),
            subscribed: Cell::new(false),
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// A resize-triggered relayout has not been flushed yet.
    pub fn resizing(&self) -> bool {
        self.resizing.get()
    }

    fn flush_key(&self) -> ListenerKey {
        ListenerKey::identity(&self.resizing)
    }

    /// Add a root to the fan-out. The flush subscription is made on first use.
    pub fn register(&self, root: ComponentId) {
        if !self.subscribed.replace(true) {
            let resizing = self.resizing.clone();
            self.scheduler
                .broadcaster()
                .register_listener(self.flush_key(), move |_, _| {
                    resizing.set(false);
                    Ok(())
                });
        }
        self.roots.borrow_mut().insert(root);
    }

    pub fn deregister(&self, root: ComponentId) -> bool {
        self.roots.borrow_mut().shift_remove(&root)
    }

    pub fn is_registered(&self, root: ComponentId) -> bool {
        self.roots.borrow().contains(&root)
    }

    pub fn roots(&self) -> Vec<ComponentId> {
        self.roots.borrow().iter().copied().collect()
    }

    /// Deliver a viewport resize: update the size signals and queue every
    /// registered root for layout.
    pub fn handle_resize(&self, width: u16, height: u16) {
        self.viewport.set_size(width, height);
        let roots = self.roots();
        if roots.is_empty() {
            return;
        }
        tracing::debug!(width, height, roots = roots.len(), "viewport resized");
        self.resizing.set(true);
        for root in roots {
            self.scheduler.register_to_compute_layout(root);
        }
    }
}

impl Drop for ResizeBroadcaster {
    fn drop(&mut self) {
        if self.subscribed.get() {
            self.scheduler.broadcaster().deregister_listener(&self.flush_key());
        }
    }
}
