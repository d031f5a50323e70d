//! Mount API - Binds a root component to the terminal and runs the loop.
//!
//! Mounting anchors the root to a [`TerminalSurface`] over the engine's
//! viewport and enables auto-resize. The loop then waits on crossterm
//! events, feeding resizes to the [`ResizeBroadcaster`], and polls the
//! scheduler so deferred flushes run when due.
//!
//! # Example
//!
//! ```ignore
//! use spark_plot::{mount, run, Engine, EngineConfig};
//!
//! let engine = Engine::new(EngineConfig::default())?;
//! let root = engine.tree().add_table(rows)?;
//!
//! let handle = mount(&engine, root)?;
//! run(&handle)?; // Blocks until Ctrl+C or handle.stop()
//! handle.unmount();
//! ```
//!
//! Ctrl+C arrives as a key event only while the host keeps the terminal in
//! raw mode; otherwise the default signal handling applies.

use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};

use super::render_controller::RenderController;
use super::resize::ResizeBroadcaster;
use crate::engine::{ComponentTree, Engine};
use crate::error::PlotResult;
use crate::surface::TerminalSurface;
use crate::types::ComponentId;

// =============================================================================
// Mount Handle
// =============================================================================

/// Handle returned by [`mount`].
///
/// Holds the scheduling context, the mounted root and the running flag
/// (cleared on Ctrl+C, [`stop`](Self::stop) or unmount).
pub struct MountHandle {
    tree: Rc<ComponentTree>,
    scheduler: Rc<RenderController>,
    resize: Rc<ResizeBroadcaster>,
    root: Option<ComponentId>,
    running: Arc<AtomicBool>,
    frame_interval: Duration,
}

impl MountHandle {
    pub fn root(&self) -> Option<ComponentId> {
        self.root
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop the loop. The root stays anchored until unmount.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Flag shared with other threads (signal handlers) that want to stop
    /// the loop.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    /// Stop and detach the root.
    pub fn unmount(mut self) {
        self.release();
    }

    fn release(&mut self) {
        self.stop();
        if let Some(root) = self.root.take() {
            if let Err(err) = self.tree.detach(root) {
                tracing::warn!(%err, "unmount failed to detach root");
            }
        }
    }
}

impl Drop for MountHandle {
    fn drop(&mut self) {
        self.release();
    }
}

// =============================================================================
// Mount Function
// =============================================================================

/// Mount `root` on the terminal.
///
/// This sets up:
/// 1. Terminal size detection into the engine's viewport
/// 2. Anchoring of `root` to a terminal surface (layout is queued)
/// 3. Auto-resize, so viewport changes relayout the root
pub fn mount(engine: &Engine, root: ComponentId) -> PlotResult<MountHandle> {
    let viewport = engine.viewport().clone();
    viewport.detect();

    let tree = engine.tree().clone();
    tree.auto_resize(root, true)?;
    tree.anchor(root, Rc::new(TerminalSurface::new(viewport)))?;

    Ok(MountHandle {
        tree,
        scheduler: engine.scheduler().clone(),
        resize: engine.resize_broadcaster().clone(),
        root: Some(root),
        running: Arc::new(AtomicBool::new(true)),
        frame_interval: engine.config().frame_interval,
    })
}

// =============================================================================
// Event Loop
// =============================================================================

/// Apply one terminal event. Returns whether it was consumed.
pub fn route_event(handle: &MountHandle, event: Event) -> bool {
    match event {
        Event::Resize(width, height) => {
            handle.resize.handle_resize(width, height);
            true
        }
        Event::Key(KeyEvent {
            code: KeyCode::Char('c'),
            modifiers,
            ..
        }) if modifiers.contains(KeyModifiers::CONTROL) => {
            handle.stop();
            true
        }
        _ => false,
    }
}

/// Run the event loop once.
///
/// Waits for a terminal event at most until the scheduler's next deadline
/// (capped at one frame), routes it, then polls the scheduler.
///
/// # Returns
///
/// * `Ok(true)` - Continue running
/// * `Ok(false)` - Stop requested (Ctrl+C pressed or `handle.stop()` called)
/// * `Err(e)` - Terminal I/O error or a failed flush
pub fn tick(handle: &MountHandle) -> PlotResult<bool> {
    if !handle.is_running() {
        return Ok(false);
    }

    let wait = handle
        .scheduler
        .next_deadline()
        .map(|due| due.saturating_duration_since(Instant::now()))
        .map_or(handle.frame_interval, |until| until.min(handle.frame_interval));

    if event::poll(wait)? {
        route_event(handle, event::read()?);
    }
    handle.scheduler.poll()?;

    Ok(handle.is_running())
}

/// Run the event loop until stopped.
pub fn run(handle: &MountHandle) -> PlotResult<()> {
    while tick(handle)? {}
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::engine::{Layoutable, RenderFrame};

    struct Blank;

    impl Layoutable for Blank {
        fn render(&mut self, _frame: &RenderFrame<'_>) -> PlotResult<()> {
            Ok(())
        }
    }

    fn mounted() -> (Engine, MountHandle) {
        let engine = Engine::new(EngineConfig::default()).unwrap();
        let root = engine.tree().add_element(Blank);
        let handle = mount(&engine, root).unwrap();
        (engine, handle)
    }

    #[test]
    fn test_mount_anchors_with_auto_resize() {
        let (engine, handle) = mounted();
        let root = handle.root().unwrap();
        assert!(engine.tree().is_anchored(root));
        assert!(engine.resize_broadcaster().is_registered(root));
        assert!(engine.scheduler().is_queued_for_layout(root));
    }

    #[test]
    fn test_resize_event_relayouts_root() {
        let (engine, handle) = mounted();
        engine.viewport().set_size(80, 24);
        engine.flush().unwrap();

        assert!(route_event(&handle, Event::Resize(120, 40)));
        assert_eq!(engine.viewport().width(), 120);
        assert!(engine.resize_broadcaster().resizing());

        engine.flush().unwrap();
        let root = handle.root().unwrap();
        assert_eq!(
            engine.tree().bounds(root).map(|b| b.size.width),
            Some(120.0)
        );
    }

    #[test]
    fn test_ctrl_c_stops() {
        let (_engine, handle) = mounted();
        assert!(!route_event(
            &handle,
            Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE))
        ));
        assert!(handle.is_running());

        assert!(route_event(
            &handle,
            Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL))
        ));
        assert!(!handle.is_running());
        assert!(!tick(&handle).unwrap());
    }

    #[test]
    fn test_unmount_detaches() {
        let (engine, handle) = mounted();
        let root = handle.root().unwrap();
        handle.unmount();
        assert!(!engine.tree().is_anchored(root));
        assert!(!engine.resize_broadcaster().is_registered(root));
        assert!(!engine.scheduler().has_pending());
    }
}
