//! RenderController - Batching scheduler for layout and render work.
//!
//! Components register themselves when they need a relayout or a repaint.
//! Both queues are insertion-ordered and deduplicated by id; a flush
//! snapshots and clears them, lays out every queued tree, then paints.
//!
//! # Policies
//!
//! - **Immediate**: flush on registration. Registrations made while a flush
//!   is running are flushed in a follow-up round before it returns.
//! - **AnimationFrame**: defer to the next frame boundary.
//! - **Timeout**: defer by a fixed delay.
//!
//! Deferred policies only *arm* a deadline; the host loop calls
//! [`poll`](RenderController::poll) and the flush runs once it is due. Every
//! registration made before the deadline coalesces into the same flush.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

use indexmap::IndexSet;

use crate::broadcast::{Broadcaster, Listenable};
use crate::config::{EngineConfig, DEFAULT_FRAME_INTERVAL, DEFAULT_TIMEOUT};
use crate::error::{PlotError, PlotResult};
use crate::types::ComponentId;

/// Follow-up rounds an Immediate flush runs for work queued by its own
/// elements. Work left after the last round stays armed for `poll`.
const MAX_IMMEDIATE_ROUNDS: usize = 16;

// =============================================================================
// Policy / Target
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderPolicy {
    Immediate,
    #[default]
    AnimationFrame,
    Timeout,
}

/// What a flush drives. Implemented by the component tree.
pub trait FlushTarget {
    /// Still present and anchored.
    fn is_live(&self, id: ComponentId) -> bool;

    /// Lay out the whole tree containing `id`. Returns every id laid out.
    fn layout_pass(&self, id: ComponentId) -> PlotResult<Vec<ComponentId>>;

    /// `id` and its descendants in paint order.
    fn subtree(&self, id: ComponentId) -> Vec<ComponentId>;

    fn paint(&self, id: ComponentId) -> PlotResult<()>;
}

/// Counts from one flush, broadcast through `on_flush`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlushStats {
    /// Layout passes run (one per tree).
    pub laid_out: usize,
    pub painted: usize,
    /// Queued ids that were no longer live.
    pub skipped: usize,
}

// =============================================================================
// Controller
// =============================================================================

pub struct RenderController {
    policy: Cell<RenderPolicy>,
    frame_interval: Duration,
    timeout: Duration,
    epoch: Instant,
    layout_queue: RefCell<IndexSet<ComponentId>>,
    render_queue: RefCell<IndexSet<ComponentId>>,
    deadline: Cell<Option<Instant>>,
    flushing: Cell<bool>,
    target: RefCell<Option<Weak<dyn FlushTarget>>>,
    on_flush: Broadcaster<RenderController, FlushStats>,
}

impl std::fmt::Debug for RenderController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderController")
            .field("policy", &self.policy.get())
            .field("layout_queue", &self.layout_queue.borrow())
            .field("render_queue", &self.render_queue.borrow())
            .field("deadline", &self.deadline.get())
            .field("flushing", &self.flushing.get())
            .finish()
    }
}

impl Default for RenderController {
    fn default() -> Self {
        Self::new(RenderPolicy::default())
    }
}

impl RenderController {
    pub fn new(policy: RenderPolicy) -> Self {
        Self::with_timings(policy, DEFAULT_FRAME_INTERVAL, DEFAULT_TIMEOUT)
    }

    pub fn from_config(config: &EngineConfig) -> PlotResult<Self> {
        config.validate()?;
        Ok(Self::with_timings(
            config.render_policy,
            config.frame_interval,
            config.timeout,
        ))
    }

    fn with_timings(policy: RenderPolicy, frame_interval: Duration, timeout: Duration) -> Self {
        Self {
            policy: Cell::new(policy),
            frame_interval,
            timeout,
            epoch: Instant::now(),
            layout_queue: RefCell::new(IndexSet::new()),
            render_queue: RefCell::new(IndexSet::new()),
            deadline: Cell::new(None),
            flushing: Cell::new(false),
            target: RefCell::new(None),
            on_flush: Broadcaster::new(),
        }
    }

    /// Attach the tree that flushes act on.
    pub fn set_target(&self, target: Weak<dyn FlushTarget>) {
        *self.target.borrow_mut() = Some(target);
    }

    pub fn policy(&self) -> RenderPolicy {
        self.policy.get()
    }

    /// Switching to Immediate with work pending flushes it now.
    pub fn set_render_policy(&self, policy: RenderPolicy) -> PlotResult<()> {
        self.policy.set(policy);
        if policy == RenderPolicy::Immediate && self.has_pending() {
            self.flush()?;
        }
        Ok(())
    }

    // =========================================================================
    // Registration
    // =========================================================================

    pub fn register_to_render(&self, id: ComponentId) {
        tracing::trace!(%id, "queued for render");
        self.render_queue.borrow_mut().insert(id);
        self.schedule();
    }

    pub fn register_to_compute_layout(&self, id: ComponentId) {
        tracing::trace!(%id, "queued for layout");
        self.layout_queue.borrow_mut().insert(id);
        self.schedule();
    }

    /// Drop `id` from both queues.
    pub fn purge(&self, id: ComponentId) {
        self.layout_queue.borrow_mut().shift_remove(&id);
        self.render_queue.borrow_mut().shift_remove(&id);
    }

    pub fn is_queued_for_layout(&self, id: ComponentId) -> bool {
        self.layout_queue.borrow().contains(&id)
    }

    pub fn is_queued_for_render(&self, id: ComponentId) -> bool {
        self.render_queue.borrow().contains(&id)
    }

    pub fn has_pending(&self) -> bool {
        !self.layout_queue.borrow().is_empty() || !self.render_queue.borrow().is_empty()
    }

    fn schedule(&self) {
        let now = Instant::now();
        match self.policy.get() {
            RenderPolicy::Immediate if self.flushing.get() => self.arm(now),
            RenderPolicy::Immediate => {
                if let Err(err) = self.flush() {
                    tracing::error!(%err, "immediate flush failed");
                }
            }
            RenderPolicy::AnimationFrame => self.arm(self.next_frame(now)),
            RenderPolicy::Timeout => self.arm(now + self.timeout),
        }
    }

    /// Keep an earlier deadline; registrations coalesce into it.
    fn arm(&self, due: Instant) {
        if self.deadline.get().is_none() {
            self.deadline.set(Some(due));
        }
    }

    /// First frame boundary strictly after `now`.
    fn next_frame(&self, now: Instant) -> Instant {
        let interval = self.frame_interval.as_nanos().max(1);
        let elapsed = now.saturating_duration_since(self.epoch).as_nanos();
        let frames = elapsed / interval + 1;
        self.epoch + Duration::from_nanos((frames * interval) as u64)
    }

    /// Run `f` with registrations deferred exactly as during a flush, so code
    /// that calls into elements never re-enters a flush. Work queued
    /// meanwhile is flushed afterwards under the Immediate policy.
    pub(crate) fn exclusive<R>(&self, f: impl FnOnce() -> R) -> R {
        if self.flushing.replace(true) {
            return f();
        }
        let out = f();
        self.flushing.set(false);
        if self.policy.get() == RenderPolicy::Immediate && self.has_pending() {
            if let Err(err) = self.flush() {
                tracing::error!(%err, "immediate flush failed");
            }
        }
        out
    }

    // =========================================================================
    // Polling
    // =========================================================================

    /// When the armed flush is due, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadline.get()
    }

    pub fn poll(&self) -> PlotResult<Option<FlushStats>> {
        self.poll_at(Instant::now())
    }

    /// Flush if the armed deadline is at or before `now`.
    pub fn poll_at(&self, now: Instant) -> PlotResult<Option<FlushStats>> {
        match self.deadline.get() {
            Some(due) if due <= now => self.flush().map(Some),
            _ => Ok(None),
        }
    }

    // =========================================================================
    // Flush
    // =========================================================================

    /// Run all queued work synchronously.
    ///
    /// Layout for every queued tree completes before any paint. Ids that were
    /// detached since they were queued are skipped. Work registered while the
    /// flush runs waits for the next round; under Immediate that round runs
    /// before `flush` returns. The first failure is returned after the
    /// remaining work has run; later failures are logged.
    pub fn flush(&self) -> PlotResult<FlushStats> {
        if self.flushing.get() {
            return Ok(FlushStats::default());
        }
        let Some(target) = self.target.borrow().as_ref().and_then(Weak::upgrade) else {
            return Ok(FlushStats::default());
        };
        let mut stats = self.flush_round(target.as_ref())?;
        let mut rounds = 1;
        while self.policy.get() == RenderPolicy::Immediate && self.has_pending() {
            if rounds == MAX_IMMEDIATE_ROUNDS {
                tracing::warn!(rounds, "immediate flush still has work, deferring to poll");
                break;
            }
            let round = self.flush_round(target.as_ref())?;
            stats.laid_out += round.laid_out;
            stats.painted += round.painted;
            stats.skipped += round.skipped;
            rounds += 1;
        }
        Ok(stats)
    }

    fn flush_round(&self, target: &dyn FlushTarget) -> PlotResult<FlushStats> {
        self.deadline.set(None);
        let layout = std::mem::take(&mut *self.layout_queue.borrow_mut());
        let render = std::mem::take(&mut *self.render_queue.borrow_mut());
        if layout.is_empty() && render.is_empty() {
            return Ok(FlushStats::default());
        }

        self.flushing.set(true);
        let mut stats = FlushStats::default();
        let mut errors: Vec<PlotError> = Vec::new();
        let mut to_paint: IndexSet<ComponentId> = IndexSet::new();

        for id in layout {
            if !target.is_live(id) {
                stats.skipped += 1;
                continue;
            }
            if to_paint.contains(&id) {
                continue;
            }
            match target.layout_pass(id) {
                Ok(ids) => {
                    stats.laid_out += 1;
                    to_paint.extend(ids);
                }
                Err(err) => errors.push(err),
            }
        }

        for id in render {
            if target.is_live(id) {
                to_paint.extend(target.subtree(id));
            } else {
                stats.skipped += 1;
            }
        }

        for id in to_paint {
            if !target.is_live(id) {
                stats.skipped += 1;
                continue;
            }
            match target.paint(id) {
                Ok(()) => stats.painted += 1,
                Err(err) => errors.push(err),
            }
        }

        self.flushing.set(false);
        tracing::debug!(
            laid_out = stats.laid_out,
            painted = stats.painted,
            skipped = stats.skipped,
            failed = errors.len(),
            "flush"
        );

        let broadcast = self.on_flush.broadcast(self, &stats);

        let mut errors = errors.into_iter();
        if let Some(first) = errors.next() {
            for err in errors {
                tracing::error!(%err, "flush failure");
            }
            return Err(first);
        }
        broadcast.map(|()| stats)
    }
}

impl Listenable for RenderController {
    type Args = FlushStats;

    /// Fires after every flush that did work.
    fn broadcaster(&self) -> &Broadcaster<Self, FlushStats> {
        &self.on_flush
    }
}
