//! Render Pipeline
//!
//! Connects invalidations to layout and paint, and the terminal to the
//! component tree.
//!
//! # Pipeline Architecture
//!
//! ```text
//! Broadcaster fires → component invalidates → RenderController queues
//!     → poll/flush → layout (top-down, per tree) → paint (per element)
//! ```
//!
//! ## Data Flow
//!
//! 1. **RenderController** - deduplicated layout/render queues, flush policy
//! 2. **ResizeBroadcaster** - viewport resize → roots queued for layout
//! 3. **Viewport** - terminal size held in signals, read by surfaces
//! 4. **mount** - crossterm event loop that feeds resizes and polls flushes

pub mod mount;
pub mod render_controller;
pub mod resize;
pub mod viewport;

pub use mount::{mount, route_event, run, tick, MountHandle};
pub use render_controller::{FlushStats, FlushTarget, RenderController, RenderPolicy};
pub use resize::ResizeBroadcaster;
pub use viewport::Viewport;
