//! # spark-plot
//!
//! Layout negotiation, domain computation and render scheduling for
//! terminal plots.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for the
//! viewport size and [crossterm](https://github.com/crossterm-rs/crossterm)
//! for the terminal.
//!
//! ## Architecture
//!
//! A plot is a tree of components held in an arena. Leaves are caller-supplied
//! [`Layoutable`] elements; groups overlay their children and tables allocate
//! a 2-D grid. Scales turn data values into positions; their domains are
//! derived from the extents that datasets project onto them.
//!
//! ```text
//! Dataset/Scale change → Broadcaster → component invalidated
//!     → RenderController queue → flush → layout (top-down) → paint
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Ids, space requests, bounds, alignment, flags
//! - [`broadcast`] - Per-entity listener hubs
//! - [`engine`] - Component arena, lifecycle, [`Engine`] context
//! - [`layout`] - Group overlay and Table fixed-point allocation
//! - [`scale`] - Quantitative/ordinal scales and the [`Domainer`]
//! - [`data`] - Datasets, accessors and perspectives
//! - [`pipeline`] - Scheduler, resize fan-out, viewport and mount loop

pub mod broadcast;
pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod layout;
pub mod pipeline;
pub mod scale;
pub mod surface;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use broadcast::{Broadcaster, Listenable, Listener, ListenerKey};

pub use config::EngineConfig;

pub use error::{Axis, ErrorKind, PlotError, PlotResult};

pub use engine::{ComponentTree, Engine, Layoutable, RenderFrame};

pub use layout::{Sizer, TableGrid, TableLayout, MAX_LAYOUT_ITERATIONS};

pub use scale::{
    DomainSource, Domainer, Extent, ExtentKey, ExtentRegistry, OrdinalScale,
    QuantitativeScale, RangeType, Scale, ScaleDomainCoordinator, ScaleTransform,
    DEFAULT_PAD_PROPORTION,
};

pub use data::{
    datum, Accessor, AppliedAccessor, DataExtent, Dataset, Datum, Metadata, Perspective, Value,
};

pub use pipeline::{
    mount, route_event, run, tick, FlushStats, FlushTarget, MountHandle, RenderController,
    RenderPolicy, ResizeBroadcaster, Viewport,
};

pub use surface::{FixedSurface, Surface, TerminalSurface};
