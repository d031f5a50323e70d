//! Component nodes and the [`Layoutable`] capability.
//!
//! Leaves carry a boxed [`Layoutable`] supplied by the caller (plots, axes,
//! labels). Groups and tables are built-in node kinds whose negotiation lives
//! in [`crate::layout`].

use std::rc::Rc;

use super::binding::ListenerBinding;
use crate::error::PlotResult;
use crate::layout::table::TableGrid;
use crate::surface::Surface;
use crate::types::{Bounds, ComponentFlags, ComponentId, Size, SpaceRequest};

// =============================================================================
// Layoutable
// =============================================================================

/// What a visual element implements to take part in layout and rendering.
///
/// `requested_space` must be monotonic: offering more space never raises the
/// reported minimum.
pub trait Layoutable {
    /// Minimum space needed inside `offered`, and whether more would be used.
    fn requested_space(&self, offered: Size<f64>) -> SpaceRequest {
        let _ = offered;
        SpaceRequest::NONE
    }

    fn is_fixed_width(&self) -> bool {
        false
    }

    fn is_fixed_height(&self) -> bool {
        false
    }

    /// One-time preparation when first anchored.
    fn setup(&mut self, surface: &dyn Surface) -> PlotResult<()> {
        let _ = surface;
        Ok(())
    }

    /// Draw at the already computed position. Never renegotiates layout.
    fn render(&mut self, frame: &RenderFrame<'_>) -> PlotResult<()>;
}

/// Stands in for an element while its own code runs outside the registry
/// borrow. Re-entrant calls on the same element see an empty leaf.
pub(crate) struct Lent;

impl Layoutable for Lent {
    fn render(&mut self, _frame: &RenderFrame<'_>) -> PlotResult<()> {
        Ok(())
    }
}

/// Everything an element needs to draw itself.
pub struct RenderFrame<'a> {
    pub id: ComponentId,
    /// Absolute position and size on the surface.
    pub bounds: Bounds,
    pub surface: &'a dyn Surface,
    /// A viewport resize is being laid out; skip animations.
    pub resizing: bool,
}

// =============================================================================
// Component Node
// =============================================================================

pub(crate) enum ComponentKind {
    Element(Box<dyn Layoutable>),
    Group,
    Table(TableGrid),
}

impl ComponentKind {
    pub(crate) fn is_container(&self) -> bool {
        !matches!(self, ComponentKind::Element(_))
    }
}

pub(crate) struct Component {
    pub name: Option<String>,
    pub parent: Option<ComponentId>,
    /// Groups: overlay order. Tables: occupied cells, row-major.
    pub children: Vec<ComponentId>,
    pub kind: ComponentKind,
    pub x_align: f64,
    pub y_align: f64,
    pub x_offset: f64,
    pub y_offset: f64,
    pub flags: ComponentFlags,
    /// Roots only.
    pub surface: Option<Rc<dyn Surface>>,
    /// Roots only; overrides the surface measurement.
    pub explicit_size: Option<Size<f64>>,
    pub cached_request: Option<(Size<f64>, SpaceRequest)>,
    /// Relative to the parent.
    pub bounds: Option<Bounds>,
    pub bindings: Vec<Rc<dyn ListenerBinding>>,
}

impl Component {
    pub(crate) fn new(kind: ComponentKind) -> Self {
        let mut flags = ComponentFlags::NONE;
        if let ComponentKind::Element(element) = &kind {
            flags.set(ComponentFlags::FIXED_WIDTH, element.is_fixed_width());
            flags.set(ComponentFlags::FIXED_HEIGHT, element.is_fixed_height());
        }
        Self {
            name: None,
            parent: None,
            children: Vec::new(),
            kind,
            x_align: 0.0,
            y_align: 0.0,
            x_offset: 0.0,
            y_offset: 0.0,
            flags,
            surface: None,
            explicit_size: None,
            cached_request: None,
            bounds: None,
            bindings: Vec::new(),
        }
    }

    pub(crate) fn is_anchored(&self) -> bool {
        self.flags.contains(ComponentFlags::ANCHORED)
    }
}
