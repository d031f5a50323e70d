//! Layout Module - space negotiation and placement.
//!
//! # Architecture
//!
//! Negotiation is a two-step protocol run top-down over the component tree:
//!
//! 1. `requested_space(offered)` asks a node what it needs inside an offer.
//!    Leaves answer through their [`Layoutable`](crate::engine::Layoutable);
//!    groups and tables answer by asking their children.
//! 2. `compute_layout(origin, available)` assigns the final position and size,
//!    honouring alignment and offsets, then places children.
//!
//! The container algorithms ([`group`], [`table`]) are free functions over the
//! [`Sizer`] trait so they can be exercised without a component tree.

pub mod group;
pub mod table;

pub use table::{TableGrid, TableLayout, MAX_LAYOUT_ITERATIONS};

use std::cell::RefCell;

use crate::engine::component::ComponentKind;
use crate::engine::registry::{with_element, Registry};
use crate::error::PlotResult;
use crate::types::{point, Bounds, ComponentFlags, ComponentId, Point, Size, SpaceRequest};

/// What the container algorithms need to know about a child.
pub trait Sizer {
    fn requested_space(&mut self, id: ComponentId, offered: Size<f64>)
    -> PlotResult<SpaceRequest>;

    /// (fixed width, fixed height)
    fn is_fixed(&mut self, id: ComponentId) -> PlotResult<(bool, bool)>;
}

/// [`Sizer`] backed by the component arena.
pub(crate) struct RegistrySizer<'a> {
    registry: &'a RefCell<Registry>,
}

impl<'a> RegistrySizer<'a> {
    pub(crate) fn new(registry: &'a RefCell<Registry>) -> Self {
        Self { registry }
    }
}

impl Sizer for RegistrySizer<'_> {
    fn requested_space(
        &mut self,
        id: ComponentId,
        offered: Size<f64>,
    ) -> PlotResult<SpaceRequest> {
        requested_space(self.registry, id, offered)
    }

    fn is_fixed(&mut self, id: ComponentId) -> PlotResult<(bool, bool)> {
        is_fixed(self.registry, id)
    }
}

enum Shape {
    Leaf,
    Group(Vec<ComponentId>),
    Table(TableGrid),
}

fn shape(registry: &RefCell<Registry>, id: ComponentId) -> PlotResult<Shape> {
    let reg = registry.borrow();
    let node = reg.node(id)?;
    Ok(match &node.kind {
        ComponentKind::Element(_) => Shape::Leaf,
        ComponentKind::Group => Shape::Group(node.children.clone()),
        ComponentKind::Table(grid) => Shape::Table(grid.clone()),
    })
}

// =============================================================================
// Negotiation
// =============================================================================
//
// The registry is only borrowed between element calls: element code runs
// with its slot lent out and may change the tree.

/// Minimum space `id` needs inside `offered`. Answers are cached per offer
/// until the node (or a descendant) is invalidated.
pub(crate) fn requested_space(
    registry: &RefCell<Registry>,
    id: ComponentId,
    offered: Size<f64>,
) -> PlotResult<SpaceRequest> {
    if let Some((cached_offer, request)) = registry.borrow().node(id)?.cached_request {
        if cached_offer == offered {
            return Ok(request);
        }
    }

    let request = match shape(registry, id)? {
        Shape::Leaf => with_element(registry, id, |element| element.requested_space(offered))?
            .unwrap_or(SpaceRequest::NONE),
        Shape::Group(children) => {
            group::requested_space(&mut RegistrySizer::new(registry), &children, offered)?
        }
        Shape::Table(grid) => {
            table::requested_space(&mut RegistrySizer::new(registry), &grid, offered)?
        }
    };

    registry.borrow_mut().node_mut(id)?.cached_request = Some((offered, request));
    Ok(request)
}

/// Leaves use their flags; containers are fixed when all children are.
pub(crate) fn is_fixed(registry: &RefCell<Registry>, id: ComponentId) -> PlotResult<(bool, bool)> {
    match shape(registry, id)? {
        Shape::Leaf => {
            let flags = registry.borrow().node(id)?.flags;
            Ok((
                flags.contains(ComponentFlags::FIXED_WIDTH),
                flags.contains(ComponentFlags::FIXED_HEIGHT),
            ))
        }
        Shape::Group(children) => group::is_fixed(&mut RegistrySizer::new(registry), &children),
        Shape::Table(grid) => table::is_fixed(&mut RegistrySizer::new(registry), &grid),
    }
}

// =============================================================================
// Placement
// =============================================================================

/// Assign `id` its bounds inside (origin, available) and place its children.
///
/// A fixed-size axis shrinks to the requested minimum (never past the offer)
/// and is positioned by the alignment proportion. Offsets always apply.
pub(crate) fn compute_layout(
    registry: &RefCell<Registry>,
    id: ComponentId,
    origin: Point<f64>,
    available: Size<f64>,
) -> PlotResult<Bounds> {
    let (fixed_width, fixed_height) = is_fixed(registry, id)?;
    let request = if fixed_width || fixed_height {
        requested_space(registry, id, available)?
    } else {
        SpaceRequest::NONE
    };

    let bounds = {
        let mut reg = registry.borrow_mut();
        let node = reg.node_mut(id)?;
        let mut bounds = Bounds::new(
            origin.x + node.x_offset,
            origin.y + node.y_offset,
            available.width,
            available.height,
        );
        if fixed_width {
            bounds.size.width = available.width.min(request.width);
            bounds.origin.x += (available.width - bounds.size.width) * node.x_align;
        }
        if fixed_height {
            bounds.size.height = available.height.min(request.height);
            bounds.origin.y += (available.height - bounds.size.height) * node.y_align;
        }
        node.bounds = Some(bounds);
        bounds
    };

    match shape(registry, id)? {
        Shape::Leaf => {}
        Shape::Group(children) => {
            for child in children {
                compute_layout(registry, child, point(0.0, 0.0), bounds.size)?;
            }
        }
        Shape::Table(grid) => {
            let layout = table::iterate_layout(&mut RegistrySizer::new(registry), &grid, bounds.size)?;
            for (child, cell_origin, cell_size) in table::placements(&grid, &layout) {
                compute_layout(registry, child, cell_origin, cell_size)?;
            }
        }
    }
    Ok(bounds)
}

/// Allocation report for a table at its current bounds.
pub(crate) fn table_layout(
    registry: &RefCell<Registry>,
    id: ComponentId,
) -> PlotResult<Option<TableLayout>> {
    let Shape::Table(grid) = shape(registry, id)? else {
        return Ok(None);
    };
    let Some(bounds) = registry.borrow().node(id)?.bounds else {
        return Ok(None);
    };
    table::iterate_layout(&mut RegistrySizer::new(registry), &grid, bounds.size).map(Some)
}

// =============================================================================
// Test Support
// =============================================================================

#[cfg(test)]
pub(crate) mod testing {
    use super::Sizer;
    use crate::error::PlotResult;
    use crate::types::{ComponentId, Size, SpaceRequest};

    enum Behavior {
        Constant(SpaceRequest, bool),
        /// Width-dependent text of the given length.
        Wrap(f64),
        /// Alternates its answer on every call.
        Oscillating(usize),
    }

    /// Scripted children addressed by index.
    #[derive(Default)]
    pub(crate) struct FakeSizer {
        items: Vec<Behavior>,
    }

    impl FakeSizer {
        fn push(&mut self, behavior: Behavior) -> ComponentId {
            self.items.push(behavior);
            ComponentId::new(self.items.len() as u32 - 1, 0)
        }

        pub fn none(&mut self) -> ComponentId {
            self.push(Behavior::Constant(SpaceRequest::NONE, false))
        }

        pub fn fixed(&mut self, width: f64, height: f64) -> ComponentId {
            self.push(Behavior::Constant(SpaceRequest::fixed(width, height), true))
        }

        pub fn greedy(&mut self, width: f64, height: f64) -> ComponentId {
            self.push(Behavior::Constant(SpaceRequest::greedy(width, height), false))
        }

        pub fn wrap(&mut self, len: f64) -> ComponentId {
            self.push(Behavior::Wrap(len))
        }

        pub fn oscillating(&mut self) -> ComponentId {
            self.push(Behavior::Oscillating(0))
        }
    }

    impl Sizer for FakeSizer {
        fn requested_space(
            &mut self,
            id: ComponentId,
            offered: Size<f64>,
        ) -> PlotResult<SpaceRequest> {
            Ok(match &mut self.items[id.index()] {
                Behavior::Constant(request, _) => *request,
                Behavior::Wrap(len) => SpaceRequest {
                    width: 1.0,
                    height: (*len / offered.width.max(1.0)).ceil(),
                    wants_width: true,
                    wants_height: false,
                },
                Behavior::Oscillating(calls) => {
                    *calls += 1;
                    let width = if *calls % 2 == 0 { 10.0 } else { 20.0 };
                    SpaceRequest::fixed(width, 0.0)
                }
            })
        }

        fn is_fixed(&mut self, id: ComponentId) -> PlotResult<(bool, bool)> {
            Ok(match &self.items[id.index()] {
                Behavior::Constant(_, fixed) => (*fixed, *fixed),
                _ => (false, false),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::component::RenderFrame;
    use crate::engine::Layoutable;
    use crate::types::size;
    use proptest::prelude::*;

    struct Block {
        request: SpaceRequest,
        fixed: bool,
    }

    impl Layoutable for Block {
        fn requested_space(&self, _offered: Size<f64>) -> SpaceRequest {
            self.request
        }
        fn is_fixed_width(&self) -> bool {
            self.fixed
        }
        fn is_fixed_height(&self) -> bool {
            self.fixed
        }
        fn render(&mut self, _frame: &RenderFrame<'_>) -> PlotResult<()> {
            Ok(())
        }
    }

    struct Wrap {
        len: f64,
    }

    impl Layoutable for Wrap {
        fn requested_space(&self, offered: Size<f64>) -> SpaceRequest {
            SpaceRequest {
                width: 1.0,
                height: (self.len / offered.width.max(1.0)).ceil(),
                wants_width: true,
                wants_height: false,
            }
        }
        fn render(&mut self, _frame: &RenderFrame<'_>) -> PlotResult<()> {
            Ok(())
        }
    }

    fn element(reg: &mut Registry, layoutable: impl Layoutable + 'static) -> ComponentId {
        reg.insert(ComponentKind::Element(Box::new(layoutable)))
    }

    fn block(reg: &mut Registry, w: f64, h: f64, fixed: bool) -> ComponentId {
        element(
            reg,
            Block {
                request: if fixed {
                    SpaceRequest::fixed(w, h)
                } else {
                    SpaceRequest::greedy(w, h)
                },
                fixed,
            },
        )
    }

    fn adopt(reg: &mut Registry, parent: ComponentId, children: &[ComponentId]) {
        for &child in children {
            reg.get_mut(parent).unwrap().children.push(child);
            reg.get_mut(child).unwrap().parent = Some(parent);
        }
    }

    fn set_weights(reg: &mut Registry, t: ComponentId, col: usize, row: usize) {
        if let ComponentKind::Table(grid) = &mut reg.get_mut(t).unwrap().kind {
            grid.set_col_weight(col, 1.0).unwrap();
            grid.set_row_weight(row, 1.0).unwrap();
        }
    }

    fn table(reg: &mut Registry, rows: Vec<Vec<Option<ComponentId>>>) -> ComponentId {
        let grid = TableGrid::from_rows(rows).unwrap();
        let children = grid.children();
        let id = reg.insert(ComponentKind::Table(grid));
        adopt(reg, id, &children);
        id
    }

    #[test]
    fn test_alignment_of_fixed_leaf() {
        let mut reg = Registry::default();
        let leaf = block(&mut reg, 20.0, 10.0, true);
        reg.get_mut(leaf).unwrap().x_align = 0.5;
        reg.get_mut(leaf).unwrap().y_align = 1.0;
        let reg = RefCell::new(reg);

        let bounds = compute_layout(&reg, leaf, point(0.0, 0.0), size(100.0, 50.0)).unwrap();
        assert_eq!(bounds, Bounds::new(40.0, 40.0, 20.0, 10.0));
    }

    #[test]
    fn test_offset_and_clipped_fixed_size() {
        let mut reg = Registry::default();
        let leaf = block(&mut reg, 200.0, 10.0, true);
        reg.get_mut(leaf).unwrap().x_offset = 3.0;
        let reg = RefCell::new(reg);

        let bounds = compute_layout(&reg, leaf, point(5.0, 5.0), size(100.0, 50.0)).unwrap();
        assert_eq!(bounds, Bounds::new(8.0, 5.0, 100.0, 10.0));
    }

    #[test]
    fn test_greedy_leaf_fills_offer() {
        let mut reg = Registry::default();
        let leaf = block(&mut reg, 20.0, 10.0, false);
        let reg = RefCell::new(reg);
        let bounds = compute_layout(&reg, leaf, point(0.0, 0.0), size(100.0, 50.0)).unwrap();
        assert_eq!(bounds, Bounds::new(0.0, 0.0, 100.0, 50.0));
    }

    #[test]
    fn test_group_children_share_origin() {
        let mut reg = Registry::default();
        let a = block(&mut reg, 10.0, 10.0, true);
        let b = block(&mut reg, 0.0, 0.0, false);
        let group = reg.insert(ComponentKind::Group);
        adopt(&mut reg, group, &[a, b]);
        let reg = RefCell::new(reg);

        compute_layout(&reg, group, point(0.0, 0.0), size(60.0, 30.0)).unwrap();
        assert_eq!(reg.borrow().get(a).unwrap().bounds, Some(Bounds::new(0.0, 0.0, 10.0, 10.0)));
        assert_eq!(reg.borrow().get(b).unwrap().bounds, Some(Bounds::new(0.0, 0.0, 60.0, 30.0)));
        assert_eq!(is_fixed(&reg, group).unwrap(), (false, false));
    }

    #[test]
    fn test_table_places_cells() {
        let mut reg = Registry::default();
        let corner = block(&mut reg, 50.0, 50.0, true);
        let b = block(&mut reg, 0.0, 0.0, false);
        let c = block(&mut reg, 0.0, 0.0, false);
        let d = block(&mut reg, 0.0, 0.0, false);
        let t = table(&mut reg, vec![vec![Some(corner), Some(b)], vec![Some(c), Some(d)]]);
        set_weights(&mut reg, t, 1, 1);
        let reg = RefCell::new(reg);

        compute_layout(&reg, t, point(0.0, 0.0), size(300.0, 300.0)).unwrap();
        assert_eq!(reg.borrow().get(d).unwrap().bounds, Some(Bounds::new(50.0, 50.0, 250.0, 250.0)));
        assert_eq!(reg.borrow().get(b).unwrap().bounds, Some(Bounds::new(50.0, 0.0, 250.0, 50.0)));

        let layout = table_layout(&reg, t).unwrap().unwrap();
        assert_eq!(layout.col_widths, vec![50.0, 250.0]);
    }

    #[test]
    fn test_request_cache_is_keyed_by_offer() {
        let mut reg = Registry::default();
        let text = element(&mut reg, Wrap { len: 100.0 });
        let reg = RefCell::new(reg);
        let at_ten = requested_space(&reg, text, size(10.0, 5.0)).unwrap();
        let at_fifty = requested_space(&reg, text, size(50.0, 5.0)).unwrap();
        assert_eq!(at_ten.height, 10.0);
        assert_eq!(at_fifty.height, 2.0);
        assert_eq!(
            reg.borrow().get(text).unwrap().cached_request,
            Some((size(50.0, 5.0), at_fifty))
        );
    }

    proptest! {
        #[test]
        fn prop_group_request_is_monotonic(
            lens in prop::collection::vec(1.0f64..500.0, 1..5),
            small in 1.0f64..200.0,
            extra in 0.0f64..200.0,
        ) {
            let mut reg = Registry::default();
            let children: Vec<_> = lens.iter().map(|&len| element(&mut reg, Wrap { len })).collect();
            let group = reg.insert(ComponentKind::Group);
            adopt(&mut reg, group, &children);
            let reg = RefCell::new(reg);

            let low = requested_space(&reg, group, size(small, small)).unwrap();
            let high = requested_space(&reg, group, size(small + extra, small + extra)).unwrap();
            prop_assert!(high.width <= low.width);
            prop_assert!(high.height <= low.height);
        }

        #[test]
        fn prop_table_request_is_monotonic(
            lens in prop::collection::vec(1.0f64..500.0, 1..5),
            padding in 0.0f64..4.0,
            small in 1.0f64..200.0,
            extra in 0.0f64..200.0,
        ) {
            let mut reg = Registry::default();
            let rows: Vec<_> = lens
                .iter()
                .map(|&len| vec![Some(element(&mut reg, Wrap { len }))])
                .collect();
            let t = table(&mut reg, rows);
            if let ComponentKind::Table(grid) = &mut reg.get_mut(t).unwrap().kind {
                grid.set_padding(padding, padding).unwrap();
            }
            let reg = RefCell::new(reg);

            let low = requested_space(&reg, t, size(small, small)).unwrap();
            let high = requested_space(&reg, t, size(small + extra, small + extra)).unwrap();
            prop_assert!(high.width <= low.width);
            prop_assert!(high.height <= low.height);
        }
    }
}
