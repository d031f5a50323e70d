//! ComponentTree - Owns every component and drives its lifecycle.
//!
//! Nodes live in a generational [`Registry`]; callers hold [`ComponentId`]s.
//! The tree is the [`FlushTarget`] of its [`RenderController`]: a flush asks
//! it to lay out queued trees and paint their elements.
//!
//! # Lifecycle
//!
//! ```text
//! add_* ──► (unanchored) ──anchor──► setup once, bindings attached, layout queued
//!                ▲                              │
//!                └──────────── detach ◄─────────┘  bindings detached, queues purged
//! ```
//!
//! Element code (setup, requested_space, render) runs with its element lent
//! out of the registry, so it may change the tree: a component it detaches
//! is skipped by the running flush. Work it registers waits for the next one.

use std::cell::RefCell;
use std::rc::Rc;

use super::binding::{BroadcastBinding, ListenerBinding};
use super::component::{ComponentKind, Layoutable, RenderFrame};
use super::registry::{with_element, Registry};
use crate::broadcast::Listenable;
use crate::error::{check_proportion, PlotError, PlotResult};
use crate::layout::{self, TableGrid, TableLayout};
use crate::pipeline::{FlushTarget, RenderController, ResizeBroadcaster};
use crate::surface::Surface;
use crate::types::{
    point, Bounds, ComponentFlags, ComponentId, Invalidation, Point, Size, SpaceRequest, XAlign,
    YAlign,
};

pub struct ComponentTree {
    registry: RefCell<Registry>,
    scheduler: Rc<RenderController>,
    resize: Rc<ResizeBroadcaster>,
    table_iteration_limit: usize,
}

impl std::fmt::Debug for ComponentTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentTree")
            .field("components", &self.len())
            .finish()
    }
}

impl ComponentTree {
    /// Create a tree and make it the scheduler's flush target.
    pub fn new(
        scheduler: &Rc<RenderController>,
        resize: &Rc<ResizeBroadcaster>,
        table_iteration_limit: usize,
    ) -> Rc<Self> {
        let tree = Rc::new(Self {
            registry: RefCell::new(Registry::default()),
            scheduler: scheduler.clone(),
            resize: resize.clone(),
            table_iteration_limit: table_iteration_limit.max(1),
        });
        let target: Rc<dyn FlushTarget> = tree.clone();
        scheduler.set_target(Rc::downgrade(&target));
        tree
    }

    pub fn scheduler(&self) -> &Rc<RenderController> {
        &self.scheduler
    }

    pub fn len(&self) -> usize {
        self.registry.borrow().len()
    }

    pub fn contains(&self, id: ComponentId) -> bool {
        self.registry.borrow().contains(id)
    }

    // =========================================================================
    // Construction
    // =========================================================================

    pub fn add_element(&self, element: impl Layoutable + 'static) -> ComponentId {
        self.registry
            .borrow_mut()
            .insert(ComponentKind::Element(Box::new(element)))
    }

    /// New group holding `children` in overlay order.
    pub fn add_group(&self, children: &[ComponentId]) -> PlotResult<ComponentId> {
        self.check_new_children(children.iter().copied())?;
        let group = self.registry.borrow_mut().insert(ComponentKind::Group);
        for &child in children {
            self.group_add(group, child, false)?;
        }
        Ok(group)
    }

    /// New table from rows of optional cells.
    pub fn add_table(&self, rows: Vec<Vec<Option<ComponentId>>>) -> PlotResult<ComponentId> {
        self.check_new_children(rows.iter().flatten().flatten().copied())?;
        let mut grid = TableGrid::new();
        grid.set_iteration_limit(self.table_iteration_limit)?;
        let table = self.registry.borrow_mut().insert(ComponentKind::Table(grid));
        for (r, row) in rows.into_iter().enumerate() {
            for (c, cell) in row.into_iter().enumerate() {
                match cell {
                    Some(child) => self.table_add(table, child, r, c)?,
                    None => self.grow_table(table, r, c)?,
                }
            }
        }
        Ok(table)
    }

    fn check_new_children(&self, children: impl Iterator<Item = ComponentId>) -> PlotResult<()> {
        let reg = self.registry.borrow();
        let mut seen = Vec::new();
        for child in children {
            reg.node(child)?;
            if seen.contains(&child) {
                return Err(PlotError::InvalidConfig(format!(
                    "component {child} listed twice"
                )));
            }
            seen.push(child);
        }
        Ok(())
    }

    fn grow_table(&self, table: ComponentId, row: usize, col: usize) -> PlotResult<()> {
        grid_mut(&mut self.registry.borrow_mut(), table)?.grow(row + 1, col + 1);
        Ok(())
    }

    // =========================================================================
    // Names
    // =========================================================================

    pub fn set_name(&self, id: ComponentId, name: &str) -> PlotResult<()> {
        self.registry.borrow_mut().set_name(id, name)
    }

    pub fn name(&self, id: ComponentId) -> Option<String> {
        self.registry.borrow().get(id).and_then(|node| node.name.clone())
    }

    pub fn find(&self, name: &str) -> Option<ComponentId> {
        self.registry.borrow().find(name)
    }

    // =========================================================================
    // Alignment / Sizing
    // =========================================================================

    pub fn set_x_alignment(&self, id: ComponentId, align: XAlign) -> PlotResult<()> {
        self.registry.borrow_mut().node_mut(id)?.x_align = align.proportion();
        self.invalidate_layout(id)
    }

    pub fn set_y_alignment(&self, id: ComponentId, align: YAlign) -> PlotResult<()> {
        self.registry.borrow_mut().node_mut(id)?.y_align = align.proportion();
        self.invalidate_layout(id)
    }

    /// Raw alignment proportions in [0, 1]: 0 is left/top, 1 is right/bottom.
    pub fn set_alignment_proportions(&self, id: ComponentId, x: f64, y: f64) -> PlotResult<()> {
        let x = check_proportion("x alignment", x)?;
        let y = check_proportion("y alignment", y)?;
        {
            let mut reg = self.registry.borrow_mut();
            let node = reg.node_mut(id)?;
            node.x_align = x;
            node.y_align = y;
        }
        self.invalidate_layout(id)
    }

    pub fn set_offset(&self, id: ComponentId, x: f64, y: f64) -> PlotResult<()> {
        {
            let mut reg = self.registry.borrow_mut();
            let node = reg.node_mut(id)?;
            node.x_offset = x;
            node.y_offset = y;
        }
        self.invalidate_layout(id)
    }

    /// Override an element's fixed-size flags. Containers derive theirs.
    pub fn set_fixed(&self, id: ComponentId, width: bool, height: bool) -> PlotResult<()> {
        {
            let mut reg = self.registry.borrow_mut();
            let node = reg.node_mut(id)?;
            if node.kind.is_container() {
                return Err(PlotError::InvalidConfig(format!(
                    "fixed size of container {id} follows its children"
                )));
            }
            node.flags.set(ComponentFlags::FIXED_WIDTH, width);
            node.flags.set(ComponentFlags::FIXED_HEIGHT, height);
        }
        self.invalidate_layout(id)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Bind a root to `surface`: name it, run one-time setup over the
    /// subtree, attach listener bindings and queue a layout.
    pub fn anchor(&self, id: ComponentId, surface: Rc<dyn Surface>) -> PlotResult<()> {
        let auto_resize = {
            let mut reg = self.registry.borrow_mut();
            let node = reg.node_mut(id)?;
            if node.parent.is_some() {
                return Err(PlotError::NotRoot(id));
            }
            node.surface = Some(surface.clone());
            node.flags.contains(ComponentFlags::AUTO_RESIZE)
        };
        self.anchor_subtree(id, &surface)?;
        if auto_resize {
            self.resize.register(id);
        }
        tracing::debug!(%id, "anchored");
        self.invalidate_layout(id)
    }

    /// Anchor, then queue a render as well.
    pub fn render_to(&self, id: ComponentId, surface: Rc<dyn Surface>) -> PlotResult<()> {
        self.anchor(id, surface)?;
        self.request_render(id)
    }

    fn anchor_subtree(&self, id: ComponentId, surface: &Rc<dyn Surface>) -> PlotResult<()> {
        let attach = self.scheduler.exclusive(|| -> PlotResult<Vec<_>> {
            let pending_setup = {
                let mut reg = self.registry.borrow_mut();
                let mut pending = Vec::new();
                for node_id in reg.subtree(id) {
                    reg.ensure_name(node_id)?;
                    if !reg.node(node_id)?.flags.contains(ComponentFlags::SETUP) {
                        pending.push(node_id);
                    }
                }
                pending
            };
            for node_id in pending_setup {
                if let Some(result) = with_element(&self.registry, node_id, |element| {
                    element.setup(surface.as_ref())
                })? {
                    result?;
                }
                if let Some(node) = self.registry.borrow_mut().get_mut(node_id) {
                    node.flags.insert(ComponentFlags::SETUP);
                }
            }

            let mut reg = self.registry.borrow_mut();
            let mut attach: Vec<(ComponentId, Rc<dyn ListenerBinding>)> = Vec::new();
            for node_id in reg.subtree(id) {
                let node = reg.node_mut(node_id)?;
                if !node.is_anchored() {
                    node.flags.insert(ComponentFlags::ANCHORED);
                    attach.extend(node.bindings.iter().map(|b| (node_id, b.clone())));
                }
            }
            Ok(attach)
        })?;
        for (node_id, binding) in attach {
            binding.attach(node_id, &self.scheduler);
        }
        Ok(())
    }

    /// Explicit root size; `None` goes back to measuring the surface.
    pub fn resize(&self, id: ComponentId, size: Option<Size<f64>>) -> PlotResult<()> {
        {
            let mut reg = self.registry.borrow_mut();
            let node = reg.node_mut(id)?;
            if node.parent.is_some() {
                return Err(PlotError::NotRoot(id));
            }
            node.explicit_size = size;
        }
        self.invalidate_layout(id)
    }

    /// Follow viewport resizes while anchored.
    pub fn auto_resize(&self, id: ComponentId, enabled: bool) -> PlotResult<()> {
        let live_root = {
            let mut reg = self.registry.borrow_mut();
            let node = reg.node_mut(id)?;
            node.flags.set(ComponentFlags::AUTO_RESIZE, enabled);
            node.parent.is_none() && node.is_anchored()
        };
        if enabled && live_root {
            self.resize.register(id);
        } else if !enabled {
            self.resize.deregister(id);
        }
        Ok(())
    }

    /// Invalidate `id` whenever `source` broadcasts, while anchored.
    pub fn bind<L: Listenable>(
        &self,
        id: ComponentId,
        source: &Rc<L>,
        invalidation: Invalidation,
    ) -> PlotResult<()> {
        let binding: Rc<dyn ListenerBinding> = Rc::new(BroadcastBinding::new(source, invalidation));
        let anchored = {
            let mut reg = self.registry.borrow_mut();
            let node = reg.node_mut(id)?;
            node.bindings.push(binding.clone());
            node.is_anchored()
        };
        if anchored {
            binding.attach(id, &self.scheduler);
        }
        Ok(())
    }

    /// Drop cached requests up to the root and queue the root for layout.
    pub fn invalidate_layout(&self, id: ComponentId) -> PlotResult<()> {
        let root = {
            let mut reg = self.registry.borrow_mut();
            reg.node(id)?;
            reg.clear_cached_requests(id);
            let root = reg.root_of(id)?;
            let node = reg.node(root)?;
            (node.is_anchored() && node.flags.contains(ComponentFlags::SETUP)).then_some(root)
        };
        if let Some(root) = root {
            self.scheduler.register_to_compute_layout(root);
        }
        Ok(())
    }

    pub fn request_render(&self, id: ComponentId) -> PlotResult<()> {
        if self.registry.borrow().node(id)?.is_anchored() {
            self.scheduler.register_to_render(id);
        }
        Ok(())
    }

    /// Unlink `id` from its parent and unanchor its subtree. The nodes stay
    /// allocated and can be re-added or re-anchored.
    pub fn detach(&self, id: ComponentId) -> PlotResult<()> {
        let (parent, detached) = {
            let mut reg = self.registry.borrow_mut();
            let parent = reg.node(id)?.parent;
            if let Some(parent) = parent {
                unlink(&mut reg, parent, id)?;
            }
            let mut detached = Vec::new();
            for node_id in reg.subtree(id) {
                let node = reg.node_mut(node_id)?;
                let bindings = if node.is_anchored() {
                    node.flags.remove(ComponentFlags::ANCHORED);
                    node.bindings.clone()
                } else {
                    Vec::new()
                };
                detached.push((node_id, bindings));
            }
            reg.node_mut(id)?.surface = None;
            (parent, detached)
        };

        for (node_id, bindings) in detached {
            self.scheduler.purge(node_id);
            self.resize.deregister(node_id);
            for binding in bindings {
                binding.detach(node_id);
            }
        }
        tracing::debug!(%id, "detached");

        if let Some(parent) = parent {
            self.invalidate_layout(parent)?;
        }
        Ok(())
    }

    /// Detach, then free `id` and its descendants.
    pub fn remove(&self, id: ComponentId) -> PlotResult<()> {
        self.detach(id)?;
        let mut reg = self.registry.borrow_mut();
        for node_id in reg.subtree(id) {
            reg.remove(node_id);
        }
        Ok(())
    }

    // =========================================================================
    // Containers
    // =========================================================================

    /// Link `child` under `container`: reject cycles, detach it from any
    /// previous parent and anchor it when the container is anchored.
    fn adopt(
        &self,
        container: ComponentId,
        child: ComponentId,
        link: impl FnOnce(&mut Registry) -> PlotResult<()>,
    ) -> PlotResult<()> {
        {
            let reg = self.registry.borrow();
            reg.node(child)?;
            if reg.is_ancestor(child, container) {
                return Err(PlotError::WouldCycle {
                    parent: container,
                    child,
                });
            }
        }
        let linked = {
            let reg = self.registry.borrow();
            let node = reg.node(child)?;
            node.parent.is_some() || node.is_anchored()
        };
        if linked {
            self.detach(child)?;
        }

        let surface = {
            let mut reg = self.registry.borrow_mut();
            link(&mut reg)?;
            reg.node_mut(child)?.parent = Some(container);
            let root = reg.root_of(container)?;
            let root = reg.node(root)?;
            if root.is_anchored() {
                root.surface.clone()
            } else {
                None
            }
        };
        if let Some(surface) = surface {
            self.anchor_subtree(child, &surface)?;
        }
        self.invalidate_layout(container)
    }

    /// Put `child` in a table cell, growing the grid as needed.
    pub fn table_add(
        &self,
        table: ComponentId,
        child: ComponentId,
        row: usize,
        col: usize,
    ) -> PlotResult<()> {
        let occupied = grid_mut(&mut self.registry.borrow_mut(), table)?
            .get(row, col)
            .is_some();
        if occupied {
            return Err(PlotError::CellOccupied { row, col });
        }
        self.adopt(table, child, |reg| {
            let grid = grid_mut(reg, table)?;
            grid.place(row, col, child)?;
            let children = grid.children();
            reg.node_mut(table)?.children = children;
            Ok(())
        })
    }

    /// Add `child` on top (or, with `prepend`, underneath). Returns false
    /// when it is already a member.
    pub fn group_add(&self, group: ComponentId, child: ComponentId, prepend: bool) -> PlotResult<bool> {
        {
            let reg = self.registry.borrow();
            let node = reg.node(group)?;
            if !matches!(node.kind, ComponentKind::Group) {
                return Err(PlotError::NotAContainer(group));
            }
            if node.children.contains(&child) {
                return Ok(false);
            }
        }
        self.adopt(group, child, |reg| {
            let children = &mut reg.node_mut(group)?.children;
            if prepend {
                children.insert(0, child);
            } else {
                children.push(child);
            }
            Ok(())
        })?;
        Ok(true)
    }

    pub fn set_row_weight(&self, table: ComponentId, row: usize, weight: f64) -> PlotResult<()> {
        grid_mut(&mut self.registry.borrow_mut(), table)?.set_row_weight(row, weight)?;
        self.invalidate_layout(table)
    }

    pub fn set_col_weight(&self, table: ComponentId, col: usize, weight: f64) -> PlotResult<()> {
        grid_mut(&mut self.registry.borrow_mut(), table)?.set_col_weight(col, weight)?;
        self.invalidate_layout(table)
    }

    pub fn set_padding(&self, table: ComponentId, row_padding: f64, col_padding: f64) -> PlotResult<()> {
        grid_mut(&mut self.registry.borrow_mut(), table)?.set_padding(row_padding, col_padding)?;
        self.invalidate_layout(table)
    }

    pub fn set_table_iteration_limit(&self, table: ComponentId, limit: usize) -> PlotResult<()> {
        grid_mut(&mut self.registry.borrow_mut(), table)?.set_iteration_limit(limit)?;
        self.invalidate_layout(table)
    }

    /// Detach `child` if it belongs to `container`.
    pub fn remove_child(&self, container: ComponentId, child: ComponentId) -> PlotResult<bool> {
        let is_child = {
            let reg = self.registry.borrow();
            if !reg.node(container)?.kind.is_container() {
                return Err(PlotError::NotAContainer(container));
            }
            reg.node(child)?.parent == Some(container)
        };
        if is_child {
            self.detach(child)?;
        }
        Ok(is_child)
    }

    /// Children of a container; row-major for tables.
    pub fn components(&self, container: ComponentId) -> PlotResult<Vec<ComponentId>> {
        let reg = self.registry.borrow();
        let node = reg.node(container)?;
        if !node.kind.is_container() {
            return Err(PlotError::NotAContainer(container));
        }
        Ok(node.children.clone())
    }

    pub fn is_empty(&self, container: ComponentId) -> PlotResult<bool> {
        self.components(container).map(|children| children.is_empty())
    }

    pub fn detach_all(&self, container: ComponentId) -> PlotResult<()> {
        for child in self.components(container)? {
            self.detach(child)?;
        }
        Ok(())
    }

    /// Overlay two components: a group absorbs a plain component (on top when
    /// the group comes first, underneath otherwise); any other pair gets a
    /// new group.
    pub fn merge(&self, a: ComponentId, b: ComponentId) -> PlotResult<ComponentId> {
        let (a_group, b_group) = {
            let reg = self.registry.borrow();
            let is_group = |id| reg.node(id).map(|n| matches!(n.kind, ComponentKind::Group));
            (is_group(a)?, is_group(b)?)
        };
        match (a_group, b_group) {
            (true, false) => {
                self.group_add(a, b, false)?;
                Ok(a)
            }
            (false, true) => {
                self.group_add(b, a, true)?;
                Ok(b)
            }
            _ => self.add_group(&[a, b]),
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn parent(&self, id: ComponentId) -> Option<ComponentId> {
        self.registry.borrow().get(id).and_then(|node| node.parent)
    }

    /// Bounds relative to the parent, once laid out.
    pub fn bounds(&self, id: ComponentId) -> Option<Bounds> {
        self.registry.borrow().get(id).and_then(|node| node.bounds)
    }

    /// Bounds relative to the surface.
    pub fn absolute_bounds(&self, id: ComponentId) -> Option<Bounds> {
        absolute_bounds(&self.registry.borrow(), id)
    }

    pub fn is_anchored(&self, id: ComponentId) -> bool {
        self.registry.borrow().get(id).is_some_and(|node| node.is_anchored())
    }

    pub fn is_fixed_width(&self, id: ComponentId) -> PlotResult<bool> {
        layout::is_fixed(&self.registry, id).map(|(w, _)| w)
    }

    pub fn is_fixed_height(&self, id: ComponentId) -> PlotResult<bool> {
        layout::is_fixed(&self.registry, id).map(|(_, h)| h)
    }

    pub fn requested_space(&self, id: ComponentId, offered: Size<f64>) -> PlotResult<SpaceRequest> {
        self.scheduler
            .exclusive(|| layout::requested_space(&self.registry, id, offered))
    }

    /// Allocation of a table at its current bounds.
    pub fn table_layout(&self, table: ComponentId) -> PlotResult<Option<TableLayout>> {
        self.scheduler
            .exclusive(|| layout::table_layout(&self.registry, table))
    }

    // =========================================================================
    // Synchronous Layout / Render
    // =========================================================================

    /// Lay out `id` now. Roots may omit the placement: the explicit size or
    /// the surface measurement is used at the origin.
    pub fn compute_layout(
        &self,
        id: ComponentId,
        placement: Option<(Point<f64>, Size<f64>)>,
    ) -> PlotResult<Bounds> {
        self.scheduler.exclusive(|| -> PlotResult<Bounds> {
            let (origin, available) = match placement {
                Some(placement) => placement,
                None => root_placement(&self.registry.borrow(), id)?,
            };
            layout::compute_layout(&self.registry, id, origin, available)
        })
    }

    /// Paint `id` and its descendants at their computed positions.
    pub fn do_render(&self, id: ComponentId) -> PlotResult<()> {
        self.scheduler.exclusive(|| -> PlotResult<()> {
            let ids = {
                let reg = self.registry.borrow();
                if !reg.node(id)?.is_anchored() {
                    return Err(PlotError::Unanchored(id));
                }
                reg.subtree(id)
            };
            for node_id in ids {
                // Earlier renders may have detached part of the subtree.
                if self.is_anchored(node_id) {
                    self.paint_node(node_id)?;
                }
            }
            Ok(())
        })
    }

    fn paint_node(&self, id: ComponentId) -> PlotResult<()> {
        let (bounds, surface) = {
            let reg = self.registry.borrow();
            let Some(bounds) = absolute_bounds(&reg, id) else {
                tracing::trace!(%id, "not laid out, skipping paint");
                return Ok(());
            };
            let root = reg.root_of(id)?;
            let surface = reg
                .node(root)?
                .surface
                .clone()
                .ok_or(PlotError::Unanchored(id))?;
            (bounds, surface)
        };
        let resizing = self.resize.resizing();
        let rendered = with_element(&self.registry, id, |element| {
            element.render(&RenderFrame {
                id,
                bounds,
                surface: surface.as_ref(),
                resizing,
            })
        })?;
        rendered.unwrap_or(Ok(()))
    }
}

impl FlushTarget for ComponentTree {
    fn is_live(&self, id: ComponentId) -> bool {
        self.is_anchored(id)
    }

    fn layout_pass(&self, id: ComponentId) -> PlotResult<Vec<ComponentId>> {
        let (root, ids, origin, available) = {
            let mut reg = self.registry.borrow_mut();
            let root = reg.root_of(id)?;
            let ids = reg.subtree(root);
            for &node_id in &ids {
                if let Some(node) = reg.get_mut(node_id) {
                    node.cached_request = None;
                }
            }
            let (origin, available) = root_placement(&reg, root)?;
            (root, ids, origin, available)
        };
        layout::compute_layout(&self.registry, root, origin, available)?;
        Ok(ids)
    }

    fn subtree(&self, id: ComponentId) -> Vec<ComponentId> {
        self.registry.borrow().subtree(id)
    }

    fn paint(&self, id: ComponentId) -> PlotResult<()> {
        self.paint_node(id)
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn grid_mut(reg: &mut Registry, table: ComponentId) -> PlotResult<&mut TableGrid> {
    match &mut reg.node_mut(table)?.kind {
        ComponentKind::Table(grid) => Ok(grid),
        _ => Err(PlotError::NotAContainer(table)),
    }
}

fn unlink(reg: &mut Registry, parent: ComponentId, child: ComponentId) -> PlotResult<()> {
    let node = reg.node_mut(parent)?;
    node.children.retain(|&c| c != child);
    if let ComponentKind::Table(grid) = &mut node.kind {
        grid.remove(child);
    }
    reg.node_mut(child)?.parent = None;
    Ok(())
}

/// Placement of a root: explicit size, else the surface measurement.
fn root_placement(reg: &Registry, id: ComponentId) -> PlotResult<(Point<f64>, Size<f64>)> {
    let node = reg.node(id)?;
    if node.parent.is_some() {
        return Err(PlotError::PlacementRequired(id));
    }
    if let Some(size) = node.explicit_size {
        return Ok((point(0.0, 0.0), size));
    }
    let surface = node.surface.as_ref().ok_or(PlotError::Unanchored(id))?;
    let size = surface.measure().ok_or(PlotError::Unmeasurable(id))?;
    Ok((point(0.0, 0.0), size))
}

fn absolute_bounds(reg: &Registry, id: ComponentId) -> Option<Bounds> {
    let node = reg.get(id)?;
    let mut bounds = node.bounds?;
    let mut parent = node.parent;
    while let Some(p) = parent {
        let node = reg.get(p)?;
        bounds = bounds.translate(node.bounds?.origin);
        parent = node.parent;
    }
    Some(bounds)
}
