//! Component Registry - Arena ownership for the component tree.
//!
//! Manages the lifecycle of component slots:
//! - Generational ids (a freed slot is reused under a new generation)
//! - Free slot pool for O(1) reuse
//! - Name ↔ id mapping, with generated `c<N>` names
//! - Parent/child relations stored as ids, never as owning pointers

use std::cell::RefCell;
use std::collections::HashMap;

use super::component::{Component, ComponentKind, Layoutable, Lent};
use crate::error::{PlotError, PlotResult};
use crate::types::ComponentId;

struct Slot {
    generation: u32,
    node: Option<Component>,
}

#[derive(Default)]
pub(crate) struct Registry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    names: HashMap<String, ComponentId>,
    name_counter: usize,
}

impl Registry {
    // =========================================================================
    // Allocation
    // =========================================================================

    /// Allocate a slot for a new, parentless component.
    pub fn insert(&mut self, kind: ComponentKind) -> ComponentId {
        let id = match self.free.pop() {
            Some(index) => ComponentId::new(index, self.slots[index as usize].generation),
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    node: None,
                });
                ComponentId::new(index, 0)
            }
        };
        self.slots[id.index()].node = Some(Component::new(kind));
        id
    }

    /// Free a slot. Does not touch relatives; callers unlink first.
    pub fn remove(&mut self, id: ComponentId) -> Option<Component> {
        let slot = self.slots.get_mut(id.index())?;
        if slot.generation != id.generation {
            return None;
        }
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        if let Some(name) = &node.name {
            self.names.remove(name);
        }
        Some(node)
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    pub fn get(&self, id: ComponentId) -> Option<&Component> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub fn get_mut(&mut self, id: ComponentId) -> Option<&mut Component> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    pub fn node(&self, id: ComponentId) -> PlotResult<&Component> {
        self.get(id).ok_or(PlotError::UnknownComponent(id))
    }

    pub fn node_mut(&mut self, id: ComponentId) -> PlotResult<&mut Component> {
        self.get_mut(id).ok_or(PlotError::UnknownComponent(id))
    }

    pub fn contains(&self, id: ComponentId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.node.is_some()).count()
    }

    // =========================================================================
    // Names
    // =========================================================================

    pub fn set_name(&mut self, id: ComponentId, name: &str) -> PlotResult<()> {
        if let Some(&owner) = self.names.get(name) {
            if owner != id {
                return Err(PlotError::InvalidConfig(format!("name {name:?} is taken")));
            }
        }
        let node = self.node_mut(id)?;
        let old = node.name.replace(name.to_string());
        if let Some(old) = old {
            self.names.remove(&old);
        }
        self.names.insert(name.to_string(), id);
        Ok(())
    }

    /// Give `id` a generated `c<N>` name if it has none.
    pub fn ensure_name(&mut self, id: ComponentId) -> PlotResult<()> {
        if self.node(id)?.name.is_some() {
            return Ok(());
        }
        loop {
            let candidate = format!("c{}", self.name_counter);
            self.name_counter += 1;
            if !self.names.contains_key(&candidate) {
                return self.set_name(id, &candidate);
            }
        }
    }

    pub fn find(&self, name: &str) -> Option<ComponentId> {
        self.names.get(name).copied()
    }

    // =========================================================================
    // Tree Walks
    // =========================================================================

    /// Topmost ancestor of `id` (itself when parentless).
    pub fn root_of(&self, id: ComponentId) -> PlotResult<ComponentId> {
        let mut current = id;
        while let Some(parent) = self.node(current)?.parent {
            current = parent;
        }
        Ok(current)
    }

    /// `id` and its descendants, pre-order.
    pub fn subtree(&self, id: ComponentId) -> Vec<ComponentId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.get(current) {
                out.push(current);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Whether `ancestor` is `id` or above it.
    pub fn is_ancestor(&self, ancestor: ComponentId, id: ComponentId) -> bool {
        let mut current = Some(id);
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            current = self.get(c).and_then(|node| node.parent);
        }
        false
    }

    /// Drop cached space requests from `id` up to its root.
    pub fn clear_cached_requests(&mut self, id: ComponentId) {
        let mut current = Some(id);
        while let Some(c) = current {
            current = match self.get_mut(c) {
                Some(node) => {
                    node.cached_request = None;
                    node.parent
                }
                None => None,
            };
        }
    }
}

// =============================================================================
// Element Access
// =============================================================================

/// Run `f` on the element at `id` with the registry released.
///
/// The element is moved out of its slot for the call, so element code may
/// change the tree (detach, invalidate, bind). It goes back afterwards unless
/// the slot was freed meanwhile. `None` when `id` is a container.
pub(crate) fn with_element<R>(
    registry: &RefCell<Registry>,
    id: ComponentId,
    f: impl FnOnce(&mut dyn Layoutable) -> R,
) -> PlotResult<Option<R>> {
    let mut element = {
        let mut reg = registry.borrow_mut();
        match &mut reg.node_mut(id)?.kind {
            ComponentKind::Element(slot) => std::mem::replace(slot, Box::new(Lent)),
            _ => return Ok(None),
        }
    };
    let result = f(element.as_mut());
    if let Some(node) = registry.borrow_mut().get_mut(id) {
        if let ComponentKind::Element(slot) = &mut node.kind {
            *slot = element;
        }
    }
    Ok(Some(result))
}
