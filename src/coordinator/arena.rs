//! Coordinator tree stored in a generational arena.
//!
//! Parents own their children by id; a child records its parent id. Ids are
//! generational, so a handle kept after its coordinator is gone can never
//! address a newer coordinator reusing the slot. A coordinator leaves its
//! parent's child set exactly once: when it finishes, or when an ancestor is
//! torn down.

use std::fmt;

use crate::coordinator::event::NavigationEvent;
use crate::coordinator::navigator::{Navigator, Route};
use crate::core::errors::{NightlightError, Result};
use crate::paging::{ItemId, ListKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoordinatorId {
    index: u32,
    generation: u32,
}

impl fmt::Display for CoordinatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}.{}", self.index, self.generation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Created,
    Started,
    /// Finished or torn down. Stale ids report this too.
    Finished,
}

/// The row a parent acted on before starting a child flow.
///
/// `item` is authoritative; `row_hint` is only where the row was at the time
/// and may be wrong after the list shifts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowContext {
    pub list: ListKey,
    pub item: ItemId,
    pub row_hint: usize,
}

/// A child's event, addressed to its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub parent: CoordinatorId,
    pub child: CoordinatorId,
    pub context: Option<RowContext>,
    pub event: NavigationEvent,
}

#[derive(Debug)]
struct Node {
    route: Route,
    parent: Option<CoordinatorId>,
    children: Vec<CoordinatorId>,
    lifecycle: Lifecycle,
    active_context: Option<RowContext>,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

#[derive(Debug, Default)]
pub struct CoordinatorArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl CoordinatorArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live coordinators.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Whether `id` still names a live coordinator.
    pub fn contains(&self, id: CoordinatorId) -> bool {
        self.node(id).is_some()
    }

    /// Register a top-level coordinator with no parent.
    pub fn create_root(&mut self, route: Route) -> CoordinatorId {
        self.insert(Node {
            route,
            parent: None,
            children: Vec::new(),
            lifecycle: Lifecycle::Created,
            active_context: None,
        })
    }

    /// Register a child under `parent`. The child still has to be started.
    pub fn add_child(&mut self, parent: CoordinatorId, route: Route) -> Result<CoordinatorId> {
        if !self.contains(parent) {
            return Err(stale(parent));
        }
        let child = self.insert(Node {
            route,
            parent: Some(parent),
            children: Vec::new(),
            lifecycle: Lifecycle::Created,
            active_context: None,
        });
        if let Some(node) = self.node_mut(parent) {
            node.children.push(child);
        }
        Ok(child)
    }

    /// Put the coordinator's screen up. Allowed once.
    pub fn start(&mut self, id: CoordinatorId, navigator: &mut dyn Navigator) -> Result<()> {
        let node = self.node_mut(id).ok_or_else(|| stale(id))?;
        if node.lifecycle != Lifecycle::Created {
            return Err(NightlightError::Navigation {
                details: format!("coordinator {id} already started"),
            });
        }
        node.lifecycle = Lifecycle::Started;
        let route = node.route.clone();
        let presentation = route.presentation();
        navigator.show(id, route, presentation);
        Ok(())
    }

    /// End a child flow and hand its result to the parent.
    ///
    /// The child and its whole subtree are dismissed and removed, and the
    /// parent's active row context is taken into the delivery.
    pub fn finish_child(
        &mut self,
        child: CoordinatorId,
        event: NavigationEvent,
        navigator: &mut dyn Navigator,
    ) -> Result<Delivery> {
        let parent = self
            .node(child)
            .ok_or_else(|| stale(child))?
            .parent
            .ok_or_else(|| NightlightError::Navigation {
                details: format!("coordinator {child} has no parent to finish into"),
            })?;

        self.teardown(child, navigator);
        let context = self
            .node_mut(parent)
            .and_then(|node| node.active_context.take());

        Ok(Delivery {
            parent,
            child,
            context,
            event,
        })
    }

    /// Send an event to the parent without ending the child. The parent's
    /// context is left in place.
    pub fn emit(&self, child: CoordinatorId, event: NavigationEvent) -> Result<Delivery> {
        let node = self.node(child).ok_or_else(|| stale(child))?;
        let parent = node.parent.ok_or_else(|| NightlightError::Navigation {
            details: format!("coordinator {child} has no parent to emit to"),
        })?;
        let context = self
            .node(parent)
            .and_then(|node| node.active_context.clone());
        Ok(Delivery {
            parent,
            child,
            context,
            event,
        })
    }

    /// Remove `id` and every descendant, dismissing their screens. Returns
    /// the removed ids, leaves first. Stale ids remove nothing.
    pub fn teardown(&mut self, id: CoordinatorId, navigator: &mut dyn Navigator) -> Vec<CoordinatorId> {
        let Some(parent) = self.node(id).map(|node| node.parent) else {
            return Vec::new();
        };
        if let Some(parent_node) = parent.and_then(|p| self.node_mut(p)) {
            parent_node.children.retain(|c| *c != id);
        }

        let mut removed = Vec::new();
        self.remove_subtree(id, navigator, &mut removed);
        removed
    }

    /// Parent of a live coordinator; `None` for roots and stale ids.
    pub fn parent(&self, id: CoordinatorId) -> Option<CoordinatorId> {
        self.node(id).and_then(|node| node.parent)
    }

    /// Live children in the order they were added.
    pub fn children(&self, id: CoordinatorId) -> &[CoordinatorId] {
        self.node(id)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
    }

    /// Route the coordinator presents.
    pub fn route(&self, id: CoordinatorId) -> Option<&Route> {
        self.node(id).map(|node| &node.route)
    }

    /// Stale ids report `Finished`.
    pub fn lifecycle(&self, id: CoordinatorId) -> Lifecycle {
        self.node(id).map_or(Lifecycle::Finished, |node| node.lifecycle)
    }

    /// First live child currently showing `route`.
    pub fn child_with_route(&self, parent: CoordinatorId, route: &Route) -> Option<CoordinatorId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|child| self.route(*child) == Some(route))
    }

    // ── active row context ──

    /// Remember the row a child flow was started from.
    pub fn set_active_context(&mut self, id: CoordinatorId, context: RowContext) -> Result<()> {
        let node = self.node_mut(id).ok_or_else(|| stale(id))?;
        node.active_context = Some(context);
        Ok(())
    }

    /// Row context waiting to be handed to the next delivery.
    pub fn active_context(&self, id: CoordinatorId) -> Option<&RowContext> {
        self.node(id).and_then(|node| node.active_context.as_ref())
    }

    /// Take the row context without delivering it.
    pub fn clear_active_context(&mut self, id: CoordinatorId) -> Option<RowContext> {
        self.node_mut(id).and_then(|node| node.active_context.take())
    }

    /// Drop every context pointing into `list` (the list was reset).
    pub fn clear_contexts_for(&mut self, list: ListKey) -> usize {
        let mut cleared = 0;
        for slot in &mut self.slots {
            if let Some(node) = slot.node.as_mut()
                && node
                    .active_context
                    .as_ref()
                    .is_some_and(|ctx| ctx.list == list)
            {
                node.active_context = None;
                cleared += 1;
            }
        }
        cleared
    }

    // ── internals ──

    fn insert(&mut self, node: Node) -> CoordinatorId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return CoordinatorId {
                index,
                generation: slot.generation,
            };
        }
        let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        CoordinatorId {
            index,
            generation: 0,
        }
    }

    fn remove_subtree(
        &mut self,
        id: CoordinatorId,
        navigator: &mut dyn Navigator,
        removed: &mut Vec<CoordinatorId>,
    ) {
        let children = match self.node_mut(id) {
            Some(node) => {
                node.lifecycle = Lifecycle::Finished;
                std::mem::take(&mut node.children)
            }
            None => return,
        };
        for child in children {
            self.remove_subtree(child, navigator, removed);
        }
        navigator.dismiss(id);
        let slot = &mut self.slots[id.index as usize];
        slot.node = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live -= 1;
        removed.push(id);
    }

    fn node(&self, id: CoordinatorId) -> Option<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn node_mut(&mut self, id: CoordinatorId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }
}

fn stale(id: CoordinatorId) -> NightlightError {
    NightlightError::Navigation {
        details: format!("coordinator {id} is no longer live"),
    }
}
