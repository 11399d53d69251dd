//! Node storage, id allocation, and the dirty-node sink

use std::cell::{Cell, RefCell};

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use trellis_layout::PropertyChangeFlags;

use crate::{NodeId, NodeKind, StackError, UiNode};

/// Everything a build stack needs from its surroundings: node storage,
/// id allocation, and the two dirty queues the pass driver polls.
///
/// Nodes are keyed by id; the registry owns them and hands out scoped
/// mutable access through [`ElementRegistry::with_node`]. One registry per
/// UI thread, shared by every stack built on it.
#[derive(Debug, Default)]
pub struct ElementRegistry {
    nodes: RefCell<FxHashMap<NodeId, UiNode>>,
    next_id: Cell<NodeId>,
    reserved_id: Cell<Option<NodeId>>,
    dirty_layout: RefCell<SmallVec<[NodeId; 16]>>,
    dirty_render: RefCell<SmallVec<[NodeId; 16]>>,
}

struct DirtySnapshot {
    flags: PropertyChangeFlags,
    parent: Option<NodeId>,
    measure_boundary: bool,
    request_parent: bool,
    layout_marked: bool,
    render_marked: bool,
    render_boundary: bool,
}

impl ElementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // --- id allocation ---

    /// Hands out the next unused id. Monotonic for the registry lifetime.
    pub fn make_unique_id(&self) -> NodeId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    /// Parks `id` for the next [`ElementRegistry::claim_node_id`] call, as
    /// when a recycled element re-enters the build with its old identity.
    pub fn reserve_id(&self, id: NodeId) {
        self.reserved_id.set(Some(id));
        if id >= self.next_id.get() {
            self.next_id.set(id + 1);
        }
    }

    /// Takes the reserved id if one is parked, else allocates fresh. The
    /// reservation is consumed by the first claim.
    pub fn claim_node_id(&self) -> NodeId {
        match self.reserved_id.take() {
            Some(id) => id,
            None => self.make_unique_id(),
        }
    }

    // --- node storage ---

    /// Creates a node under a claimed id and returns the id.
    pub fn create_node(&self, tag: impl Into<String>, kind: NodeKind) -> NodeId {
        let id = self.claim_node_id();
        self.nodes.borrow_mut().insert(id, UiNode::new(tag, id, kind));
        id
    }

    /// Runs `f` with mutable access to the node.
    pub fn with_node<R>(
        &self,
        id: NodeId,
        f: impl FnOnce(&mut UiNode) -> R,
    ) -> Result<R, StackError> {
        let mut nodes = self.nodes.borrow_mut();
        let node = nodes.get_mut(&id).ok_or(StackError::MissingNode { id })?;
        Ok(f(node))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.borrow().contains_key(&id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.borrow().len()
    }

    /// Drops the node's storage. Detaching it from its parent first is the
    /// caller's business.
    pub fn remove_node(&self, id: NodeId) -> bool {
        self.nodes.borrow_mut().remove(&id).is_some()
    }

    /// Wipes storage, queues, and the allocator. Test scaffolding and
    /// whole-page teardown only.
    pub fn clear(&self) {
        self.nodes.borrow_mut().clear();
        self.dirty_layout.borrow_mut().clear();
        self.dirty_render.borrow_mut().clear();
        self.reserved_id.set(None);
        self.next_id.set(0);
    }

    // --- tree editing ---

    /// Attaches `child` under `parent`.
    ///
    /// `slot` picks the insertion position, appending when `None` or out
    /// of range. A Group parent overrides the slot: mount is delegated, and
    /// the child lands before the trailing run of silently-removed
    /// children so retained branch content stays rightmost. A non-silent
    /// mount raises `MEASURE` on the parent.
    pub fn add_child(
        &self,
        parent: NodeId,
        child: NodeId,
        slot: Option<usize>,
        silently: bool,
    ) -> Result<(), StackError> {
        let index = {
            let nodes = self.nodes.borrow();
            if !nodes.contains_key(&child) {
                return Err(StackError::MissingNode { id: child });
            }
            let parent_node = nodes
                .get(&parent)
                .ok_or(StackError::MissingNode { id: parent })?;
            if parent_node.is_group() {
                Some(slot_before_silent_tail(&nodes, parent_node))
            } else {
                slot
            }
        };
        {
            let mut nodes = self.nodes.borrow_mut();
            let parent_node = nodes
                .get_mut(&parent)
                .ok_or(StackError::MissingNode { id: parent })?;
            match index {
                Some(index) if index < parent_node.child_count() => {
                    parent_node.insert_child_at(index, child);
                }
                _ => parent_node.insert_child(child),
            }
        }
        let nodes = self.nodes.borrow();
        if let Some(child_node) = nodes.get(&child) {
            child_node.set_parent(parent);
            child_node.set_removed_silently(false);
        }
        if !silently {
            if let Some(parent_node) = nodes.get(&parent) {
                parent_node.mark_dirty(PropertyChangeFlags::MEASURE);
            }
        }
        Ok(())
    }

    /// Detaches `child` from `parent`, raising `MEASURE` on the parent
    /// when the child was actually attached.
    pub fn remove_child(&self, parent: NodeId, child: NodeId) -> Result<(), StackError> {
        let detached = self.with_node(parent, |parent_node| parent_node.remove_child(child))?;
        if !detached {
            return Ok(());
        }
        let nodes = self.nodes.borrow();
        if let Some(child_node) = nodes.get(&child) {
            child_node.clear_parent();
        }
        if let Some(parent_node) = nodes.get(&parent) {
            parent_node.mark_dirty(PropertyChangeFlags::MEASURE);
        }
        Ok(())
    }

    /// Detaches `child` keeping its state for later reuse: the node stays
    /// in storage, flagged `removed_silently`, and the parent is not
    /// invalidated.
    pub fn remove_child_silently(&self, parent: NodeId, child: NodeId) -> Result<(), StackError> {
        let detached = self.with_node(parent, |parent_node| parent_node.remove_child(child))?;
        if !detached {
            return Ok(());
        }
        let nodes = self.nodes.borrow();
        if let Some(child_node) = nodes.get(&child) {
            child_node.clear_parent();
            child_node.set_removed_silently(true);
        }
        Ok(())
    }

    // --- dirty sink ---

    /// ORs `extra` into the node's flags and routes the result.
    ///
    /// Measure-and-layout changes walk up while the node is not a measure
    /// boundary and its accumulated flags still demand a parent measure,
    /// re-entering on the parent with `BY_CHILD_REQUEST`; the walk ends at
    /// the node that absorbs the request, which is enqueued once into the
    /// dirty-layout queue. Render-only changes walk up through nodes that
    /// are not render boundaries, re-entering with `RENDER_BY_CHILD_REQUEST`,
    /// and enqueue the stopping node once into the dirty-render queue. Only
    /// enqueued nodes carry a dirty mark, so a drained queue can accept the
    /// same node again. A node whose flags come out clean is not routed at
    /// all.
    pub fn mark_dirty_node(
        &self,
        id: NodeId,
        extra: PropertyChangeFlags,
    ) -> Result<(), StackError> {
        let snapshot = self.with_node(id, |node| {
            node.mark_dirty(extra);
            DirtySnapshot {
                flags: node.layout().change_flags(),
                parent: node.parent(),
                measure_boundary: node.is_measure_boundary(),
                request_parent: node.layout().need_request_parent_measure(),
                layout_marked: node.layout_dirty_marked(),
                render_marked: node.render_dirty_marked(),
                render_boundary: node.is_render_boundary(),
            }
        })?;
        if snapshot.flags.is_clean() {
            return Ok(());
        }
        if snapshot.flags.needs_measure_and_layout() {
            if !snapshot.measure_boundary && snapshot.request_parent {
                if let Some(parent) = snapshot.parent {
                    return self.mark_dirty_node(parent, PropertyChangeFlags::BY_CHILD_REQUEST);
                }
            }
            if !snapshot.layout_marked {
                self.with_node(id, |node| node.set_layout_dirty_marked(true))?;
                self.dirty_layout.borrow_mut().push(id);
            }
            return Ok(());
        }
        if snapshot.flags.needs_render() {
            if snapshot.render_marked || snapshot.layout_marked {
                return Ok(());
            }
            if !snapshot.render_boundary {
                if let Some(parent) = snapshot.parent {
                    return self
                        .mark_dirty_node(parent, PropertyChangeFlags::RENDER_BY_CHILD_REQUEST);
                }
            }
            self.with_node(id, |node| node.set_render_dirty_marked(true))?;
            self.dirty_render.borrow_mut().push(id);
        }
        Ok(())
    }

    /// Drains the dirty-layout queue in first-enqueue order, clearing each
    /// node's layout mark so it can be enqueued again next pass.
    pub fn take_dirty_layout_nodes(&self) -> Vec<NodeId> {
        let drained: Vec<NodeId> = self.dirty_layout.borrow_mut().drain(..).collect();
        for &id in &drained {
            let _ = self.with_node(id, |node| node.set_layout_dirty_marked(false));
        }
        drained
    }

    /// Drains the dirty-render queue in first-enqueue order, clearing each
    /// node's render mark.
    pub fn take_dirty_render_nodes(&self) -> Vec<NodeId> {
        let drained: Vec<NodeId> = self.dirty_render.borrow_mut().drain(..).collect();
        for &id in &drained {
            let _ = self.with_node(id, |node| node.set_render_dirty_marked(false));
        }
        drained
    }
}

/// Position just before the trailing run of silently-removed children.
fn slot_before_silent_tail(nodes: &FxHashMap<NodeId, UiNode>, parent: &UiNode) -> usize {
    let children = parent.children();
    let mut index = children.len();
    while index > 0 {
        let silent = nodes
            .get(&children[index - 1])
            .map(|node| node.removed_silently())
            .unwrap_or(false);
        if !silent {
            break;
        }
        index -= 1;
    }
    index
}

#[cfg(test)]
#[path = "tests/registry_tests.rs"]
mod tests;
