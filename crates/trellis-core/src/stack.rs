//! The build stack: incremental view construction over registry nodes

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use trellis_layout::{PropertyChangeFlags, VisualState};

use crate::{ElementRegistry, NodeId, StackError};

/// One in-progress view construction.
///
/// Widget code pushes a node when its scope opens and pops it when the
/// scope closes; popping mounts the node under the new top. The stack is
/// single-threaded and non-reentrant within one build pass; nesting goes
/// through [`enter`](crate::enter) and its scope guard, never through
/// sharing.
pub struct BuildStack {
    registry: Rc<ElementRegistry>,
    elements: RefCell<Vec<NodeId>>,
    key_lengths: RefCell<SmallVec<[usize; 8]>>,
    view_key: RefCell<String>,
    visual_state: Cell<Option<VisualState>>,
}

impl BuildStack {
    pub fn new(registry: Rc<ElementRegistry>) -> Self {
        Self {
            registry,
            elements: RefCell::new(Vec::new()),
            key_lengths: RefCell::new(SmallVec::new()),
            view_key: RefCell::new(String::new()),
            visual_state: Cell::new(None),
        }
    }

    pub fn registry(&self) -> &Rc<ElementRegistry> {
        &self.registry
    }

    pub fn depth(&self) -> usize {
        self.elements.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.borrow().is_empty()
    }

    /// The open element everything builds into right now.
    pub fn main_element_node(&self) -> Option<NodeId> {
        self.elements.borrow().last().copied()
    }

    /// The top element when it is a frame, `None` otherwise.
    pub fn main_frame_node(&self) -> Option<NodeId> {
        let top = self.main_element_node()?;
        self.registry
            .with_node(top, |node| node.has_paint_surface())
            .unwrap_or(false)
            .then_some(top)
    }

    /// Delegates to the registry's reserved-id slot.
    pub fn claim_node_id(&self) -> NodeId {
        self.registry.claim_node_id()
    }

    /// Opens `id` as the element under construction.
    ///
    /// An atomic top is closed first: atomic elements never stay open
    /// across a sibling push, so pushing onto one finalizes it into its
    /// own parent. The pushed node gets its parent hint and loses any
    /// silent-removal flag from a previous pass.
    pub fn push(&self, id: NodeId) {
        if self.should_pop_immediately() {
            self.pop(None);
        }
        let parent = self.main_element_node();
        let registered = self.registry.with_node(id, |node| {
            node.set_removed_silently(false);
            if let Some(parent) = parent {
                node.set_parent(parent);
            }
        });
        if registered.is_err() {
            log::warn!("push: node {id} is not registered, ignoring");
            return;
        }
        self.elements.borrow_mut().push(id);
    }

    fn should_pop_immediately(&self) -> bool {
        let top = {
            let elements = self.elements.borrow();
            if elements.len() <= 1 {
                return false;
            }
            elements.last().copied()
        };
        let Some(top) = top else {
            return false;
        };
        self.registry
            .with_node(top, |node| node.is_atomic())
            .unwrap_or(false)
    }

    /// Closes the top element and mounts it under the new top.
    ///
    /// The root element is never popped. `slot` picks the mount position
    /// for plain parents (append when `None` or out of range); Group
    /// parents decide their own position, and an iteration container
    /// mounts silently pending reconciliation.
    pub fn pop(&self, slot: Option<usize>) {
        let child = {
            let mut elements = self.elements.borrow_mut();
            if elements.len() <= 1 {
                return;
            }
            let Some(id) = elements.pop() else {
                return;
            };
            id
        };
        self.seal(child);
        let Some(parent) = self.main_element_node() else {
            return;
        };
        let for_each = self
            .registry
            .with_node(parent, |node| node.is_for_each())
            .unwrap_or(false);
        let (slot, silently) = if for_each { (None, true) } else { (slot, false) };
        if let Err(err) = self.registry.add_child(parent, child, slot, silently) {
            log::warn!("pop: mounting node {child} under {parent} failed: {err}");
        }
    }

    /// Closes the innermost container: any run of atomic elements on top
    /// is popped first, then the container itself. Never pops the last
    /// remaining entry.
    pub fn pop_container(&self) {
        let Some(top) = self.main_element_node() else {
            return;
        };
        let atomic = self
            .registry
            .with_node(top, |node| node.is_atomic())
            .unwrap_or(false);
        if !atomic {
            self.pop(None);
            return;
        }
        while self.depth() > 1 {
            let Some(top) = self.main_element_node() else {
                break;
            };
            let atomic = self
                .registry
                .with_node(top, |node| node.is_atomic())
                .unwrap_or(false);
            if !atomic {
                break;
            }
            self.pop(None);
        }
        self.pop(None);
    }

    /// Pops the top element without mounting it and returns it, for the
    /// caller to mount or adopt as a detached subtree. Iteration
    /// containers reconcile their pending ids here.
    pub fn finish(&self) -> Result<NodeId, StackError> {
        let popped = self.elements.borrow_mut().pop();
        let Some(id) = popped else {
            log::warn!("finish on an empty build stack");
            return Err(StackError::EmptyStack);
        };
        self.seal(id);
        let remaining = self.depth();
        if remaining > 0 {
            log::debug!("finish leaves {remaining} element(s) on the stack");
        }
        Ok(id)
    }

    fn seal(&self, id: NodeId) {
        let for_each = self
            .registry
            .with_node(id, |node| node.is_for_each())
            .unwrap_or(false);
        if for_each {
            self.reconcile_for_each(id);
        }
        let _ = self.registry.with_node(id, |node| {
            if node.has_paint_surface() {
                node.mark_debug_boundary();
            }
        });
    }

    // --- key path ---

    /// Appends a scope segment to the view key. Segments are joined with
    /// `_`; the first segment joins nothing.
    pub fn push_key(&self, segment: &str) {
        let mut view_key = self.view_key.borrow_mut();
        if view_key.is_empty() {
            view_key.push_str(segment);
            self.key_lengths.borrow_mut().push(segment.len());
        } else {
            view_key.push('_');
            view_key.push_str(segment);
            self.key_lengths.borrow_mut().push(segment.len() + 1);
        }
    }

    /// Removes the most recent scope segment, restoring the view key to
    /// its pre-push value.
    pub fn pop_key(&self) -> Result<(), StackError> {
        let Some(count) = self.key_lengths.borrow_mut().pop() else {
            return Err(StackError::StaleKeyPop);
        };
        let mut view_key = self.view_key.borrow_mut();
        let truncated = view_key.len().saturating_sub(count);
        view_key.truncate(truncated);
        Ok(())
    }

    /// Namespaces `id` with the current view key.
    pub fn process_view_id(&self, id: &str) -> String {
        let view_key = self.view_key.borrow();
        if view_key.is_empty() {
            id.to_string()
        } else {
            format!("{}_{}", view_key.as_str(), id)
        }
    }

    pub fn view_key(&self) -> String {
        self.view_key.borrow().clone()
    }

    // --- visual state ---

    pub fn set_visual_state(&self, state: VisualState) {
        self.visual_state.set(Some(state));
    }

    pub fn clear_visual_state(&self) {
        self.visual_state.set(None);
    }

    pub fn visual_state(&self) -> Option<VisualState> {
        self.visual_state.get()
    }

    /// Whether styling declared for the selected visual state applies
    /// right now. Pass-through `true` when no state is selected; `false`
    /// when no frame is on top to ask.
    pub fn is_current_visual_state_active(&self) -> bool {
        let Some(state) = self.visual_state.get() else {
            return true;
        };
        let Some(frame) = self.main_frame_node() else {
            return false;
        };
        self.registry
            .with_node(frame, |node| node.is_state_active(state))
            .unwrap_or(false)
    }

    // --- iteration containers ---

    /// Stashes the id list for the open iteration container; applied by
    /// the reconciliation that runs when the container is finished.
    pub fn set_for_each_ids(&self, ids: Vec<String>) {
        let Some(top) = self.main_element_node() else {
            log::warn!("set_for_each_ids with no open element");
            return;
        };
        let applied = self
            .registry
            .with_node(top, |node| match node.for_each_state_mut() {
                Some(state) => {
                    state.pending_ids = Some(ids);
                    true
                }
                None => false,
            })
            .unwrap_or(false);
        if !applied {
            log::warn!("set_for_each_ids: node {top} is not an iteration container");
        }
    }

    /// Rebuilds the container's child list in new-id order.
    ///
    /// Children beyond the previous id list are the fresh nodes pushed
    /// this pass, consumed in order for ids with no previous match.
    /// Children whose id disappeared are removed silently, state retained
    /// for a later pass. The container re-measures only when the mounted
    /// list actually changed.
    fn reconcile_for_each(&self, id: NodeId) {
        let plan = self.registry.with_node(id, |node| {
            let children = node.children();
            let state = node.for_each_state_mut()?;
            let pending = state.pending_ids.take()?;
            let old_ids = std::mem::replace(&mut state.ids, pending.clone());
            Some((children, old_ids, pending))
        });
        let Ok(Some((children, old_ids, new_ids))) = plan else {
            return;
        };

        let split = old_ids.len().min(children.len());
        let (previous, fresh) = children.split_at(split);
        let mut by_id: FxHashMap<&str, NodeId> = old_ids
            .iter()
            .map(String::as_str)
            .zip(previous.iter().copied())
            .collect();
        let mut fresh_iter = fresh.iter().copied();

        let mut ordered: Vec<NodeId> = Vec::with_capacity(new_ids.len());
        for key in &new_ids {
            if let Some(node_id) = by_id.remove(key.as_str()).or_else(|| fresh_iter.next()) {
                ordered.push(node_id);
            }
        }
        let leftovers: Vec<NodeId> = by_id.into_values().chain(fresh_iter).collect();

        let order_changed = ordered != children;
        let _ = self.registry.with_node(id, |node| {
            if order_changed {
                node.update_children(&ordered);
                node.mark_dirty(PropertyChangeFlags::MEASURE);
            }
        });
        for leftover in leftovers {
            let _ = self.registry.with_node(leftover, |node| {
                node.clear_parent();
                node.set_removed_silently(true);
            });
        }
        for &kept in &ordered {
            let _ = self.registry.with_node(kept, |node| {
                node.set_parent(id);
                node.set_removed_silently(false);
            });
        }
    }
}

impl std::fmt::Debug for BuildStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildStack")
            .field("depth", &self.depth())
            .field("view_key", &self.view_key.borrow().as_str())
            .field("visual_state", &self.visual_state.get())
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/stack_tests.rs"]
mod tests;
