//! Tree nodes produced by the build stack

use std::cell::Cell;

use indexmap::IndexSet;
use trellis_layout::{PropertyChangeFlags, VisualState};

use crate::{LayoutProperty, NodeId};

/// Reconciliation state carried by an indexed iteration container.
///
/// `ids` are the child identities of the previous build; a rebuild stashes
/// the freshly declared order in `pending_ids` and the diff runs when the
/// container is finished.
#[derive(Debug, Clone, Default)]
pub struct ForEachState {
    pub ids: Vec<String>,
    pub pending_ids: Option<Vec<String>>,
}

/// The closed set of node kinds the stack distinguishes.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// A concrete element with a paint surface. An atomic frame accepts no
    /// further pushed children; a push on top of one closes it first.
    Frame { atomic: bool },
    /// A grouping container that adopts mounted children itself, e.g. for
    /// conditional rendering.
    Group,
    /// An indexed iteration container whose children are reconciled by id.
    ForEach(ForEachState),
}

impl NodeKind {
    pub const fn is_atomic(&self) -> bool {
        matches!(self, NodeKind::Frame { atomic: true })
    }

    pub const fn is_group(&self) -> bool {
        matches!(self, NodeKind::Group)
    }

    pub const fn is_for_each(&self) -> bool {
        matches!(self, NodeKind::ForEach(_))
    }

    /// Frames own a paint surface; groups and iteration containers are
    /// structural only.
    pub const fn has_paint_surface(&self) -> bool {
        matches!(self, NodeKind::Frame { .. })
    }
}

/// One node of the retained tree.
///
/// A node exclusively owns its children (by id, through the registry) and
/// holds a non-owning back-reference to its parent. Interaction state and
/// dirty bookkeeping use `Cell` so event dispatch and the dirty sink can
/// write through shared references.
#[derive(Debug)]
pub struct UiNode {
    tag: String,
    id: NodeId,
    kind: NodeKind,
    children: IndexSet<NodeId>,
    parent: Cell<Option<NodeId>>,
    removed_silently: Cell<bool>,
    needs_debug_boundary: Cell<bool>,
    measure_boundary: Cell<bool>,
    render_boundary: Cell<bool>,
    layout_dirty_marked: Cell<bool>,
    render_dirty_marked: Cell<bool>,
    /// Active interaction-state bits, written by event dispatch.
    state_flags: Cell<u32>,
    layout: LayoutProperty,
}

impl UiNode {
    pub fn new(tag: impl Into<String>, id: NodeId, kind: NodeKind) -> Self {
        // Frames paint into their own surface, so render dirt stops there.
        let render_boundary = kind.has_paint_surface();
        let node = Self {
            tag: tag.into(),
            id,
            kind,
            children: IndexSet::new(),
            parent: Cell::new(None),
            removed_silently: Cell::new(false),
            needs_debug_boundary: Cell::new(false),
            measure_boundary: Cell::new(false),
            render_boundary: Cell::new(render_boundary),
            layout_dirty_marked: Cell::new(false),
            render_dirty_marked: Cell::new(false),
            state_flags: Cell::new(0),
            layout: LayoutProperty::default(),
        };
        node.layout.set_host(id);
        node
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_atomic(&self) -> bool {
        self.kind.is_atomic()
    }

    pub fn is_group(&self) -> bool {
        self.kind.is_group()
    }

    pub fn is_for_each(&self) -> bool {
        self.kind.is_for_each()
    }

    pub fn has_paint_surface(&self) -> bool {
        self.kind.has_paint_surface()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent.get()
    }

    pub fn set_parent(&self, parent: NodeId) {
        self.parent.set(Some(parent));
    }

    pub fn clear_parent(&self) {
        self.parent.set(None);
    }

    /// Snapshot of the ordered child ids.
    pub fn children(&self) -> Vec<NodeId> {
        self.children.iter().copied().collect()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub(crate) fn insert_child(&mut self, child: NodeId) {
        self.children.insert(child);
    }

    pub(crate) fn insert_child_at(&mut self, index: usize, child: NodeId) {
        if index >= self.children.len() {
            self.children.insert(child);
            return;
        }
        let mut ordered: Vec<NodeId> = self.children.iter().copied().collect();
        ordered.insert(index, child);
        self.children.clear();
        for id in ordered {
            self.children.insert(id);
        }
    }

    pub(crate) fn remove_child(&mut self, child: NodeId) -> bool {
        self.children.shift_remove(&child)
    }

    pub(crate) fn update_children(&mut self, children: &[NodeId]) {
        self.children.clear();
        for &child in children {
            self.children.insert(child);
        }
    }

    pub fn removed_silently(&self) -> bool {
        self.removed_silently.get()
    }

    pub fn set_removed_silently(&self, removed: bool) {
        self.removed_silently.set(removed);
    }

    pub fn needs_debug_boundary(&self) -> bool {
        self.needs_debug_boundary.get()
    }

    pub(crate) fn mark_debug_boundary(&self) {
        self.needs_debug_boundary.set(true);
    }

    pub fn is_measure_boundary(&self) -> bool {
        self.measure_boundary.get()
    }

    pub fn set_measure_boundary(&self, boundary: bool) {
        self.measure_boundary.set(boundary);
    }

    pub fn is_render_boundary(&self) -> bool {
        self.render_boundary.get()
    }

    pub fn set_render_boundary(&self, boundary: bool) {
        self.render_boundary.set(boundary);
    }

    pub(crate) fn layout_dirty_marked(&self) -> bool {
        self.layout_dirty_marked.get()
    }

    pub(crate) fn set_layout_dirty_marked(&self, marked: bool) {
        self.layout_dirty_marked.set(marked);
    }

    pub(crate) fn render_dirty_marked(&self) -> bool {
        self.render_dirty_marked.get()
    }

    pub(crate) fn set_render_dirty_marked(&self, marked: bool) {
        self.render_dirty_marked.set(marked);
    }

    pub fn state_flags(&self) -> u32 {
        self.state_flags.get()
    }

    pub fn add_state_flag(&self, bit: u32) {
        self.state_flags.set(self.state_flags.get() | bit);
    }

    pub fn remove_state_flag(&self, bit: u32) {
        self.state_flags.set(self.state_flags.get() & !bit);
    }

    /// Whether the given visual state is currently live on this node.
    /// `Normal` holds exactly when no other state bit is set.
    pub fn is_state_active(&self, state: VisualState) -> bool {
        match state {
            VisualState::Normal => self.state_flags.get() == 0,
            other => self.state_flags.get() & other.bit() != 0,
        }
    }

    pub fn layout(&self) -> &LayoutProperty {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut LayoutProperty {
        &mut self.layout
    }

    /// Shorthand for raising invalidation flags on this node's layout.
    pub fn mark_dirty(&self, flags: PropertyChangeFlags) {
        self.layout.mark_dirty(flags);
    }

    pub(crate) fn for_each_state_mut(&mut self) -> Option<&mut ForEachState> {
        match &mut self.kind {
            NodeKind::ForEach(state) => Some(state),
            _ => None,
        }
    }
}
