//! View-construction & layout-invalidation core for Trellis
//!
//! A thread-local build stack turns declarative construction calls into a
//! mounted node tree; every node carries a layout property that resolves
//! parent constraints into its own and its content's constraints and
//! accumulates invalidation flags for the pass driver to consume.

pub mod build_context;
mod layout_property;
mod node;
mod registry;
mod stack;

pub use build_context::{enter, try_with_build_stack, with_build_stack, ScopedBuildStack};
pub use layout_property::LayoutProperty;
pub use node::{ForEachState, NodeKind, UiNode};
pub use registry::ElementRegistry;
pub use stack::BuildStack;

pub mod prelude {
    pub use crate::build_context::{enter, try_with_build_stack, with_build_stack, ScopedBuildStack};
    pub use crate::{
        BuildStack, ConstraintError, ElementRegistry, LayoutProperty, NodeId, NodeKind, StackError,
        UiNode,
    };
    pub use trellis_graphics::prelude::*;
    pub use trellis_layout::prelude::*;
}

use trellis_graphics::Size;

pub type NodeId = usize;

/// Errors surfaced by stack and registry operations.
///
/// These are programmer-error conditions, not transient ones; the build
/// driver decides whether to abort the pass or skip the offending node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackError {
    EmptyStack,
    StaleKeyPop,
    MissingNode { id: NodeId },
}

impl std::fmt::Display for StackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StackError::EmptyStack => write!(f, "operation on an empty build stack"),
            StackError::StaleKeyPop => write!(f, "pop_key without a matching push_key"),
            StackError::MissingNode { id } => write!(f, "node {id} missing"),
        }
    }
}

impl std::error::Error for StackError {}

/// Errors surfaced by constraint resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintError {
    /// Resolved min exceeds max after clamping. Not reachable when the
    /// documented resolution order is followed.
    InvalidConstraint { min: Size, max: Size },
}

impl std::fmt::Display for ConstraintError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstraintError::InvalidConstraint { min, max } => write!(
                f,
                "resolved constraint min ({} x {}) exceeds max ({} x {})",
                min.width, min.height, max.width, max.height
            ),
        }
    }
}

impl std::error::Error for ConstraintError {}
