//! Invalidation flag algebra shared by layout properties and the dirty sink

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Accumulated invalidation categories for one node.
///
/// Flags only ever accumulate (monotonic OR); they are consumed explicitly
/// by the pass driver, never cleared implicitly.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyChangeFlags(u32);

impl PropertyChangeFlags {
    /// Nothing changed.
    pub const NORMAL: Self = Self(0);
    /// Node must be re-measured.
    pub const MEASURE: Self = Self(1 << 0);
    /// Node must be re-laid-out.
    pub const LAYOUT: Self = Self(1 << 1);
    /// Node must re-measure itself without implying its parent.
    pub const MEASURE_SELF: Self = Self(1 << 2);
    /// Node must re-measure itself and ask the parent to re-measure.
    pub const MEASURE_SELF_AND_PARENT: Self = Self(1 << 3);
    /// Raised on a parent because a child requested its measure.
    pub const BY_CHILD_REQUEST: Self = Self(1 << 4);
    /// Paint output is stale.
    pub const RENDER: Self = Self(1 << 5);
    /// Raised on a parent because a child requested its render.
    pub const RENDER_BY_CHILD_REQUEST: Self = Self(1 << 6);
    /// Node must re-measure itself and every child.
    pub const MEASURE_SELF_AND_CHILD: Self = Self(1 << 7);

    const REQUEST_MEASURE_AND_LAYOUT: u32 = Self::MEASURE.0
        | Self::MEASURE_SELF.0
        | Self::MEASURE_SELF_AND_PARENT.0
        | Self::MEASURE_SELF_AND_CHILD.0
        | Self::BY_CHILD_REQUEST.0
        | Self::LAYOUT.0;
    const REQUEST_PARENT_MEASURE: u32 =
        Self::MEASURE.0 | Self::MEASURE_SELF_AND_PARENT.0 | Self::BY_CHILD_REQUEST.0;
    const REQUEST_MEASURE: u32 = Self::MEASURE.0
        | Self::MEASURE_SELF.0
        | Self::MEASURE_SELF_AND_PARENT.0
        | Self::MEASURE_SELF_AND_CHILD.0
        | Self::BY_CHILD_REQUEST.0;
    const REQUEST_RENDER: u32 = Self::RENDER.0 | Self::RENDER_BY_CHILD_REQUEST.0;

    /// Returns an empty flag set.
    pub const fn empty() -> Self {
        Self::NORMAL
    }

    /// Returns whether all bits in `other` are present in `self`.
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Returns whether any bit in `other` is present in `self`.
    pub const fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    /// ORs the requested bits into this set.
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Returns the raw bit representation.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns true when no bits are set.
    pub const fn is_clean(self) -> bool {
        self.0 == 0
    }

    /// True when a measure or layout pass must visit this node.
    pub const fn needs_measure_and_layout(self) -> bool {
        (self.0 & Self::REQUEST_MEASURE_AND_LAYOUT) != 0
    }

    /// True when the change also requires the parent to re-measure.
    pub const fn needs_parent_measure(self) -> bool {
        (self.0 & Self::REQUEST_PARENT_MEASURE) != 0
    }

    /// True when this node itself must be re-measured.
    pub const fn needs_measure(self) -> bool {
        (self.0 & Self::REQUEST_MEASURE) != 0
    }

    /// True when this node must be re-laid-out.
    pub const fn needs_layout(self) -> bool {
        (self.0 & Self::LAYOUT.0) != 0
    }

    /// True when the paint output is stale.
    pub const fn needs_render(self) -> bool {
        (self.0 & Self::REQUEST_RENDER) != 0
    }
}

impl Default for PropertyChangeFlags {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl fmt::Debug for PropertyChangeFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyChangeFlags")
            .field("measure", &self.contains(Self::MEASURE))
            .field("layout", &self.contains(Self::LAYOUT))
            .field("measure_self", &self.contains(Self::MEASURE_SELF))
            .field(
                "measure_self_and_parent",
                &self.contains(Self::MEASURE_SELF_AND_PARENT),
            )
            .field("by_child_request", &self.contains(Self::BY_CHILD_REQUEST))
            .field("render", &self.contains(Self::RENDER))
            .field(
                "render_by_child_request",
                &self.contains(Self::RENDER_BY_CHILD_REQUEST),
            )
            .field(
                "measure_self_and_child",
                &self.contains(Self::MEASURE_SELF_AND_CHILD),
            )
            .finish()
    }
}

impl BitOr for PropertyChangeFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for PropertyChangeFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

#[cfg(test)]
#[path = "tests/flags_tests.rs"]
mod tests;
