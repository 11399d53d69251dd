//! Declared per-edge properties (padding, margin, border widths)

use trellis_graphics::EdgeInsets;

use crate::CalcLength;

/// Four independently-optional declared edges.
///
/// An unset edge is not the same as a zero edge: unset falls back to the
/// resolver's default (zero, or an injected theme value).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PaddingProperty {
    pub left: Option<CalcLength>,
    pub top: Option<CalcLength>,
    pub right: Option<CalcLength>,
    pub bottom: Option<CalcLength>,
}

/// Margins share the padding shape.
pub type MarginProperty = PaddingProperty;
/// Border widths share the padding shape.
pub type BorderWidthProperty = PaddingProperty;

impl PaddingProperty {
    pub fn uniform(all: CalcLength) -> Self {
        Self {
            left: Some(all),
            top: Some(all),
            right: Some(all),
            bottom: Some(all),
        }
    }

    pub fn from_lengths(
        left: CalcLength,
        top: CalcLength,
        right: CalcLength,
        bottom: CalcLength,
    ) -> Self {
        Self {
            left: Some(left),
            top: Some(top),
            right: Some(right),
            bottom: Some(bottom),
        }
    }

    /// Merges the declared edges of `value` into this property.
    ///
    /// Only edges the new value declares participate: a declared edge
    /// overwrites on difference, an undeclared edge keeps whatever was
    /// stored before. Returns true when any edge changed.
    pub fn update_with_check(&mut self, value: PaddingProperty) -> bool {
        let mut changed = false;
        let mut merge = |edge: &mut Option<CalcLength>, new: Option<CalcLength>| {
            if new.is_some() && *edge != new {
                *edge = new;
                changed = true;
            }
        };
        merge(&mut self.left, value.left);
        merge(&mut self.top, value.top);
        merge(&mut self.right, value.right);
        merge(&mut self.bottom, value.bottom);
        changed
    }

    /// Resolves each edge against the percent-reference width.
    ///
    /// Edge percentages resolve against the reference width on every edge,
    /// including top and bottom. Unset or unresolvable edges take the
    /// matching component of `default`.
    pub fn resolve_with_default(&self, reference_width: f32, default: EdgeInsets) -> EdgeInsets {
        let edge = |length: Option<CalcLength>, fallback: f32| {
            length
                .and_then(|l| l.resolve(reference_width))
                .unwrap_or(fallback)
        };
        EdgeInsets {
            left: edge(self.left, default.left),
            top: edge(self.top, default.top),
            right: edge(self.right, default.right),
            bottom: edge(self.bottom, default.bottom),
        }
    }

    /// Resolves each edge with unset edges contributing zero.
    pub fn resolve(&self, reference_width: f32) -> EdgeInsets {
        self.resolve_with_default(reference_width, EdgeInsets::ZERO)
    }
}
