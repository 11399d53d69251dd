//! Box constraints handed from parent to child during measurement

use trellis_graphics::{EdgeInsets, OptionalSize, Size};

/// The box constraint one node receives for one measure pass.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoxConstraint {
    pub min_size: Size,
    pub max_size: Size,
    /// Basis against which percentage lengths resolve. Inherited from the
    /// parent's resolved content size; a constraint cloned across
    /// containers must re-derive it.
    pub percent_reference: Size,
    /// The parent's own ideal size, consulted by `MatchParent` measurement.
    pub parent_ideal_size: OptionalSize,
    /// The dimensions this node was explicitly asked to take, if any.
    pub self_ideal_size: OptionalSize,
}

impl BoxConstraint {
    /// A constraint with no upper bound and no percent basis.
    pub fn unbounded() -> Self {
        Self {
            min_size: Size::ZERO,
            max_size: Size::new(f32::INFINITY, f32::INFINITY),
            percent_reference: Size::ZERO,
            parent_ideal_size: OptionalSize::UNSET,
            self_ideal_size: OptionalSize::UNSET,
        }
    }

    /// Clamps `size` into `[min_size, max_size]` component-wise.
    pub fn constrain(&self, size: Size) -> Size {
        size.clamp(self.min_size, self.max_size)
    }

    /// Shrinks the constraint by per-edge insets, as when carving the
    /// content area out of padding and border.
    ///
    /// The max size and each set ideal dimension shrink, clamped at zero;
    /// the min size is then re-clamped into the shrunk max so the
    /// `min <= max` invariant survives.
    pub fn minus_insets(&mut self, insets: EdgeInsets) {
        if insets.is_zero() {
            return;
        }
        self.max_size = self.max_size.minus_insets(insets);
        self.self_ideal_size.minus_insets(insets);
        self.min_size = self.min_size.clamp(Size::ZERO, self.max_size);
    }

    /// Derives the unset ideal dimension from the set one so that
    /// `width / height == ratio`, capped at the matching max extent.
    ///
    /// A width that is already set wins over a set height; with neither
    /// dimension set there is nothing to derive.
    pub fn apply_aspect_ratio(&mut self, ratio: f32) {
        if !ratio.is_finite() || ratio <= 0.0 {
            return;
        }
        match (self.self_ideal_size.width, self.self_ideal_size.height) {
            (Some(_), Some(_)) | (None, None) => {}
            (Some(width), None) => {
                let height = width / ratio;
                self.self_ideal_size.height = Some(if self.max_size.height.is_finite() {
                    height.min(self.max_size.height)
                } else {
                    height
                });
            }
            (None, Some(height)) => {
                let width = height * ratio;
                self.self_ideal_size.width = Some(if self.max_size.width.is_finite() {
                    width.min(self.max_size.width)
                } else {
                    width
                });
            }
        }
    }

    /// Returns true once `min <= max` holds component-wise.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.min_size.width <= self.max_size.width && self.min_size.height <= self.max_size.height
    }
}

#[cfg(test)]
#[path = "tests/constraint_tests.rs"]
mod tests;
