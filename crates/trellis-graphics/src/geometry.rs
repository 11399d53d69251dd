//! Geometric primitives: Size, OptionalSize, EdgeInsets

use std::ops::AddAssign;

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub fn is_positive(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Clamps both components into `[min, max]` component-wise.
    pub fn clamp(&self, min: Size, max: Size) -> Size {
        Size {
            width: self.width.clamp(min.width, max.width),
            height: self.height.clamp(min.height, max.height),
        }
    }

    /// Shrinks the size by the given insets, never below zero.
    pub fn minus_insets(&self, insets: EdgeInsets) -> Size {
        Size {
            width: (self.width - insets.horizontal_sum()).max(0.0),
            height: (self.height - insets.vertical_sum()).max(0.0),
        }
    }
}

/// A size whose dimensions are independently optional.
///
/// "Unset" is distinct from "explicitly zero": an unset dimension is still
/// open for later resolution (content size, parent ideal, aspect ratio),
/// while a zero dimension is a resolved answer.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct OptionalSize {
    pub width: Option<f32>,
    pub height: Option<f32>,
}

impl OptionalSize {
    pub const fn new(width: Option<f32>, height: Option<f32>) -> Self {
        Self { width, height }
    }

    pub const UNSET: OptionalSize = OptionalSize {
        width: None,
        height: None,
    };

    pub fn from_size(size: Size) -> Self {
        Self {
            width: Some(size.width),
            height: Some(size.height),
        }
    }

    pub fn set_width(&mut self, width: f32) {
        self.width = Some(width);
    }

    pub fn set_height(&mut self, height: f32) {
        self.height = Some(height);
    }

    pub fn is_fully_set(&self) -> bool {
        self.width.is_some() && self.height.is_some()
    }

    /// Fills each unset dimension from `other`, leaving set ones alone.
    pub fn fill_unset_from(&mut self, other: OptionalSize) {
        if self.width.is_none() {
            self.width = other.width;
        }
        if self.height.is_none() {
            self.height = other.height;
        }
    }

    /// Resolves to a concrete size, taking unset dimensions from `fallback`.
    pub fn to_size_or(&self, fallback: Size) -> Size {
        Size {
            width: self.width.unwrap_or(fallback.width),
            height: self.height.unwrap_or(fallback.height),
        }
    }

    /// Shrinks each set dimension by the matching inset sum, never below zero.
    pub fn minus_insets(&mut self, insets: EdgeInsets) {
        if let Some(width) = self.width {
            self.width = Some((width - insets.horizontal_sum()).max(0.0));
        }
        if let Some(height) = self.height {
            self.height = Some((height - insets.vertical_sum()).max(0.0));
        }
    }
}

/// Per-edge values for padding, margin or border widths.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EdgeInsets {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl EdgeInsets {
    pub const ZERO: EdgeInsets = EdgeInsets {
        left: 0.0,
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
    };

    pub fn uniform(all: f32) -> Self {
        Self {
            left: all,
            top: all,
            right: all,
            bottom: all,
        }
    }

    pub fn from_components(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.left == 0.0 && self.top == 0.0 && self.right == 0.0 && self.bottom == 0.0
    }

    pub fn horizontal_sum(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical_sum(&self) -> f32 {
        self.top + self.bottom
    }
}

impl AddAssign for EdgeInsets {
    fn add_assign(&mut self, rhs: Self) {
        self.left += rhs.left;
        self.top += rhs.top;
        self.right += rhs.right;
        self.bottom += rhs.bottom;
    }
}
