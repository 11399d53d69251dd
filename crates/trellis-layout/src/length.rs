//! Declared lengths that resolve against a percent reference

use trellis_graphics::{OptionalSize, Size};

/// A length as declared by widget code, before resolution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CalcLength {
    /// An absolute length in pixels.
    Px(f32),
    /// A fraction of the percent reference (`0.5` is 50%).
    Percent(f32),
}

impl CalcLength {
    /// Resolves this length against the given percent-reference extent.
    ///
    /// Percentages resolve against the reference only, never against
    /// min/max bounds. Negative declarations resolve to `None`.
    pub fn resolve(&self, reference: f32) -> Option<f32> {
        match *self {
            CalcLength::Px(value) => (value >= 0.0).then_some(value),
            CalcLength::Percent(fraction) => (fraction >= 0.0).then_some(fraction * reference),
        }
    }
}

/// A declared size: each axis optionally carries a [`CalcLength`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CalcSize {
    pub width: Option<CalcLength>,
    pub height: Option<CalcLength>,
}

impl CalcSize {
    pub const fn new(width: Option<CalcLength>, height: Option<CalcLength>) -> Self {
        Self { width, height }
    }

    pub fn from_lengths(width: CalcLength, height: CalcLength) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
        }
    }

    /// Whether both axes carry a declaration.
    pub fn is_fully_set(&self) -> bool {
        self.width.is_some() && self.height.is_some()
    }

    /// Resolves each declared axis against the matching reference extent.
    pub fn resolve(&self, reference: Size) -> OptionalSize {
        OptionalSize {
            width: self.width.and_then(|w| w.resolve(reference.width)),
            height: self.height.and_then(|h| h.resolve(reference.height)),
        }
    }
}

#[cfg(test)]
#[path = "tests/length_tests.rs"]
mod tests;
