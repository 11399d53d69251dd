//! Measurement policy and visual-state enums

/// How a node derives its ideal size when not explicitly sized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MeasureType {
    /// Unset dimensions take the parent's ideal size.
    MatchParent,
    /// Unset dimensions wrap the measured content.
    #[default]
    MatchContent,
}

/// Resolved text/layout direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextDirection {
    Ltr,
    Rtl,
    /// Follow the inherited direction.
    #[default]
    Auto,
}

/// Whether a node occupies space and paints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VisibleType {
    #[default]
    Visible,
    /// Occupies space but does not paint.
    Invisible,
    /// Neither paints nor occupies space.
    Gone,
}

/// Coarse interaction states used for state-conditional styling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VisualState {
    #[default]
    Normal,
    Pressed,
    Focused,
    Disabled,
    Selected,
}

impl VisualState {
    /// The bit this state occupies in a node's active-state mask.
    /// `Normal` is the absence of all other bits.
    pub const fn bit(self) -> u32 {
        match self {
            VisualState::Normal => 0,
            VisualState::Pressed => 1 << 0,
            VisualState::Focused => 1 << 1,
            VisualState::Disabled => 1 << 2,
            VisualState::Selected => 1 << 3,
        }
    }
}
