//! Layout contracts & constraint resolution for Trellis
//!
//! Declared lengths, per-edge properties, box constraints and the
//! invalidation flag algebra consumed by the view-construction core.

mod alignment;
mod constraint;
mod edges;
mod flags;
mod length;
mod measure;
mod properties;

pub use alignment::*;
pub use constraint::*;
pub use edges::*;
pub use flags::*;
pub use length::*;
pub use measure::*;
pub use properties::*;

pub mod prelude {
    pub use crate::alignment::Alignment;
    pub use crate::constraint::BoxConstraint;
    pub use crate::flags::PropertyChangeFlags;
    pub use crate::length::{CalcLength, CalcSize};
    pub use crate::measure::{MeasureType, TextDirection, VisibleType, VisualState};
}
