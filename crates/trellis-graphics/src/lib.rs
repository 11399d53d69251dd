//! Pure math/data for sizes & units in Trellis
//!
//! This crate contains the geometry primitives shared by the layout
//! contracts and the view-construction core.

mod geometry;

pub use geometry::*;

pub mod prelude {
    pub use crate::geometry::{EdgeInsets, OptionalSize, Size};
}
