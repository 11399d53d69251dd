//! Lazily-allocated declaration blocks carried by layout properties
//!
//! Each block distinguishes "absent" from "explicitly zero" and exposes
//! update-with-check mutators that report whether the stored value
//! actually differed.

use crate::{Alignment, CalcLength, CalcSize};

/// Declared min/max/ideal calc sizes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MeasureProperty {
    pub min_size: Option<CalcSize>,
    pub max_size: Option<CalcSize>,
    pub self_ideal_size: Option<CalcSize>,
}

impl MeasureProperty {
    pub fn update_min_size_with_check(&mut self, value: CalcSize) -> bool {
        if self.min_size == Some(value) {
            return false;
        }
        self.min_size = Some(value);
        true
    }

    pub fn update_max_size_with_check(&mut self, value: CalcSize) -> bool {
        if self.max_size == Some(value) {
            return false;
        }
        self.max_size = Some(value);
        true
    }

    pub fn update_self_ideal_size_with_check(&mut self, value: CalcSize) -> bool {
        if self.self_ideal_size == Some(value) {
            return false;
        }
        self.self_ideal_size = Some(value);
        true
    }
}

/// Flex participation declared on a child of a flex container.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FlexItemProperty {
    pub layout_weight: Option<f32>,
    pub flex_grow: Option<f32>,
    pub flex_shrink: Option<f32>,
    pub flex_basis: Option<CalcLength>,
}

impl FlexItemProperty {
    pub fn update_layout_weight_with_check(&mut self, value: f32) -> bool {
        if self.layout_weight == Some(value) {
            return false;
        }
        self.layout_weight = Some(value);
        true
    }

    pub fn update_flex_grow_with_check(&mut self, value: f32) -> bool {
        if self.flex_grow == Some(value) {
            return false;
        }
        self.flex_grow = Some(value);
        true
    }

    pub fn update_flex_shrink_with_check(&mut self, value: f32) -> bool {
        if self.flex_shrink == Some(value) {
            return false;
        }
        self.flex_shrink = Some(value);
        true
    }

    pub fn update_flex_basis_with_check(&mut self, value: CalcLength) -> bool {
        if self.flex_basis == Some(value) {
            return false;
        }
        self.flex_basis = Some(value);
        true
    }
}

/// Grid-span metadata, copied wholesale when a sibling's constraints are
/// adopted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GridProperty {
    pub span: Option<i32>,
    pub offset: Option<i32>,
}

impl GridProperty {
    pub fn update_span_with_check(&mut self, value: i32) -> bool {
        if self.span == Some(value) {
            return false;
        }
        self.span = Some(value);
        true
    }

    pub fn update_offset_with_check(&mut self, value: i32) -> bool {
        if self.offset == Some(value) {
            return false;
        }
        self.offset = Some(value);
        true
    }
}

/// Where the node positions its content inside its frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PositionProperty {
    pub alignment: Option<Alignment>,
}

impl PositionProperty {
    pub fn update_alignment_with_check(&mut self, value: Alignment) -> bool {
        if self.alignment == Some(value) {
            return false;
        }
        self.alignment = Some(value);
        true
    }
}
