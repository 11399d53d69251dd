//! Per-node layout declarations and constraint resolution

use std::cell::Cell;

use trellis_graphics::{EdgeInsets, OptionalSize, Size};
use trellis_layout::{
    Alignment, BorderWidthProperty, BoxConstraint, CalcLength, CalcSize, FlexItemProperty,
    GridProperty, MarginProperty, MeasureProperty, MeasureType, PaddingProperty, PositionProperty,
    PropertyChangeFlags, TextDirection, VisibleType,
};

use crate::{ConstraintError, NodeId};

/// Layout state owned 1:1 by a node.
///
/// Declaration blocks are lazily allocated on first write. Every setter
/// compares old and new values and raises invalidation flags only on an
/// actual change, so repeated writes of the same value are no-ops.
///
/// Per measure pass, the resolver surface walks the node through
/// `update_layout_constraint` → `update_content_constraint` →
/// `create_child_constraint` (per child) → the post-measure `check_*`
/// reconciliation; a property mutation afterwards re-raises flags but never
/// retroactively invalidates finished ancestors.
#[derive(Debug, Default)]
pub struct LayoutProperty {
    layout_constraint: Option<BoxConstraint>,
    content_constraint: Option<BoxConstraint>,
    padding: Option<PaddingProperty>,
    margin: Option<MarginProperty>,
    border_width: Option<BorderWidthProperty>,
    calc_layout: Option<MeasureProperty>,
    flex_item: Option<FlexItemProperty>,
    grid: Option<GridProperty>,
    position: Option<PositionProperty>,
    aspect_ratio: Option<f32>,
    measure_type: MeasureType,
    layout_direction: TextDirection,
    visibility: VisibleType,
    change_flags: Cell<PropertyChangeFlags>,
    host: Cell<Option<NodeId>>,
}

impl LayoutProperty {
    pub fn set_host(&self, host: NodeId) {
        self.host.set(Some(host));
    }

    pub fn host(&self) -> Option<NodeId> {
        self.host.get()
    }

    /// Raises invalidation flags directly, as widget code does when
    /// reacting to events outside the build pass. OR-accumulation only;
    /// raises from different moments compose, but two raises racing on the
    /// same instant are not synchronized (the owner is single-threaded).
    pub fn mark_dirty(&self, flags: PropertyChangeFlags) {
        self.change_flags.set(self.change_flags.get() | flags);
    }

    pub fn change_flags(&self) -> PropertyChangeFlags {
        self.change_flags.get()
    }

    /// Consumes the accumulated flags: returns them and resets to clean.
    /// Nothing else ever clears flags; a consumer that skips this call
    /// observes the union of the passes since the last one.
    pub fn clean_flags(&self) -> PropertyChangeFlags {
        self.change_flags.replace(PropertyChangeFlags::NORMAL)
    }

    /// Whether the accumulated change must bubble to the parent's measure.
    ///
    /// A node whose only change is a bare child request and whose ideal
    /// size is fully declared absorbs the request: its own size cannot
    /// change, so neither can the parent's.
    pub fn need_request_parent_measure(&self) -> bool {
        let flags = self.change_flags.get();
        if flags == PropertyChangeFlags::BY_CHILD_REQUEST && self.has_fixed_ideal_size() {
            return false;
        }
        flags.needs_parent_measure()
    }

    fn has_fixed_ideal_size(&self) -> bool {
        self.calc_layout
            .as_ref()
            .and_then(|calc| calc.self_ideal_size)
            .map(|ideal| ideal.is_fully_set())
            .unwrap_or(false)
    }

    // --- declared-property accessors ---

    pub fn padding(&self) -> Option<&PaddingProperty> {
        self.padding.as_ref()
    }

    pub fn margin(&self) -> Option<&MarginProperty> {
        self.margin.as_ref()
    }

    pub fn border_width(&self) -> Option<&BorderWidthProperty> {
        self.border_width.as_ref()
    }

    pub fn calc_layout(&self) -> Option<&MeasureProperty> {
        self.calc_layout.as_ref()
    }

    pub fn flex_item(&self) -> Option<&FlexItemProperty> {
        self.flex_item.as_ref()
    }

    pub fn grid(&self) -> Option<&GridProperty> {
        self.grid.as_ref()
    }

    pub fn position(&self) -> Option<&PositionProperty> {
        self.position.as_ref()
    }

    pub fn aspect_ratio(&self) -> Option<f32> {
        self.aspect_ratio
    }

    pub fn measure_type(&self) -> MeasureType {
        self.measure_type
    }

    pub fn layout_direction(&self) -> TextDirection {
        self.layout_direction
    }

    pub fn visibility(&self) -> VisibleType {
        self.visibility
    }

    pub fn layout_constraint(&self) -> Option<BoxConstraint> {
        self.layout_constraint
    }

    pub fn content_constraint(&self) -> Option<BoxConstraint> {
        self.content_constraint
    }

    // --- flag-mapped setter surface ---

    pub fn update_padding(&mut self, value: PaddingProperty) {
        if self
            .padding
            .get_or_insert_with(PaddingProperty::default)
            .update_with_check(value)
        {
            self.mark_dirty(PropertyChangeFlags::MEASURE | PropertyChangeFlags::LAYOUT);
        }
    }

    pub fn update_margin(&mut self, value: MarginProperty) {
        if self
            .margin
            .get_or_insert_with(MarginProperty::default)
            .update_with_check(value)
        {
            self.mark_dirty(PropertyChangeFlags::MEASURE | PropertyChangeFlags::LAYOUT);
        }
    }

    pub fn update_border_width(&mut self, value: BorderWidthProperty) {
        if self
            .border_width
            .get_or_insert_with(BorderWidthProperty::default)
            .update_with_check(value)
        {
            self.mark_dirty(PropertyChangeFlags::MEASURE | PropertyChangeFlags::LAYOUT);
        }
    }

    pub fn update_user_defined_ideal_size(&mut self, value: CalcSize) {
        if self
            .calc_layout
            .get_or_insert_with(MeasureProperty::default)
            .update_self_ideal_size_with_check(value)
        {
            self.mark_dirty(PropertyChangeFlags::MEASURE);
        }
    }

    pub fn update_calc_min_size(&mut self, value: CalcSize) {
        if self
            .calc_layout
            .get_or_insert_with(MeasureProperty::default)
            .update_min_size_with_check(value)
        {
            self.mark_dirty(PropertyChangeFlags::MEASURE);
        }
    }

    pub fn update_calc_max_size(&mut self, value: CalcSize) {
        if self
            .calc_layout
            .get_or_insert_with(MeasureProperty::default)
            .update_max_size_with_check(value)
        {
            self.mark_dirty(PropertyChangeFlags::MEASURE);
        }
    }

    pub fn update_layout_weight(&mut self, value: f32) {
        if self
            .flex_item
            .get_or_insert_with(FlexItemProperty::default)
            .update_layout_weight_with_check(value)
        {
            self.mark_dirty(PropertyChangeFlags::MEASURE);
        }
    }

    pub fn update_flex_grow(&mut self, value: f32) {
        if self
            .flex_item
            .get_or_insert_with(FlexItemProperty::default)
            .update_flex_grow_with_check(value)
        {
            self.mark_dirty(PropertyChangeFlags::MEASURE);
        }
    }

    pub fn update_flex_shrink(&mut self, value: f32) {
        if self
            .flex_item
            .get_or_insert_with(FlexItemProperty::default)
            .update_flex_shrink_with_check(value)
        {
            self.mark_dirty(PropertyChangeFlags::MEASURE);
        }
    }

    pub fn update_flex_basis(&mut self, value: CalcLength) {
        if self
            .flex_item
            .get_or_insert_with(FlexItemProperty::default)
            .update_flex_basis_with_check(value)
        {
            self.mark_dirty(PropertyChangeFlags::MEASURE);
        }
    }

    pub fn update_aspect_ratio(&mut self, value: f32) {
        if self.aspect_ratio == Some(value) {
            return;
        }
        self.aspect_ratio = Some(value);
        self.mark_dirty(PropertyChangeFlags::MEASURE);
    }

    pub fn update_grid_span(&mut self, value: i32) {
        if self
            .grid
            .get_or_insert_with(GridProperty::default)
            .update_span_with_check(value)
        {
            self.mark_dirty(PropertyChangeFlags::MEASURE);
        }
    }

    pub fn update_grid_offset(&mut self, value: i32) {
        if self
            .grid
            .get_or_insert_with(GridProperty::default)
            .update_offset_with_check(value)
        {
            self.mark_dirty(PropertyChangeFlags::MEASURE);
        }
    }

    pub fn update_alignment(&mut self, value: Alignment) {
        if self
            .position
            .get_or_insert_with(PositionProperty::default)
            .update_alignment_with_check(value)
        {
            self.mark_dirty(PropertyChangeFlags::LAYOUT);
        }
    }

    pub fn update_measure_type(&mut self, value: MeasureType) {
        if self.measure_type == value {
            return;
        }
        self.measure_type = value;
        self.mark_dirty(PropertyChangeFlags::MEASURE);
    }

    pub fn update_layout_direction(&mut self, value: TextDirection) {
        if self.layout_direction == value {
            return;
        }
        self.layout_direction = value;
        self.mark_dirty(PropertyChangeFlags::MEASURE);
    }

    pub fn update_visibility(&mut self, value: VisibleType) {
        if self.visibility == value {
            return;
        }
        self.visibility = value;
        self.mark_dirty(PropertyChangeFlags::MEASURE);
    }

    // --- constraint resolution ---

    /// Accepts the constraint handed down by the parent for this pass.
    ///
    /// The declared margin is carved out first. Declared calc sizes then
    /// overlay the result: min raises the lower bound, max lowers the
    /// upper bound (min wins a conflict), and the ideal replaces
    /// `self_ideal_size` per axis, resolved against the percent reference
    /// and deliberately not clamped into the max.
    pub fn update_layout_constraint(
        &mut self,
        parent: &BoxConstraint,
    ) -> Result<(), ConstraintError> {
        let mut constraint = *parent;
        let margin = self.resolved_margin(constraint.percent_reference.width);
        constraint.minus_insets(margin);

        if let Some(calc) = &self.calc_layout {
            let reference = constraint.percent_reference;
            if let Some(min) = calc.min_size {
                let resolved = min.resolve(reference);
                if let Some(width) = resolved.width {
                    constraint.min_size.width = constraint.min_size.width.max(width);
                }
                if let Some(height) = resolved.height {
                    constraint.min_size.height = constraint.min_size.height.max(height);
                }
            }
            if let Some(max) = calc.max_size {
                let resolved = max.resolve(reference);
                if let Some(width) = resolved.width {
                    constraint.max_size.width = constraint.max_size.width.min(width);
                }
                if let Some(height) = resolved.height {
                    constraint.max_size.height = constraint.max_size.height.min(height);
                }
            }
            if let Some(ideal) = calc.self_ideal_size {
                let resolved = ideal.resolve(reference);
                if resolved.width.is_some() {
                    constraint.self_ideal_size.width = resolved.width;
                }
                if resolved.height.is_some() {
                    constraint.self_ideal_size.height = resolved.height;
                }
            }
        }

        // Declared min beats declared max when they cross.
        if constraint.min_size.width > constraint.max_size.width {
            constraint.max_size.width = constraint.min_size.width;
        }
        if constraint.min_size.height > constraint.max_size.height {
            constraint.max_size.height = constraint.min_size.height;
        }

        if let Some(ratio) = self.aspect_ratio {
            constraint.apply_aspect_ratio(ratio);
        }

        Self::validated(&constraint)?;
        self.layout_constraint = Some(constraint);
        Ok(())
    }

    /// Adopts a sibling's resolved constraints wholesale, grid-span
    /// metadata included. The percent reference travels with the cloned
    /// constraint; re-deriving it is the caller's business when the clone
    /// crosses containers.
    pub fn clone_constraints_from(&mut self, other: &LayoutProperty) {
        self.layout_constraint = other.layout_constraint;
        self.content_constraint = other.content_constraint;
        self.grid = other.grid;
    }

    /// Derives the content-area constraint from the stored layout
    /// constraint: refresh the percent reference from the parent ideal,
    /// then carve out padding and border from both the ideal and the max
    /// size, clamped at zero. No-op while no constraint is assigned.
    pub fn update_content_constraint(&mut self) -> Result<(), ConstraintError> {
        let Some(mut constraint) = self.layout_constraint else {
            return Ok(());
        };
        if let Some(width) = constraint.parent_ideal_size.width {
            constraint.percent_reference.width = width;
        }
        if let Some(height) = constraint.parent_ideal_size.height {
            constraint.percent_reference.height = height;
        }
        let reference_width = constraint.percent_reference.width;
        let padding = self.resolved_padding(reference_width);
        constraint.minus_insets(padding);
        let border = self.resolved_border(reference_width);
        constraint.minus_insets(border);
        Self::validated(&constraint)?;
        self.content_constraint = Some(constraint);
        Ok(())
    }

    /// Builds the constraint handed to a child: the content constraint
    /// with this node's resolved ideal promoted into the child's
    /// parent-ideal, max and percent basis, and the per-child fields
    /// (self ideal, min) reset.
    pub fn create_child_constraint(&self) -> BoxConstraint {
        let mut constraint = self
            .content_constraint
            .or(self.layout_constraint)
            .unwrap_or_else(BoxConstraint::unbounded);
        let ideal = constraint.self_ideal_size;
        constraint.parent_ideal_size = ideal;
        constraint.max_size = ideal.to_size_or(constraint.max_size);
        constraint.percent_reference = ideal.to_size_or(constraint.percent_reference);
        constraint.self_ideal_size = OptionalSize::UNSET;
        constraint.min_size = Size::ZERO;
        constraint
    }

    /// Resolves padding plus border against the current percent reference,
    /// unset edges contributing zero.
    pub fn create_padding_and_border(&self) -> EdgeInsets {
        self.create_padding_and_border_with_default(EdgeInsets::ZERO, EdgeInsets::ZERO)
    }

    /// Resolves padding plus border with theme-supplied fallbacks for the
    /// edges the widget left unset.
    pub fn create_padding_and_border_with_default(
        &self,
        default_padding: EdgeInsets,
        default_border: EdgeInsets,
    ) -> EdgeInsets {
        let reference_width = self.percent_reference_width();
        let mut insets = match &self.padding {
            Some(padding) => padding.resolve_with_default(reference_width, default_padding),
            None => default_padding,
        };
        insets += match &self.border_width {
            Some(border) => border.resolve_with_default(reference_width, default_border),
            None => default_border,
        };
        insets
    }

    /// Resolves the declared margin against the current percent reference.
    pub fn create_margin(&self) -> EdgeInsets {
        self.resolved_margin(self.percent_reference_width())
    }

    /// Folds the measured content size back into the resolved ideal after
    /// children are measured. `MatchParent` first inherits the parent
    /// ideal; dimensions filled in here (rather than declared) are clipped
    /// into `[min, max]`.
    pub fn check_self_ideal_size(&mut self, content_size: Size) {
        let measure_type = self.measure_type;
        let Some(constraint) = self.layout_constraint.as_mut() else {
            return;
        };
        let width_was_unset = constraint.self_ideal_size.width.is_none();
        let height_was_unset = constraint.self_ideal_size.height.is_none();

        if measure_type == MeasureType::MatchParent {
            let parent_ideal = constraint.parent_ideal_size;
            constraint.self_ideal_size.fill_unset_from(parent_ideal);
        }
        constraint
            .self_ideal_size
            .fill_unset_from(OptionalSize::from_size(content_size));

        let min = constraint.min_size;
        let max = constraint.max_size;
        if width_was_unset {
            if let Some(width) = constraint.self_ideal_size.width {
                constraint.self_ideal_size.width = Some(width.clamp(min.width, max.width));
            }
        }
        if height_was_unset {
            if let Some(height) = constraint.self_ideal_size.height {
                constraint.self_ideal_size.height = Some(height.clamp(min.height, max.height));
            }
        }
    }

    /// Enforces the declared aspect ratio by deriving whichever ideal
    /// dimension is still unset from the one that is set.
    pub fn check_aspect_ratio(&mut self) {
        let Some(ratio) = self.aspect_ratio else {
            return;
        };
        if let Some(constraint) = self.layout_constraint.as_mut() {
            constraint.apply_aspect_ratio(ratio);
        }
    }

    /// Ensures each resolved ideal dimension at least covers the summed
    /// padding and border on that axis.
    pub fn check_border_and_padding(&mut self) {
        let insets = self.create_padding_and_border();
        let Some(constraint) = self.layout_constraint.as_mut() else {
            return;
        };
        if let Some(width) = constraint.self_ideal_size.width {
            constraint.self_ideal_size.width = Some(width.max(insets.horizontal_sum()));
        }
        if let Some(height) = constraint.self_ideal_size.height {
            constraint.self_ideal_size.height = Some(height.max(insets.vertical_sum()));
        }
    }

    fn percent_reference_width(&self) -> f32 {
        self.layout_constraint
            .map(|constraint| constraint.percent_reference.width)
            .unwrap_or(0.0)
    }

    fn resolved_margin(&self, reference_width: f32) -> EdgeInsets {
        match &self.margin {
            Some(margin) => margin.resolve(reference_width),
            None => EdgeInsets::ZERO,
        }
    }

    fn resolved_padding(&self, reference_width: f32) -> EdgeInsets {
        match &self.padding {
            Some(padding) => padding.resolve(reference_width),
            None => EdgeInsets::ZERO,
        }
    }

    fn resolved_border(&self, reference_width: f32) -> EdgeInsets {
        match &self.border_width {
            Some(border) => border.resolve(reference_width),
            None => EdgeInsets::ZERO,
        }
    }

    fn validated(constraint: &BoxConstraint) -> Result<(), ConstraintError> {
        if constraint.is_valid() {
            Ok(())
        } else {
            Err(ConstraintError::InvalidConstraint {
                min: constraint.min_size,
                max: constraint.max_size,
            })
        }
    }
}

#[cfg(test)]
#[path = "tests/layout_property_tests.rs"]
mod tests;
