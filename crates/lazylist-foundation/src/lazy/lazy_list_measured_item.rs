//! One measured item and its positioned form.
//!
//! Offsets here are logical: measured from the start of the content area
//! along the direction items are laid out. Reverse layout flips them only
//! when producing physical placements.

use lazylist_animation::AnimationType;
use lazylist_ui_layout::{HorizontalAlignment, Placeable, VerticalAlignment};
use smallvec::SmallVec;

use super::lazy_layout_key::LazyLayoutKey;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeasuredPlaceable {
    pub placeable: Placeable,
    pub placement_animation: Option<AnimationType>,
}

/// An item that has been materialized and measured but not placed.
#[derive(Clone, Debug, PartialEq)]
pub struct LazyListMeasuredItem {
    pub index: usize,
    pub key: LazyLayoutKey,
    pub content_type: Option<u64>,
    pub is_vertical: bool,
    /// Sum of the children's main axis sizes.
    pub size: i32,
    /// `size` plus the gap that follows the item. The last item has no gap.
    pub size_with_spacings: i32,
    pub cross_axis_size: i32,
    pub placeables: SmallVec<[MeasuredPlaceable; 1]>,
    horizontal_alignment: HorizontalAlignment,
    vertical_alignment: VerticalAlignment,
}

impl LazyListMeasuredItem {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        index: usize,
        key: LazyLayoutKey,
        content_type: Option<u64>,
        placeables: SmallVec<[MeasuredPlaceable; 1]>,
        is_vertical: bool,
        spacing: i32,
        horizontal_alignment: HorizontalAlignment,
        vertical_alignment: VerticalAlignment,
    ) -> Self {
        let (size, cross_axis_size) =
            placeables
                .iter()
                .fold((0, 0), |(main, cross), measured| {
                    let Placeable { width, height } = measured.placeable;
                    if is_vertical {
                        (main + height, cross.max(width))
                    } else {
                        (main + width, cross.max(height))
                    }
                });
        Self {
            index,
            key,
            content_type,
            is_vertical,
            size,
            size_with_spacings: (size + spacing).max(0),
            cross_axis_size,
            placeables,
            horizontal_alignment,
            vertical_alignment,
        }
    }

    /// Fixes the item at logical `offset`. Children stack along the main
    /// axis and are aligned inside `layout_cross_size` on the cross axis.
    pub fn position(&self, offset: i32, layout_cross_size: i32) -> LazyListPositionedItem {
        let mut main_offset = offset;
        let placeables = self
            .placeables
            .iter()
            .map(|measured| {
                let Placeable { width, height } = measured.placeable;
                let (main_size, cross_size, cross_offset) = if self.is_vertical {
                    (
                        height,
                        width,
                        self.horizontal_alignment.align(layout_cross_size, width),
                    )
                } else {
                    (
                        width,
                        height,
                        self.vertical_alignment.align(layout_cross_size, height),
                    )
                };
                let positioned = PositionedPlaceable {
                    main_offset,
                    cross_offset,
                    main_size,
                    cross_size,
                    placement_animation: measured.placement_animation,
                };
                main_offset += main_size;
                positioned
            })
            .collect();
        LazyListPositionedItem {
            index: self.index,
            key: self.key,
            content_type: self.content_type,
            offset,
            size: self.size,
            size_with_spacings: self.size_with_spacings,
            cross_axis_size: self.cross_axis_size,
            is_sticky_header: false,
            placeables,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionedPlaceable {
    pub main_offset: i32,
    pub cross_offset: i32,
    pub main_size: i32,
    pub cross_size: i32,
    pub placement_animation: Option<AnimationType>,
}

/// An item with its final logical position for this pass.
#[derive(Clone, Debug, PartialEq)]
pub struct LazyListPositionedItem {
    pub index: usize,
    pub key: LazyLayoutKey,
    pub content_type: Option<u64>,
    pub offset: i32,
    pub size: i32,
    pub size_with_spacings: i32,
    pub cross_axis_size: i32,
    pub is_sticky_header: bool,
    pub placeables: SmallVec<[PositionedPlaceable; 1]>,
}

impl LazyListPositionedItem {
    pub fn has_animations(&self) -> bool {
        self.placeables
            .iter()
            .any(|placeable| placeable.placement_animation.is_some())
    }

    pub fn end_offset(&self) -> i32 {
        self.offset + self.size
    }
}
