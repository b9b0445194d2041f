//! The lazy list measure pass.
//!
//! Given the scroll anchor (first visible index plus how far it is scrolled
//! out of view) and a pending scroll delta, decides which items to
//! materialize, consumes as much of the delta as the content allows, picks
//! the new anchor and positions every item.
//!
//! All offsets are logical and relative to the start of the content area,
//! i.e. the viewport minus the content padding. The start padding region is
//! `[-before_content_padding, 0)`.

use std::collections::VecDeque;

use lazylist_ui_layout::{Arrangement, HorizontalAlignment, LinearArrangement, VerticalAlignment};

use super::item_placement_animator::{LazyListItemPlacementAnimator, PlacementViewport};
use super::lazy_layout_key::LazyLayoutKey;
use super::lazy_list_header::find_or_compose_lazy_list_header;
use super::lazy_list_measured_item::{LazyListMeasuredItem, LazyListPositionedItem};
use super::lazy_measured_item_provider::MeasuredItemProvider;

/// Layout parameters of a list.
#[derive(Clone, Debug, PartialEq)]
pub struct LazyListMeasureConfig {
    pub is_vertical: bool,
    /// Lays items out from the bottom (or right) edge. Padding and offsets
    /// stay logical: "before" is the edge the first item sits at.
    pub reverse_layout: bool,
    pub before_content_padding: i32,
    pub after_content_padding: i32,
    /// Distributes items when they do not fill the viewport. Its spacing is
    /// also the gap between items.
    pub arrangement: LinearArrangement,
    /// Cross axis alignment of children in a vertical list.
    pub horizontal_alignment: HorizontalAlignment,
    /// Cross axis alignment of children in a horizontal list.
    pub vertical_alignment: VerticalAlignment,
}

impl Default for LazyListMeasureConfig {
    fn default() -> Self {
        Self {
            is_vertical: true,
            reverse_layout: false,
            before_content_padding: 0,
            after_content_padding: 0,
            arrangement: LinearArrangement::Start,
            horizontal_alignment: HorizontalAlignment::Start,
            vertical_alignment: VerticalAlignment::Top,
        }
    }
}

impl LazyListMeasureConfig {
    pub fn vertical() -> Self {
        Self::default()
    }

    pub fn horizontal() -> Self {
        Self {
            is_vertical: false,
            ..Self::default()
        }
    }

    pub fn reversed(mut self) -> Self {
        self.reverse_layout = true;
        self
    }

    pub fn with_content_padding(mut self, before: i32, after: i32) -> Self {
        self.before_content_padding = before;
        self.after_content_padding = after;
        self
    }

    pub fn with_arrangement(mut self, arrangement: LinearArrangement) -> Self {
        self.arrangement = arrangement;
        self
    }

    pub fn with_horizontal_alignment(mut self, alignment: HorizontalAlignment) -> Self {
        self.horizontal_alignment = alignment;
        self
    }

    pub fn with_vertical_alignment(mut self, alignment: VerticalAlignment) -> Self {
        self.vertical_alignment = alignment;
        self
    }

    pub fn spacing(&self) -> i32 {
        self.arrangement.spacing()
    }
}

/// Scroll state and viewport for one pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LazyListMeasureInput<'a> {
    pub items_count: usize,
    /// Viewport main axis size minus both content paddings.
    pub main_axis_available_size: i32,
    pub cross_axis_size: i32,
    pub first_visible_item_index: usize,
    pub first_visible_item_scroll_offset: i32,
    /// Pending scroll. Positive values move the content towards its end,
    /// revealing earlier items.
    pub scroll_to_be_consumed: f32,
    pub header_indexes: &'a [usize],
}

/// Outcome of a measure pass.
#[derive(Clone, Debug, PartialEq)]
pub struct LazyListMeasureResult {
    pub first_visible_item_index: usize,
    pub first_visible_item_key: Option<LazyLayoutKey>,
    pub first_visible_item_scroll_offset: i32,
    /// Part of the requested scroll that was applied.
    pub consumed_scroll: f32,
    pub can_scroll_forward: bool,
    /// Positioned items in index order. A sticky header that was not part
    /// of the window is inserted at the front.
    pub visible_items: Vec<LazyListPositionedItem>,
    /// Items outside the window that still finish a placement animation.
    pub offscreen_items: Vec<LazyListPositionedItem>,
    /// Position of the sticky header inside `visible_items`.
    pub sticky_header: Option<usize>,
    pub viewport_start_offset: i32,
    pub viewport_end_offset: i32,
    pub main_axis_available_size: i32,
    /// Logical end of the last item in the window, spacing included.
    pub content_end_offset: i32,
    pub total_items_count: usize,
}

impl LazyListMeasureResult {
    pub fn empty(main_axis_available_size: i32, before: i32, after: i32) -> Self {
        Self {
            first_visible_item_index: 0,
            first_visible_item_key: None,
            first_visible_item_scroll_offset: 0,
            consumed_scroll: 0.0,
            can_scroll_forward: false,
            visible_items: Vec::new(),
            offscreen_items: Vec::new(),
            sticky_header: None,
            viewport_start_offset: -before,
            viewport_end_offset: main_axis_available_size + after,
            main_axis_available_size,
            content_end_offset: 0,
            total_items_count: 0,
        }
    }

    pub fn can_scroll_backward(&self) -> bool {
        self.first_visible_item_index != 0 || self.first_visible_item_scroll_offset != 0
    }

    pub fn visible_indices(&self) -> Vec<usize> {
        self.visible_items.iter().map(|item| item.index).collect()
    }
}

/// Runs one measure pass. See the module docs for the coordinate system.
///
/// # Panics
///
/// Panics on negative content padding.
pub fn measure_lazy_list(
    input: &LazyListMeasureInput<'_>,
    config: &LazyListMeasureConfig,
    provider: &mut dyn MeasuredItemProvider,
    animator: Option<&mut LazyListItemPlacementAnimator>,
) -> LazyListMeasureResult {
    let before = config.before_content_padding;
    let after = config.after_content_padding;
    assert!(before >= 0, "negative before content padding {before}");
    assert!(after >= 0, "negative after content padding {after}");
    let available = input.main_axis_available_size;
    let items_count = input.items_count;
    let viewport = PlacementViewport {
        main_axis_size: available,
        cross_axis_size: input.cross_axis_size,
        before_content_padding: before,
        after_content_padding: after,
    };

    if items_count == 0 {
        if let Some(animator) = animator {
            animator.on_measured(0, &[], provider, viewport);
        }
        return LazyListMeasureResult::empty(available, before, after);
    }

    let mut first_index = input.first_visible_item_index;
    let mut first_offset = input.first_visible_item_scroll_offset;
    if first_index >= items_count {
        log::debug!(
            "anchor {first_index} past the end of {items_count} items, clamping to the last item"
        );
        first_index = items_count - 1;
        first_offset = 0;
    }

    let requested_delta = input.scroll_to_be_consumed.round() as i32;
    let mut scroll_delta = requested_delta;
    first_offset -= scroll_delta;
    if first_index == 0 && first_offset < 0 {
        scroll_delta += first_offset;
        first_offset = 0;
    }

    let mut visible: VecDeque<LazyListMeasuredItem> = VecDeque::new();
    let spacing = config.spacing();
    let min_offset = -before + spacing.min(0);
    let max_offset = available;

    // Walk backwards until the start padding region is covered.
    first_offset += min_offset;
    while first_offset < 0 && first_index > 0 {
        let previous = first_index - 1;
        let item = provider.get_and_measure(previous);
        first_offset += item.size_with_spacings;
        visible.push_front(item);
        first_index = previous;
    }
    if first_offset < min_offset {
        scroll_delta -= min_offset - first_offset;
        first_offset = min_offset;
    }
    first_offset -= min_offset;

    let max_main_axis = (max_offset + after).max(0);
    let mut index = first_index;
    let mut current = -first_offset;

    let mut position = 0;
    while position < visible.len() {
        if current >= max_main_axis {
            visible.truncate(position);
            break;
        }
        current += visible[position].size_with_spacings;
        index += 1;
        position += 1;
    }

    // Walk forwards until the viewport and end padding are covered. An item
    // starting exactly at the end is not visible.
    while index < items_count
        && (current < max_main_axis || current <= 0 || visible.is_empty())
    {
        let item = provider.get_and_measure(index);
        current += item.size_with_spacings;
        if current <= min_offset && index != items_count - 1 {
            // Entirely before the visible region.
            first_index = index + 1;
            first_offset -= item.size_with_spacings;
        } else {
            visible.push_back(item);
        }
        index += 1;
    }

    // Ran out of items before the end: scroll back to close the gap.
    if current < max_offset {
        let to_scroll_back = max_offset - current;
        first_offset -= to_scroll_back;
        current += to_scroll_back;
        while first_offset < before && first_index > 0 {
            let previous = first_index - 1;
            let item = provider.get_and_measure(previous);
            first_offset += item.size_with_spacings;
            visible.push_front(item);
            first_index = previous;
        }
        scroll_delta += to_scroll_back;
        if first_offset < 0 {
            scroll_delta += first_offset;
            current += first_offset;
            first_offset = 0;
        }
    }

    let consumed_scroll = if requested_delta.signum() == scroll_delta.signum()
        && requested_delta.abs() >= scroll_delta.abs()
    {
        scroll_delta as f32
    } else {
        input.scroll_to_be_consumed
    };

    assert!(
        first_offset >= 0,
        "negative first item scroll offset {first_offset}"
    );
    let items_scroll_offset = -first_offset;

    // Items lying entirely inside the start padding do not count as first
    // visible.
    let mut first_position = 0;
    if before > 0 || spacing < 0 {
        for (slot, item) in visible.iter().enumerate() {
            let size = item.size_with_spacings;
            if first_offset != 0 && size <= first_offset && slot + 1 != visible.len() {
                first_offset -= size;
                first_position = slot + 1;
            } else {
                break;
            }
        }
    }
    let first_item = visible.get(first_position);
    let first_visible_item_index = first_item.map_or(first_index, |item| item.index);
    let first_visible_item_key = first_item.map(|item| item.key);

    let mut positioned = calculate_items_offsets(
        &visible,
        available,
        input.cross_axis_size,
        current,
        items_scroll_offset,
        config,
    );

    let offscreen_items = match animator {
        Some(animator) => {
            animator.on_measured(consumed_scroll as i32, &positioned, provider, viewport)
        }
        None => Vec::new(),
    };

    let sticky_header = if input.header_indexes.is_empty() {
        None
    } else {
        find_or_compose_lazy_list_header(
            &mut positioned,
            provider,
            input.header_indexes,
            before,
            input.cross_axis_size,
        )
    };

    LazyListMeasureResult {
        first_visible_item_index,
        first_visible_item_key,
        first_visible_item_scroll_offset: first_offset,
        consumed_scroll,
        can_scroll_forward: index < items_count || current > max_offset,
        visible_items: positioned,
        offscreen_items,
        sticky_header,
        viewport_start_offset: -before,
        viewport_end_offset: max_offset + after,
        main_axis_available_size: available,
        content_end_offset: current,
        total_items_count: items_count,
    }
}

/// Assigns logical offsets. When the items do not fill the viewport the
/// arrangement distributes them; otherwise they follow each other from
/// `items_scroll_offset`.
fn calculate_items_offsets(
    items: &VecDeque<LazyListMeasuredItem>,
    main_axis_size: i32,
    cross_axis_size: i32,
    final_main_axis_offset: i32,
    items_scroll_offset: i32,
    config: &LazyListMeasureConfig,
) -> Vec<LazyListPositionedItem> {
    let has_spare_space = final_main_axis_offset < main_axis_size;
    if !has_spare_space {
        let mut offset = items_scroll_offset;
        return items
            .iter()
            .map(|item| {
                let positioned = item.position(offset, cross_axis_size);
                offset += item.size_with_spacings;
                positioned
            })
            .collect();
    }

    assert_eq!(
        items_scroll_offset, 0,
        "items scrolled while not filling the viewport"
    );
    let count = items.len();
    let reverse = config.reverse_layout;
    let reverse_aware = |slot: usize| if reverse { count - slot - 1 } else { slot };
    let sizes: Vec<i32> = (0..count).map(|slot| items[reverse_aware(slot)].size).collect();
    let mut offsets = vec![0; count];
    config.arrangement.arrange(main_axis_size, &sizes, &mut offsets);

    let mut positioned = Vec::with_capacity(count);
    let order: Box<dyn Iterator<Item = usize>> = if reverse {
        Box::new((0..count).rev())
    } else {
        Box::new(0..count)
    };
    for slot in order {
        let item = &items[reverse_aware(slot)];
        let absolute = offsets[slot];
        let relative = if reverse {
            main_axis_size - absolute - item.size
        } else {
            absolute
        };
        positioned.push(item.position(relative, cross_axis_size));
    }
    positioned
}

#[cfg(test)]
#[path = "tests/lazy_list_measure_tests.rs"]
mod tests;
