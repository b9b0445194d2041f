//! Assertion helpers for list geometry.

use lazylist_foundation::lazy::{LazyListLayoutInfo, LazyListState};

/// Assert that a value is within an expected range.
pub fn assert_approx_eq(actual: f32, expected: f32, tolerance: f32, msg: &str) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tolerance,
        "{}: expected {} (±{}), got {} (diff: {})",
        msg,
        expected,
        tolerance,
        actual,
        diff
    );
}

/// Assert the committed anchor of `state`.
pub fn assert_anchor(state: &LazyListState, index: usize, scroll_offset: i32, msg: &str) {
    let actual = (
        state.first_visible_item_index(),
        state.first_visible_item_scroll_offset(),
    );
    assert_eq!(
        actual,
        (index, scroll_offset),
        "{}: expected anchor ({}, {}), got {:?}",
        msg,
        index,
        scroll_offset,
        actual
    );
}

/// Assert the indices of the laid out items, in layout order.
pub fn assert_visible_indices(info: &LazyListLayoutInfo, expected: &[usize], msg: &str) {
    let actual: Vec<usize> = info.visible_items_info.iter().map(|item| item.index).collect();
    assert_eq!(actual, expected, "{}: visible indices", msg);
}

/// Assert the logical offset of item `index`.
pub fn assert_item_offset(info: &LazyListLayoutInfo, index: usize, expected: i32, msg: &str) {
    let item = info
        .visible_items_info
        .iter()
        .find(|item| item.index == index)
        .unwrap_or_else(|| panic!("{}: item {} is not laid out", msg, index));
    assert_eq!(
        item.offset, expected,
        "{}: item {} at {}, expected {}",
        msg, index, item.offset, expected
    );
}

/// Assert that laid out items follow each other without gaps or overlap,
/// `spacing` apart. Sticky headers are skipped.
pub fn assert_contiguous(info: &LazyListLayoutInfo, msg: &str) {
    let items: Vec<_> = info
        .visible_items_info
        .iter()
        .filter(|item| !item.is_sticky_header)
        .collect();
    for pair in items.windows(2) {
        assert_eq!(
            pair[1].index,
            pair[0].index + 1,
            "{}: indices {} and {} not adjacent",
            msg,
            pair[0].index,
            pair[1].index
        );
        assert_eq!(
            pair[1].offset,
            pair[0].offset + pair[0].size + info.main_axis_item_spacing,
            "{}: gap between items {} and {}",
            msg,
            pair[0].index,
            pair[1].index
        );
    }
}
