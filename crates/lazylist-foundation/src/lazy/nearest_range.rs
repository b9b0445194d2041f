//! Window of indices searched when resolving keys during layout.

use std::ops::Range;

pub const NEAREST_ITEMS_SLIDING_WINDOW_SIZE: usize = 30;
pub const NEAREST_ITEMS_EXTRA_COUNT: usize = 100;

/// Index range around the first visible item, snapped to window
/// boundaries so small scrolls keep the same range.
///
/// Key lookups during a layout pass only scan this range, which keeps them
/// constant time no matter how long the list is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NearestRange {
    range: Range<usize>,
    anchor: usize,
    window: usize,
    extra: usize,
}

impl Default for NearestRange {
    fn default() -> Self {
        Self::new(0)
    }
}

impl NearestRange {
    pub fn new(first_visible_index: usize) -> Self {
        Self::with_window(
            first_visible_index,
            NEAREST_ITEMS_SLIDING_WINDOW_SIZE,
            NEAREST_ITEMS_EXTRA_COUNT,
        )
    }

    pub fn with_window(first_visible_index: usize, window: usize, extra: usize) -> Self {
        let window = window.max(1);
        Self {
            range: Self::compute(first_visible_index, window, extra),
            anchor: first_visible_index,
            window,
            extra,
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.range.contains(&index)
    }

    pub fn update(&mut self, first_visible_index: usize) {
        if first_visible_index == self.anchor {
            return;
        }
        self.anchor = first_visible_index;
        self.range = Self::compute(first_visible_index, self.window, self.extra);
    }

    fn compute(first_visible_index: usize, window: usize, extra: usize) -> Range<usize> {
        let window_start = window.saturating_mul(first_visible_index / window);
        let start = window_start.saturating_sub(extra);
        let end = window_start.saturating_add(window).saturating_add(extra);
        start..end
    }
}
