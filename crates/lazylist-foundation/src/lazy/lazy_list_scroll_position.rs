//! Scroll position of a lazy list.
//!
//! The position lives twice. The raw cells are what a measure pass reads and
//! writes; nothing observes them. The observable mirror is written only when
//! a pass commits (or a new position is requested) and is what the outside
//! world reads and subscribes to.

use std::cell::{Cell, RefCell};
use std::ops::Range;

use lazylist_core::{MutableState, State};

use super::item_provider::{find_index_by_key, LazyLayoutItemProvider};
use super::lazy_layout_key::LazyLayoutKey;
use super::lazy_list_measure::LazyListMeasureResult;
use super::nearest_range::NearestRange;

pub struct LazyListScrollPosition {
    index: Cell<usize>,
    scroll_offset: Cell<i32>,
    observed_index: MutableState<usize>,
    observed_scroll_offset: MutableState<i32>,
    last_known_first_item_key: Cell<Option<LazyLayoutKey>>,
    had_first_not_empty_layout: Cell<bool>,
    nearest_range: RefCell<NearestRange>,
}

impl std::fmt::Debug for LazyListScrollPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyListScrollPosition")
            .field("index", &self.index.get())
            .field("scroll_offset", &self.scroll_offset.get())
            .field("last_known_first_item_key", &self.last_known_first_item_key.get())
            .finish_non_exhaustive()
    }
}

impl LazyListScrollPosition {
    pub fn new(index: usize, scroll_offset: i32) -> Self {
        assert!(scroll_offset >= 0, "negative scroll offset {scroll_offset}");
        Self {
            index: Cell::new(index),
            scroll_offset: Cell::new(scroll_offset),
            observed_index: MutableState::new(index),
            observed_scroll_offset: MutableState::new(scroll_offset),
            last_known_first_item_key: Cell::new(None),
            had_first_not_empty_layout: Cell::new(false),
            nearest_range: RefCell::new(NearestRange::new(index)),
        }
    }

    /// Raw anchor index, as the next measure pass will see it.
    pub fn index(&self) -> usize {
        self.index.get()
    }

    /// Raw anchor offset, as the next measure pass will see it.
    pub fn scroll_offset(&self) -> i32 {
        self.scroll_offset.get()
    }

    /// Committed anchor index. Records a read for observers.
    pub fn observed_index(&self) -> usize {
        self.observed_index.get()
    }

    /// Committed anchor offset. Records a read for observers.
    pub fn observed_scroll_offset(&self) -> i32 {
        self.observed_scroll_offset.get()
    }

    pub fn index_state(&self) -> State<usize> {
        self.observed_index.as_state()
    }

    pub fn scroll_offset_state(&self) -> State<i32> {
        self.observed_scroll_offset.as_state()
    }

    pub fn last_known_first_item_key(&self) -> Option<LazyLayoutKey> {
        self.last_known_first_item_key.get()
    }

    pub fn nearest_range(&self) -> Range<usize> {
        self.nearest_range.borrow().range()
    }

    /// Commits the anchor chosen by a measure pass.
    ///
    /// Empty passes before the first non-empty one are ignored, so a list
    /// created with an initial position keeps it until content arrives.
    pub fn update_from_measure_result(&self, result: &LazyListMeasureResult) {
        self.last_known_first_item_key
            .set(result.first_visible_item_key);
        if !self.had_first_not_empty_layout.get() && result.total_items_count == 0 {
            return;
        }
        self.had_first_not_empty_layout.set(true);
        let offset = result.first_visible_item_scroll_offset;
        assert!(offset >= 0, "scroll offset should be non-negative ({offset})");
        self.update(result.first_visible_item_index, offset);
    }

    /// Jumps to a new anchor. The key is forgotten so the next pass does not
    /// move the anchor back to the item that was first before the jump.
    pub fn request_position(&self, index: usize, scroll_offset: i32) {
        self.update(index, scroll_offset);
        self.last_known_first_item_key.set(None);
    }

    /// Follows the previously first visible item after the content changed.
    ///
    /// Only the raw index is moved; the observable mirror catches up when
    /// the pass commits. Returns the index the pass should start from.
    pub fn update_if_first_item_moved(&self, provider: &dyn LazyLayoutItemProvider) -> usize {
        let index = self.index.get();
        let new_index = find_index_by_key(
            provider,
            self.last_known_first_item_key.get(),
            index,
            self.nearest_range(),
        );
        if new_index != index {
            log::debug!("first visible item moved from {index} to {new_index}");
            self.index.set(new_index);
            self.nearest_range.borrow_mut().update(new_index);
        }
        new_index
    }

    fn update(&self, index: usize, scroll_offset: i32) {
        if index != self.index.get() {
            self.nearest_range.borrow_mut().update(index);
        }
        self.index.set(index);
        self.scroll_offset.set(scroll_offset);
        self.observed_index.set(index);
        self.observed_scroll_offset.set(scroll_offset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lazy::lazy_list_scope::{LazyItemScope, LazyListIntervalContent, LazyListScope};
    use lazylist_core::observe_reads;

    fn keyed(keys: Vec<u64>) -> LazyListIntervalContent {
        let count = keys.len();
        LazyListIntervalContent::build(move |scope| {
            scope.items(
                count,
                Some(move |index: usize| keys[index]),
                None::<fn(usize) -> u64>,
                |_: &mut LazyItemScope, _: usize| {},
            );
        })
    }

    fn result(index: usize, offset: i32, key: u64, total: usize) -> LazyListMeasureResult {
        let mut result = LazyListMeasureResult::empty(100, 0, 0);
        result.first_visible_item_index = index;
        result.first_visible_item_scroll_offset = offset;
        result.first_visible_item_key = Some(LazyLayoutKey::User(key));
        result.total_items_count = total;
        result
    }

    #[test]
    fn raw_reads_are_not_observed() {
        let position = LazyListScrollPosition::new(3, 12);
        let (_, reads) = observe_reads(|| (position.index(), position.scroll_offset()));
        assert!(reads.is_empty());
        let (_, reads) = observe_reads(|| position.observed_index());
        assert_eq!(reads, vec![position.index_state().id()]);
    }

    #[test]
    fn empty_layouts_before_content_keep_the_initial_position() {
        let position = LazyListScrollPosition::new(7, 20);
        position.update_from_measure_result(&LazyListMeasureResult::empty(100, 0, 0));
        assert_eq!(position.index(), 7);
        assert_eq!(position.observed_scroll_offset(), 20);

        position.update_from_measure_result(&result(5, 3, 42, 10));
        assert_eq!(position.index(), 5);
        assert_eq!(position.observed_index(), 5);
        assert_eq!(position.last_known_first_item_key(), Some(LazyLayoutKey::User(42)));

        position.update_from_measure_result(&LazyListMeasureResult::empty(100, 0, 0));
        assert_eq!(position.index(), 0);
    }

    #[test]
    fn moved_first_item_is_followed_by_key() {
        let position = LazyListScrollPosition::new(0, 0);
        position.update_from_measure_result(&result(2, 5, 12, 5));

        // Two items inserted in front of the anchor.
        let content = keyed(vec![1, 2, 10, 11, 12, 13, 14]);
        assert_eq!(position.update_if_first_item_moved(&content), 4);
        assert_eq!(position.index(), 4);
        assert_eq!(position.scroll_offset(), 5);
        // The mirror waits for the pass to commit.
        assert_eq!(position.observed_index(), 2);
    }

    #[test]
    fn unknown_key_keeps_the_index() {
        let position = LazyListScrollPosition::new(0, 0);
        position.update_from_measure_result(&result(2, 0, 99, 5));
        let content = keyed(vec![1, 2, 3, 4]);
        assert_eq!(position.update_if_first_item_moved(&content), 2);
    }

    #[test]
    fn requested_position_forgets_the_key() {
        let position = LazyListScrollPosition::new(0, 0);
        position.update_from_measure_result(&result(2, 0, 12, 5));
        position.request_position(40, 6);
        assert_eq!(position.last_known_first_item_key(), None);
        assert_eq!(position.observed_index(), 40);
        assert_eq!(position.scroll_offset(), 6);
        assert!(position.nearest_range().contains(&40));
    }
}
