use std::ops::Range;

use super::lazy_layout_key::LazyLayoutKey;
use super::lazy_list_scope::LazyItemScope;

/// Source of item content for the lazy layout.
///
/// Everything is addressed by global index; the layout never sees how the
/// content is stored.
pub trait LazyLayoutItemProvider {
    fn item_count(&self) -> usize;

    fn get_key(&self, index: usize) -> LazyLayoutKey;

    fn get_content_type(&self, _index: usize) -> Option<u64> {
        None
    }

    /// Emits the measurables of item `index` into `scope`.
    fn compose_item(&self, index: usize, scope: &mut LazyItemScope);

    /// Indices of sticky header items, ascending.
    fn header_indexes(&self) -> &[usize] {
        &[]
    }

    fn get_index(&self, key: LazyLayoutKey) -> Option<usize> {
        (0..self.item_count()).find(|&index| self.get_key(index) == key)
    }

    /// Like [`get_index`](Self::get_index) but only scans `range`.
    fn get_index_in_range(&self, key: LazyLayoutKey, range: Range<usize>) -> Option<usize> {
        let count = self.item_count();
        (range.start.min(count)..range.end.min(count)).find(|&index| self.get_key(index) == key)
    }
}

/// Resolves where the item identified by `key` lives now.
///
/// Keeps `last_known_index` when the key is unknown, the list is empty, or
/// the item did not move. Otherwise only `search_range` is scanned, so an
/// item that moved far away is not found and the position stays index based.
pub fn find_index_by_key(
    provider: &dyn LazyLayoutItemProvider,
    key: Option<LazyLayoutKey>,
    last_known_index: usize,
    search_range: Range<usize>,
) -> usize {
    let Some(key) = key else {
        return last_known_index;
    };
    let count = provider.item_count();
    if count == 0 {
        return last_known_index;
    }
    if last_known_index < count && provider.get_key(last_known_index) == key {
        return last_known_index;
    }
    provider
        .get_index_in_range(key, search_range)
        .unwrap_or(last_known_index)
}
