use std::ops::Range;

use lazylist_core::collections::map::HashMap;

use super::item_provider::LazyLayoutItemProvider;
use super::lazy_layout_key::LazyLayoutKey;

/// Key to index lookup restricted to a window of the list.
///
/// Built once per layout pass from the nearest range, so both directions
/// answer in constant time; keys outside the window are unknown.
#[derive(Debug, Clone, Default)]
pub struct KeyIndexMap {
    map: HashMap<LazyLayoutKey, usize>,
    keys: Vec<LazyLayoutKey>,
    start: usize,
}

impl KeyIndexMap {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_provider(provider: &dyn LazyLayoutItemProvider, range: Range<usize>) -> Self {
        let count = provider.item_count();
        let start = range.start.min(count);
        let end = range.end.min(count);
        let mut map = HashMap::default();
        map.reserve(end - start);
        let mut keys = Vec::with_capacity(end - start);
        for index in start..end {
            let key = provider.get_key(index);
            map.entry(key).or_insert(index);
            keys.push(key);
        }
        Self { map, keys, start }
    }

    pub fn index_of(&self, key: LazyLayoutKey) -> Option<usize> {
        self.map.get(&key).copied()
    }

    pub fn key_at(&self, index: usize) -> Option<LazyLayoutKey> {
        index
            .checked_sub(self.start)
            .and_then(|offset| self.keys.get(offset))
            .copied()
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
