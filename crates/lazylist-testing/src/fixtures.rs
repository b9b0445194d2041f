//! Item providers with known sizes.

use std::cell::Cell;
use std::rc::Rc;

use lazylist_foundation::lazy::{LazyItemScope, LazyLayoutItemProvider, LazyLayoutKey};
use lazylist_ui_layout::{Constraints, Placeable};

/// One item of a [`FixedSizeItemProvider`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SizedItem {
    pub key: u64,
    pub main_size: i32,
    /// Fills the cross axis when `None`.
    pub cross_size: Option<i32>,
    pub content_type: Option<u64>,
}

impl SizedItem {
    pub fn new(key: u64, main_size: i32) -> Self {
        Self {
            key,
            main_size,
            cross_size: None,
            content_type: None,
        }
    }
}

/// Provider whose items measure to fixed main axis sizes.
///
/// Keys default to the item index. Every composition is counted, so tests
/// can check how much content a pass materialized.
#[derive(Clone, Debug)]
pub struct FixedSizeItemProvider {
    items: Vec<SizedItem>,
    header_indexes: Vec<usize>,
    is_vertical: bool,
    animate_placement: bool,
    compose_count: Rc<Cell<usize>>,
}

impl FixedSizeItemProvider {
    pub fn from_items(items: Vec<SizedItem>) -> Self {
        Self {
            items,
            header_indexes: Vec::new(),
            is_vertical: true,
            animate_placement: false,
            compose_count: Rc::new(Cell::new(0)),
        }
    }

    /// `count` items of `size` pixels keyed by index.
    pub fn uniform(count: usize, size: i32) -> Self {
        Self::from_items(
            (0..count)
                .map(|index| SizedItem::new(index as u64, size))
                .collect(),
        )
    }

    pub fn with_sizes(sizes: &[i32]) -> Self {
        Self::from_items(
            sizes
                .iter()
                .enumerate()
                .map(|(index, size)| SizedItem::new(index as u64, *size))
                .collect(),
        )
    }

    /// Items of `size` pixels with the given keys, in order.
    pub fn with_keys(keys: &[u64], size: i32) -> Self {
        Self::from_items(keys.iter().map(|key| SizedItem::new(*key, size)).collect())
    }

    /// Marks the items at `indexes` as sticky headers.
    ///
    /// # Panics
    ///
    /// Panics when `indexes` is not ascending or points past the items.
    pub fn with_sticky_headers(mut self, indexes: &[usize]) -> Self {
        assert!(
            indexes.windows(2).all(|pair| pair[0] < pair[1]),
            "header indexes must ascend: {indexes:?}"
        );
        assert!(
            indexes.last().map_or(true, |last| *last < self.items.len()),
            "header index out of range: {indexes:?}"
        );
        self.header_indexes = indexes.to_vec();
        self
    }

    pub fn horizontal(mut self) -> Self {
        self.is_vertical = false;
        self
    }

    /// Emits every item with the default placement animation.
    pub fn animated(mut self) -> Self {
        self.animate_placement = true;
        self
    }

    pub fn items(&self) -> &[SizedItem] {
        &self.items
    }

    pub fn keys(&self) -> Vec<u64> {
        self.items.iter().map(|item| item.key).collect()
    }

    /// Same configuration with a different item list. The compose counter
    /// is shared.
    pub fn replace_items(&self, items: Vec<SizedItem>) -> Self {
        let header_count = items.len();
        Self {
            items,
            header_indexes: self
                .header_indexes
                .iter()
                .copied()
                .filter(|index| *index < header_count)
                .collect(),
            is_vertical: self.is_vertical,
            animate_placement: self.animate_placement,
            compose_count: self.compose_count.clone(),
        }
    }

    /// Items composed so far, across all passes and clones.
    pub fn compose_count(&self) -> usize {
        self.compose_count.get()
    }

    pub fn into_rc(self) -> Rc<dyn LazyLayoutItemProvider> {
        Rc::new(self)
    }
}

fn fixed_placeable(item: SizedItem, vertical: bool, constraints: Constraints) -> Placeable {
    let (max_cross, min_cross) = if vertical {
        (constraints.max_width, constraints.min_width)
    } else {
        (constraints.max_height, constraints.min_height)
    };
    let cross = item.cross_size.unwrap_or(if max_cross == Constraints::INFINITY {
        min_cross
    } else {
        max_cross
    });
    if vertical {
        Placeable::new(cross, item.main_size)
    } else {
        Placeable::new(item.main_size, cross)
    }
}

impl LazyLayoutItemProvider for FixedSizeItemProvider {
    fn item_count(&self) -> usize {
        self.items.len()
    }

    fn get_key(&self, index: usize) -> LazyLayoutKey {
        match self.items.get(index) {
            Some(item) => LazyLayoutKey::User(item.key),
            None => LazyLayoutKey::Index(index),
        }
    }

    fn get_content_type(&self, index: usize) -> Option<u64> {
        self.items.get(index).and_then(|item| item.content_type)
    }

    fn compose_item(&self, index: usize, scope: &mut LazyItemScope) {
        let Some(item) = self.items.get(index).copied() else {
            log::warn!("compose requested for missing item {index}");
            return;
        };
        self.compose_count.set(self.compose_count.get() + 1);
        let vertical = self.is_vertical;
        let measurable = move |constraints: Constraints| fixed_placeable(item, vertical, constraints);
        if self.animate_placement {
            scope.animate_item_placement(measurable);
        } else {
            scope.emit(measurable);
        }
    }

    fn header_indexes(&self) -> &[usize] {
        &self.header_indexes
    }
}
