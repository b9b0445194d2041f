use std::ops::Range;
use std::rc::Rc;

use lazylist_core::collections::map::HashMap;
use lazylist_core::SubcomposeState;
use lazylist_ui_layout::{Arrangement, Constraints};
use smallvec::SmallVec;

use super::item_provider::LazyLayoutItemProvider;
use super::key_index_map::KeyIndexMap;
use super::lazy_list_measure::LazyListMeasureConfig;
use super::lazy_list_measured_item::{LazyListMeasuredItem, MeasuredPlaceable};
use super::lazy_list_scope::{ItemMeasurable, LazyItemScope};

/// What the measure pass needs from the outside world: measured items by
/// index and the key window used for placement animations.
pub trait MeasuredItemProvider {
    fn item_count(&self) -> usize;

    /// Materializes (or reuses) and measures item `index`. Asking twice for
    /// the same index within a pass returns the same measurement.
    fn get_and_measure(&mut self, index: usize) -> LazyListMeasuredItem;

    fn key_index_map(&mut self) -> Rc<KeyIndexMap>;
}

/// Children of one item as materialized by its content closure.
#[derive(Debug)]
pub struct ComposedItem {
    pub generation: u64,
    pub measurables: SmallVec<[ItemMeasurable; 1]>,
}

/// [`MeasuredItemProvider`] backed by item content and a subcomposition
/// cache.
///
/// Content is cached per item key across passes. A cached entry built for
/// an older content generation is thrown away and rebuilt.
pub struct LazyListMeasuredItemProvider<'a> {
    content: &'a dyn LazyLayoutItemProvider,
    composition: &'a mut SubcomposeState<Rc<ComposedItem>>,
    generation: u64,
    child_constraints: Constraints,
    config: &'a LazyListMeasureConfig,
    item_count: usize,
    measured: HashMap<usize, LazyListMeasuredItem>,
    nearest_range: Range<usize>,
    key_index_map: Option<Rc<KeyIndexMap>>,
}

impl<'a> LazyListMeasuredItemProvider<'a> {
    pub fn new(
        content: &'a dyn LazyLayoutItemProvider,
        composition: &'a mut SubcomposeState<Rc<ComposedItem>>,
        generation: u64,
        child_constraints: Constraints,
        config: &'a LazyListMeasureConfig,
        nearest_range: Range<usize>,
    ) -> Self {
        Self {
            item_count: content.item_count(),
            content,
            composition,
            generation,
            child_constraints,
            config,
            measured: HashMap::default(),
            nearest_range,
            key_index_map: None,
        }
    }

    /// Items measured in this pass.
    pub fn measured_count(&self) -> usize {
        self.measured.len()
    }
}

impl MeasuredItemProvider for LazyListMeasuredItemProvider<'_> {
    fn item_count(&self) -> usize {
        self.item_count
    }

    fn get_and_measure(&mut self, index: usize) -> LazyListMeasuredItem {
        if let Some(item) = self.measured.get(&index) {
            return item.clone();
        }
        let content = self.content;
        let generation = self.generation;
        let key = content.get_key(index);
        let slot = key.slot_id();
        let stale = self
            .composition
            .get(slot)
            .is_some_and(|composed| composed.generation != generation);
        if stale {
            self.composition.evict(slot);
        }
        let composed = self.composition.subcompose(slot, || {
            log::trace!("composing item {index} ({key:?})");
            let mut scope = LazyItemScope::new(index);
            content.compose_item(index, &mut scope);
            Rc::new(ComposedItem {
                generation,
                measurables: scope.into_measurables(),
            })
        });
        let placeables = composed
            .measurables
            .iter()
            .map(|child| MeasuredPlaceable {
                placeable: child.measurable().measure(self.child_constraints),
                placement_animation: child.placement_animation(),
            })
            .collect();
        let spacing = if index + 1 == self.item_count {
            0
        } else {
            self.config.arrangement.spacing()
        };
        let item = LazyListMeasuredItem::new(
            index,
            key,
            content.get_content_type(index),
            placeables,
            self.config.is_vertical,
            spacing,
            self.config.horizontal_alignment,
            self.config.vertical_alignment,
        );
        self.measured.insert(index, item.clone());
        item
    }

    fn key_index_map(&mut self) -> Rc<KeyIndexMap> {
        let content = self.content;
        let range = self.nearest_range.clone();
        self.key_index_map
            .get_or_insert_with(|| Rc::new(KeyIndexMap::from_provider(content, range)))
            .clone()
    }
}

#[cfg(test)]
#[path = "tests/lazy_measured_item_provider_tests.rs"]
mod tests;
