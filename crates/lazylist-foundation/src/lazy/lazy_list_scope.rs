//! Builder DSL for list content.
//!
//! Content is declared as a sequence of intervals (`item`, `items`,
//! `sticky_header`). Nothing is materialized up front: the layout asks for
//! individual items by global index while it measures.

use std::cell::RefCell;
use std::fmt;
use std::hash::Hash;
use std::ops::Range;
use std::rc::Rc;

use lazylist_animation::AnimationType;
use lazylist_core::collections::map::HashMap;
use lazylist_ui_layout::Measurable;
use smallvec::SmallVec;

use super::interval_list::IntervalList;
use super::item_placement_animator::default_placement_animation;
use super::item_provider::LazyLayoutItemProvider;
use super::lazy_layout_key::{default_key_factory, KeyFactory, LazyLayoutKey};
use crate::error::LazyListError;

/// One child emitted by an item, optionally animated when its position
/// changes.
#[derive(Clone)]
pub struct ItemMeasurable {
    measurable: Rc<dyn Measurable>,
    placement_animation: Option<AnimationType>,
}

impl ItemMeasurable {
    pub fn measurable(&self) -> &dyn Measurable {
        self.measurable.as_ref()
    }

    pub fn placement_animation(&self) -> Option<AnimationType> {
        self.placement_animation
    }
}

impl fmt::Debug for ItemMeasurable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemMeasurable")
            .field("placement_animation", &self.placement_animation)
            .finish_non_exhaustive()
    }
}

/// Receiver for the children of one item. Children stack along the main
/// axis in emission order.
#[derive(Debug)]
pub struct LazyItemScope {
    index: usize,
    measurables: SmallVec<[ItemMeasurable; 1]>,
}

impl LazyItemScope {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            measurables: SmallVec::new(),
        }
    }

    /// Global index of the item being built.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn emit(&mut self, measurable: impl Measurable + 'static) {
        self.push(Rc::new(measurable), None);
    }

    /// Emits a child that glides to its new position with the default
    /// placement spring instead of jumping.
    pub fn animate_item_placement(&mut self, measurable: impl Measurable + 'static) {
        self.push(Rc::new(measurable), Some(default_placement_animation()));
    }

    pub fn animate_item_placement_with(
        &mut self,
        measurable: impl Measurable + 'static,
        animation: impl Into<AnimationType>,
    ) {
        self.push(Rc::new(measurable), Some(animation.into()));
    }

    pub fn len(&self) -> usize {
        self.measurables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurables.is_empty()
    }

    pub fn into_measurables(self) -> SmallVec<[ItemMeasurable; 1]> {
        self.measurables
    }

    fn push(&mut self, measurable: Rc<dyn Measurable>, placement_animation: Option<AnimationType>) {
        self.measurables.push(ItemMeasurable {
            measurable,
            placement_animation,
        });
    }
}

/// Declares list content.
pub trait LazyListScope {
    fn item<F>(&mut self, key: Option<u64>, content_type: Option<u64>, content: F)
    where
        F: Fn(&mut LazyItemScope) + 'static;

    /// Adds `count` items. `key` and `content_type` receive the index local
    /// to this call, `item_content` as well.
    fn items<K, C, F>(
        &mut self,
        count: usize,
        key: Option<K>,
        content_type: Option<C>,
        item_content: F,
    ) where
        K: Fn(usize) -> u64 + 'static,
        C: Fn(usize) -> u64 + 'static,
        F: Fn(&mut LazyItemScope, usize) + 'static;

    /// Adds an item that sticks to the start of the viewport until the next
    /// header pushes it out.
    fn sticky_header<F>(&mut self, key: Option<u64>, content_type: Option<u64>, content: F)
    where
        F: Fn(&mut LazyItemScope) + 'static;
}

type IndexFn = Rc<dyn Fn(usize) -> u64>;
type ContentFn = Rc<dyn Fn(&mut LazyItemScope, usize)>;

/// One `item`/`items` call.
#[derive(Clone)]
pub struct LazyListInterval {
    pub key: Option<IndexFn>,
    pub content_type: Option<IndexFn>,
    pub content: ContentFn,
}

impl fmt::Debug for LazyListInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyListInterval")
            .field("keyed", &self.key.is_some())
            .field("typed", &self.content_type.is_some())
            .finish_non_exhaustive()
    }
}

/// Content collected from a [`LazyListScope`] block.
pub struct LazyListIntervalContent {
    intervals: IntervalList<LazyListInterval>,
    header_indexes: Vec<usize>,
    key_factory: KeyFactory,
    key_cache: RefCell<Option<HashMap<LazyLayoutKey, usize>>>,
}

impl fmt::Debug for LazyListIntervalContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyListIntervalContent")
            .field("item_count", &self.intervals.size())
            .field("header_indexes", &self.header_indexes)
            .finish_non_exhaustive()
    }
}

impl Default for LazyListIntervalContent {
    fn default() -> Self {
        Self::new()
    }
}

impl LazyListIntervalContent {
    /// Below this many items key lookups scan instead of building the map.
    const CACHE_THRESHOLD: usize = 64;

    pub fn new() -> Self {
        Self::with_key_factory(default_key_factory())
    }

    /// Items declared without a key get `factory(global_index)` as key.
    pub fn with_key_factory(factory: KeyFactory) -> Self {
        Self {
            intervals: IntervalList::new(),
            header_indexes: Vec::new(),
            key_factory: factory,
            key_cache: RefCell::new(None),
        }
    }

    pub fn build(block: impl FnOnce(&mut Self)) -> Self {
        let mut content = Self::new();
        block(&mut content);
        content
    }

    pub fn item_count(&self) -> usize {
        self.intervals.size()
    }

    pub fn header_indexes(&self) -> &[usize] {
        &self.header_indexes
    }

    pub fn get_key(&self, index: usize) -> LazyLayoutKey {
        match self.intervals.get(index) {
            Ok(interval) => match &interval.value.key {
                Some(key) => LazyLayoutKey::User(key(index - interval.start_index)),
                None => (self.key_factory)(index),
            },
            Err(_) => (self.key_factory)(index),
        }
    }

    pub fn get_content_type(&self, index: usize) -> Option<u64> {
        let interval = self.intervals.get(index).ok()?;
        interval
            .value
            .content_type
            .as_ref()
            .map(|content_type| content_type(index - interval.start_index))
    }

    pub fn compose_item(&self, index: usize, scope: &mut LazyItemScope) -> Result<(), LazyListError> {
        let interval = self.intervals.get(index)?;
        (interval.value.content)(scope, index - interval.start_index);
        Ok(())
    }

    pub fn get_index_by_key(&self, key: LazyLayoutKey) -> Option<usize> {
        let count = self.item_count();
        if count <= Self::CACHE_THRESHOLD {
            return (0..count).find(|&index| self.get_key(index) == key);
        }
        let mut cache = self.key_cache.borrow_mut();
        let map = cache.get_or_insert_with(|| {
            let mut map = HashMap::default();
            map.reserve(count);
            for index in 0..count {
                map.entry(self.get_key(index)).or_insert(index);
            }
            map
        });
        map.get(&key).copied()
    }

    pub fn get_index_by_key_in_range(&self, key: LazyLayoutKey, range: Range<usize>) -> Option<usize> {
        let count = self.item_count();
        (range.start.min(count)..range.end.min(count)).find(|&index| self.get_key(index) == key)
    }

    fn push_interval(&mut self, count: usize, interval: LazyListInterval) {
        *self.key_cache.get_mut() = None;
        self.intervals.add_interval(count, interval);
    }
}

impl LazyListScope for LazyListIntervalContent {
    fn item<F>(&mut self, key: Option<u64>, content_type: Option<u64>, content: F)
    where
        F: Fn(&mut LazyItemScope) + 'static,
    {
        self.push_interval(
            1,
            LazyListInterval {
                key: key.map(|key| Rc::new(move |_: usize| key) as IndexFn),
                content_type: content_type.map(|ty| Rc::new(move |_: usize| ty) as IndexFn),
                content: Rc::new(move |scope: &mut LazyItemScope, _: usize| content(scope)),
            },
        );
    }

    fn items<K, C, F>(
        &mut self,
        count: usize,
        key: Option<K>,
        content_type: Option<C>,
        item_content: F,
    ) where
        K: Fn(usize) -> u64 + 'static,
        C: Fn(usize) -> u64 + 'static,
        F: Fn(&mut LazyItemScope, usize) + 'static,
    {
        self.push_interval(
            count,
            LazyListInterval {
                key: key.map(|key| Rc::new(key) as IndexFn),
                content_type: content_type.map(|ty| Rc::new(ty) as IndexFn),
                content: Rc::new(item_content),
            },
        );
    }

    fn sticky_header<F>(&mut self, key: Option<u64>, content_type: Option<u64>, content: F)
    where
        F: Fn(&mut LazyItemScope) + 'static,
    {
        self.header_indexes.push(self.item_count());
        self.item(key, content_type, content);
    }
}

impl LazyLayoutItemProvider for LazyListIntervalContent {
    fn item_count(&self) -> usize {
        LazyListIntervalContent::item_count(self)
    }

    fn get_key(&self, index: usize) -> LazyLayoutKey {
        LazyListIntervalContent::get_key(self, index)
    }

    fn get_content_type(&self, index: usize) -> Option<u64> {
        LazyListIntervalContent::get_content_type(self, index)
    }

    fn compose_item(&self, index: usize, scope: &mut LazyItemScope) {
        if let Err(err) = LazyListIntervalContent::compose_item(self, index, scope) {
            log::warn!("skipping item content: {err}");
        }
    }

    fn header_indexes(&self) -> &[usize] {
        &self.header_indexes
    }

    fn get_index(&self, key: LazyLayoutKey) -> Option<usize> {
        self.get_index_by_key(key)
    }

    fn get_index_in_range(&self, key: LazyLayoutKey, range: Range<usize>) -> Option<usize> {
        self.get_index_by_key_in_range(key, range)
    }
}

type NoKey = fn(usize) -> u64;

/// Conveniences over [`LazyListScope::items`].
pub trait LazyListScopeExt: LazyListScope {
    /// `count` items without keys or content types.
    fn items_count<F>(&mut self, count: usize, item_content: F)
    where
        F: Fn(&mut LazyItemScope, usize) + 'static,
    {
        self.items(count, None::<NoKey>, None::<NoKey>, item_content);
    }

    /// One item per element. The slice is copied once into shared storage.
    fn items_slice<T, F>(&mut self, items: &[T], item_content: F)
    where
        T: Clone + 'static,
        F: Fn(&mut LazyItemScope, &T) + 'static,
    {
        let data: Rc<[T]> = items.to_vec().into();
        self.items(
            data.len(),
            None::<NoKey>,
            None::<NoKey>,
            move |scope, index| {
                if let Some(item) = data.get(index) {
                    item_content(scope, item);
                }
            },
        );
    }

    /// Like [`items_slice`](Self::items_slice) with the element index.
    fn items_indexed<T, F>(&mut self, items: &[T], item_content: F)
    where
        T: Clone + 'static,
        F: Fn(&mut LazyItemScope, usize, &T) + 'static,
    {
        let data: Rc<[T]> = items.to_vec().into();
        self.items(
            data.len(),
            None::<NoKey>,
            None::<NoKey>,
            move |scope, index| {
                if let Some(item) = data.get(index) {
                    item_content(scope, index, item);
                }
            },
        );
    }

    /// One item per element, keyed by the hash of `key(element)` so the
    /// position and animations follow the element when the data changes.
    fn items_keyed<T, K, KF, F>(&mut self, items: &[T], key: KF, item_content: F)
    where
        T: Clone + 'static,
        K: Hash,
        KF: Fn(&T) -> K + 'static,
        F: Fn(&mut LazyItemScope, &T) + 'static,
    {
        let data: Rc<[T]> = items.to_vec().into();
        let keys = data.clone();
        self.items(
            data.len(),
            Some(move |index: usize| match keys.get(index) {
                Some(item) => lazylist_core::hash::hash_key(&key(item)),
                None => index as u64,
            }),
            None::<NoKey>,
            move |scope, index| {
                if let Some(item) = data.get(index) {
                    item_content(scope, item);
                }
            },
        );
    }
}

impl<S: LazyListScope + ?Sized> LazyListScopeExt for S {}

#[cfg(test)]
#[path = "tests/lazy_list_scope_tests.rs"]
mod tests;
