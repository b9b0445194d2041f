//! Animates items to their new positions when the data set changes.
//!
//! Each tracked child keeps an [`Animatable`] holding its offset in "target
//! space": the logical offset it would have if the list had not scrolled
//! since the animation started. Scroll consumed by the list is accumulated
//! separately per item (`not_animatable_delta`) and added on top, so
//! scrolling never animates and animations keep running while scrolling.

use std::rc::Rc;

use lazylist_animation::{
    Animatable, AnimationType, SpringSpec, DAMPING_RATIO_NO_BOUNCY, STIFFNESS_MEDIUM_LOW,
};
use lazylist_core::collections::map::{HashMap, HashSet};
use lazylist_core::RuntimeHandle;
use smallvec::SmallVec;

use super::key_index_map::KeyIndexMap;
use super::lazy_layout_key::LazyLayoutKey;
use super::lazy_list_measured_item::LazyListPositionedItem;
use super::lazy_measured_item_provider::MeasuredItemProvider;

/// Spring used by `animate_item_placement` and substituted for tweens that
/// get interrupted mid-flight.
pub fn default_placement_animation() -> AnimationType {
    SpringSpec::new(DAMPING_RATIO_NO_BOUNCY, STIFFNESS_MEDIUM_LOW)
        .with_visibility_threshold(1.0)
        .into()
}

/// Logical extent of the list for one pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlacementViewport {
    pub main_axis_size: i32,
    pub cross_axis_size: i32,
    pub before_content_padding: i32,
    pub after_content_padding: i32,
}

impl PlacementViewport {
    fn start(&self) -> i32 {
        -self.before_content_padding
    }

    fn end(&self) -> i32 {
        self.main_axis_size + self.after_content_padding
    }
}

struct PlaceableInfo {
    animatable: Animatable,
    target_offset: i32,
    size: i32,
}

struct ItemInfo {
    index: usize,
    not_animatable_delta: i32,
    placeables: SmallVec<[PlaceableInfo; 1]>,
}

impl ItemInfo {
    fn new(index: usize) -> Self {
        Self {
            index,
            not_animatable_delta: 0,
            placeables: SmallVec::new(),
        }
    }
}

pub struct LazyListItemPlacementAnimator {
    runtime: RuntimeHandle,
    items: HashMap<LazyLayoutKey, ItemInfo>,
    previous_key_index_map: Rc<KeyIndexMap>,
    viewport_start_item_index: usize,
    viewport_start_item_not_visible_part_size: i32,
    viewport_end_item_index: usize,
    viewport_end_item_not_visible_part_size: i32,
    invalidation: Option<Rc<dyn Fn()>>,
}

impl std::fmt::Debug for LazyListItemPlacementAnimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyListItemPlacementAnimator")
            .field("tracked", &self.items.len())
            .field("viewport_start_item_index", &self.viewport_start_item_index)
            .field("viewport_end_item_index", &self.viewport_end_item_index)
            .finish_non_exhaustive()
    }
}

impl LazyListItemPlacementAnimator {
    pub fn new(runtime: RuntimeHandle) -> Self {
        Self {
            runtime,
            items: HashMap::default(),
            previous_key_index_map: Rc::new(KeyIndexMap::empty()),
            viewport_start_item_index: 0,
            viewport_start_item_not_visible_part_size: 0,
            viewport_end_item_index: 0,
            viewport_end_item_not_visible_part_size: 0,
            invalidation: None,
        }
    }

    /// Called on every animation frame of every tracked child. Newly created
    /// animations pick it up; running ones keep the callback they started
    /// with.
    pub fn set_invalidation(&mut self, invalidation: Option<Rc<dyn Fn()>>) {
        self.invalidation = invalidation;
    }

    /// Forgets every tracked item. Used when the list jumps instead of
    /// scrolling.
    pub fn reset(&mut self) {
        self.items.clear();
        self.previous_key_index_map = Rc::new(KeyIndexMap::empty());
        self.viewport_start_item_index = 0;
        self.viewport_start_item_not_visible_part_size = 0;
        self.viewport_end_item_index = 0;
        self.viewport_end_item_not_visible_part_size = 0;
    }

    pub fn tracked_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_tracking(&self, key: LazyLayoutKey) -> bool {
        self.items.contains_key(&key)
    }

    /// Whether any child of `key` is still moving.
    pub fn is_item_animating(&self, key: LazyLayoutKey) -> bool {
        self.items.get(&key).is_some_and(|info| {
            info.placeables
                .iter()
                .any(|placeable| placeable.animatable.is_running())
        })
    }

    pub fn is_animating(&self) -> bool {
        self.items
            .values()
            .flat_map(|info| info.placeables.iter())
            .any(|placeable| placeable.animatable.is_running())
    }

    /// Reconciles tracked items with the items positioned by this pass and
    /// starts animations for every child whose target moved.
    ///
    /// Returns items that are no longer positioned but still have an
    /// animation to finish on screen; they are placed along with the
    /// visible ones.
    pub fn on_measured(
        &mut self,
        consumed_scroll: i32,
        positioned: &[LazyListPositionedItem],
        provider: &mut dyn MeasuredItemProvider,
        viewport: PlacementViewport,
    ) -> Vec<LazyListPositionedItem> {
        let (Some(first), Some(last)) = (positioned.first(), positioned.last()) else {
            self.reset();
            return Vec::new();
        };
        if self.items.is_empty() && !positioned.iter().any(|item| item.has_animations()) {
            self.reset();
            return Vec::new();
        }

        let not_animatable_delta = consumed_scroll;
        let total_size: i32 = positioned.iter().map(|item| item.size_with_spacings).sum();
        let average_item_size = total_size / positioned.len() as i32;

        let mut positioned_keys = HashSet::default();
        for item in positioned {
            positioned_keys.insert(item.key);
            if let Some(info) = self.items.get_mut(&item.key) {
                info.index = item.index;
                if item.has_animations() {
                    info.not_animatable_delta += not_animatable_delta;
                    Self::start_animations_if_needed(
                        &self.runtime,
                        &self.invalidation,
                        item,
                        info,
                    );
                } else {
                    self.items.remove(&item.key);
                }
                continue;
            }
            if !item.has_animations() {
                continue;
            }
            let Some(first_placeable) = item.placeables.first() else {
                continue;
            };
            let first_offset = first_placeable.main_offset;
            let expected_first_offset = match self.previous_key_index_map.index_of(item.key) {
                // Appeared from nowhere: lands in place.
                None => first_offset,
                Some(previous_index) => self.expected_offset(
                    previous_index,
                    item.size_with_spacings,
                    average_item_size,
                    not_animatable_delta,
                    viewport.main_axis_size,
                    first_offset,
                ),
            };
            let mut info = ItemInfo::new(item.index);
            for placeable in &item.placeables {
                let start = expected_first_offset + placeable.main_offset - first_offset;
                info.placeables.push(self.placeable_info(start, placeable.main_size));
            }
            Self::start_animations_if_needed(&self.runtime, &self.invalidation, item, &mut info);
            self.items.insert(item.key, info);
        }

        let key_index_map = provider.key_index_map();
        let offscreen_keys: Vec<LazyLayoutKey> = self
            .items
            .keys()
            .filter(|key| !positioned_keys.contains(*key))
            .copied()
            .collect();
        let mut offscreen = Vec::new();
        for key in offscreen_keys {
            let Some(info) = self.items.get_mut(&key) else {
                continue;
            };
            info.not_animatable_delta += not_animatable_delta;
            let delta = info.not_animatable_delta;
            let on_screen = info.placeables.iter().any(|placeable| {
                let value = placeable.animatable.value().round() as i32 + delta;
                value + placeable.size > viewport.start() && value < viewport.end()
            });
            let in_progress = info
                .placeables
                .iter()
                .any(|placeable| placeable.animatable.is_running());
            let index = key_index_map.index_of(key);
            let keep = index.is_some() && !info.placeables.is_empty() && (on_screen || in_progress);
            let Some(index) = index.filter(|_| keep) else {
                log::trace!("placement animation for {key:?} dropped");
                self.items.remove(&key);
                continue;
            };
            let measured = provider.get_and_measure(index);
            let target = if index > last.index {
                last.offset
                    + last.size_with_spacings
                    + average_item_size * (index - last.index - 1) as i32
            } else if index < first.index {
                first.offset
                    - measured.size_with_spacings
                    - average_item_size * (first.index - index - 1) as i32
            } else {
                info.placeables
                    .first()
                    .map(|placeable| placeable.target_offset + delta)
                    .unwrap_or(first.offset)
            };
            let item = measured.position(target, viewport.cross_axis_size);
            if let Some(info) = self.items.get_mut(&key) {
                info.index = index;
                Self::start_animations_if_needed(&self.runtime, &self.invalidation, &item, info);
            }
            offscreen.push(item);
        }

        self.previous_key_index_map = key_index_map;
        self.viewport_start_item_index = first.index;
        self.viewport_start_item_not_visible_part_size = first.offset;
        self.viewport_end_item_index = last.index;
        self.viewport_end_item_not_visible_part_size =
            last.offset + last.size_with_spacings - viewport.main_axis_size;
        offscreen
    }

    /// Where child `placeable_index` of `key` should be drawn this frame.
    ///
    /// A running animation whose current value and target are both past
    /// the same viewport edge is snapped to its target; nothing of it would
    /// be visible anyway.
    pub fn animated_offset(
        &self,
        key: LazyLayoutKey,
        placeable_index: usize,
        raw_offset: i32,
        viewport: &PlacementViewport,
    ) -> i32 {
        let Some(info) = self.items.get(&key) else {
            return raw_offset;
        };
        let Some(placeable) = info.placeables.get(placeable_index) else {
            return raw_offset;
        };
        let current_value = placeable.animatable.value().round() as i32 + info.not_animatable_delta;
        let current_target = placeable.target_offset + info.not_animatable_delta;
        let min = viewport.start() - placeable.size;
        let max = viewport.end();
        if placeable.animatable.is_running()
            && ((current_target <= min && current_value <= min)
                || (current_target >= max && current_value >= max))
        {
            placeable.animatable.snap_to(placeable.target_offset as f32);
            return current_target;
        }
        current_value
    }

    fn placeable_info(&self, initial_offset: i32, size: i32) -> PlaceableInfo {
        Self::new_placeable_info(&self.runtime, &self.invalidation, initial_offset, size)
    }

    fn new_placeable_info(
        runtime: &RuntimeHandle,
        invalidation: &Option<Rc<dyn Fn()>>,
        initial_offset: i32,
        size: i32,
    ) -> PlaceableInfo {
        let animatable = Animatable::new(initial_offset as f32, runtime.clone());
        if let Some(invalidation) = invalidation.clone() {
            animatable.state().subscribe(move || invalidation());
        }
        PlaceableInfo {
            animatable,
            target_offset: initial_offset,
            size,
        }
    }

    /// Offset an item that sat at `previous_index` in the last pass would
    /// have now, extrapolated past the previous viewport with the average
    /// item size. Indices that were inside that viewport keep `fallback`.
    fn expected_offset(
        &self,
        previous_index: usize,
        size_with_spacings: i32,
        average_item_size: i32,
        scrolled_by: i32,
        main_axis_size: i32,
        fallback: i32,
    ) -> i32 {
        if previous_index > self.viewport_end_item_index {
            let distance = (previous_index - self.viewport_end_item_index) as i32;
            main_axis_size
                + self.viewport_end_item_not_visible_part_size
                + average_item_size * (distance - 1)
                + scrolled_by
        } else if previous_index < self.viewport_start_item_index {
            let distance = (self.viewport_start_item_index - previous_index) as i32;
            self.viewport_start_item_not_visible_part_size
                - size_with_spacings
                - average_item_size * (distance - 1)
                + scrolled_by
        } else {
            fallback
        }
    }

    fn start_animations_if_needed(
        runtime: &RuntimeHandle,
        invalidation: &Option<Rc<dyn Fn()>>,
        item: &LazyListPositionedItem,
        info: &mut ItemInfo,
    ) {
        info.placeables.truncate(item.placeables.len());
        while info.placeables.len() < item.placeables.len() {
            let placeable = &item.placeables[info.placeables.len()];
            info.placeables.push(Self::new_placeable_info(
                runtime,
                invalidation,
                placeable.main_offset - info.not_animatable_delta,
                placeable.main_size,
            ));
        }
        for (tracked, placeable) in info.placeables.iter_mut().zip(&item.placeables) {
            tracked.size = placeable.main_size;
            let current_target = tracked.target_offset + info.not_animatable_delta;
            if current_target == placeable.main_offset {
                continue;
            }
            tracked.target_offset = placeable.main_offset - info.not_animatable_delta;
            match placeable.placement_animation {
                Some(animation) => {
                    let animation = if tracked.animatable.is_running() && !animation.is_spring() {
                        default_placement_animation()
                    } else {
                        animation
                    };
                    tracked
                        .animatable
                        .animate_to(tracked.target_offset as f32, animation);
                }
                None => tracked.animatable.snap_to(tracked.target_offset as f32),
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/item_placement_animator_tests.rs"]
mod tests;
