use super::*;
use crate::lazy::item_provider::LazyLayoutItemProvider;
use crate::lazy::lazy_list_measured_item::{LazyListMeasuredItem, MeasuredPlaceable};
use crate::lazy::lazy_list_scope::LazyItemScope;
use lazylist_animation::AnimationSpec;
use lazylist_core::{Runtime, TestScheduler};
use lazylist_ui_layout::{HorizontalAlignment, Placeable, VerticalAlignment};
use smallvec::smallvec;
use std::cell::Cell;
use std::sync::Arc;

const FRAME: u64 = 16_000_000;
const ITEM: i32 = 30;

/// Rows of equal height whose keys can be reordered between passes.
struct Rows {
    keys: Vec<u64>,
    animation: Option<AnimationType>,
}

impl Rows {
    fn new(keys: &[u64]) -> Self {
        Self {
            keys: keys.to_vec(),
            animation: Some(AnimationSpec::linear(160).into()),
        }
    }

    fn index_of(&self, key: u64) -> usize {
        self.keys
            .iter()
            .position(|candidate| *candidate == key)
            .unwrap_or_else(|| panic!("no key {key}"))
    }

    /// Positions the first `count` rows from offset `start`.
    fn window(&mut self, count: usize, start: i32) -> Vec<LazyListPositionedItem> {
        (0..count)
            .map(|index| self.get_and_measure(index).position(start + index as i32 * ITEM, 40))
            .collect()
    }
}

impl LazyLayoutItemProvider for Rows {
    fn item_count(&self) -> usize {
        self.keys.len()
    }

    fn get_key(&self, index: usize) -> LazyLayoutKey {
        LazyLayoutKey::User(self.keys[index])
    }

    fn compose_item(&self, _index: usize, _scope: &mut LazyItemScope) {}
}

impl MeasuredItemProvider for Rows {
    fn item_count(&self) -> usize {
        self.keys.len()
    }

    fn get_and_measure(&mut self, index: usize) -> LazyListMeasuredItem {
        LazyListMeasuredItem::new(
            index,
            LazyLayoutKey::User(self.keys[index]),
            None,
            smallvec![MeasuredPlaceable {
                placeable: Placeable::new(40, ITEM),
                placement_animation: self.animation,
            }],
            true,
            0,
            HorizontalAlignment::Start,
            VerticalAlignment::Top,
        )
    }

    fn key_index_map(&mut self) -> Rc<KeyIndexMap> {
        Rc::new(KeyIndexMap::from_provider(self, 0..self.keys.len()))
    }
}

fn viewport() -> PlacementViewport {
    PlacementViewport {
        main_axis_size: 100,
        cross_axis_size: 40,
        before_content_padding: 0,
        after_content_padding: 0,
    }
}

fn pump(runtime: &Runtime, frames: u64, start: u64) -> u64 {
    let handle = runtime.handle();
    let mut time = start;
    for _ in 0..frames {
        time += FRAME;
        handle.drain_frame_callbacks(time);
    }
    time
}

fn key(raw: u64) -> LazyLayoutKey {
    LazyLayoutKey::User(raw)
}

#[test]
fn items_without_animation_are_not_tracked() {
    let runtime = Runtime::new(Arc::new(TestScheduler::default()));
    let mut animator = LazyListItemPlacementAnimator::new(runtime.handle());
    let mut rows = Rows::new(&[1, 2, 3, 4]);
    rows.animation = None;
    let window = rows.window(4, 0);
    let offscreen = animator.on_measured(0, &window, &mut rows, viewport());
    assert!(offscreen.is_empty());
    assert_eq!(animator.tracked_count(), 0);
    assert_eq!(animator.animated_offset(key(1), 0, 0, &viewport()), 0);
}

#[test]
fn reordered_items_animate_to_their_new_offset() {
    let runtime = Runtime::new(Arc::new(TestScheduler::default()));
    let mut animator = LazyListItemPlacementAnimator::new(runtime.handle());
    let mut rows = Rows::new(&[1, 2, 3, 4]);
    let window = rows.window(4, 0);
    animator.on_measured(0, &window, &mut rows, viewport());
    assert_eq!(animator.tracked_count(), 4);
    assert!(!animator.is_animating());

    rows.keys.swap(0, 1);
    let window = rows.window(4, 0);
    animator.on_measured(0, &window, &mut rows, viewport());
    assert!(animator.is_animating());
    assert_eq!(animator.animated_offset(key(1), 0, 30, &viewport()), 0);
    assert_eq!(animator.animated_offset(key(2), 0, 0, &viewport()), 30);

    let time = pump(&runtime, 6, 0);
    let halfway = animator.animated_offset(key(1), 0, 30, &viewport());
    assert!(halfway > 0 && halfway < 30, "halfway offset {halfway}");

    pump(&runtime, 12, time);
    assert!(!animator.is_animating());
    assert_eq!(animator.animated_offset(key(1), 0, 30, &viewport()), 30);
    assert_eq!(animator.animated_offset(key(2), 0, 0, &viewport()), 0);
}

#[test]
fn scrolling_does_not_animate() {
    let runtime = Runtime::new(Arc::new(TestScheduler::default()));
    let mut animator = LazyListItemPlacementAnimator::new(runtime.handle());
    let mut rows = Rows::new(&[1, 2, 3, 4, 5]);
    let window = rows.window(4, 0);
    animator.on_measured(0, &window, &mut rows, viewport());

    let window = rows.window(4, -10);
    animator.on_measured(-10, &window, &mut rows, viewport());
    assert!(!animator.is_animating());
    assert_eq!(animator.animated_offset(key(1), 0, -10, &viewport()), -10);
    assert_eq!(animator.animated_offset(key(3), 0, 50, &viewport()), 50);
}

#[test]
fn item_moved_out_of_the_window_is_placed_until_it_leaves() {
    let runtime = Runtime::new(Arc::new(TestScheduler::default()));
    let mut animator = LazyListItemPlacementAnimator::new(runtime.handle());
    let mut rows = Rows::new(&(1..=12).collect::<Vec<_>>());
    let window = rows.window(4, 0);
    animator.on_measured(0, &window, &mut rows, viewport());

    // Key 1 moves to index 10, far below the window.
    let moved = rows.keys.remove(0);
    rows.keys.insert(10, moved);
    assert_eq!(rows.index_of(1), 10);
    let window = rows.window(4, 0);
    let offscreen = animator.on_measured(0, &window, &mut rows, viewport());
    assert_eq!(offscreen.len(), 1);
    assert_eq!(offscreen[0].key, key(1));
    assert_eq!(offscreen[0].index, 10);
    // Extrapolated past the last placed item with the average item size.
    assert_eq!(offscreen[0].offset, 90 + ITEM + ITEM * 6);
    assert!(animator.is_tracking(key(1)));
    assert_eq!(animator.animated_offset(key(1), 0, 300, &viewport()), 0);

    pump(&runtime, 20, 0);
    let window = rows.window(4, 0);
    let offscreen = animator.on_measured(0, &window, &mut rows, viewport());
    assert!(offscreen.is_empty());
    assert!(!animator.is_tracking(key(1)));
}

#[test]
fn new_item_without_history_appears_in_place() {
    let runtime = Runtime::new(Arc::new(TestScheduler::default()));
    let mut animator = LazyListItemPlacementAnimator::new(runtime.handle());
    let mut rows = Rows::new(&[1, 2, 3, 4]);
    let window = rows.window(4, 0);
    animator.on_measured(0, &window, &mut rows, viewport());

    rows.keys.insert(0, 99);
    let window = rows.window(4, 0);
    animator.on_measured(0, &window, &mut rows, viewport());
    assert_eq!(animator.animated_offset(key(99), 0, 0, &viewport()), 0);
    // The old first row slides down.
    assert_eq!(animator.animated_offset(key(1), 0, 30, &viewport()), 0);
    assert!(animator.is_animating());
}

#[test]
fn animation_frames_invalidate_placement() {
    let runtime = Runtime::new(Arc::new(TestScheduler::default()));
    let mut animator = LazyListItemPlacementAnimator::new(runtime.handle());
    let invalidations = Rc::new(Cell::new(0));
    let counter = invalidations.clone();
    animator.set_invalidation(Some(Rc::new(move || counter.set(counter.get() + 1))));
    let mut rows = Rows::new(&[1, 2, 3, 4]);
    let window = rows.window(4, 0);
    animator.on_measured(0, &window, &mut rows, viewport());
    rows.keys.swap(0, 1);
    let window = rows.window(4, 0);
    animator.on_measured(0, &window, &mut rows, viewport());

    pump(&runtime, 4, 0);
    assert!(invalidations.get() > 0);
}

#[test]
fn reset_forgets_everything() {
    let runtime = Runtime::new(Arc::new(TestScheduler::default()));
    let mut animator = LazyListItemPlacementAnimator::new(runtime.handle());
    let mut rows = Rows::new(&[1, 2, 3]);
    let window = rows.window(3, 0);
    animator.on_measured(0, &window, &mut rows, viewport());
    assert_eq!(animator.tracked_count(), 3);
    animator.reset();
    assert_eq!(animator.tracked_count(), 0);
    assert!(!animator.is_tracking(key(2)));
}

#[test]
fn empty_pass_resets_tracking() {
    let runtime = Runtime::new(Arc::new(TestScheduler::default()));
    let mut animator = LazyListItemPlacementAnimator::new(runtime.handle());
    let mut rows = Rows::new(&[1, 2, 3]);
    let window = rows.window(3, 0);
    animator.on_measured(0, &window, &mut rows, viewport());
    let offscreen = animator.on_measured(0, &[], &mut rows, viewport());
    assert!(offscreen.is_empty());
    assert_eq!(animator.tracked_count(), 0);
}

#[test]
fn animation_past_the_viewport_end_snaps_to_its_target() {
    let runtime = Runtime::new(Arc::new(TestScheduler::default()));
    let mut animator = LazyListItemPlacementAnimator::new(runtime.handle());
    let mut rows = Rows::new(&(1..=12).collect::<Vec<_>>());
    let window = rows.window(4, 0);
    animator.on_measured(0, &window, &mut rows, viewport());

    let moved = rows.keys.remove(0);
    rows.keys.insert(10, moved);
    let window = rows.window(4, 0);
    animator.on_measured(0, &window, &mut rows, viewport());
    let target = 90 + ITEM + ITEM * 6;

    // Halfway through the tween the row is already below the viewport.
    pump(&runtime, 6, 0);
    assert!(animator.is_item_animating(key(1)));
    assert_eq!(animator.animated_offset(key(1), 0, target, &viewport()), target);
    assert!(!animator.is_item_animating(key(1)));
    assert_eq!(animator.animated_offset(key(1), 0, target, &viewport()), target);
}

#[test]
fn running_animation_inside_the_viewport_is_not_snapped() {
    let runtime = Runtime::new(Arc::new(TestScheduler::default()));
    let mut animator = LazyListItemPlacementAnimator::new(runtime.handle());
    let mut rows = Rows::new(&[1, 2, 3, 4]);
    let window = rows.window(4, 0);
    animator.on_measured(0, &window, &mut rows, viewport());
    rows.keys.swap(0, 1);
    let window = rows.window(4, 0);
    animator.on_measured(0, &window, &mut rows, viewport());

    pump(&runtime, 4, 0);
    let offset = animator.animated_offset(key(1), 0, ITEM, &viewport());
    assert!(offset > 0 && offset < ITEM, "offset {offset}");
    assert!(animator.is_item_animating(key(1)));
}

#[test]
fn interrupted_tween_continues_as_a_spring() {
    let runtime = Runtime::new(Arc::new(TestScheduler::default()));
    let mut animator = LazyListItemPlacementAnimator::new(runtime.handle());
    let mut rows = Rows::new(&[1, 2, 3, 4]);
    let window = rows.window(4, 0);
    animator.on_measured(0, &window, &mut rows, viewport());

    rows.keys.swap(0, 1);
    let window = rows.window(4, 0);
    animator.on_measured(0, &window, &mut rows, viewport());
    let time = pump(&runtime, 3, 0);
    assert!(animator.is_item_animating(key(1)));

    // Swapped back while key 1 is still heading down.
    rows.keys.swap(0, 1);
    let window = rows.window(4, 0);
    animator.on_measured(0, &window, &mut rows, viewport());

    // A restarted 160ms tween would be done after ten frames of play time;
    // the placement spring is still carrying the downward velocity.
    let time = pump(&runtime, 11, time);
    assert!(animator.is_item_animating(key(1)));

    pump(&runtime, 120, time);
    assert!(!animator.is_item_animating(key(1)));
    assert_eq!(animator.animated_offset(key(1), 0, 0, &viewport()), 0);
}

#[test]
fn uninterrupted_tween_finishes_on_time() {
    let runtime = Runtime::new(Arc::new(TestScheduler::default()));
    let mut animator = LazyListItemPlacementAnimator::new(runtime.handle());
    let mut rows = Rows::new(&[1, 2, 3, 4]);
    let window = rows.window(4, 0);
    animator.on_measured(0, &window, &mut rows, viewport());
    rows.keys.swap(0, 1);
    let window = rows.window(4, 0);
    animator.on_measured(0, &window, &mut rows, viewport());

    pump(&runtime, 11, 0);
    assert!(!animator.is_item_animating(key(1)));
    assert_eq!(animator.animated_offset(key(1), 0, ITEM, &viewport()), ITEM);
}
