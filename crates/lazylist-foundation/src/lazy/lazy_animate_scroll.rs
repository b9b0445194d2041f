//! Animated scroll to an item that may be far outside the window.
//!
//! Item sizes outside the window are unknown, so the distance to the target
//! is only an estimate. The scroll is done in steps: each step animates by
//! at most [`LazyAnimateScrollConfig::target_distance`] and stops as soon as
//! the item shows up. Once a couple of steps have run and the target is
//! still many items away, the list jumps to a nearby index instead of
//! scrolling through everything in between.

use lazylist_animation::{AnimationState, AnimationType, SpringSpec};
use lazylist_core::FrameClock;

use crate::scrollable::ScrollScope;

/// A scroll that falls short of its delta by more than this many pixels has
/// hit the end of the content.
pub(crate) const SCROLL_TOLERANCE: f32 = 0.5;

/// What the animated scroll needs from a lazy layout.
pub trait LazyLayoutAnimateScrollScope: ScrollScope {
    fn first_visible_item_index(&self) -> usize;

    fn first_visible_item_scroll_offset(&self) -> i32;

    fn last_visible_item_index(&self) -> usize;

    fn item_count(&self) -> usize;

    /// Logical offset of item `index` if it is currently laid out.
    fn visible_item_offset(&self, index: usize) -> Option<i32>;

    /// Jumps to `index` without animation.
    fn snap_to_item(&mut self, index: usize, scroll_offset: i32);

    /// Estimated distance to the start of item `index`. Exact for visible
    /// items, extrapolated with the average visible item size otherwise.
    fn calculate_distance_to(&self, index: usize) -> f32;

    fn frame_clock(&self) -> FrameClock;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LazyAnimateScrollConfig {
    /// Longest distance animated by a single step.
    pub target_distance: f32,
    /// Shortest distance animated by a step, so short steps do not crawl.
    pub bound_distance: f32,
    /// A teleport lands this many items before the target.
    pub items_for_teleport: usize,
    /// Steps to run before teleporting is allowed.
    pub teleport_after_loops: usize,
    /// Hard stop. The list snaps to the target once reached.
    pub max_loops: usize,
    pub animation: AnimationType,
}

impl Default for LazyAnimateScrollConfig {
    fn default() -> Self {
        Self {
            target_distance: 2500.0,
            bound_distance: 1500.0,
            items_for_teleport: 100,
            teleport_after_loops: 2,
            max_loops: 100,
            animation: SpringSpec::default().into(),
        }
    }
}

/// How an animated scroll went.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AnimateScrollOutcome {
    pub loops: usize,
    pub teleports: usize,
    /// The item became visible and the list settled on it.
    pub found: bool,
    /// The content ended before the item showed up.
    pub hit_end: bool,
}

/// Scrolls `scope` until item `index` sits at `scroll_offset`.
///
/// Stops early when the content ends. Dropping the future leaves the list
/// wherever the last frame put it.
pub async fn animate_scroll_to_item<S>(
    scope: &mut S,
    index: usize,
    scroll_offset: i32,
    config: &LazyAnimateScrollConfig,
) -> AnimateScrollOutcome
where
    S: LazyLayoutAnimateScrollScope + ?Sized,
{
    let clock = scope.frame_clock();
    let mut outcome = AnimateScrollOutcome::default();
    let mut anim = AnimationState::new(0.0);
    let mut found = scope.visible_item_offset(index);

    if found.is_none() {
        let forward = index > scope.first_visible_item_index();
        let is_overshot = |scope: &S| {
            let first = scope.first_visible_item_index();
            let first_offset = scope.first_visible_item_scroll_offset();
            if forward {
                first > index || (first == index && first_offset > scroll_offset)
            } else {
                first < index || (first == index && first_offset < scroll_offset)
            }
        };

        let mut keep_looping = true;
        let mut loops = 1;
        while keep_looping && found.is_none() && scope.item_count() > 0 {
            if loops > config.max_loops {
                log::warn!(
                    "animated scroll to {index} gave up after {} steps, snapping",
                    config.max_loops
                );
                scope.snap_to_item(index, scroll_offset);
                break;
            }
            let expected_distance = scope.calculate_distance_to(index) + scroll_offset as f32;
            let target = if expected_distance.abs() < config.target_distance {
                let distance = expected_distance.abs().max(config.bound_distance);
                if forward {
                    distance
                } else {
                    -distance
                }
            } else if forward {
                config.target_distance
            } else {
                -config.target_distance
            };
            log::trace!(
                "step {loops} towards {index}: expected {expected_distance}, animating {target}"
            );

            anim = anim.copy_with_value(0.0);
            let sequential = anim.velocity != 0.0;
            let mut previous_value = 0.0;
            anim.animate_to(target, config.animation, &clock, sequential, |frame| {
                if scope.visible_item_offset(index).is_none() {
                    let coerced = if target > 0.0 {
                        frame.value().min(target)
                    } else {
                        frame.value().max(target)
                    };
                    let delta = coerced - previous_value;
                    let consumed = scope.scroll_by(delta);
                    if scope.visible_item_offset(index).is_none() && !is_overshot(scope) {
                        if (delta - consumed).abs() > SCROLL_TOLERANCE {
                            log::debug!("content ended before reaching item {index}");
                            outcome.hit_end = true;
                            keep_looping = false;
                            frame.cancel_animation();
                            return;
                        }
                        previous_value += delta;
                        if (forward && frame.value() > target) || (!forward && frame.value() < target)
                        {
                            frame.cancel_animation();
                        }
                        if loops >= config.teleport_after_loops {
                            if forward
                                && index.saturating_sub(scope.last_visible_item_index())
                                    > config.items_for_teleport
                            {
                                let landing = index - config.items_for_teleport;
                                log::debug!("teleporting forward to {landing}");
                                scope.snap_to_item(landing, 0);
                                outcome.teleports += 1;
                            } else if !forward
                                && scope.first_visible_item_index().saturating_sub(index)
                                    > config.items_for_teleport
                            {
                                let landing = index + config.items_for_teleport;
                                log::debug!("teleporting backward to {landing}");
                                scope.snap_to_item(landing, 0);
                                outcome.teleports += 1;
                            }
                        }
                    }
                }

                if is_overshot(scope) {
                    log::debug!("overshot item {index}, snapping");
                    scope.snap_to_item(index, scroll_offset);
                    keep_looping = false;
                    frame.cancel_animation();
                } else if let Some(offset) = scope.visible_item_offset(index) {
                    found = Some(offset);
                    frame.cancel_animation();
                }
            })
            .await;
            outcome.loops = loops;
            loops += 1;
        }
    }

    if let Some(item_offset) = found {
        // Settle on the exact position; stops by itself at the content end.
        let mut settle = anim.copy_with_value(0.0);
        let target = (item_offset + scroll_offset) as f32;
        let sequential = settle.velocity != 0.0;
        let mut previous_value = 0.0;
        settle
            .animate_to(target, config.animation, &clock, sequential, |frame| {
                let value = frame.value();
                let coerced = if target > 0.0 {
                    value.min(target)
                } else if target < 0.0 {
                    value.max(target)
                } else {
                    0.0
                };
                let delta = coerced - previous_value;
                let consumed = scope.scroll_by(delta);
                if (delta - consumed).abs() > SCROLL_TOLERANCE || coerced != value {
                    frame.cancel_animation();
                }
                previous_value += delta;
            })
            .await;
        scope.snap_to_item(index, scroll_offset);
        outcome.found = true;
    }
    outcome
}
