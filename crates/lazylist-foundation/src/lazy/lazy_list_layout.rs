//! Runs measure passes for one list and turns results into placements.
//!
//! A pass reads the raw scroll position and pending scroll from the
//! [`LazyListState`], materializes items through the subcompose cache,
//! runs [`measure_lazy_list`] and commits the result back to the state.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use lazylist_core::SubcomposeState;
use lazylist_ui_layout::{Axis, Constraints};

use super::item_placement_animator::PlacementViewport;
use super::item_provider::LazyLayoutItemProvider;
use super::lazy_layout_key::LazyLayoutKey;
use super::lazy_list_measure::{
    measure_lazy_list, LazyListMeasureConfig, LazyListMeasureInput, LazyListMeasureResult,
};
use super::lazy_list_measured_item::LazyListPositionedItem;
use super::lazy_list_state::{LazyListState, Remeasurement};
use super::lazy_measured_item_provider::{ComposedItem, LazyListMeasuredItemProvider};

/// Where one child of one item goes, in viewport pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LazyListItemPlacement {
    pub index: usize,
    pub key: LazyLayoutKey,
    /// Position of the child within its item.
    pub placeable_index: usize,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub is_sticky_header: bool,
}

/// Counters of the layout and its item cache.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LazyListLayoutStats {
    pub measure_passes: usize,
    /// Items materialized by the last pass.
    pub active_items: usize,
    /// Items kept around for reuse.
    pub reusable_items: usize,
    pub total_composed: usize,
    pub reuse_count: usize,
}

struct LayoutInner {
    state: LazyListState,
    config: RefCell<LazyListMeasureConfig>,
    content: RefCell<Rc<dyn LazyLayoutItemProvider>>,
    generation: Cell<u64>,
    composition: RefCell<SubcomposeState<Rc<ComposedItem>>>,
    constraints: Cell<Option<Constraints>>,
    measuring: Cell<bool>,
    last_result: RefCell<Option<Rc<LazyListMeasureResult>>>,
    placement_invalidated: Rc<Cell<bool>>,
}

impl LayoutInner {
    fn measure(&self, constraints: Constraints) -> Rc<LazyListMeasureResult> {
        assert!(
            !self.measuring.get(),
            "remeasure requested while a measure pass is running"
        );
        let config = self.config.borrow().clone();
        let axis = if config.is_vertical {
            Axis::Vertical
        } else {
            Axis::Horizontal
        };
        let main_max = axis.main(constraints.max_width, constraints.max_height);
        assert!(
            main_max != Constraints::INFINITY,
            "lazy list measured with an unbounded main axis"
        );
        let cross_max = axis.cross(constraints.max_width, constraints.max_height);
        let (cross_axis_size, child_constraints) = if cross_max != Constraints::INFINITY {
            (
                cross_max,
                Constraints::for_lazy_item(config.is_vertical, cross_max),
            )
        } else {
            (
                axis.cross(constraints.min_width, constraints.min_height),
                Constraints::loose(Constraints::INFINITY, Constraints::INFINITY),
            )
        };

        self.measuring.set(true);
        self.constraints.set(Some(constraints));
        let content = self.content.borrow().clone();
        let position = self.state.scroll_position();
        let first_visible_item_index = position.update_if_first_item_moved(content.as_ref());
        let input = LazyListMeasureInput {
            items_count: content.item_count(),
            main_axis_available_size: (main_max
                - config.before_content_padding
                - config.after_content_padding)
                .max(0),
            cross_axis_size,
            first_visible_item_index,
            first_visible_item_scroll_offset: position.scroll_offset(),
            scroll_to_be_consumed: self.state.scroll_to_be_consumed(),
            header_indexes: content.header_indexes(),
        };

        let result = {
            let mut composition = self.composition.borrow_mut();
            composition.begin_pass();
            let mut provider = LazyListMeasuredItemProvider::new(
                content.as_ref(),
                &mut *composition,
                self.generation.get(),
                child_constraints,
                &config,
                position.nearest_range(),
            );
            let mut animator = self.state.placement_animator().borrow_mut();
            let result = measure_lazy_list(&input, &config, &mut provider, Some(&mut *animator));
            log::trace!(
                "measured {} items for window {:?}",
                provider.measured_count(),
                result.visible_indices()
            );
            drop(provider);
            let disposed = composition.finish_pass();
            if !disposed.is_empty() {
                log::trace!("disposed {} cached items", disposed.len());
            }
            Rc::new(result)
        };

        self.measuring.set(false);
        *self.last_result.borrow_mut() = Some(result.clone());
        self.placement_invalidated.set(true);
        self.state.apply_measure_result(&result, &config);
        result
    }
}

impl Remeasurement for LayoutInner {
    fn force_remeasure(&self) {
        match self.constraints.get() {
            Some(constraints) => {
                self.measure(constraints);
            }
            None => log::trace!("remeasure before the first measure, skipped"),
        }
    }
}

/// Lays out a list of items from `content` for `state`.
///
/// Creating the layout attaches it to the state, so raw deltas and
/// programmatic scrolls remeasure through it with the last constraints.
#[derive(Clone)]
pub struct LazyListLayout {
    inner: Rc<LayoutInner>,
}

impl std::fmt::Debug for LazyListLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyListLayout")
            .field("config", &self.inner.config.borrow())
            .field("generation", &self.inner.generation.get())
            .field("constraints", &self.inner.constraints.get())
            .finish_non_exhaustive()
    }
}

impl LazyListLayout {
    pub fn new(
        state: LazyListState,
        config: LazyListMeasureConfig,
        content: Rc<dyn LazyLayoutItemProvider>,
    ) -> Self {
        let placement_invalidated = Rc::new(Cell::new(false));
        let inner = Rc::new(LayoutInner {
            state: state.clone(),
            config: RefCell::new(config),
            content: RefCell::new(content),
            generation: Cell::new(0),
            composition: RefCell::new(SubcomposeState::default()),
            constraints: Cell::new(None),
            measuring: Cell::new(false),
            last_result: RefCell::new(None),
            placement_invalidated: placement_invalidated.clone(),
        });
        let weak: Weak<LayoutInner> = Rc::downgrade(&inner);
        state.attach(weak);
        state
            .placement_animator()
            .borrow_mut()
            .set_invalidation(Some(Rc::new(move || placement_invalidated.set(true))));
        Self { inner }
    }

    pub fn state(&self) -> &LazyListState {
        &self.inner.state
    }

    /// Runs a measure pass.
    ///
    /// # Panics
    ///
    /// Panics on an unbounded main axis, and when called from inside a
    /// running pass.
    pub fn measure(&self, constraints: Constraints) -> Rc<LazyListMeasureResult> {
        self.inner.measure(constraints)
    }

    /// Measures again with the last constraints.
    pub fn remeasure(&self) -> Option<Rc<LazyListMeasureResult>> {
        self.inner
            .constraints
            .get()
            .map(|constraints| self.inner.measure(constraints))
    }

    /// Replaces the content. Cached items are rebuilt on their next use;
    /// the scroll position follows the first visible item by key.
    pub fn set_content(&self, content: Rc<dyn LazyLayoutItemProvider>) {
        *self.inner.content.borrow_mut() = content;
        self.inner.generation.set(self.inner.generation.get() + 1);
    }

    pub fn set_config(&self, config: LazyListMeasureConfig) {
        *self.inner.config.borrow_mut() = config;
    }

    pub fn config(&self) -> LazyListMeasureConfig {
        self.inner.config.borrow().clone()
    }

    pub fn last_result(&self) -> Option<Rc<LazyListMeasureResult>> {
        self.inner.last_result.borrow().clone()
    }

    /// Whether placements changed since the last call, either because a pass
    /// ran or because a placement animation advanced.
    pub fn take_placement_invalidation(&self) -> bool {
        self.inner.placement_invalidated.replace(false)
    }

    pub fn stats(&self) -> LazyListLayoutStats {
        let composition = self.inner.composition.borrow().stats();
        LazyListLayoutStats {
            measure_passes: self.inner.state.num_measure_passes(),
            active_items: composition.active,
            reusable_items: composition.reusable,
            total_composed: composition.total_composed,
            reuse_count: composition.reuse_count,
        }
    }

    /// Positions of every child of the last pass, in viewport pixels.
    ///
    /// Regular items come first, then items that only finish a placement
    /// animation, then the sticky header so it is drawn on top. Running
    /// placement animations are applied; the sticky header never animates.
    pub fn placements(&self) -> Vec<LazyListItemPlacement> {
        let Some(result) = self.last_result() else {
            return Vec::new();
        };
        let config = self.inner.config.borrow();
        let animator = self.inner.state.placement_animator().borrow();
        let viewport = PlacementViewport {
            main_axis_size: result.main_axis_available_size,
            cross_axis_size: result
                .visible_items
                .first()
                .map_or(0, |item| item.cross_axis_size),
            before_content_padding: config.before_content_padding,
            after_content_padding: config.after_content_padding,
        };
        let axis = if config.is_vertical {
            Axis::Vertical
        } else {
            Axis::Horizontal
        };
        let start_padding = if config.reverse_layout {
            config.after_content_padding
        } else {
            config.before_content_padding
        };

        let mut placements = Vec::new();
        let mut place = |item: &LazyListPositionedItem, animate: bool| {
            for (placeable_index, placeable) in item.placeables.iter().enumerate() {
                let logical = if animate && placeable.placement_animation.is_some() {
                    animator.animated_offset(item.key, placeable_index, placeable.main_offset, &viewport)
                } else {
                    placeable.main_offset
                };
                let main = if config.reverse_layout {
                    result.main_axis_available_size - logical - placeable.main_size
                } else {
                    logical
                } + start_padding;
                let (x, y) = axis.compose(main, placeable.cross_offset);
                let (width, height) = axis.compose(placeable.main_size, placeable.cross_size);
                placements.push(LazyListItemPlacement {
                    index: item.index,
                    key: item.key,
                    placeable_index,
                    x,
                    y,
                    width,
                    height,
                    is_sticky_header: item.is_sticky_header,
                });
            }
        };

        for item in result.visible_items.iter().filter(|item| !item.is_sticky_header) {
            place(item, true);
        }
        for item in &result.offscreen_items {
            place(item, true);
        }
        if let Some(header) = result.sticky_header.and_then(|slot| result.visible_items.get(slot)) {
            place(header, false);
        }
        placements
    }
}

#[cfg(test)]
#[path = "tests/lazy_list_layout_tests.rs"]
mod tests;
