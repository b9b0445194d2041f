//! Lazy list state management.
//!
//! [`LazyListState`] owns the scroll position and everything that changes
//! it: raw deltas, jumps and animated scroll sessions. Observable values
//! (`first_visible_item_*`, `can_scroll_*`, `layout_info`) are
//! [`MutableState`] cells written once per committed measure pass.
//! Measuring itself is done by a [`LazyListLayout`](super::LazyListLayout),
//! which the state reaches through a [`Remeasurement`] handle.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::{Rc, Weak};

use lazylist_animation::{AnimationState, AnimationType};
use lazylist_core::{FrameClock, MutableState, RuntimeHandle, State, TaskHandle};

use super::item_placement_animator::LazyListItemPlacementAnimator;
use super::lazy_animate_scroll::{
    animate_scroll_to_item, AnimateScrollOutcome, LazyAnimateScrollConfig,
    LazyLayoutAnimateScrollScope, SCROLL_TOLERANCE,
};
use super::lazy_layout_key::LazyLayoutKey;
use super::lazy_list_measure::{LazyListMeasureConfig, LazyListMeasureResult};
use super::lazy_list_scroll_position::LazyListScrollPosition;
use crate::error::LazyListError;
use crate::scrollable::{MutatorMutex, ScrollScope, ScrollableState};

/// Something that can run a measure pass right now.
pub trait Remeasurement {
    fn force_remeasure(&self);
}

/// Information about a single laid out item.
#[derive(Clone, Debug, PartialEq)]
pub struct LazyListItemInfo {
    pub index: usize,
    pub key: LazyLayoutKey,
    /// Logical offset from the start of the content area.
    pub offset: i32,
    pub size: i32,
    pub content_type: Option<u64>,
    pub is_sticky_header: bool,
}

/// Information about the items laid out by the last pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LazyListLayoutInfo {
    pub visible_items_info: Vec<LazyListItemInfo>,
    pub total_items_count: usize,
    /// Main axis size of the viewport, content padding included.
    pub viewport_size: i32,
    pub viewport_start_offset: i32,
    pub viewport_end_offset: i32,
    pub before_content_padding: i32,
    pub after_content_padding: i32,
    pub main_axis_item_spacing: i32,
    pub is_vertical: bool,
    pub reverse_layout: bool,
}

impl LazyListLayoutInfo {
    pub fn from_measure_result(result: &LazyListMeasureResult, config: &LazyListMeasureConfig) -> Self {
        Self {
            visible_items_info: result
                .visible_items
                .iter()
                .map(|item| LazyListItemInfo {
                    index: item.index,
                    key: item.key,
                    offset: item.offset,
                    size: item.size,
                    content_type: item.content_type,
                    is_sticky_header: item.is_sticky_header,
                })
                .collect(),
            total_items_count: result.total_items_count,
            viewport_size: result.main_axis_available_size
                + config.before_content_padding
                + config.after_content_padding,
            viewport_start_offset: result.viewport_start_offset,
            viewport_end_offset: result.viewport_end_offset,
            before_content_padding: config.before_content_padding,
            after_content_padding: config.after_content_padding,
            main_axis_item_spacing: config.spacing(),
            is_vertical: config.is_vertical,
            reverse_layout: config.reverse_layout,
        }
    }

    /// Item `index` at its own position. A sticky header pinned in front of
    /// the window does not count.
    pub fn laid_out_item(&self, index: usize) -> Option<&LazyListItemInfo> {
        let first_regular = self
            .visible_items_info
            .iter()
            .find(|item| !item.is_sticky_header)
            .map(|item| item.index);
        self.visible_items_info.iter().find(|item| {
            item.index == index
                && (!item.is_sticky_header || first_regular.is_some_and(|first| index >= first))
        })
    }
}

/// Scroll position that can be stored and restored verbatim.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LazyListSavedPosition {
    pub index: usize,
    pub scroll_offset: i32,
}

/// Shared progress of a scroll session.
#[derive(Debug, Default)]
pub struct ScrollProgress {
    finished: Cell<bool>,
    consumed: Cell<f32>,
    outcome: Cell<Option<AnimateScrollOutcome>>,
}

/// Handle to a scroll session started on a [`LazyListState`].
#[derive(Debug)]
pub struct ScrollJob {
    task: Option<TaskHandle>,
    progress: Rc<ScrollProgress>,
}

impl ScrollJob {
    /// Still running. False once finished, cancelled or preempted.
    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(TaskHandle::is_active)
    }

    /// Ran to completion.
    pub fn is_finished(&self) -> bool {
        self.progress.finished.get()
    }

    /// Total scroll consumed by the session so far, content direction.
    pub fn consumed(&self) -> f32 {
        self.progress.consumed.get()
    }

    /// Outcome of an animated scroll to an item, once it has finished.
    pub fn outcome(&self) -> Option<AnimateScrollOutcome> {
        self.progress.outcome.get()
    }

    pub fn cancel(self) {
        if let Some(task) = self.task {
            task.cancel();
        }
    }
}

struct StateInner {
    runtime: RuntimeHandle,
    scroll_position: LazyListScrollPosition,
    scroll_to_be_consumed: Cell<f32>,
    can_scroll_forward: MutableState<bool>,
    can_scroll_backward: MutableState<bool>,
    layout_info: MutableState<LazyListLayoutInfo>,
    mutator: MutatorMutex,
    remeasurement: RefCell<Option<Weak<dyn Remeasurement>>>,
    placement_animator: RefCell<LazyListItemPlacementAnimator>,
    animate_scroll_config: Cell<LazyAnimateScrollConfig>,
    num_measure_passes: Cell<usize>,
}

/// State object for lazy list scroll position tracking.
///
/// Cloning is cheap and every clone controls the same list.
///
/// # Example
///
/// ```rust,ignore
/// let state = LazyListState::new(runtime.handle());
/// state.scroll_to_item(50, 0);
/// let job = state.animate_scroll_to_item(4_000, 0)?;
/// ```
#[derive(Clone)]
pub struct LazyListState {
    inner: Rc<StateInner>,
}

impl std::fmt::Debug for LazyListState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyListState")
            .field("scroll_position", &self.inner.scroll_position)
            .field("scroll_to_be_consumed", &self.inner.scroll_to_be_consumed.get())
            .field("is_scroll_in_progress", &self.inner.mutator.is_mutating())
            .finish_non_exhaustive()
    }
}

impl PartialEq for LazyListState {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl LazyListState {
    pub fn new(runtime: RuntimeHandle) -> Self {
        Self::with_position(runtime, 0, 0)
    }

    pub fn with_position(
        runtime: RuntimeHandle,
        first_visible_item_index: usize,
        first_visible_item_scroll_offset: i32,
    ) -> Self {
        Self {
            inner: Rc::new(StateInner {
                placement_animator: RefCell::new(LazyListItemPlacementAnimator::new(
                    runtime.clone(),
                )),
                runtime,
                scroll_position: LazyListScrollPosition::new(
                    first_visible_item_index,
                    first_visible_item_scroll_offset,
                ),
                scroll_to_be_consumed: Cell::new(0.0),
                can_scroll_forward: MutableState::new(false),
                can_scroll_backward: MutableState::new(false),
                layout_info: MutableState::new(LazyListLayoutInfo::default()),
                mutator: MutatorMutex::new(),
                remeasurement: RefCell::new(None),
                animate_scroll_config: Cell::new(LazyAnimateScrollConfig::default()),
                num_measure_passes: Cell::new(0),
            }),
        }
    }

    pub fn from_saved(runtime: RuntimeHandle, saved: LazyListSavedPosition) -> Self {
        Self::with_position(runtime, saved.index, saved.scroll_offset)
    }

    pub fn saved_position(&self) -> LazyListSavedPosition {
        LazyListSavedPosition {
            index: self.inner.scroll_position.observed_index(),
            scroll_offset: self.inner.scroll_position.observed_scroll_offset(),
        }
    }

    pub fn runtime(&self) -> &RuntimeHandle {
        &self.inner.runtime
    }

    /// Index of the first visible item as of the last committed pass.
    pub fn first_visible_item_index(&self) -> usize {
        self.inner.scroll_position.observed_index()
    }

    /// How far the first visible item is scrolled out of view.
    pub fn first_visible_item_scroll_offset(&self) -> i32 {
        self.inner.scroll_position.observed_scroll_offset()
    }

    pub fn first_visible_item_index_state(&self) -> State<usize> {
        self.inner.scroll_position.index_state()
    }

    pub fn first_visible_item_scroll_offset_state(&self) -> State<i32> {
        self.inner.scroll_position.scroll_offset_state()
    }

    pub fn layout_info(&self) -> LazyListLayoutInfo {
        self.inner.layout_info.get()
    }

    pub fn layout_info_state(&self) -> State<LazyListLayoutInfo> {
        self.inner.layout_info.as_state()
    }

    pub fn can_scroll_forward(&self) -> bool {
        self.inner.can_scroll_forward.get()
    }

    pub fn can_scroll_backward(&self) -> bool {
        self.inner.can_scroll_backward.get()
    }

    pub fn is_scroll_in_progress(&self) -> bool {
        self.inner.mutator.is_mutating()
    }

    /// Measure passes committed so far.
    pub fn num_measure_passes(&self) -> usize {
        self.inner.num_measure_passes.get()
    }

    pub fn animate_scroll_config(&self) -> LazyAnimateScrollConfig {
        self.inner.animate_scroll_config.get()
    }

    pub fn set_animate_scroll_config(&self, config: LazyAnimateScrollConfig) {
        self.inner.animate_scroll_config.set(config);
    }

    /// Whether a layout is attached and can measure on demand.
    pub fn is_attached(&self) -> bool {
        self.remeasurement().is_some()
    }

    /// Feeds a delta in layout direction to the next measure pass and runs
    /// it. Negative values move towards the end of the content.
    ///
    /// Returns the consumed part of `distance`. Sub-pixel remainders are
    /// reported as consumed and carried into the next pass.
    ///
    /// # Panics
    ///
    /// Panics when more than half a pixel is still pending from an earlier
    /// call, which means a pass is running right now.
    pub fn on_scroll(&self, distance: f32) -> f32 {
        if (distance < 0.0 && !self.can_scroll_forward())
            || (distance > 0.0 && !self.can_scroll_backward())
        {
            return 0.0;
        }
        let pending = self.inner.scroll_to_be_consumed.get();
        assert!(
            pending.abs() <= 0.5,
            "entering scroll with {pending} pixels still pending"
        );
        self.inner.scroll_to_be_consumed.set(pending + distance);
        if self.inner.scroll_to_be_consumed.get().abs() > 0.5 {
            self.force_remeasure();
        }
        let pending = self.inner.scroll_to_be_consumed.get();
        if pending.abs() <= 0.5 {
            distance
        } else {
            self.inner.scroll_to_be_consumed.set(0.0);
            distance - pending
        }
    }

    /// Applies `delta` in content direction and returns the consumed amount
    /// in the same sign. Stops any scroll session first.
    ///
    /// Positive values scroll towards the end. This is the opposite sign of
    /// [`on_scroll`](Self::on_scroll), where a forward scroll by 250 pixels
    /// is `on_scroll(-250.0)` and the same scroll here is
    /// `dispatch_raw_delta(250.0)`.
    pub fn dispatch_raw_delta(&self, delta: f32) -> f32 {
        self.inner.mutator.cancel();
        -self.on_scroll(-delta)
    }

    /// Jumps to `index` with `scroll_offset` pixels of it scrolled out of
    /// view. Indices past the end are clamped by the next pass.
    pub fn scroll_to_item(&self, index: usize, scroll_offset: i32) {
        self.inner.mutator.cancel();
        self.snap_to_item(index, scroll_offset);
    }

    /// Animates to item `index`, probing and teleporting over long
    /// distances.
    ///
    /// # Errors
    ///
    /// [`LazyListError::NotAttached`] before a layout has measured the list,
    /// [`LazyListError::IndexOutOfBounds`] for an index past the content.
    pub fn animate_scroll_to_item(
        &self,
        index: usize,
        scroll_offset: i32,
    ) -> Result<ScrollJob, LazyListError> {
        if !self.is_attached() || self.num_measure_passes() == 0 {
            return Err(LazyListError::NotAttached);
        }
        let item_count = self.inner.layout_info.with(|info| info.total_items_count);
        if index >= item_count {
            return Err(LazyListError::IndexOutOfBounds { index, item_count });
        }
        let config = self.animate_scroll_config();
        Ok(self.scroll(move |mut scope| async move {
            let outcome = animate_scroll_to_item(&mut scope, index, scroll_offset, &config).await;
            log::debug!("animated scroll to {index} finished: {outcome:?}");
            scope.progress.outcome.set(Some(outcome));
        }))
    }

    /// Animates a scroll by `value` pixels in content direction. Stops early
    /// when the content ends.
    pub fn animate_scroll_by(&self, value: f32, animation: impl Into<AnimationType>) -> ScrollJob {
        let animation = animation.into();
        self.scroll(move |mut scope| async move {
            let clock = scope.frame_clock();
            let mut animation_state = AnimationState::new(0.0);
            let mut previous_value = 0.0;
            animation_state
                .animate_to(value, animation, &clock, false, |frame| {
                    let delta = frame.value() - previous_value;
                    let consumed = scope.scroll_by(delta);
                    previous_value += consumed;
                    if (delta - consumed).abs() > SCROLL_TOLERANCE {
                        frame.cancel_animation();
                    }
                })
                .await;
        })
    }

    /// Runs `block` as the only scroll session, cancelling the previous one.
    pub fn scroll<F, Fut>(&self, block: F) -> ScrollJob
    where
        F: FnOnce(LazyListScrollScope) -> Fut,
        Fut: Future<Output = ()> + 'static,
    {
        let progress = Rc::new(ScrollProgress::default());
        let scope = LazyListScrollScope {
            state: Rc::downgrade(&self.inner),
            progress: progress.clone(),
        };
        let finished = progress.clone();
        let task = self.inner.mutator.mutate(&self.inner.runtime, move |guard| {
            let session = block(scope);
            async move {
                session.await;
                finished.finished.set(true);
                drop(guard);
            }
        });
        ScrollJob { task, progress }
    }

    /// Cancels the running scroll session, if any.
    pub fn stop_scroll(&self) {
        self.inner.mutator.cancel();
    }

    pub(crate) fn attach(&self, remeasurement: Weak<dyn Remeasurement>) {
        *self.inner.remeasurement.borrow_mut() = Some(remeasurement);
    }

    pub(crate) fn scroll_position(&self) -> &LazyListScrollPosition {
        &self.inner.scroll_position
    }

    pub(crate) fn scroll_to_be_consumed(&self) -> f32 {
        self.inner.scroll_to_be_consumed.get()
    }

    pub(crate) fn placement_animator(&self) -> &RefCell<LazyListItemPlacementAnimator> {
        &self.inner.placement_animator
    }

    /// Commits a finished measure pass: consumed scroll first, then the
    /// observable values.
    pub(crate) fn apply_measure_result(
        &self,
        result: &LazyListMeasureResult,
        config: &LazyListMeasureConfig,
    ) {
        let pending = self.inner.scroll_to_be_consumed.get();
        self.inner
            .scroll_to_be_consumed
            .set(pending - result.consumed_scroll);
        self.inner
            .num_measure_passes
            .set(self.inner.num_measure_passes.get() + 1);
        self.inner.scroll_position.update_from_measure_result(result);
        self.inner.can_scroll_forward.set(result.can_scroll_forward);
        self.inner
            .can_scroll_backward
            .set(result.can_scroll_backward());
        self.inner
            .layout_info
            .set(LazyListLayoutInfo::from_measure_result(result, config));
    }

    fn snap_to_item(&self, index: usize, scroll_offset: i32) {
        self.inner
            .scroll_position
            .request_position(index, scroll_offset.max(0));
        self.inner.placement_animator.borrow_mut().reset();
        self.force_remeasure();
    }

    fn remeasurement(&self) -> Option<Rc<dyn Remeasurement>> {
        self.inner
            .remeasurement
            .borrow()
            .as_ref()
            .and_then(Weak::upgrade)
    }

    fn force_remeasure(&self) {
        match self.remeasurement() {
            Some(remeasurement) => remeasurement.force_remeasure(),
            None => log::trace!("no layout attached, remeasure skipped"),
        }
    }
}

impl ScrollableState for LazyListState {
    fn dispatch_raw_delta(&self, delta: f32) -> f32 {
        LazyListState::dispatch_raw_delta(self, delta)
    }

    fn is_scroll_in_progress(&self) -> bool {
        LazyListState::is_scroll_in_progress(self)
    }

    fn can_scroll_forward(&self) -> bool {
        LazyListState::can_scroll_forward(self)
    }

    fn can_scroll_backward(&self) -> bool {
        LazyListState::can_scroll_backward(self)
    }
}

/// Scroll receiver handed to a scroll session.
///
/// Holds the state weakly; once the state is gone every scroll consumes
/// nothing.
pub struct LazyListScrollScope {
    state: Weak<StateInner>,
    progress: Rc<ScrollProgress>,
}

impl LazyListScrollScope {
    fn state(&self) -> Option<LazyListState> {
        self.state.upgrade().map(|inner| LazyListState { inner })
    }

    fn with_layout_info<R>(&self, default: R, f: impl FnOnce(&LazyListLayoutInfo) -> R) -> R {
        match self.state.upgrade() {
            Some(inner) => inner.layout_info.with(f),
            None => default,
        }
    }

    /// Scroll consumed by this session so far.
    pub fn consumed(&self) -> f32 {
        self.progress.consumed.get()
    }
}

impl ScrollScope for LazyListScrollScope {
    fn scroll_by(&mut self, pixels: f32) -> f32 {
        let Some(state) = self.state() else {
            return 0.0;
        };
        let consumed = -state.on_scroll(-pixels);
        self.progress.consumed.set(self.progress.consumed.get() + consumed);
        consumed
    }
}

impl LazyLayoutAnimateScrollScope for LazyListScrollScope {
    fn first_visible_item_index(&self) -> usize {
        self.state
            .upgrade()
            .map_or(0, |inner| inner.scroll_position.index())
    }

    fn first_visible_item_scroll_offset(&self) -> i32 {
        self.state
            .upgrade()
            .map_or(0, |inner| inner.scroll_position.scroll_offset())
    }

    fn last_visible_item_index(&self) -> usize {
        self.with_layout_info(0, |info| {
            info.visible_items_info.last().map_or(0, |item| item.index)
        })
    }

    fn item_count(&self) -> usize {
        self.with_layout_info(0, |info| info.total_items_count)
    }

    fn visible_item_offset(&self, index: usize) -> Option<i32> {
        self.with_layout_info(None, |info| info.laid_out_item(index).map(|item| item.offset))
    }

    fn snap_to_item(&mut self, index: usize, scroll_offset: i32) {
        if let Some(state) = self.state() {
            state.snap_to_item(index, scroll_offset);
        }
    }

    fn calculate_distance_to(&self, index: usize) -> f32 {
        let first_index = self.first_visible_item_index();
        let first_offset = self.first_visible_item_scroll_offset();
        self.with_layout_info(0.0, |info| {
            let items = &info.visible_items_info;
            if items.is_empty() {
                return 0.0;
            }
            if let Some(item) = info.laid_out_item(index) {
                return item.offset as f32;
            }
            let total: i32 = items.iter().map(|item| item.size).sum();
            let average = total as f32 / items.len() as f32 + info.main_axis_item_spacing as f32;
            let indexes_diff = index as f32 - first_index as f32;
            average * indexes_diff - first_offset as f32
        })
    }

    fn frame_clock(&self) -> FrameClock {
        match self.state.upgrade() {
            Some(inner) => inner.runtime.frame_clock(),
            None => FrameClock::new(RuntimeHandle::detached()),
        }
    }
}

#[cfg(test)]
#[path = "tests/lazy_list_state_tests.rs"]
mod tests;
