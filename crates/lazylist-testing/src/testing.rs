use std::rc::Rc;
use std::sync::Arc;

use lazylist_core::{Runtime, RuntimeHandle, TestScheduler};
use lazylist_foundation::lazy::{
    LazyLayoutItemProvider, LazyListItemPlacement, LazyListLayout, LazyListLayoutInfo,
    LazyListMeasureConfig, LazyListMeasureResult, LazyListState, ScrollJob,
};
use lazylist_ui_layout::Constraints;

/// Length of one frame driven by [`LazyListTestRule::advance_frame`].
pub const FRAME_NANOS: u64 = 16_000_000;

/// Headless harness for exercising a lazy list in tests.
///
/// `LazyListTestRule` owns a runtime with a counting scheduler, one
/// [`LazyListState`] and, once content is set, the [`LazyListLayout`] that
/// measures it inside a fixed viewport. Frames are advanced manually.
pub struct LazyListTestRule {
    runtime: Runtime,
    scheduler: Arc<TestScheduler>,
    state: LazyListState,
    layout: Option<LazyListLayout>,
    constraints: Constraints,
    frame_time_nanos: u64,
}

impl LazyListTestRule {
    /// Create a rule whose list fills a `width` x `height` viewport.
    pub fn new(width: i32, height: i32) -> Self {
        Self::with_constraints(Constraints::tight(width, height))
    }

    pub fn with_constraints(constraints: Constraints) -> Self {
        let scheduler = Arc::new(TestScheduler::default());
        let runtime = Runtime::new(scheduler.clone());
        let state = LazyListState::new(runtime.handle());
        Self {
            runtime,
            scheduler,
            state,
            layout: None,
            constraints,
            frame_time_nanos: 0,
        }
    }

    /// Replace the state before content is set, e.g. to start from a
    /// restored position.
    pub fn set_state(&mut self, state: LazyListState) {
        assert!(
            self.layout.is_none(),
            "state must be replaced before content is set"
        );
        self.state = state;
    }

    /// Install `content` and run the first measure pass.
    pub fn set_content(
        &mut self,
        config: LazyListMeasureConfig,
        content: Rc<dyn LazyLayoutItemProvider>,
    ) -> Rc<LazyListMeasureResult> {
        let layout = LazyListLayout::new(self.state.clone(), config, content);
        let result = layout.measure(self.constraints);
        self.layout = Some(layout);
        result
    }

    /// Swap the content of the installed layout and remeasure.
    pub fn replace_content(
        &mut self,
        content: Rc<dyn LazyLayoutItemProvider>,
    ) -> Rc<LazyListMeasureResult> {
        self.layout().set_content(content);
        self.measure()
    }

    /// Measure with the current viewport.
    pub fn measure(&self) -> Rc<LazyListMeasureResult> {
        self.layout().measure(self.constraints)
    }

    /// Change the viewport and remeasure.
    pub fn resize(&mut self, width: i32, height: i32) -> Rc<LazyListMeasureResult> {
        self.constraints = Constraints::tight(width, height);
        self.measure()
    }

    /// Advance the clock by one frame, then run whatever the frame woke up.
    pub fn advance_frame(&mut self) {
        self.frame_time_nanos += FRAME_NANOS;
        let handle = self.runtime.handle();
        handle.drain_frame_callbacks(self.frame_time_nanos);
        handle.drain_ui();
    }

    /// Advance frames until nothing waits for one. Returns the number of
    /// frames it took.
    ///
    /// # Panics
    ///
    /// Panics when the runtime is still busy after `max_frames` frames.
    pub fn run_until_idle(&mut self, max_frames: usize) -> usize {
        let handle = self.runtime.handle();
        handle.drain_ui();
        let mut frames = 0;
        while handle.has_frame_callbacks() {
            assert!(
                frames < max_frames,
                "list did not settle within {max_frames} frames"
            );
            self.advance_frame();
            frames += 1;
        }
        log::trace!("settled after {frames} frames");
        frames
    }

    /// Advance frames until `job` is no longer running. Returns the number
    /// of frames it took.
    ///
    /// # Panics
    ///
    /// Panics when `job` still runs after `max_frames` frames.
    pub fn run_until_finished(&mut self, job: &ScrollJob, max_frames: usize) -> usize {
        self.runtime.handle().drain_ui();
        let mut frames = 0;
        while job.is_active() {
            assert!(
                frames < max_frames,
                "scroll did not finish within {max_frames} frames"
            );
            self.advance_frame();
            frames += 1;
        }
        frames
    }

    pub fn state(&self) -> &LazyListState {
        &self.state
    }

    /// # Panics
    ///
    /// Panics before [`set_content`](Self::set_content).
    pub fn layout(&self) -> &LazyListLayout {
        match &self.layout {
            Some(layout) => layout,
            None => panic!("no content set"),
        }
    }

    pub fn layout_info(&self) -> LazyListLayoutInfo {
        self.state.layout_info()
    }

    pub fn visible_indices(&self) -> Vec<usize> {
        self.state
            .layout_info()
            .visible_items_info
            .iter()
            .map(|item| item.index)
            .collect()
    }

    pub fn placements(&self) -> Vec<LazyListItemPlacement> {
        self.layout().placements()
    }

    pub fn runtime_handle(&self) -> RuntimeHandle {
        self.runtime.handle()
    }

    pub fn frame_time_nanos(&self) -> u64 {
        self.frame_time_nanos
    }

    /// Frames the runtime asked its scheduler for.
    pub fn frames_requested(&self) -> usize {
        self.scheduler.frames_requested()
    }
}

/// Convenience helper for tests that only need temporary access to a
/// `LazyListTestRule`.
pub fn run_test_list<R>(width: i32, height: i32, f: impl FnOnce(&mut LazyListTestRule) -> R) -> R {
    let mut rule = LazyListTestRule::new(width, height);
    f(&mut rule)
}

#[cfg(test)]
#[path = "tests/testing_tests.rs"]
mod tests;
