use super::*;
use crate::lazy::lazy_list_layout::LazyListLayout;
use crate::lazy::lazy_list_scope::{LazyItemScope, LazyListIntervalContent, LazyListScopeExt};
use lazylist_animation::AnimationSpec;
use lazylist_core::{Runtime, TestScheduler};
use lazylist_ui_layout::{Constraints, Placeable};
use std::sync::Arc;

const FRAME: u64 = 16_000_000;

fn runtime() -> Runtime {
    Runtime::new(Arc::new(TestScheduler::default()))
}

/// `count` rows of 100px measured in a 40x350 viewport.
fn attached(runtime: &Runtime, count: usize) -> (LazyListState, LazyListLayout) {
    let state = LazyListState::new(runtime.handle());
    let content = LazyListIntervalContent::build(|scope| {
        scope.items_count(count, |item: &mut LazyItemScope, _| {
            item.emit(|constraints: Constraints| Placeable::new(constraints.max_width, 100));
        });
    });
    let layout = LazyListLayout::new(state.clone(), LazyListMeasureConfig::default(), Rc::new(content));
    layout.measure(Constraints::tight(40, 350));
    (state, layout)
}

fn run_frames(runtime: &Runtime, job: &ScrollJob, max_frames: u64) {
    let handle = runtime.handle();
    handle.drain_ui();
    let mut time = 0;
    for _ in 0..max_frames {
        if job.is_finished() || !job.is_active() {
            break;
        }
        time += FRAME;
        handle.drain_frame_callbacks(time);
        handle.drain_ui();
    }
}

#[test]
fn detached_state_consumes_no_scroll() {
    let runtime = runtime();
    let state = LazyListState::new(runtime.handle());
    assert!(!state.is_attached());
    assert_eq!(state.on_scroll(-10.0), 0.0);
    assert_eq!(state.dispatch_raw_delta(10.0), 0.0);
    assert_eq!(state.num_measure_passes(), 0);
}

#[test]
fn scroll_to_item_updates_the_position_before_layout() {
    let runtime = runtime();
    let state = LazyListState::new(runtime.handle());
    state.scroll_to_item(5, 7);
    assert_eq!(state.first_visible_item_index(), 5);
    assert_eq!(state.first_visible_item_scroll_offset(), 7);
}

#[test]
fn saved_position_restores_verbatim() {
    let runtime = runtime();
    let state = LazyListState::with_position(runtime.handle(), 12, 30);
    let saved = state.saved_position();
    assert_eq!(saved, LazyListSavedPosition { index: 12, scroll_offset: 30 });

    let restored = LazyListState::from_saved(runtime.handle(), saved);
    assert_eq!(restored.first_visible_item_index(), 12);
    assert_eq!(restored.first_visible_item_scroll_offset(), 30);
    assert_ne!(restored, state);
    assert_eq!(state.clone(), state);
}

#[test]
fn animated_scroll_needs_a_measured_layout() {
    let runtime = runtime();
    let state = LazyListState::new(runtime.handle());
    assert_eq!(
        state.animate_scroll_to_item(3, 0).err(),
        Some(LazyListError::NotAttached)
    );

    let (state, _layout) = attached(&runtime, 20);
    assert_eq!(
        state.animate_scroll_to_item(20, 0).err(),
        Some(LazyListError::IndexOutOfBounds { index: 20, item_count: 20 })
    );
}

#[test]
fn raw_delta_moves_the_anchor() {
    let runtime = runtime();
    let (state, _layout) = attached(&runtime, 20);
    assert!(state.can_scroll_forward());
    assert!(!state.can_scroll_backward());

    assert_eq!(state.dispatch_raw_delta(250.0), 250.0);
    assert_eq!(state.first_visible_item_index(), 2);
    assert_eq!(state.first_visible_item_scroll_offset(), 50);
    assert!(state.can_scroll_backward());
    assert_eq!(state.layout_info().visible_items_info[0].offset, -50);
}

#[test]
fn sub_pixel_deltas_are_carried_without_a_pass() {
    let runtime = runtime();
    let (state, _layout) = attached(&runtime, 20);
    let passes = state.num_measure_passes();

    assert_eq!(state.dispatch_raw_delta(0.3), 0.3);
    assert_eq!(state.num_measure_passes(), passes);
    assert_eq!(state.first_visible_item_scroll_offset(), 0);

    // The carried remainder joins the next delta.
    state.dispatch_raw_delta(0.4);
    assert_eq!(state.num_measure_passes(), passes + 1);
    assert_eq!(state.first_visible_item_scroll_offset(), 1);
}

#[test]
fn raw_delta_is_limited_by_the_content_end() {
    let runtime = runtime();
    let (state, _layout) = attached(&runtime, 5);
    // 500px of content in a 350px viewport.
    let consumed = state.dispatch_raw_delta(400.0);
    assert_eq!(consumed, 150.0);
    assert!(!state.can_scroll_forward());
    assert_eq!(state.dispatch_raw_delta(10.0), 0.0);
}

#[test]
fn scroll_session_can_be_stopped() {
    let runtime = runtime();
    let (state, _layout) = attached(&runtime, 20);
    let job = state.scroll(|_scope| std::future::pending::<()>());
    runtime.handle().drain_ui();
    assert!(state.is_scroll_in_progress());
    assert!(job.is_active());

    state.stop_scroll();
    assert!(!state.is_scroll_in_progress());
    assert!(!job.is_finished());
}

#[test]
fn new_session_preempts_the_running_one() {
    let runtime = runtime();
    let (state, _layout) = attached(&runtime, 20);
    let first = state.scroll(|_scope| std::future::pending::<()>());
    runtime.handle().drain_ui();
    let second = state.scroll(|mut scope| async move {
        scope.scroll_by(120.0);
    });
    run_frames(&runtime, &second, 10);

    assert!(!first.is_active());
    assert!(second.is_finished());
    assert_eq!(second.consumed(), 120.0);
    assert_eq!(state.first_visible_item_index(), 1);
    assert!(!state.is_scroll_in_progress());
}

#[test]
fn raw_delta_cancels_a_running_session() {
    let runtime = runtime();
    let (state, _layout) = attached(&runtime, 20);
    let job = state.scroll(|_scope| std::future::pending::<()>());
    runtime.handle().drain_ui();
    state.dispatch_raw_delta(30.0);
    assert!(!state.is_scroll_in_progress());
    assert!(!job.is_finished());
    assert_eq!(state.first_visible_item_scroll_offset(), 30);
}

#[test]
fn animate_scroll_by_reaches_the_target() {
    let runtime = runtime();
    let (state, _layout) = attached(&runtime, 20);
    let job = state.animate_scroll_by(150.0, AnimationSpec::linear(160));
    run_frames(&runtime, &job, 60);

    assert!(job.is_finished());
    assert!((job.consumed() - 150.0).abs() <= 1.0, "consumed {}", job.consumed());
    assert_eq!(state.first_visible_item_index(), 1);
    assert_eq!(state.first_visible_item_scroll_offset(), 50);
}

#[test]
fn animate_scroll_by_stops_at_the_content_end() {
    let runtime = runtime();
    let (state, _layout) = attached(&runtime, 5);
    let job = state.animate_scroll_by(1_000.0, AnimationSpec::linear(160));
    run_frames(&runtime, &job, 60);

    assert!(job.is_finished());
    assert_eq!(job.consumed(), 150.0);
    assert!(!state.can_scroll_forward());
}

#[test]
fn animate_scroll_to_visible_item() {
    let runtime = runtime();
    let (state, _layout) = attached(&runtime, 20);
    let job = state.animate_scroll_to_item(2, 10).expect("attached layout");
    run_frames(&runtime, &job, 200);

    assert!(job.is_finished());
    assert_eq!(state.first_visible_item_index(), 2);
    assert_eq!(state.first_visible_item_scroll_offset(), 10);
    let outcome = job.outcome().expect("finished session has an outcome");
    assert!(outcome.found);
    assert_eq!(outcome.teleports, 0);
}

#[test]
fn layout_info_reports_the_viewport() {
    let runtime = runtime();
    let (state, _layout) = attached(&runtime, 20);
    let info = state.layout_info();
    assert_eq!(info.total_items_count, 20);
    assert_eq!(info.viewport_size, 350);
    assert_eq!(info.viewport_start_offset, 0);
    assert_eq!(info.viewport_end_offset, 350);
    let indices: Vec<usize> = info.visible_items_info.iter().map(|item| item.index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3]);
    assert!(info.is_vertical);
}
