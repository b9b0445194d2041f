use super::*;
use crate::assertions::{assert_anchor, assert_visible_indices};
use crate::fixtures::FixedSizeItemProvider;

#[test]
fn test_rule_measures_installed_content() {
    run_test_list(40, 350, |rule| {
        let content = FixedSizeItemProvider::uniform(20, 100);
        let result = rule.set_content(LazyListMeasureConfig::default(), content.clone().into_rc());
        assert_eq!(result.visible_indices(), vec![0, 1, 2, 3]);
        assert_eq!(rule.visible_indices(), vec![0, 1, 2, 3]);
        assert_eq!(content.compose_count(), 4);
        assert_anchor(rule.state(), 0, 0, "initial");
    });
}

#[test]
fn resize_remeasures_with_the_new_viewport() {
    let mut rule = LazyListTestRule::new(40, 350);
    rule.set_content(
        LazyListMeasureConfig::default(),
        FixedSizeItemProvider::uniform(20, 100).into_rc(),
    );
    rule.resize(40, 150);
    assert_visible_indices(&rule.layout_info(), &[0, 1], "shrunk viewport");
}

#[test]
fn idle_runtime_needs_no_frames() {
    let mut rule = LazyListTestRule::new(40, 350);
    rule.set_content(
        LazyListMeasureConfig::default(),
        FixedSizeItemProvider::uniform(20, 100).into_rc(),
    );
    assert_eq!(rule.run_until_idle(10), 0);
    assert_eq!(rule.frame_time_nanos(), 0);
}

#[test]
fn frames_drive_scroll_sessions() {
    let mut rule = LazyListTestRule::new(40, 350);
    rule.set_content(
        LazyListMeasureConfig::default(),
        FixedSizeItemProvider::uniform(20, 100).into_rc(),
    );
    let job = rule.state().animate_scroll_by(
        250.0,
        lazylist_foundation::lazy::default_placement_animation(),
    );
    let frames = rule.run_until_finished(&job, 200);
    assert!(frames > 0);
    assert!(job.is_finished());
    assert_eq!(rule.frame_time_nanos(), frames as u64 * FRAME_NANOS);
    assert_anchor(rule.state(), 2, 50, "after animated scroll");
    assert!(rule.frames_requested() > 0);
}

#[test]
#[should_panic(expected = "no content set")]
fn layout_access_before_content_panics() {
    let rule = LazyListTestRule::new(40, 350);
    rule.layout();
}
