//! Property-based tests for scroll reconciliation.
//!
//! Random item sizes, viewports and delta sequences are fed through a real
//! layout; after every pass the committed state must describe a window that
//! could actually be on screen. The shaped variants add content padding,
//! spacing (negative included), reverse layout and sticky headers.

use lazylist_foundation::lazy::LazyListMeasureConfig;
use lazylist_testing::prelude::*;
use lazylist_ui_layout::LinearArrangement;
use proptest::prelude::*;

fn arb_sizes() -> impl Strategy<Value = Vec<i32>> {
    prop::collection::vec(1i32..=150, 0..120)
}

fn arb_viewport() -> impl Strategy<Value = i32> {
    40i32..=600
}

fn arb_deltas() -> impl Strategy<Value = Vec<i32>> {
    prop::collection::vec(-800i32..=800, 1..12)
}

fn rule_for(sizes: &[i32], viewport: i32) -> LazyListTestRule {
    let mut rule = LazyListTestRule::new(40, viewport);
    rule.set_content(
        LazyListMeasureConfig::default(),
        FixedSizeItemProvider::with_sizes(sizes).into_rc(),
    );
    rule
}

fn check_window(rule: &LazyListTestRule, sizes: &[i32], viewport: i32) -> Result<(), TestCaseError> {
    let state = rule.state();
    let info = rule.layout_info();
    let index = state.first_visible_item_index();
    let offset = state.first_visible_item_scroll_offset();

    if sizes.is_empty() {
        prop_assert!(info.visible_items_info.is_empty());
        prop_assert_eq!((index, offset), (0, 0));
        return Ok(());
    }
    prop_assert!(index < sizes.len(), "anchor {} of {}", index, sizes.len());
    prop_assert!(offset >= 0);
    prop_assert!(offset < sizes[index], "offset {} inside item of {}", offset, sizes[index]);

    let first = &info.visible_items_info[0];
    prop_assert_eq!(first.index, index);
    prop_assert_eq!(first.offset, -offset);
    assert_contiguous(&info, "window");

    let result = rule.layout().last_result().expect("measured");
    let last = info.visible_items_info.last().expect("non-empty window");
    prop_assert_eq!(result.content_end_offset, last.offset + last.size);
    prop_assert_eq!(
        state.can_scroll_forward(),
        result.content_end_offset > viewport || last.index + 1 < sizes.len()
    );
    prop_assert_eq!(state.can_scroll_backward(), index > 0 || offset > 0);

    let total: i32 = sizes.iter().sum();
    if total <= viewport {
        prop_assert_eq!(info.visible_items_info.len(), sizes.len());
    } else {
        prop_assert!(last.offset + last.size >= viewport, "gap at the end");
    }
    Ok(())
}

/// A list with everything that shifts items away from a plain stack.
#[derive(Clone, Debug)]
struct Shape {
    sizes: Vec<i32>,
    viewport: i32,
    before: i32,
    after: i32,
    spacing: i32,
    reverse: bool,
    headers: Vec<usize>,
}

impl Shape {
    fn config(&self) -> LazyListMeasureConfig {
        // `spaced_by` rejects negative gaps; overlapping items are still legal.
        let config = LazyListMeasureConfig::default()
            .with_content_padding(self.before, self.after)
            .with_arrangement(LinearArrangement::SpacedBy(self.spacing));
        if self.reverse {
            config.reversed()
        } else {
            config
        }
    }

    fn available(&self) -> i32 {
        self.viewport - self.before - self.after
    }
}

fn arb_shape() -> impl Strategy<Value = Shape> {
    (
        prop::collection::vec(20i32..=150, 0..80),
        160i32..=600,
        0i32..=60,
        0i32..=60,
        -10i32..=20,
        any::<bool>(),
        prop::collection::btree_set(0usize..80, 0..8),
    )
        .prop_map(|(sizes, viewport, before, after, spacing, reverse, headers)| {
            let headers = headers.into_iter().filter(|index| *index < sizes.len()).collect();
            Shape {
                sizes,
                viewport,
                before,
                after,
                spacing,
                reverse,
                headers,
            }
        })
}

fn shaped_rule(shape: &Shape) -> LazyListTestRule {
    let mut rule = LazyListTestRule::new(40, shape.viewport);
    let content = FixedSizeItemProvider::with_sizes(&shape.sizes).with_sticky_headers(&shape.headers);
    rule.set_content(shape.config(), content.into_rc());
    rule
}

fn check_shaped_window(rule: &LazyListTestRule, shape: &Shape) -> Result<(), TestCaseError> {
    let state = rule.state();
    let info = rule.layout_info();
    let index = state.first_visible_item_index();
    let offset = state.first_visible_item_scroll_offset();
    let count = shape.sizes.len();

    prop_assert_eq!(info.before_content_padding, shape.before);
    prop_assert_eq!(info.after_content_padding, shape.after);
    prop_assert_eq!(info.main_axis_item_spacing, shape.spacing);
    prop_assert_eq!(info.reverse_layout, shape.reverse);
    if count == 0 {
        prop_assert!(info.visible_items_info.is_empty());
        prop_assert_eq!((index, offset), (0, 0));
        return Ok(());
    }

    prop_assert!(index < count, "anchor {} of {}", index, count);
    prop_assert!(offset >= 0);
    let bound = shape.sizes[index] + shape.spacing.max(0) + shape.before;
    prop_assert!(offset < bound, "offset {} not below {}", offset, bound);
    prop_assert_eq!(state.can_scroll_backward(), index > 0 || offset > 0);
    prop_assert!(
        info.visible_items_info.iter().any(|item| item.index == index),
        "anchor {} not laid out",
        index
    );
    assert_contiguous(&info, "shaped window");

    let result = rule.layout().last_result().expect("measured");
    let available = shape.available();
    let regular: Vec<_> = info
        .visible_items_info
        .iter()
        .filter(|item| !item.is_sticky_header)
        .collect();
    let sticky: Vec<_> = info
        .visible_items_info
        .iter()
        .filter(|item| item.is_sticky_header)
        .collect();

    let has_spare_space = result.content_end_offset < available;
    if !has_spare_space {
        if let Some(anchor) = regular.iter().find(|item| item.index == index) {
            prop_assert_eq!(anchor.offset, -offset);
        }
    }

    if let Some(last) = regular.last() {
        if last.index + 1 < count {
            prop_assert!(state.can_scroll_forward(), "items after {} left out", last.index);
            prop_assert!(
                last.offset + last.size + shape.spacing.max(0) >= available,
                "gap after item {}",
                last.index
            );
        }
        if !state.can_scroll_forward() {
            prop_assert_eq!(last.index, count - 1);
            prop_assert!(last.offset + last.size <= available, "last item clipped");
        }
    }

    prop_assert!(sticky.len() <= 1, "{} sticky headers", sticky.len());
    prop_assert_eq!(result.sticky_header.is_some(), sticky.len() == 1);
    match (sticky.first(), regular.first()) {
        (Some(header), Some(first)) => {
            prop_assert!(shape.headers.contains(&header.index));
            prop_assert!(header.index <= first.index);
            prop_assert!(
                !shape
                    .headers
                    .iter()
                    .any(|candidate| *candidate > header.index && *candidate < first.index),
                "header {} skipped a later one before {}",
                header.index,
                first.index
            );
            if header.offset < -shape.before {
                let next = shape.headers.iter().find(|candidate| **candidate > header.index);
                let pusher = next.and_then(|next| regular.iter().find(|item| item.index == *next));
                prop_assert!(
                    pusher.is_some_and(|pusher| pusher.offset - header.size == header.offset),
                    "header {} above the padding edge without being pushed",
                    header.index
                );
            }
        }
        (None, Some(first)) => {
            prop_assert!(
                shape.headers.iter().all(|candidate| *candidate > first.index),
                "no header before item {}",
                first.index
            );
        }
        _ => {}
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(96))]

    #[test]
    fn anchor_stays_valid_under_any_deltas(
        sizes in arb_sizes(),
        viewport in arb_viewport(),
        deltas in arb_deltas(),
    ) {
        let rule = rule_for(&sizes, viewport);
        check_window(&rule, &sizes, viewport)?;
        for delta in deltas {
            let consumed = rule.state().dispatch_raw_delta(delta as f32);
            prop_assert!(consumed.abs() <= (delta as f32).abs());
            prop_assert!(consumed == 0.0 || consumed.signum() == (delta as f32).signum());
            check_window(&rule, &sizes, viewport)?;
        }
    }

    #[test]
    fn measuring_without_delta_is_idempotent(
        sizes in arb_sizes(),
        viewport in arb_viewport(),
        delta in -2_000i32..=2_000,
    ) {
        let rule = rule_for(&sizes, viewport);
        rule.state().dispatch_raw_delta(delta as f32);
        let info = rule.layout_info();
        let placements = rule.placements();

        rule.measure();
        prop_assert_eq!(rule.layout_info(), info.clone());
        prop_assert_eq!(rule.placements(), placements);
        rule.measure();
        prop_assert_eq!(rule.layout_info(), info);
    }

    #[test]
    fn fully_consumed_delta_round_trips(
        sizes in arb_sizes(),
        viewport in arb_viewport(),
        start in 0i32..=3_000,
        delta in -600i32..=600,
    ) {
        let rule = rule_for(&sizes, viewport);
        rule.state().dispatch_raw_delta(start as f32);
        let anchor = rule.state().saved_position();

        let forward = rule.state().dispatch_raw_delta(delta as f32);
        prop_assume!(forward == delta as f32);
        let backward = rule.state().dispatch_raw_delta(-delta as f32);
        prop_assert_eq!(backward, -delta as f32);
        prop_assert_eq!(rule.state().saved_position(), anchor);
    }

    #[test]
    fn consumed_scroll_adds_up_to_the_position(
        viewport in arb_viewport(),
        deltas in arb_deltas(),
    ) {
        // Uniform items make the absolute position easy to recover.
        let sizes = vec![50; 80];
        let rule = rule_for(&sizes, viewport);
        let mut position = 0.0f32;
        for delta in deltas {
            position += rule.state().dispatch_raw_delta(delta as f32);
            let state = rule.state();
            let absolute = state.first_visible_item_index() as i32 * 50
                + state.first_visible_item_scroll_offset();
            prop_assert_eq!(absolute as f32, position);
        }
    }

    #[test]
    fn shaped_anchor_stays_valid_under_any_deltas(
        shape in arb_shape(),
        deltas in arb_deltas(),
    ) {
        let rule = shaped_rule(&shape);
        check_shaped_window(&rule, &shape)?;
        for delta in deltas {
            let consumed = rule.state().dispatch_raw_delta(delta as f32);
            prop_assert!(consumed.abs() <= (delta as f32).abs());
            prop_assert!(consumed == 0.0 || consumed.signum() == (delta as f32).signum());
            check_shaped_window(&rule, &shape)?;
        }
    }

    #[test]
    fn shaped_measuring_without_delta_is_idempotent(
        shape in arb_shape(),
        delta in -2_000i32..=2_000,
    ) {
        let rule = shaped_rule(&shape);
        rule.state().dispatch_raw_delta(delta as f32);
        let info = rule.layout_info();
        let placements = rule.placements();

        rule.measure();
        prop_assert_eq!(rule.layout_info(), info);
        prop_assert_eq!(rule.placements(), placements);
    }
}
