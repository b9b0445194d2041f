use super::*;
use crate::animation::{AnimationSpec, Easing, SpringSpec};

const MILLI: u64 = 1_000_000;

#[test]
fn linear_tween_samples_proportionally() {
    let run = TargetBasedAnimation::new(
        AnimationSpec::linear(100).into(),
        0.0,
        0.0,
        200.0,
    );
    assert_eq!(run.value_at(0), 0.0);
    assert!((run.value_at(50 * MILLI) - 100.0).abs() < 1e-3);
    assert!((run.velocity_at(50 * MILLI) - 2000.0).abs() < 1.0);
    assert!(!run.is_finished(99 * MILLI));
    assert!(run.is_finished(100 * MILLI));
    assert_eq!(run.value_at(150 * MILLI), 200.0);
    assert_eq!(run.velocity_at(150 * MILLI), 0.0);
}

#[test]
fn tween_delay_holds_initial_value() {
    let run = TargetBasedAnimation::new(
        AnimationSpec::tween(100, Easing::Linear).with_delay(50).into(),
        10.0,
        0.0,
        20.0,
    );
    assert_eq!(run.value_at(40 * MILLI), 10.0);
    assert!(!run.is_finished(120 * MILLI));
    assert!(run.is_finished(150 * MILLI));
}

#[test]
fn spring_snaps_to_target_once_at_rest() {
    let run = TargetBasedAnimation::new(SpringSpec::default().into(), 0.0, 0.0, 40.0);
    assert!(!run.is_finished(16 * MILLI));
    assert!(run.is_finished(3_000 * MILLI));
    assert_eq!(run.value_at(3_000 * MILLI), 40.0);
    assert_eq!(run.velocity_at(3_000 * MILLI), 0.0);
}
