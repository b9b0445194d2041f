use super::*;

#[test]
fn easing_curves_pin_endpoints() {
    let curves = [
        Easing::Linear,
        Easing::EaseIn,
        Easing::EaseOut,
        Easing::EaseInOut,
        Easing::FastOutSlowIn,
        Easing::LinearOutSlowIn,
        Easing::FastOutLinearIn,
        Easing::CubicBezier(0.2, 0.8, 0.3, 1.0),
    ];
    for easing in curves {
        assert_eq!(easing.transform(0.0), 0.0, "{easing:?}");
        assert_eq!(easing.transform(1.0), 1.0, "{easing:?}");
    }
}

#[test]
fn standard_curve_is_monotonic() {
    let mut previous = 0.0;
    for step in 1..=100 {
        let value = Easing::FastOutSlowIn.transform(step as f32 / 100.0);
        assert!(value >= previous - 1e-4, "step {step}: {value} < {previous}");
        previous = value;
    }
}

#[test]
fn fast_out_slow_in_leads_linear_progress() {
    assert!(Easing::FastOutSlowIn.transform(0.5) > 0.5);
    assert!(Easing::EaseIn.transform(0.25) < 0.25);
}

#[test]
fn integer_lerp_rounds() {
    assert_eq!(0i32.lerp(&10, 0.26), 3);
    assert_eq!(10i32.lerp(&0, 0.5), 5);
}

#[test]
fn default_specs() {
    let tween = AnimationSpec::default();
    assert_eq!(tween.duration_millis, 300);
    assert_eq!(tween.easing, Easing::FastOutSlowIn);
    assert_eq!(tween.with_delay(20).total_duration_nanos(), 320_000_000);

    let spring = SpringSpec::default();
    assert_eq!(spring.damping_ratio, DAMPING_RATIO_NO_BOUNCY);
    assert_eq!(spring.stiffness, STIFFNESS_MEDIUM);
    assert!(AnimationType::default().is_spring());
    assert!(!AnimationType::from(tween).is_spring());
}

#[test]
#[should_panic(expected = "stiffness must be positive")]
fn zero_stiffness_is_rejected() {
    SpringSpec::new(1.0, 0.0);
}
