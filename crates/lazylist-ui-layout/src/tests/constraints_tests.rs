use super::Constraints;
use crate::axis::Axis;

#[test]
fn lazy_item_constraints_fix_cross_axis_only() {
    let vertical = Constraints::for_lazy_item(true, 320);
    assert_eq!(vertical.min_width, 320);
    assert_eq!(vertical.max_width, 320);
    assert!(!vertical.has_bounded_height());

    let horizontal = Constraints::for_lazy_item(false, 48);
    assert_eq!(horizontal.max_height, 48);
    assert!(!horizontal.has_bounded_width());
    assert_eq!(horizontal.constrain(5000, 10), (5000, 48));
}

#[test]
fn deflate_keeps_unbounded_axes() {
    let deflated = Constraints::for_lazy_item(true, 100).deflate(20, 20);
    assert_eq!(deflated.max_width, 80);
    assert_eq!(deflated.max_height, Constraints::INFINITY);
    assert_eq!(Constraints::tight(10, 10).deflate(30, 0).max_width, 0);
}

#[test]
fn axis_picks_components() {
    assert_eq!(Axis::Vertical.main(3, 7), 7);
    assert_eq!(Axis::Vertical.cross(3, 7), 3);
    assert_eq!(Axis::Horizontal.compose(5, 9), (5, 9));
    assert_eq!(Axis::Vertical.compose(5, 9), (9, 5));
}
