use crate::constraints::Constraints;

/// Size of a measured element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Placeable {
    pub width: i32,
    pub height: i32,
}

impl Placeable {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Something that can report its size under given constraints.
pub trait Measurable {
    fn measure(&self, constraints: Constraints) -> Placeable;
}

impl<F> Measurable for F
where
    F: Fn(Constraints) -> Placeable,
{
    fn measure(&self, constraints: Constraints) -> Placeable {
        self(constraints)
    }
}

/// Pixel position of a placed element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct IntOffset {
    pub x: i32,
    pub y: i32,
}

impl IntOffset {
    pub const ZERO: IntOffset = IntOffset { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}
