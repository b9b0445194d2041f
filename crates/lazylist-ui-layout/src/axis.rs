/// Scroll direction of a list, or the direction children are laid out in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Axis {
    Horizontal,
    #[default]
    Vertical,
}

impl Axis {
    #[inline]
    pub fn cross_axis(self) -> Self {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }

    #[inline]
    pub fn is_horizontal(self) -> bool {
        matches!(self, Axis::Horizontal)
    }

    #[inline]
    pub fn is_vertical(self) -> bool {
        matches!(self, Axis::Vertical)
    }

    /// Picks the extent along this axis out of a `(width, height)` pair.
    #[inline]
    pub fn main(self, width: i32, height: i32) -> i32 {
        match self {
            Axis::Horizontal => width,
            Axis::Vertical => height,
        }
    }

    #[inline]
    pub fn cross(self, width: i32, height: i32) -> i32 {
        self.cross_axis().main(width, height)
    }

    /// Builds an `(x, y)` pair from main and cross axis components.
    #[inline]
    pub fn compose(self, main: i32, cross: i32) -> (i32, i32) {
        match self {
            Axis::Horizontal => (main, cross),
            Axis::Vertical => (cross, main),
        }
    }
}
