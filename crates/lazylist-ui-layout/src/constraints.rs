//! Measurement constraints in whole pixels.

/// Bounds a child must respect when measuring itself.
///
/// An unbounded maximum is represented by [`Constraints::INFINITY`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Constraints {
    pub min_width: i32,
    pub max_width: i32,
    pub min_height: i32,
    pub max_height: i32,
}

impl Constraints {
    pub const INFINITY: i32 = i32::MAX;

    pub fn tight(width: i32, height: i32) -> Self {
        Self {
            min_width: width,
            max_width: width,
            min_height: height,
            max_height: height,
        }
    }

    pub fn loose(max_width: i32, max_height: i32) -> Self {
        Self {
            min_width: 0,
            max_width,
            min_height: 0,
            max_height,
        }
    }

    /// Constraints for one list item: the cross axis is pinned to the
    /// viewport, the main axis is left unbounded so the item reports its
    /// natural extent.
    pub fn for_lazy_item(vertical: bool, cross_axis_size: i32) -> Self {
        if vertical {
            Self {
                min_width: cross_axis_size,
                max_width: cross_axis_size,
                min_height: 0,
                max_height: Self::INFINITY,
            }
        } else {
            Self {
                min_width: 0,
                max_width: Self::INFINITY,
                min_height: cross_axis_size,
                max_height: cross_axis_size,
            }
        }
    }

    pub fn is_tight(&self) -> bool {
        self.min_width == self.max_width && self.min_height == self.max_height
    }

    #[inline]
    pub fn has_bounded_width(&self) -> bool {
        self.max_width != Self::INFINITY
    }

    #[inline]
    pub fn has_bounded_height(&self) -> bool {
        self.max_height != Self::INFINITY
    }

    pub fn is_bounded(&self) -> bool {
        self.has_bounded_width() && self.has_bounded_height()
    }

    pub fn constrain(&self, width: i32, height: i32) -> (i32, i32) {
        (
            width.clamp(self.min_width, self.max_width),
            height.clamp(self.min_height, self.max_height),
        )
    }

    /// Shrinks the constraints by padding on each axis. Unbounded maxima
    /// stay unbounded.
    pub fn deflate(self, horizontal: i32, vertical: i32) -> Self {
        let shrink = |value: i32, by: i32| {
            if value == Self::INFINITY {
                value
            } else {
                (value - by).max(0)
            }
        };
        Self {
            min_width: shrink(self.min_width, horizontal),
            max_width: shrink(self.max_width, horizontal),
            min_height: shrink(self.min_height, vertical),
            max_height: shrink(self.max_height, vertical),
        }
    }
}

#[cfg(test)]
#[path = "tests/constraints_tests.rs"]
mod tests;
