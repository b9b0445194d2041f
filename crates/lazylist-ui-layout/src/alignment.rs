//! Cross axis alignment of list items.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum HorizontalAlignment {
    #[default]
    Start,
    CenterHorizontally,
    End,
}

impl HorizontalAlignment {
    /// Offset of a `child` wide element inside `available` pixels.
    pub fn align(&self, available: i32, child: i32) -> i32 {
        match self {
            HorizontalAlignment::Start => 0,
            HorizontalAlignment::CenterHorizontally => half(available - child),
            HorizontalAlignment::End => available - child,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum VerticalAlignment {
    #[default]
    Top,
    CenterVertically,
    Bottom,
}

impl VerticalAlignment {
    pub fn align(&self, available: i32, child: i32) -> i32 {
        match self {
            VerticalAlignment::Top => 0,
            VerticalAlignment::CenterVertically => half(available - child),
            VerticalAlignment::Bottom => available - child,
        }
    }
}

fn half(space: i32) -> i32 {
    (space as f32 / 2.0).round() as i32
}
