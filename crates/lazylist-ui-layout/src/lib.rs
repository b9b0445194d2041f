//! Layout contracts in integer pixels: constraints, axes, alignment,
//! arrangement, and the measurable/placeable pair.

mod alignment;
mod arrangement;
mod axis;
mod constraints;
mod core;

pub use alignment::*;
pub use arrangement::*;
pub use axis::*;
pub use constraints::*;
pub use core::*;

pub mod prelude {
    pub use crate::alignment::{HorizontalAlignment, VerticalAlignment};
    pub use crate::arrangement::{Arrangement, LinearArrangement};
    pub use crate::axis::Axis;
    pub use crate::constraints::Constraints;
    pub use crate::core::{IntOffset, Measurable, Placeable};
}
