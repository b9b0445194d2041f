//! Testing utilities and harness for lazy lists

pub mod assertions;
pub mod fixtures;
pub mod testing;

pub use assertions::*;
pub use fixtures::*;
pub use testing::*;

pub mod prelude {
    pub use crate::assertions::*;
    pub use crate::fixtures::{FixedSizeItemProvider, SizedItem};
    pub use crate::testing::{run_test_list, LazyListTestRule, FRAME_NANOS};
}
