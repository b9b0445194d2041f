//! Virtualized list layout: which items to materialize for a scroll
//! position, where to put them, how to animate them when they move, and how
//! to drive programmatic scrolling over very long data sets.

pub mod error;
pub mod lazy;
pub mod scrollable;

pub use error::LazyListError;
pub use scrollable::{MutatorMutex, ScrollScope, ScrollableState};

pub mod prelude {
    pub use crate::error::LazyListError;
    pub use crate::lazy::{
        LazyItemScope, LazyListIntervalContent, LazyListLayout, LazyListLayoutInfo,
        LazyListMeasureConfig, LazyListScope, LazyListScopeExt, LazyListState,
    };
    pub use crate::scrollable::{ScrollScope, ScrollableState};
}
