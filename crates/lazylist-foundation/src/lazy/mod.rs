//! Lazy layout system.
//!
//! Only the items that intersect the viewport (plus content padding) are
//! materialized, which keeps layout cost independent of the data set size.
//!
//! # Architecture
//!
//! - [`LazyListIntervalContent`] - item DSL output, addressed by global index
//! - [`LazyLayoutItemProvider`] - what the layout needs from content
//! - [`measure_lazy_list`] - the virtualized measure pass
//! - [`LazyListItemPlacementAnimator`] - animated item moves
//! - [`LazyListState`] - scroll position, raw delta dispatch, programmatic scrolls
//! - [`LazyListLayout`] - owns the per-list caches and runs measure passes
//!
//! # Example
//!
//! ```rust,ignore
//! use lazylist_foundation::prelude::*;
//!
//! let state = LazyListState::new(runtime.handle());
//! let content = LazyListIntervalContent::build(|scope| {
//!     scope.items_slice(&rows, |item, row| item.emit(row.measurable()));
//! });
//! let layout = LazyListLayout::new(state.clone(), LazyListMeasureConfig::default(), Rc::new(content));
//! layout.measure(Constraints::tight(320, 480));
//! state.dispatch_raw_delta(-120.0);
//! ```

mod interval_list;
mod item_placement_animator;
mod item_provider;
mod key_index_map;
mod lazy_animate_scroll;
mod lazy_layout_key;
mod lazy_list_header;
mod lazy_list_layout;
mod lazy_list_measure;
mod lazy_list_measured_item;
mod lazy_list_scope;
mod lazy_list_scroll_position;
mod lazy_list_state;
mod lazy_measured_item_provider;
mod nearest_range;

pub use interval_list::*;
pub use item_placement_animator::*;
pub use item_provider::*;
pub use key_index_map::*;
pub use lazy_animate_scroll::*;
pub use lazy_layout_key::*;
pub use lazy_list_header::*;
pub use lazy_list_layout::*;
pub use lazy_list_measure::*;
pub use lazy_list_measured_item::*;
pub use lazy_list_scope::*;
pub use lazy_list_scroll_position::*;
pub use lazy_list_state::*;
pub use lazy_measured_item_provider::*;
pub use nearest_range::*;
