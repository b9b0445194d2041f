use std::fmt;

/// Errors surfaced by programmatic list operations.
///
/// Caller contract violations inside a layout pass are assertions instead;
/// data-set shrinkage is absorbed by clamping and never reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LazyListError {
    IndexOutOfBounds { index: usize, item_count: usize },
    NotAttached,
}

impl fmt::Display for LazyListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LazyListError::IndexOutOfBounds { index, item_count } => {
                write!(f, "index {index} out of bounds for {item_count} items")
            }
            LazyListError::NotAttached => {
                write!(f, "list state has no measured layout attached")
            }
        }
    }
}

impl std::error::Error for LazyListError {}
