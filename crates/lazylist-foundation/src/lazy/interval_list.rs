use crate::error::LazyListError;

/// A run of consecutive items sharing one value.
#[derive(Debug, Clone)]
pub struct Interval<T> {
    pub start_index: usize,
    pub size: usize,
    pub value: T,
}

impl<T> Interval<T> {
    pub fn end_index(&self) -> usize {
        self.start_index + self.size
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start_index && index < self.end_index()
    }
}

/// Append-only sequence of intervals addressed by global index.
///
/// Lookup is a binary search over interval starts.
#[derive(Debug, Clone)]
pub struct IntervalList<T> {
    intervals: Vec<Interval<T>>,
    size: usize,
}

impl<T> Default for IntervalList<T> {
    fn default() -> Self {
        Self {
            intervals: Vec::new(),
            size: 0,
        }
    }
}

impl<T> IntervalList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `size` items. Empty intervals are ignored.
    pub fn add_interval(&mut self, size: usize, value: T) {
        if size == 0 {
            return;
        }
        self.intervals.push(Interval {
            start_index: self.size,
            size,
            value,
        });
        self.size += size;
    }

    /// Total number of items across all intervals.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn get(&self, index: usize) -> Result<&Interval<T>, LazyListError> {
        if index >= self.size {
            return Err(LazyListError::IndexOutOfBounds {
                index,
                item_count: self.size,
            });
        }
        let position = self
            .intervals
            .partition_point(|interval| interval.end_index() <= index);
        self.intervals
            .get(position)
            .ok_or(LazyListError::IndexOutOfBounds {
                index,
                item_count: self.size,
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Interval<T>> {
        self.intervals.iter()
    }

    /// Visits the intervals overlapping `from..=to`, clamped to the list.
    pub fn for_each_in_range(&self, from: usize, to: usize, mut block: impl FnMut(&Interval<T>)) {
        if self.size == 0 || from > to {
            return;
        }
        let to = to.min(self.size - 1);
        let start = self
            .intervals
            .partition_point(|interval| interval.end_index() <= from);
        for interval in &self.intervals[start..] {
            if interval.start_index > to {
                break;
            }
            block(interval);
        }
    }
}
