//! Distribution of children along the main axis.
//!
//! Positions are whole pixels. Fractional gaps are accumulated as floats and
//! rounded per child, so rounding error never piles up towards the end.

pub trait Arrangement {
    /// Writes the start position of each child into `out_positions`.
    fn arrange(&self, total_size: i32, sizes: &[i32], out_positions: &mut [i32]);

    /// Fixed gap between adjacent children, if the strategy has one.
    fn spacing(&self) -> i32 {
        0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LinearArrangement {
    #[default]
    Start,
    End,
    Center,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
    SpacedBy(i32),
}

impl LinearArrangement {
    pub fn spaced_by(spacing: i32) -> Self {
        assert!(spacing >= 0, "spacing must not be negative");
        Self::SpacedBy(spacing)
    }

    fn place(start: f32, gap: f32, sizes: &[i32], out_positions: &mut [i32]) {
        let mut cursor = start;
        for (size, position) in sizes.iter().zip(out_positions.iter_mut()) {
            *position = cursor.round() as i32;
            cursor += *size as f32 + gap;
        }
    }
}

impl Arrangement for LinearArrangement {
    fn arrange(&self, total_size: i32, sizes: &[i32], out_positions: &mut [i32]) {
        debug_assert_eq!(sizes.len(), out_positions.len());
        if sizes.is_empty() {
            return;
        }
        let consumed: i32 = sizes.iter().sum();
        let remaining = (total_size - consumed) as f32;
        let count = sizes.len() as f32;

        match *self {
            LinearArrangement::Start => Self::place(0.0, 0.0, sizes, out_positions),
            LinearArrangement::End => Self::place(remaining, 0.0, sizes, out_positions),
            LinearArrangement::Center => Self::place(remaining / 2.0, 0.0, sizes, out_positions),
            LinearArrangement::SpaceBetween => {
                let gap = if sizes.len() > 1 {
                    remaining / (count - 1.0)
                } else {
                    0.0
                };
                Self::place(0.0, gap, sizes, out_positions);
            }
            LinearArrangement::SpaceAround => {
                let gap = remaining / count;
                Self::place(gap / 2.0, gap, sizes, out_positions);
            }
            LinearArrangement::SpaceEvenly => {
                let gap = remaining / (count + 1.0);
                Self::place(gap, gap, sizes, out_positions);
            }
            LinearArrangement::SpacedBy(spacing) => {
                Self::place(0.0, spacing as f32, sizes, out_positions);
            }
        }
    }

    fn spacing(&self) -> i32 {
        match *self {
            LinearArrangement::SpacedBy(spacing) => spacing,
            _ => 0,
        }
    }
}

#[cfg(test)]
#[path = "tests/arrangement_tests.rs"]
mod tests;
