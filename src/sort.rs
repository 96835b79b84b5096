//! Per-type total orders used by column sorting.
//!
//! Every type sorts by its natural order: numeric magnitude, byte-wise
//! lexicographic for strings, chronological for temporal types and
//! `false < true` for booleans.
//!
//! Floats use [`f64::total_cmp`], so `-0.0` sorts before `+0.0` and NaN sorts
//! after `+inf` (a NaN with the sign bit set sorts before `-inf`). Descending is
//! the exact reverse of that comparator, which keeps ascending and descending
//! consistent complements for every value including NaN.

use std::cmp::Ordering;

/// Direction of a sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Orients an ascending comparison result for this direction.
    pub fn apply(self, ord: Ordering) -> Ordering {
        match self {
            Self::Asc => ord,
            Self::Desc => ord.reverse(),
        }
    }
}

/// Sorts `values` in place, stable, under the natural order of `T`.
pub(crate) fn sort_slice<T: Ord>(values: &mut [T], direction: SortDirection) {
    values.sort_by(|a, b| direction.apply(a.cmp(b)));
}

/// Float counterpart of [`sort_slice`].
pub(crate) fn sort_floats(values: &mut [f64], direction: SortDirection) {
    values.sort_by(|a, b| direction.apply(a.total_cmp(b)));
}

/// Stable permutation of row indices that orders `values`.
///
/// `order[k]` is the source row that lands at position `k`; equal values keep
/// their original relative order in both directions.
pub(crate) fn order_by<T, F>(values: &[T], direction: SortDirection, cmp: F) -> Vec<usize>
where
    F: Fn(&T, &T) -> Ordering,
{
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| direction.apply(cmp(&values[a], &values[b])));
    order
}
