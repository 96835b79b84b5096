//! Bitmap row-sets: the result type of every predicate.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Sub};

use roaring::RoaringBitmap;

/// Largest number of rows a column may hold. Row ids are stored as `u32`.
pub const MAX_ROWS: usize = u32::MAX as usize;

/// A compressed set of row indices.
///
/// Built in place while a predicate scans a column, then treated as a read-only
/// input to the set-algebra used for compound filters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    bitmap: RoaringBitmap,
}

impl RowSet {
    /// Creates an empty row-set.
    pub fn empty() -> Self {
        Self {
            bitmap: RoaringBitmap::new(),
        }
    }

    /// Creates the row-set holding every row in `0..row_count`.
    pub fn full(row_count: usize) -> Self {
        let mut bitmap = RoaringBitmap::new();
        bitmap.insert_range(0..clamp_row(row_count));
        Self { bitmap }
    }

    /// Adds a row; returns `true` if it was not already present.
    pub fn insert(&mut self, row: u32) -> bool {
        self.bitmap.insert(row)
    }

    pub fn remove(&mut self, row: u32) -> bool {
        self.bitmap.remove(row)
    }

    pub fn contains(&self, row: usize) -> bool {
        u32::try_from(row).is_ok_and(|row| self.bitmap.contains(row))
    }

    /// Number of rows in the set.
    pub fn len(&self) -> usize {
        self.bitmap.len() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.bitmap.is_empty()
    }

    /// Rows present in both sets (AND).
    pub fn and(&self, other: &RowSet) -> RowSet {
        Self {
            bitmap: &self.bitmap & &other.bitmap,
        }
    }

    /// Rows present in either set (OR).
    pub fn or(&self, other: &RowSet) -> RowSet {
        Self {
            bitmap: &self.bitmap | &other.bitmap,
        }
    }

    /// Rows in `self` but not in `other`.
    pub fn and_not(&self, other: &RowSet) -> RowSet {
        Self {
            bitmap: &self.bitmap - &other.bitmap,
        }
    }

    /// Rows in exactly one of the two sets.
    pub fn xor(&self, other: &RowSet) -> RowSet {
        Self {
            bitmap: &self.bitmap ^ &other.bitmap,
        }
    }

    /// Rows of `0..row_count` that are not in this set (NOT).
    ///
    /// Members at or beyond `row_count` are dropped.
    pub fn complement(&self, row_count: usize) -> RowSet {
        let mut bitmap = RoaringBitmap::new();
        bitmap.insert_range(0..clamp_row(row_count));
        bitmap -= &self.bitmap;
        Self { bitmap }
    }

    /// Smallest row in the set.
    pub fn min(&self) -> Option<usize> {
        self.bitmap.min().map(|row| row as usize)
    }

    /// Largest row in the set.
    pub fn max(&self) -> Option<usize> {
        self.bitmap.max().map(|row| row as usize)
    }

    /// Iterates over the rows in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.bitmap.iter().map(|row| row as usize)
    }

    /// Collects the rows in ascending order.
    pub fn to_vec(&self) -> Vec<usize> {
        self.iter().collect()
    }

    /// Borrows the underlying compressed bitmap.
    pub fn as_bitmap(&self) -> &RoaringBitmap {
        &self.bitmap
    }

    /// Serialized size of the compressed representation, in bytes.
    pub fn serialized_size(&self) -> usize {
        self.bitmap.serialized_size()
    }
}

fn clamp_row(row_count: usize) -> u32 {
    u32::try_from(row_count).unwrap_or(u32::MAX)
}

impl From<RoaringBitmap> for RowSet {
    fn from(bitmap: RoaringBitmap) -> Self {
        Self { bitmap }
    }
}

impl From<RowSet> for RoaringBitmap {
    fn from(rows: RowSet) -> Self {
        rows.bitmap
    }
}

impl FromIterator<u32> for RowSet {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        Self {
            bitmap: iter.into_iter().collect(),
        }
    }
}

impl BitAnd for &RowSet {
    type Output = RowSet;

    fn bitand(self, rhs: Self) -> RowSet {
        self.and(rhs)
    }
}

impl BitOr for &RowSet {
    type Output = RowSet;

    fn bitor(self, rhs: Self) -> RowSet {
        self.or(rhs)
    }
}

impl BitXor for &RowSet {
    type Output = RowSet;

    fn bitxor(self, rhs: Self) -> RowSet {
        self.xor(rhs)
    }
}

impl Sub for &RowSet {
    type Output = RowSet;

    fn sub(self, rhs: Self) -> RowSet {
        self.and_not(rhs)
    }
}

impl fmt::Display for RowSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, row) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{row}")?;
        }
        f.write_str("}")
    }
}
