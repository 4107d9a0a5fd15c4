//! Rectangular cell ranges.
//!
//! A range is given by two corner labels in any order. Iteration is
//! row-major (outer loop over rows, inner loop over columns); the
//! preprocessor relies on this order when flattening a range into a
//! sequence literal.

use super::cell_ref::CellRef;
use crate::error::Result;

/// A closed rectangle of cells, normalized so `min <= max` on both axes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CellRange {
    pub min_col: usize,
    pub max_col: usize,
    pub min_row: usize,
    pub max_row: usize,
}

impl CellRange {
    pub fn new(a: &CellRef, b: &CellRef) -> CellRange {
        CellRange {
            min_col: a.col.min(b.col),
            max_col: a.col.max(b.col),
            min_row: a.row.min(b.row),
            max_row: a.row.max(b.row),
        }
    }

    pub fn width(&self) -> usize {
        self.max_col - self.min_col + 1
    }

    pub fn height(&self) -> usize {
        self.max_row - self.min_row + 1
    }

    pub fn len(&self) -> usize {
        self.width().saturating_mul(self.height())
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, cell: &CellRef) -> bool {
        (self.min_col..=self.max_col).contains(&cell.col)
            && (self.min_row..=self.max_row).contains(&cell.row)
    }

    pub fn iter(&self) -> RangeIter {
        RangeIter {
            range: self.clone(),
            next: Some(CellRef::new(self.min_col, self.min_row)),
        }
    }

    /// Labels of every cell in the range, row-major.
    pub fn labels(&self) -> impl Iterator<Item = String> + Clone {
        self.iter().map(|cell| cell.to_string())
    }
}

impl std::fmt::Display for CellRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}",
            CellRef::new(self.min_col, self.min_row),
            CellRef::new(self.max_col, self.max_row)
        )
    }
}

impl IntoIterator for &CellRange {
    type Item = CellRef;
    type IntoIter = RangeIter;

    fn into_iter(self) -> RangeIter {
        self.iter()
    }
}

/// Lazy row-major walk over a [`CellRange`]. A clone continues from the same
/// position; call [`CellRange::iter`] again for a fresh walk.
#[derive(Clone, Debug)]
pub struct RangeIter {
    range: CellRange,
    next: Option<CellRef>,
}

impl Iterator for RangeIter {
    type Item = CellRef;

    fn next(&mut self) -> Option<CellRef> {
        let current = self.next.take()?;
        self.next = if current.col < self.range.max_col {
            Some(CellRef::new(current.col + 1, current.row))
        } else if current.row < self.range.max_row {
            Some(CellRef::new(self.range.min_col, current.row + 1))
        } else {
            None
        };
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = match &self.next {
            None => 0,
            Some(next) => {
                let rows_after = self.range.max_row - next.row;
                let in_row = self.range.max_col - next.col + 1;
                rows_after
                    .saturating_mul(self.range.width())
                    .saturating_add(in_row)
            }
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RangeIter {}

/// Expand two corner labels into the range they span.
pub fn expand(start: &str, end: &str) -> Result<CellRange> {
    let start = CellRef::decode(start)?;
    let end = CellRef::decode(end)?;
    Ok(CellRange::new(&start, &end))
}

/// Parse a range like "A1:B5".
pub fn parse_range(range: &str) -> Option<CellRange> {
    let (start, end) = range.split_once(':')?;
    let start = CellRef::from_str(start.trim())?;
    let end = CellRef::from_str(end.trim())?;
    Some(CellRange::new(&start, &end))
}
