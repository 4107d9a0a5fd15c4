//! Cell reference parsing and formatting.
//!
//! Provides bidirectional conversion between spreadsheet-style cell labels
//! (e.g., "A1", "B2", "AA100") and zero-indexed column/row coordinates.
//! Columns use bijective base-26, so every `(col, row)` pair has exactly one
//! label and every well-formed label decodes to exactly one pair.
//!
//! # Examples
//!
//! ```
//! use makro_engine::engine::CellRef;
//!
//! let cell: CellRef = "B3".parse().unwrap();
//! assert_eq!(cell.col, 1);  // 0-indexed
//! assert_eq!(cell.row, 2);
//! assert_eq!(cell.to_string(), "B3");
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

use crate::error::EngineError;

fn label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?<letters>[A-Z]+)(?<numbers>[0-9]+)$").expect("label regex must compile")
    })
}

/// Relative-direction tokens usable inside formulas.
///
/// Only `UP` and `LEFT` are recognized; `DOWN` and `RIGHT` are reserved words.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    Up,
    Left,
}

impl Direction {
    pub fn from_token(token: &str) -> Option<Direction> {
        match token {
            "UP" => Some(Direction::Up),
            "LEFT" => Some(Direction::Left),
            _ => None,
        }
    }
}

/// A reference to a cell by column and row indices (0-indexed).
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct CellRef {
    pub col: usize,
    pub row: usize,
}

impl CellRef {
    pub fn new(col: usize, row: usize) -> CellRef {
        CellRef { col, row }
    }

    /// Parse a cell label (e.g., "A1", "B2", "AA10").
    /// Returns None if the input is not uppercase letters followed by digits,
    /// the row is zero, or either coordinate overflows.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(label: &str) -> Option<CellRef> {
        Self::parse_a1(label)
    }

    /// Like [`CellRef::from_str`], reporting failures as `InvalidAddress`.
    pub fn decode(label: &str) -> Result<CellRef, EngineError> {
        Self::parse_a1(label).ok_or_else(|| EngineError::InvalidAddress(label.to_string()))
    }

    fn parse_a1(label: &str) -> Option<CellRef> {
        let caps = label_re().captures(label)?;
        let letters = &caps["letters"];
        let numbers = &caps["numbers"];

        let mut col_acc = 0usize;
        for c in letters.bytes() {
            let digit = (c - b'A') as usize + 1;
            col_acc = col_acc.checked_mul(26)?.checked_add(digit)?;
        }
        let col = col_acc.checked_sub(1)?;

        let row = numbers.parse::<usize>().ok()?.checked_sub(1)?;

        Some(CellRef::new(col, row))
    }

    /// Convert column index to spreadsheet-style letters (0 -> A, 25 -> Z, 26 -> AA).
    pub fn col_to_letters(col: usize) -> String {
        let mut result = String::new();
        let mut n = col as u128 + 1;
        while n > 0 {
            n -= 1;
            result.insert(0, (b'A' + (n % 26) as u8) as char);
            n /= 26;
        }
        result
    }

    /// The neighbouring cell in `direction`, clamped at column/row zero.
    pub fn step(&self, direction: Direction) -> CellRef {
        match direction {
            Direction::Up => CellRef::new(self.col, self.row.saturating_sub(1)),
            Direction::Left => CellRef::new(self.col.saturating_sub(1), self.row),
        }
    }
}

/// Row-major: A1 < B1 < A2.
impl Ord for CellRef {
    fn cmp(&self, other: &Self) -> Ordering {
        self.row.cmp(&other.row).then(self.col.cmp(&other.col))
    }
}

impl PartialOrd for CellRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::str::FromStr for CellRef {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Widened so `usize::MAX` still has a label.
        write!(
            f,
            "{}{}",
            CellRef::col_to_letters(self.col),
            self.row as u128 + 1
        )
    }
}
