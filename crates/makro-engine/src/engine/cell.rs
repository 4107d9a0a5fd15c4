//! Cell data structures for the spreadsheet sheet.
//!
//! - [`Value`] - A derived value: scalar, text, boolean, or nested sequence
//! - [`Cell`] - Stored formula plus the result of its last evaluation
//! - [`Sheet`] - Sparse, row-major ordered storage for present cells

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::cell_ref::CellRef;

/// A value produced by evaluating a cell.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    List(Vec<Value>),
}

/// Floats compare by bit pattern as a fallback, so a cell that keeps
/// producing NaN still reaches a fixed point.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b || a.to_bits() == b.to_bits(),
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            _ => false,
        }
    }
}

impl Value {
    /// Interpret non-formula input as a literal value.
    /// - Integer text -> Int
    /// - Float text -> Float
    /// - Quoted string -> Text (without quotes)
    /// - Otherwise -> Text, verbatim
    pub fn from_literal(input: &str) -> Value {
        let trimmed = input.trim();
        if let Ok(n) = trimmed.parse::<i64>() {
            return Value::Int(n);
        }
        // "inf" and "NaN" parse as f64 but are words, not numbers.
        if trimmed.bytes().any(|b| b.is_ascii_digit())
            && let Ok(n) = trimmed.parse::<f64>()
        {
            return Value::Float(n);
        }
        if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
            return Value::Text(trimmed[1..trimmed.len() - 1].to_string());
        }
        Value::Text(input.to_string())
    }
}

/// A present cell in the sheet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Raw text as entered; a leading `=` marks an expression.
    pub formula: String,
    /// Last successful result. `None` while `error` is set, before the first
    /// evaluation, or when the expression produced no value.
    pub value: Option<Value>,
    pub error: Option<String>,
}

impl Cell {
    /// A freshly edited cell; value and error are filled in by recalculation.
    pub fn new(formula: &str) -> Cell {
        Cell {
            formula: formula.to_string(),
            value: None,
            error: None,
        }
    }

    /// The expression body if this cell holds a formula (`=` stripped).
    pub fn expression(&self) -> Option<&str> {
        self.formula.strip_prefix('=')
    }

    /// Whether this cell's derived state equals another evaluation result.
    pub fn same_result(&self, value: &Option<Value>, error: &Option<String>) -> bool {
        self.value == *value && self.error == *error
    }
}

/// Sparse sheet storage. Iteration order is row-major and is the order in
/// which recalculation visits cells.
pub type Sheet = BTreeMap<CellRef, Cell>;

/// Whether `formula` deletes the cell it is written to.
pub fn is_blank_input(formula: &str) -> bool {
    formula.trim().is_empty()
}
