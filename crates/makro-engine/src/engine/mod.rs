//! Recalculation engine API.
//!
//! - [`CellRef`], [`Direction`] - Cell addressing (A1 notation ↔ column/row indices)
//! - [`CellRange`], [`expand`] - Rectangular ranges, iterated row-major
//! - [`Cell`], [`Value`], [`Sheet`] - Data structures for cell storage
//! - [`Formula`], [`preprocess`] - Turn a formula into a literal Rhai script
//! - [`Evaluator`] - Rhai engine with built-in and custom functions
//! - [`recalculate`], [`apply_edit`] - Fixed-point whole-sheet recalculation
//! - [`format_value`], [`format_cell`] - Format values for display

mod cell;
mod cell_ref;
mod eval;
mod format;
mod preprocess;
mod range;
mod recalc;

pub use cell::{Cell, Sheet, Value, is_blank_input};
pub use cell_ref::{CellRef, Direction};
pub use eval::{Evaluator, NO_VALUE, from_dynamic, to_literal};
pub use format::{ERROR_MARKER, format_cell, format_number, format_value};
pub use preprocess::{Formula, Segment, preprocess};
pub use range::{CellRange, RangeIter, expand, parse_range};
pub use recalc::{
    DEFAULT_MAX_PASSES, RecalcOptions, RecalcReport, Recalculated, apply_edit, evaluate_cell,
    recalculate, recalculate_in_place, set_formula,
};

pub use rhai::{AST, Dynamic};
