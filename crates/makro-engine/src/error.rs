//! Error types for the recalculation engine.

use thiserror::Error;

/// Per-cell failures produced while preprocessing or evaluating a formula.
///
/// None of these abort a recalculation: the failing cell stores the message
/// and cells that reference it pick it up as [`EngineError::PropagatedError`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid cell reference: {0}")]
    InvalidAddress(String),

    #[error("Cell {0} is undefined")]
    UndefinedCell(String),

    #[error("Cell {label} has error: {message}")]
    PropagatedError { label: String, message: String },

    #[error("{0}")]
    EvaluationError(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
