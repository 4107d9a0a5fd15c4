//! Error types for Makro core.

use thiserror::Error;

use makro_engine::EngineError;

/// Errors that can occur while loading, editing or saving a document.
#[derive(Error, Debug)]
pub enum MakroError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("No file path set")]
    NoFilePath,

    #[error("No functions file loaded")]
    NoFunctionsLoaded,

    #[error("Rhai compile error: {0}")]
    FunctionsCompile(String),
}

pub type Result<T> = std::result::Result<T, MakroError>;
