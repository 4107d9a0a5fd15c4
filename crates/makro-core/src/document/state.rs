use crate::storage::SheetStore;
use makro_engine::engine::{Evaluator, RecalcOptions, RecalcReport, Sheet};
use std::path::PathBuf;

/// UI-agnostic document state for the spreadsheet.
pub struct Document {
    /// The spreadsheet sheet, replaced wholesale by each recalculation
    pub sheet: Sheet,
    /// Rhai evaluator for formulas
    pub evaluator: Evaluator,
    pub options: RecalcOptions,
    /// Where the sheet is persisted, if anywhere
    pub store: Option<Box<dyn SheetStore>>,
    /// Persist after every edit. When off, the caller saves explicitly.
    pub autosave: bool,
    /// Whether the sheet has changed since it was last saved
    pub modified: bool,
    /// Paths to custom Rhai functions files
    pub functions_files: Vec<PathBuf>,
    /// Cached custom functions script content (concatenated from all files)
    pub custom_functions: Option<String>,
    /// Report from the most recent recalculation
    pub last_report: Option<RecalcReport>,
}

impl Document {
    /// Create an empty document with no store.
    ///
    /// This constructor is side-effect free: it does not touch the filesystem.
    pub fn new() -> Self {
        Document {
            sheet: Sheet::new(),
            evaluator: Evaluator::new(),
            options: RecalcOptions::default(),
            store: None,
            autosave: true,
            modified: false,
            functions_files: Vec::new(),
            custom_functions: None,
            last_report: None,
        }
    }

    pub fn with_options(options: RecalcOptions) -> Self {
        Document {
            options,
            ..Self::new()
        }
    }

    /// Bound the operations any single formula may run.
    pub fn set_max_operations(&mut self, operations: u64) {
        self.evaluator.set_max_operations(operations);
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
