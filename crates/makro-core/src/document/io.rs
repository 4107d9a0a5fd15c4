use super::Document;
use crate::error::{MakroError, Result};
use crate::storage::{SheetStore, store_for_path};
use makro_engine::engine::RecalcReport;
use std::path::{Path, PathBuf};

const MAX_FUNCTION_FILE_BYTES: u64 = 1_048_576; // 1 MiB

fn read_functions_file(path: &Path) -> Result<String> {
    let meta = std::fs::metadata(path)?;
    if meta.len() > MAX_FUNCTION_FILE_BYTES {
        return Err(MakroError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!(
                "Refusing to read {}: functions file too large ({} bytes, max {})",
                path.display(),
                meta.len(),
                MAX_FUNCTION_FILE_BYTES
            ),
        )));
    }
    Ok(std::fs::read_to_string(path)?)
}

impl Document {
    /// Create a document backed by `store`, loading custom functions first
    /// so the loaded sheet is evaluated with them.
    pub fn with_store(store: Box<dyn SheetStore>, functions_files: &[PathBuf]) -> Result<Self> {
        let mut doc = Self::new();
        for func_path in functions_files {
            doc.load_functions(func_path)?;
        }
        doc.open(store)?;
        Ok(doc)
    }

    /// Create a document for a file path, picking the store by extension.
    /// Without a path the document lives in memory only.
    pub fn with_file(path: Option<&Path>, functions_files: &[PathBuf]) -> Result<Self> {
        match path {
            Some(p) => Self::with_store(store_for_path(p), functions_files),
            None => {
                let mut doc = Self::new();
                for func_path in functions_files {
                    doc.load_functions(func_path)?;
                }
                Ok(doc)
            }
        }
    }

    /// Load the sheet from `store`, recalculate it, and keep the store for
    /// later saves. An absent sheet starts empty.
    pub fn open(&mut self, store: Box<dyn SheetStore>) -> Result<RecalcReport> {
        let sheet = store.load()?.unwrap_or_default();
        log::debug!("opened {} with {} cell(s)", store.describe(), sheet.len());

        self.sheet = sheet;
        self.store = Some(store);
        self.modified = false;
        Ok(self.recalculate())
    }

    /// Save to the current store.
    pub fn save(&mut self) -> Result<()> {
        let Some(store) = self.store.as_mut() else {
            return Err(MakroError::NoFilePath);
        };
        store.save(&self.sheet)?;
        self.modified = false;
        Ok(())
    }

    /// Save after an edit when autosave is on and a store is attached.
    pub(crate) fn persist(&mut self) -> Result<()> {
        if self.autosave && self.store.is_some() {
            self.save()?;
        }
        Ok(())
    }

    /// Load custom Rhai functions from a file (appends to existing functions)
    /// and recalculate. Returns the path loaded, or an error.
    pub fn load_functions(&mut self, path: &Path) -> Result<PathBuf> {
        let path_buf = std::fs::canonicalize(path)?;
        let content = read_functions_file(&path_buf)?;

        if self.functions_files.contains(&path_buf) {
            // Already loaded: keep current compiled state unchanged.
            return Ok(path_buf);
        }

        let new_custom_functions = match &self.custom_functions {
            Some(existing) => format!("{}\n\n{}", existing, content),
            None => content,
        };

        // The evaluator keeps its previous functions when compilation fails.
        self.evaluator
            .set_functions(Some(&new_custom_functions))
            .map_err(|e| MakroError::FunctionsCompile(e.to_string()))?;

        self.functions_files.push(path_buf.clone());
        self.custom_functions = Some(new_custom_functions);
        log::debug!("loaded functions from {}", path_buf.display());
        self.recalculate();

        Ok(path_buf)
    }

    /// Reload all custom functions from the loaded files and recalculate.
    /// Returns the number of files reloaded.
    pub fn reload_functions(&mut self) -> Result<usize> {
        if self.functions_files.is_empty() {
            return Err(MakroError::NoFunctionsLoaded);
        }

        let mut merged = String::new();
        for (idx, path) in self.functions_files.iter().enumerate() {
            let content = read_functions_file(path)?;
            if idx > 0 {
                merged.push_str("\n\n");
            }
            merged.push_str(&content);
        }

        self.evaluator
            .set_functions(Some(&merged))
            .map_err(|e| MakroError::FunctionsCompile(e.to_string()))?;
        self.custom_functions = Some(merged);
        self.recalculate();

        Ok(self.functions_files.len())
    }
}
