//! Durable storage and export.
//!
//! A [`SheetStore`] loads and saves a sheet's formulas. Values are never
//! persisted; the document recalculates after every load.

pub mod json;
pub mod md;
pub mod parser;
pub mod writer;

use crate::error::{MakroError, Result};
use makro_engine::engine::Sheet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub use json::{parse_json_content, write_json, write_json_content};
pub use md::{write_markdown, write_markdown_content};
pub use parser::parse_grd_content;
pub use writer::{write_grd, write_grd_content};

/// Somewhere a sheet can be loaded from and saved to.
pub trait SheetStore: Send {
    /// Load the stored sheet. `Ok(None)` means nothing usable is stored.
    fn load(&self) -> Result<Option<Sheet>>;

    fn save(&mut self, sheet: &Sheet) -> Result<()>;

    /// Where the sheet lives, for messages.
    fn describe(&self) -> String;
}

/// A sheet stored as a `.grd` text file.
#[derive(Clone, Debug)]
pub struct GrdStore {
    path: PathBuf,
}

impl GrdStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        GrdStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SheetStore for GrdStore {
    fn load(&self) -> Result<Option<Sheet>> {
        load_file(&self.path, parse_grd_content)
    }

    fn save(&mut self, sheet: &Sheet) -> Result<()> {
        write_grd(&self.path, sheet)?;
        log::info!("saved {} cell(s) to {}", sheet.len(), self.path.display());
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// A sheet stored as a JSON object keyed by cell label.
#[derive(Clone, Debug)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SheetStore for JsonStore {
    fn load(&self) -> Result<Option<Sheet>> {
        load_file(&self.path, parse_json_content)
    }

    fn save(&mut self, sheet: &Sheet) -> Result<()> {
        write_json(&self.path, sheet)?;
        log::info!("saved {} cell(s) to {}", sheet.len(), self.path.display());
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Pick a file store by extension: `.json` is JSON, anything else `.grd`.
pub fn store_for_path(path: &Path) -> Box<dyn SheetStore> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        Box::new(JsonStore::new(path))
    } else {
        Box::new(GrdStore::new(path))
    }
}

/// Path a corrupt file is moved aside to.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".bak");
    PathBuf::from(name)
}

/// Read and parse `path`. A missing file is absent; a file that does not
/// parse is moved to its backup path and treated as absent.
fn load_file(path: &Path, parse: fn(&str) -> Result<Sheet>) -> Result<Option<Sheet>> {
    if !path.exists() {
        return Ok(None);
    }
    let parsed = std::fs::read_to_string(path)
        .map_err(MakroError::from)
        .and_then(|content| parse(&content));
    match parsed {
        Ok(sheet) => {
            log::debug!("loaded {} cell(s) from {}", sheet.len(), path.display());
            Ok(Some(sheet))
        }
        Err(err) if is_corrupt(&err) => {
            let backup = backup_path(path);
            std::fs::copy(path, &backup)?;
            std::fs::remove_file(path)?;
            log::warn!(
                "{} is corrupt ({}); moved it to {} and starting empty",
                path.display(),
                err,
                backup.display()
            );
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

fn is_corrupt(err: &MakroError) -> bool {
    match err {
        MakroError::Parse { .. } | MakroError::Json(_) | MakroError::Engine(_) => true,
        // Not UTF-8
        MakroError::Io(e) => e.kind() == std::io::ErrorKind::InvalidData,
        _ => false,
    }
}

#[derive(Debug, Default)]
struct MemoryInner {
    sheet: Option<Sheet>,
    saves: usize,
}

/// An in-memory store. Clones share the same storage, so a caller can keep a
/// handle after giving one to a document.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `sheet`.
    pub fn with_sheet(sheet: Sheet) -> Self {
        let store = Self::default();
        store.lock().sheet = Some(sheet);
        store
    }

    /// The last saved sheet.
    pub fn sheet(&self) -> Option<Sheet> {
        self.lock().sheet.clone()
    }

    /// Number of completed saves.
    pub fn saves(&self) -> usize {
        self.lock().saves
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SheetStore for MemoryStore {
    fn load(&self) -> Result<Option<Sheet>> {
        Ok(self.lock().sheet.clone())
    }

    fn save(&mut self, sheet: &Sheet) -> Result<()> {
        let mut inner = self.lock();
        inner.sheet = Some(sheet.clone());
        inner.saves += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
