//! JSON export and storage.
//!
//! A sheet is one object keyed by cell label, in row-major order:
//! `{"A1": {"formula": "=1+1", "value": 2, "error": null}}`.

use crate::error::Result;
use makro_engine::engine::{Cell, CellRef, Sheet, is_blank_input};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::path::Path;

struct LabelledSheet<'a>(&'a Sheet);

impl Serialize for LabelledSheet<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(cell_ref, cell)| (cell_ref.to_string(), cell)))
    }
}

/// Only the formula is read back; values are recomputed.
#[derive(Deserialize)]
struct StoredCell {
    formula: String,
}

/// Render a sheet as pretty-printed JSON.
pub fn write_json_content(sheet: &Sheet) -> Result<String> {
    Ok(serde_json::to_string_pretty(&LabelledSheet(sheet))?)
}

pub fn write_json(path: &Path, sheet: &Sheet) -> Result<()> {
    let mut content = write_json_content(sheet)?;
    content.push('\n');
    std::fs::write(path, content)?;
    Ok(())
}

/// Parse a JSON sheet. Keys must be valid cell labels.
pub fn parse_json_content(content: &str) -> Result<Sheet> {
    let stored: HashMap<String, StoredCell> = serde_json::from_str(content)?;
    let mut sheet = Sheet::new();
    for (label, cell) in stored {
        let cell_ref = CellRef::decode(&label)?;
        if !is_blank_input(&cell.formula) {
            sheet.insert(cell_ref, Cell::new(&cell.formula));
        }
    }
    Ok(sheet)
}
