//! Markdown export functionality

use crate::error::Result;
use makro_engine::engine::{CellRef, Sheet, format_cell};
use std::fmt::Write;
use std::path::Path;

/// Write the sheet to a markdown file
pub fn write_markdown(path: &Path, sheet: &Sheet) -> Result<()> {
    std::fs::write(path, write_markdown_content(sheet))?;
    Ok(())
}

/// Render the sheet as a markdown table spanning its populated cells.
pub fn write_markdown_content(sheet: &Sheet) -> String {
    let mut out = String::from("# Sheet\n\n");

    let Some((min_row, min_col, max_row, max_col)) = find_sheet_bounds(sheet) else {
        out.push_str("*Empty spreadsheet*\n");
        return out;
    };

    // Header with column letters
    out.push_str("|   |");
    for col in min_col..=max_col {
        let _ = write!(out, " {} |", CellRef::col_to_letters(col));
    }
    out.push('\n');

    out.push_str("|---|");
    for _ in min_col..=max_col {
        out.push_str("---|");
    }
    out.push('\n');

    for row in min_row..=max_row {
        let _ = write!(out, "| {} |", row + 1); // 1-based row numbers
        for col in min_col..=max_col {
            let display = sheet
                .get(&CellRef::new(col, row))
                .map(format_cell)
                .unwrap_or_default();
            let _ = write!(out, " {} |", escape_markdown(&display));
        }
        out.push('\n');
    }

    out
}

/// Bounds of the populated cells as (min_row, min_col, max_row, max_col).
fn find_sheet_bounds(sheet: &Sheet) -> Option<(usize, usize, usize, usize)> {
    let first = sheet.keys().next()?;
    let mut bounds = (first.row, first.col, first.row, first.col);
    for cell_ref in sheet.keys() {
        bounds.0 = bounds.0.min(cell_ref.row);
        bounds.1 = bounds.1.min(cell_ref.col);
        bounds.2 = bounds.2.max(cell_ref.row);
        bounds.3 = bounds.3.max(cell_ref.col);
    }
    Some(bounds)
}

/// Escape special markdown characters in cell content
fn escape_markdown(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ").replace('\r', "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use makro_engine::engine::{Cell, Value};

    #[test]
    fn test_empty_sheet() {
        assert_eq!(
            write_markdown_content(&Sheet::new()),
            "# Sheet\n\n*Empty spreadsheet*\n"
        );
    }

    #[test]
    fn test_table_spans_populated_bounds() {
        let mut sheet = Sheet::new();
        let mut b2 = Cell::new("=1+1");
        b2.value = Some(Value::Int(2));
        sheet.insert(CellRef::new(1, 1), b2);
        let mut c3 = Cell::new("a|b");
        c3.value = Some(Value::Text("a|b".to_string()));
        sheet.insert(CellRef::new(2, 2), c3);
        let mut c2 = Cell::new("=1/0");
        c2.error = Some("Division by zero".to_string());
        sheet.insert(CellRef::new(2, 1), c2);

        let expected = "# Sheet\n\n\
                        |   | B | C |\n\
                        |---|---|---|\n\
                        | 2 | 2 | #ERR! |\n\
                        | 3 |  | a\\|b |\n";
        assert_eq!(write_markdown_content(&sheet), expected);
    }
}
