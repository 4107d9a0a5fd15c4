//! Writer for .grd file format

use crate::error::Result;
use makro_engine::engine::Sheet;
use std::fs;
use std::path::Path;

/// Write a Sheet to a .grd file
pub fn write_grd(path: &Path, sheet: &Sheet) -> Result<()> {
    let content = write_grd_content(sheet);
    fs::write(path, content)?;
    Ok(())
}

/// Write a Sheet to a .grd format string. Only formulas are written; values
/// are recomputed on load.
pub fn write_grd_content(sheet: &Sheet) -> String {
    let mut lines = vec!["# Makro Spreadsheet".to_string()];

    // Sheet order is already row-major
    for (cell_ref, cell) in sheet {
        lines.push(format!("{}: {}", cell_ref, encode_formula(&cell.formula)));
    }

    lines.join("\n") + "\n"
}

fn encode_formula(formula: &str) -> String {
    let single_line = !formula.contains(['\n', '\r']) && formula.trim() == formula;
    if single_line && (formula.starts_with('=') || is_bare_number(formula)) {
        formula.to_string()
    } else {
        format!("\"{}\"", escape_grd_text(formula))
    }
}

fn is_bare_number(s: &str) -> bool {
    s.parse::<f64>().is_ok() && s.chars().any(|c| c.is_ascii_digit())
}

fn escape_grd_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::parser::parse_grd_content;
    use makro_engine::engine::{Cell, CellRef};

    fn sheet_of(cells: &[(&str, &str)]) -> Sheet {
        cells
            .iter()
            .map(|(label, formula)| (CellRef::from_str(label).unwrap(), Cell::new(formula)))
            .collect()
    }

    #[test]
    fn test_write_number() {
        let content = write_grd_content(&sheet_of(&[("A1", "42")]));
        assert!(content.contains("A1: 42\n"));
    }

    #[test]
    fn test_write_text() {
        let content = write_grd_content(&sheet_of(&[("A1", "Hello")]));
        assert!(content.contains("A1: \"Hello\""));
    }

    #[test]
    fn test_write_formula() {
        let content = write_grd_content(&sheet_of(&[("A1", "=B1 + C1")]));
        assert!(content.contains("A1: =B1 + C1\n"));
    }

    #[test]
    fn test_write_quotes_words_that_parse_as_floats() {
        let content = write_grd_content(&sheet_of(&[("A1", "inf"), ("A2", "NaN")]));
        assert!(content.contains("A1: \"inf\""));
        assert!(content.contains("A2: \"NaN\""));
    }

    #[test]
    fn test_write_multiline_formula_is_quoted() {
        let content = write_grd_content(&sheet_of(&[("A1", "=1 +\n2")]));
        assert!(content.contains("A1: \"=1 +\\n2\""));
    }

    #[test]
    fn test_write_row_major_order() {
        let content = write_grd_content(&sheet_of(&[("B2", "4"), ("A2", "3"), ("B1", "2")]));
        let body: Vec<&str> = content.lines().skip(1).collect();
        assert_eq!(body, vec!["B1: 2", "A2: 3", "B2: 4"]);
    }

    #[test]
    fn test_formulas_survive_write_and_parse() {
        let sheet = sheet_of(&[
            ("A1", "10"),
            ("A2", "-2.5e3"),
            ("A3", "\"quoted\""),
            ("B1", "=SUM(A1:A2)"),
            ("B2", "back\\slash\ttab"),
            ("C1", "  padded  "),
            ("C2", "=\"a\" + \"b\""),
        ]);
        let reloaded = parse_grd_content(&write_grd_content(&sheet)).unwrap();
        assert_eq!(reloaded, sheet);
    }
}
