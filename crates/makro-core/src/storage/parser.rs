//! Parser for .grd file format

use crate::error::{MakroError, Result};
use makro_engine::engine::{Cell, CellRef, Sheet, is_blank_input};

/// Parse .grd content from a string. Cells come back with formulas only;
/// values are filled in by recalculation.
pub fn parse_grd_content(content: &str) -> Result<Sheet> {
    let mut sheet = Sheet::new();

    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Parse "CELLREF: VALUE" format
        let Some((cell_ref_str, value_str)) = line.split_once(':') else {
            return Err(MakroError::Parse {
                line: line_num + 1,
                message: "Expected 'CELLREF: VALUE' format".to_string(),
            });
        };

        let cell_ref_str = cell_ref_str.trim();
        let cell_ref = CellRef::from_str(cell_ref_str).ok_or_else(|| MakroError::Parse {
            line: line_num + 1,
            message: format!("Invalid cell reference: {}", cell_ref_str),
        })?;

        let formula = parse_formula_value(value_str.trim(), line_num + 1)?;
        if !is_blank_input(&formula) {
            sheet.insert(cell_ref, Cell::new(&formula));
        }
    }

    Ok(sheet)
}

/// Recover the stored formula text from a value field.
fn parse_formula_value(value: &str, line_num: usize) -> Result<String> {
    if value.is_empty() {
        return Ok(String::new());
    }

    // Formula: starts with '='
    if value.starts_with('=') {
        return Ok(value.to_string());
    }

    // Quoted string: starts and ends with '"'
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        return Ok(unescape_grd_text(&value[1..value.len() - 1]));
    }

    // Bare numbers are stored as typed
    if value.parse::<f64>().is_ok() {
        return Ok(value.to_string());
    }

    Err(MakroError::Parse {
        line: line_num,
        message: format!("Invalid value: {}. Use quotes for text.", value),
    })
}

fn unescape_grd_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(next) = chars.next() {
                match next {
                    '\\' => out.push('\\'),
                    '"' => out.push('"'),
                    'n' => out.push('\n'),
                    'r' => out.push('\r'),
                    't' => out.push('\t'),
                    _ => {
                        out.push('\\');
                        out.push(next);
                    }
                }
            } else {
                out.push('\\');
            }
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formula_at(sheet: &Sheet, label: &str) -> String {
        sheet[&CellRef::from_str(label).unwrap()].formula.clone()
    }

    #[test]
    fn test_parse_number() {
        let sheet = parse_grd_content("A1: 42").unwrap();
        assert_eq!(formula_at(&sheet, "A1"), "42");
        assert_eq!(sheet[&CellRef::new(0, 0)].value, None);
    }

    #[test]
    fn test_parse_text() {
        let sheet = parse_grd_content(r#"A1: "Hello""#).unwrap();
        assert_eq!(formula_at(&sheet, "A1"), "Hello");
    }

    #[test]
    fn test_parse_text_escapes() {
        let sheet = parse_grd_content(r#"A1: "He said \"hi\"\nbye""#).unwrap();
        assert_eq!(formula_at(&sheet, "A1"), "He said \"hi\"\nbye");
    }

    #[test]
    fn test_parse_formula() {
        let sheet = parse_grd_content("A1: =B1 + C1").unwrap();
        assert_eq!(formula_at(&sheet, "A1"), "=B1 + C1");
    }

    #[test]
    fn test_parse_formula_with_colon() {
        let sheet = parse_grd_content("C1: =SUM(A1:B2)").unwrap();
        assert_eq!(formula_at(&sheet, "C1"), "=SUM(A1:B2)");
    }

    #[test]
    fn test_parse_multiple_cells() {
        let content = r#"
# Test spreadsheet
A1: 100
A2: 200
A3: "Total"
B3: =A1 + A2
"#;
        let sheet = parse_grd_content(content).unwrap();
        let labels: Vec<String> = sheet.keys().map(|k| k.to_string()).collect();
        assert_eq!(labels, vec!["A1", "A2", "A3", "B3"]);
    }

    #[test]
    fn test_unquoted_text_is_rejected() {
        let err = parse_grd_content("A1: 1\nA2: hello").unwrap_err();
        match err {
            MakroError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("Expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_cell_reference() {
        assert!(matches!(
            parse_grd_content("a1: 1"),
            Err(MakroError::Parse { line: 1, .. })
        ));
    }
}
