//! Display text for cell values.

use super::cell::{Cell, Value};

/// Shown in place of a value for cells holding an error.
pub const ERROR_MARKER: &str = "#ERR!";

/// Format a value for display.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Int(n) => n.to_string(),
        Value::Float(n) => format_number(*n),
        Value::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Value::Text(s) => s.clone(),
        Value::List(items) => items
            .iter()
            .map(|item| match item {
                Value::List(_) => format!("[{}]", format_value(item)),
                _ => format_value(item),
            })
            .collect::<Vec<_>>()
            .join(" "),
    }
}

/// Format a cell for display: its value, empty when it has none, or the
/// error marker.
pub fn format_cell(cell: &Cell) -> String {
    if cell.error.is_some() {
        return ERROR_MARKER.to_string();
    }
    cell.value.as_ref().map(format_value).unwrap_or_default()
}

/// Format a number for display.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "#NAN!".to_string()
    } else if n.is_infinite() {
        "#INF!".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e10 {
        format!("{:.0}", n)
    } else {
        format!("{:.2}", n)
    }
}
