//! Formula preprocessing.
//!
//! Before a formula can be handed to Rhai, every reference in it has to be
//! replaced by the literal value it points at. The formula is first split
//! into typed [`Segment`]s, then resolved against the current sheet:
//!
//! 1. **Ranges**: `A1:B2` → a sequence literal of the member values, row-major
//! 2. **Directions**: `UP` / `LEFT` → the neighbouring cell's label
//! 3. **Cells**: `A1` → the cell's current value, or `()` if it is blank
//!
//! Substituted text is never scanned again, so a text value that looks like a
//! label (say `"B2"`) stays a string. Text inside string literals is left alone.

use regex::Regex;
use std::sync::OnceLock;

use super::cell::Sheet;
use super::cell_ref::{CellRef, Direction};
use super::eval::{NO_VALUE, to_literal};
use super::range::CellRange;
use crate::error::{EngineError, Result};

fn reference_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"\b(?:(?<start>[A-Z]+[0-9]+):(?<end>[A-Z]+[0-9]+)\b|(?<dir>UP|LEFT)\b|(?<cell>[A-Z]+[0-9]+)\b)",
        )
        .expect("reference regex must compile")
    })
}

/// One piece of a parsed formula.
#[derive(Clone, Debug, PartialEq)]
pub enum Segment {
    /// Interpreter source passed through unchanged.
    Source(String),
    Cell(CellRef),
    Range(CellRange),
    Direction(Direction),
}

/// A formula body split into source text and references.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Formula {
    segments: Vec<Segment>,
}

impl Formula {
    /// Parse a formula body (without the leading `=`).
    /// Fails with `InvalidAddress` on labels such as `A0` whose row or
    /// column cannot be decoded.
    pub fn parse(expr: &str) -> Result<Formula> {
        let mut formula = Formula::default();
        for (chunk, quoted) in split_string_literals(expr) {
            if quoted {
                formula.push_source(chunk);
            } else {
                formula.scan(chunk)?;
            }
        }
        Ok(formula)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Substitute every reference with a literal, producing Rhai source.
    pub fn resolve(&self, sheet: &Sheet, origin: &CellRef) -> Result<String> {
        let mut pieces: Vec<Option<String>> = vec![None; self.segments.len()];

        for (piece, segment) in pieces.iter_mut().zip(&self.segments) {
            if let Segment::Range(range) = segment {
                *piece = Some(range_literal(range, sheet)?);
            }
        }

        for (piece, segment) in pieces.iter_mut().zip(&self.segments) {
            match segment {
                Segment::Source(text) => *piece = Some(text.clone()),
                Segment::Direction(dir) => *piece = Some(cell_literal(&origin.step(*dir), sheet)?),
                Segment::Cell(cell) => *piece = Some(cell_literal(cell, sheet)?),
                Segment::Range(_) => {}
            }
        }

        Ok(pieces.into_iter().flatten().collect())
    }

    fn push_source(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Segment::Source(prev)) = self.segments.last_mut() {
            prev.push_str(text);
        } else {
            self.segments.push(Segment::Source(text.to_string()));
        }
    }

    fn scan(&mut self, text: &str) -> Result<()> {
        let mut last = 0;
        for caps in reference_re().captures_iter(text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            self.push_source(&text[last..whole.start()]);
            last = whole.end();

            if let (Some(start), Some(end)) = (caps.name("start"), caps.name("end")) {
                let start = CellRef::decode(start.as_str())?;
                let end = CellRef::decode(end.as_str())?;
                self.segments.push(Segment::Range(CellRange::new(&start, &end)));
            } else if let Some(dir) = caps.name("dir").and_then(|d| Direction::from_token(d.as_str())) {
                self.segments.push(Segment::Direction(dir));
            } else if let Some(cell) = caps.name("cell") {
                self.segments.push(Segment::Cell(CellRef::decode(cell.as_str())?));
            }
        }
        self.push_source(&text[last..]);
        Ok(())
    }
}

/// Parse and resolve a formula body in one step.
pub fn preprocess(expr: &str, sheet: &Sheet, origin: &CellRef) -> Result<String> {
    Formula::parse(expr)?.resolve(sheet, origin)
}

fn cell_literal(cell_ref: &CellRef, sheet: &Sheet) -> Result<String> {
    let Some(cell) = sheet.get(cell_ref) else {
        return Ok(NO_VALUE.to_string());
    };
    if let Some(message) = &cell.error {
        return Err(EngineError::PropagatedError {
            label: cell_ref.to_string(),
            message: message.clone(),
        });
    }
    Ok(cell
        .value
        .as_ref()
        .map(to_literal)
        .unwrap_or_else(|| NO_VALUE.to_string()))
}

/// Walks the range lazily: it stops at the first absent member, so at most
/// `sheet.len() + 1` members are visited however large the range is.
fn range_literal(range: &CellRange, sheet: &Sheet) -> Result<String> {
    let mut items = Vec::new();
    for cell_ref in range {
        if !sheet.contains_key(&cell_ref) {
            return Err(EngineError::UndefinedCell(cell_ref.to_string()));
        }
        items.push(cell_literal(&cell_ref, sheet)?);
    }
    Ok(format!("[{}]", items.join(", ")))
}

/// Split a script into alternating unquoted/quoted chunks. Strings (`"`,
/// backtick) and char literals (`'`) are quoted. Quoted chunks keep their
/// delimiters; an unterminated literal runs to the end of the script.
fn split_string_literals(script: &str) -> Vec<(&str, bool)> {
    let bytes = script.as_bytes();
    let mut chunks = Vec::new();
    let mut seg_start = 0;
    let mut quote: Option<u8> = None;
    let mut backslashes = 0usize;

    for (i, &b) in bytes.iter().enumerate() {
        match quote {
            Some(q) => {
                if b == b'\\' {
                    backslashes += 1;
                    continue;
                }
                if b == q && backslashes.is_multiple_of(2) {
                    chunks.push((&script[seg_start..=i], true));
                    quote = None;
                    seg_start = i + 1;
                }
                backslashes = 0;
            }
            None => {
                if b == b'"' || b == b'`' || b == b'\'' {
                    if seg_start < i {
                        chunks.push((&script[seg_start..i], false));
                    }
                    quote = Some(b);
                    seg_start = i;
                    backslashes = 0;
                }
            }
        }
    }

    if seg_start < script.len() {
        chunks.push((&script[seg_start..], quote.is_some()));
    }
    chunks
}
