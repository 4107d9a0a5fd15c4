//! Whole-sheet recalculation.
//!
//! There is no dependency graph. Every edit re-evaluates every present cell,
//! pass after pass, until a pass changes nothing or the pass cap is reached.
//! Cells are visited in sheet order and see updates made earlier in the same
//! pass. Circular formulas either settle or run into the cap; neither is an
//! error, the sheet is simply returned in its last computed state.

use super::cell::{Cell, Sheet, Value, is_blank_input};
use super::cell_ref::CellRef;
use super::eval::Evaluator;
use super::preprocess::preprocess;
use crate::error::Result;

/// Pass cap used when none is configured.
pub const DEFAULT_MAX_PASSES: usize = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecalcOptions {
    pub max_passes: usize,
}

impl Default for RecalcOptions {
    fn default() -> Self {
        RecalcOptions {
            max_passes: DEFAULT_MAX_PASSES,
        }
    }
}

/// What a recalculation did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecalcReport {
    /// Passes run, including the final pass that found nothing to change.
    pub passes: usize,
    /// False when the cap stopped the loop before a fixed point.
    pub converged: bool,
}

/// A recalculated sheet and how it got there.
#[derive(Clone, Debug)]
pub struct Recalculated {
    pub sheet: Sheet,
    pub report: RecalcReport,
}

/// Evaluate one cell against the current sheet.
pub fn evaluate_cell(
    cell: &Cell,
    origin: &CellRef,
    sheet: &Sheet,
    evaluator: &Evaluator,
) -> Result<Option<Value>> {
    match cell.expression() {
        Some(expr) => {
            let script = preprocess(expr, sheet, origin)?;
            evaluator.evaluate(&script)
        }
        None => Ok(Some(Value::from_literal(&cell.formula))),
    }
}

/// Write `formula` into `sheet` without recalculating. Blank input removes
/// the cell; anything else resets its value and error.
pub fn set_formula(sheet: &mut Sheet, cell_ref: &CellRef, formula: &str) {
    if is_blank_input(formula) {
        sheet.remove(cell_ref);
    } else {
        sheet.insert(cell_ref.clone(), Cell::new(formula));
    }
}

/// Run passes over `sheet` until nothing changes or the cap is hit.
pub fn recalculate_in_place(
    sheet: &mut Sheet,
    evaluator: &Evaluator,
    options: &RecalcOptions,
) -> RecalcReport {
    let order: Vec<CellRef> = sheet.keys().cloned().collect();
    let mut passes = 0;

    while passes < options.max_passes {
        passes += 1;
        let mut changed = 0usize;

        for cell_ref in &order {
            let Some(cell) = sheet.get(cell_ref) else {
                continue;
            };
            let (value, error) = match evaluate_cell(cell, cell_ref, sheet, evaluator) {
                Ok(value) => (value, None),
                Err(e) => (None, Some(e.to_string())),
            };
            if cell.same_result(&value, &error) {
                continue;
            }
            if let Some(cell) = sheet.get_mut(cell_ref) {
                cell.value = value;
                cell.error = error;
            }
            changed += 1;
        }

        log::debug!("recalc pass {}: {} cell(s) changed", passes, changed);
        if changed == 0 {
            return RecalcReport {
                passes,
                converged: true,
            };
        }
    }

    log::warn!(
        "recalculation stopped after {} passes without reaching a fixed point",
        passes
    );
    RecalcReport {
        passes,
        converged: false,
    }
}

/// Recalculate a sheet, returning the new sheet.
pub fn recalculate(mut sheet: Sheet, evaluator: &Evaluator, options: &RecalcOptions) -> Recalculated {
    let report = recalculate_in_place(&mut sheet, evaluator, options);
    Recalculated { sheet, report }
}

/// Apply one edit and recalculate the whole sheet.
pub fn apply_edit(
    mut sheet: Sheet,
    cell_ref: &CellRef,
    formula: &str,
    evaluator: &Evaluator,
    options: &RecalcOptions,
) -> Recalculated {
    set_formula(&mut sheet, cell_ref, formula);
    recalculate(sheet, evaluator, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a(label: &str) -> CellRef {
        CellRef::from_str(label).unwrap()
    }

    fn edit(sheet: Sheet, label: &str, formula: &str) -> Recalculated {
        apply_edit(sheet, &a(label), formula, &Evaluator::new(), &RecalcOptions::default())
    }

    #[test]
    fn test_literal_and_formula_agree() {
        let out = edit(Sheet::new(), "B1", "42");
        assert_eq!(out.sheet[&a("B1")].value, Some(Value::Int(42)));

        let out = edit(out.sheet, "B1", "=41+1");
        assert_eq!(out.sheet[&a("B1")].value, Some(Value::Int(42)));
        assert_eq!(out.sheet[&a("B1")].error, None);
    }

    #[test]
    fn test_forward_reference_settles_in_later_pass() {
        // A1 is visited before B2, so it needs a second pass to see B2.
        let out = edit(Sheet::new(), "A1", "=B2 * 2");
        let out = edit(out.sheet, "B2", "21");
        assert_eq!(out.sheet[&a("A1")].value, Some(Value::Int(42)));
        assert!(out.report.converged);
        assert_eq!(out.report.passes, 3);
    }

    #[test]
    fn test_backward_reference_settles_in_one_pass() {
        let out = edit(Sheet::new(), "A1", "20");
        let out = edit(out.sheet, "A2", "=A1 + 1");
        assert_eq!(out.sheet[&a("A2")].value, Some(Value::Int(21)));
        assert_eq!(out.report.passes, 2);
    }

    #[test]
    fn test_converged_sheet_takes_one_pass() {
        let out = edit(Sheet::new(), "A1", "5");
        let out = edit(out.sheet, "A2", "=A1 * A1");
        let again = recalculate(out.sheet.clone(), &Evaluator::new(), &RecalcOptions::default());
        assert_eq!(again.report, RecalcReport { passes: 1, converged: true });
        assert_eq!(again.sheet, out.sheet);
    }

    #[test]
    fn test_error_propagates() {
        let out = edit(Sheet::new(), "A1", "=1/0");
        let out = edit(out.sheet, "A2", "=A1");
        let a1 = &out.sheet[&a("A1")];
        let a2 = &out.sheet[&a("A2")];
        assert!(a1.error.is_some());
        assert_eq!(a1.value, None);
        let message = a2.error.as_deref().unwrap();
        assert!(message.starts_with("Cell A1 has error:"), "{}", message);
        assert_eq!(a2.value, None);
    }

    #[test]
    fn test_error_clears_when_source_is_fixed() {
        let out = edit(Sheet::new(), "A1", "=1/0");
        let out = edit(out.sheet, "A2", "=A1 + 1");
        let out = edit(out.sheet, "A1", "=1");
        assert_eq!(out.sheet[&a("A2")].value, Some(Value::Int(2)));
        assert_eq!(out.sheet[&a("A2")].error, None);
    }

    #[test]
    fn test_delete_removes_key_and_references_see_no_value() {
        let out = edit(Sheet::new(), "A1", "1");
        let out = edit(out.sheet, "A1", "");
        assert!(!out.sheet.contains_key(&a("A1")));

        let out = edit(out.sheet, "B1", "=A1");
        assert_eq!(out.sheet[&a("B1")].error, None);
        assert_eq!(out.sheet[&a("B1")].value, None);
    }

    #[test]
    fn test_range_over_deleted_cell_is_undefined() {
        let out = edit(Sheet::new(), "A1", "1");
        let out = edit(out.sheet, "A2", "2");
        let out = edit(out.sheet, "B1", "=SUM(A1:A2)");
        assert_eq!(out.sheet[&a("B1")].value, Some(Value::Int(3)));

        let out = edit(out.sheet, "A2", "");
        assert_eq!(out.sheet[&a("B1")].error.as_deref(), Some("Cell A2 is undefined"));
    }

    #[test]
    fn test_mutual_reference_terminates() {
        let out = edit(Sheet::new(), "A1", "=A2");
        let out = edit(out.sheet, "A2", "=A1");
        assert!(out.report.passes <= DEFAULT_MAX_PASSES);
        assert!(out.sheet.contains_key(&a("A1")));
        assert!(out.sheet.contains_key(&a("A2")));
    }

    #[test]
    fn test_runaway_self_reference_hits_cap() {
        let out = edit(Sheet::new(), "A1", "=A1 + 1");
        assert_eq!(
            out.report,
            RecalcReport {
                passes: DEFAULT_MAX_PASSES,
                converged: false
            }
        );
        assert!(out.sheet[&a("A1")].error.is_some());
    }

    #[test]
    fn test_custom_cap() {
        let options = RecalcOptions { max_passes: 3 };
        let out = apply_edit(Sheet::new(), &a("A1"), "=A1 + 1", &Evaluator::new(), &options);
        assert_eq!(out.report.passes, 3);
        assert!(!out.report.converged);
    }

    #[test]
    fn test_direction_tokens_follow_the_cell() {
        let out = edit(Sheet::new(), "A1", "1");
        let out = edit(out.sheet, "A2", "=UP + 1");
        let out = edit(out.sheet, "A3", "=UP + 1");
        let out = edit(out.sheet, "B3", "=LEFT * 10");
        assert_eq!(out.sheet[&a("A3")].value, Some(Value::Int(3)));
        assert_eq!(out.sheet[&a("B3")].value, Some(Value::Int(30)));
    }

    #[test]
    fn test_error_inside_range_propagates() {
        let out = edit(Sheet::new(), "A1", "=1/0");
        let out = edit(out.sheet, "A2", "1");
        let out = edit(out.sheet, "B1", "=SUM(A1:A2)");
        let b1 = &out.sheet[&a("B1")];
        assert_eq!(b1.value, None);
        let error = b1.error.as_deref().unwrap();
        assert!(error.starts_with("Cell A1 has error: "), "got: {}", error);
        assert!(out.report.converged);
    }

    #[test]
    fn test_huge_range_fails_instead_of_allocating() {
        let out = edit(Sheet::new(), "A1", "=SUM(B1:ZZZZZZZZZZZZZ9999999999)");
        let a1 = &out.sheet[&a("A1")];
        assert_eq!(a1.value, None);
        assert!(a1.error.as_deref().unwrap().contains("B1"));
    }
}
