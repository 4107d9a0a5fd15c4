use super::Document;
use crate::error::Result;
use makro_engine::engine::{
    Cell, CellRange, CellRef, RecalcReport, Value, apply_edit, format_cell, preprocess,
    recalculate,
};

/// What [`Document::copy_range`] copies out of each cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CopyMode {
    /// Displayed values
    #[default]
    Values,
    /// Raw formulas as entered
    Formulas,
}

impl Document {
    /// Recalculate the whole sheet without changing any formula.
    pub fn recalculate(&mut self) -> RecalcReport {
        let sheet = std::mem::take(&mut self.sheet);
        let out = recalculate(sheet, &self.evaluator, &self.options);
        self.sheet = out.sheet;
        self.last_report = Some(out.report);
        out.report
    }

    /// Set a cell's formula, recalculate, then persist once.
    /// Blank input deletes the cell.
    pub fn set_cell(&mut self, cell_ref: &CellRef, formula: &str) -> Result<RecalcReport> {
        let sheet = std::mem::take(&mut self.sheet);
        let out = apply_edit(sheet, cell_ref, formula, &self.evaluator, &self.options);
        self.sheet = out.sheet;
        self.last_report = Some(out.report);
        self.modified = true;
        log::debug!(
            "{} set; recalculated in {} pass(es)",
            cell_ref,
            out.report.passes
        );
        self.persist()?;
        Ok(out.report)
    }

    /// Like [`Document::set_cell`], addressing the cell by label.
    pub fn set_cell_label(&mut self, label: &str, formula: &str) -> Result<RecalcReport> {
        let cell_ref = CellRef::decode(label)?;
        self.set_cell(&cell_ref, formula)
    }

    pub fn get_cell(&self, cell_ref: &CellRef) -> Option<&Cell> {
        self.sheet.get(cell_ref)
    }

    /// Text shown for a cell: its value, the error marker, or empty.
    pub fn display(&self, cell_ref: &CellRef) -> String {
        self.sheet.get(cell_ref).map(format_cell).unwrap_or_default()
    }

    /// Delete every cell in `range` with a single recalculation.
    pub fn clear_range(&mut self, range: &CellRange) -> Result<RecalcReport> {
        let before = self.sheet.len();
        self.sheet.retain(|cell_ref, _| !range.contains(cell_ref));
        let removed = before - self.sheet.len();

        let report = self.recalculate();
        if removed > 0 {
            log::debug!("cleared {} cell(s) in {}", removed, range);
            self.modified = true;
            self.persist()?;
        }
        Ok(report)
    }

    /// Tab-separated rows covering `range`, row-major.
    pub fn copy_range(&self, range: &CellRange, mode: CopyMode) -> String {
        let mut rows = Vec::new();
        for row in range.min_row..=range.max_row {
            let cells: Vec<String> = (range.min_col..=range.max_col)
                .map(|col| {
                    let cell_ref = CellRef::new(col, row);
                    match mode {
                        CopyMode::Values => self.display(&cell_ref),
                        CopyMode::Formulas => self
                            .sheet
                            .get(&cell_ref)
                            .map(|cell| cell.formula.clone())
                            .unwrap_or_default(),
                    }
                })
                .collect();
            rows.push(cells.join("\t"));
        }
        rows.join("\n")
    }

    /// Evaluate a standalone expression against the current sheet, as if
    /// it were written in A1. A leading `=` is optional.
    pub fn evaluate_expression(&self, expr: &str) -> Result<Option<Value>> {
        let expr = expr.strip_prefix('=').unwrap_or(expr);
        let script = preprocess(expr, &self.sheet, &CellRef::new(0, 0))?;
        Ok(self.evaluator.evaluate(&script)?)
    }
}
