//! The sheet: a sparse `Position -> Cell` map plus cached printable-area
//! bookkeeping. The only public surface of this crate, orchestrating
//! registration and invalidation across cells — a cell has no back-pointer
//! to its owning sheet, so any operation that touches more than one cell's
//! dependency sets lives here, where every sibling cell is reachable.

use std::collections::HashMap;
use std::fmt;

use sheetcalc_formula::{Ast, FormulaError, InvalidPosition, Position, Size};

use crate::cell::{strip_leading_apostrophe, Cell, CellContent, Value};
use crate::cycle::detect_cycle;
use crate::error::{EngineError, Result};
use crate::invalidate::invalidate_up;

/// A sparse grid of cells, addressed by [`Position`].
#[derive(Default)]
pub struct Sheet {
    cells: HashMap<Position, Cell>,
    printable_size: Size,
}

/// A read-only view onto a present, non-empty cell, returned by
/// [`Sheet::get_cell`]. Borrows the sheet because `get_value` may need to
/// recursively evaluate other cells.
pub struct CellHandle<'a> {
    sheet: &'a Sheet,
    pos: Position,
}

impl<'a> CellHandle<'a> {
    pub fn position(&self) -> Position {
        self.pos
    }

    pub fn get_value(&self) -> Value {
        self.sheet.value_at(self.pos)
    }

    pub fn get_text(&self) -> String {
        self.sheet.cell_at(self.pos).map(Cell::text).unwrap_or_default()
    }

    pub fn get_referenced_cells(&self) -> Vec<Position> {
        self.sheet
            .cell_at(self.pos)
            .map(|c| c.referenced_cells().to_vec())
            .unwrap_or_default()
    }

    pub fn is_referenced(&self) -> bool {
        self.sheet.cell_at(self.pos).is_some_and(Cell::is_referenced)
    }
}

impl Sheet {
    pub fn new() -> Sheet {
        Sheet {
            cells: HashMap::new(),
            printable_size: Size::default(),
        }
    }

    /// Install new content at `pos`. Validation (parsing, cycle detection)
    /// always runs to completion before any mutation, so a failure leaves
    /// the sheet byte-for-byte unchanged.
    pub fn set_cell(&mut self, pos: Position, text: &str) -> Result<()> {
        self.require_valid(pos)?;

        let current_text = self.cells.get(&pos).map(Cell::text).unwrap_or_default();
        if text == current_text {
            return Ok(());
        }

        if text.len() >= 2 && text.starts_with('=') {
            self.set_formula(pos, text)
        } else {
            self.set_plain(pos, text);
            Ok(())
        }
    }

    fn set_formula(&mut self, pos: Position, text: &str) -> Result<()> {
        let ast = Ast::parse(&text[1..])?;
        let new_down = ast.referenced_cells();
        if detect_cycle(self, pos, &new_down) {
            return Err(EngineError::CircularDependency);
        }

        invalidate_up(self, pos);
        self.unregister_down_deps(pos);

        let cell = self.cells.entry(pos).or_insert_with(Cell::empty);
        cell.content = CellContent::Formula(ast);
        cell.down_deps = new_down.clone();
        cell.cached.replace(None);

        for referenced in &new_down {
            self.cells.entry(*referenced).or_insert_with(Cell::empty);
            self.cells.get_mut(referenced).unwrap().up_deps.insert(pos);
        }

        self.grow_printable_size(pos);
        Ok(())
    }

    fn set_plain(&mut self, pos: Position, text: &str) {
        invalidate_up(self, pos);
        self.unregister_down_deps(pos);

        let cell = self.cells.entry(pos).or_insert_with(Cell::empty);
        cell.content = if text.is_empty() {
            CellContent::Empty
        } else {
            CellContent::Text(text.to_string())
        };
        cell.down_deps.clear();
        cell.cached.replace(None);

        if !cell.is_empty() {
            self.grow_printable_size(pos);
        }
    }

    /// Reset content to `Empty`, preserving `up_deps` so back-edges from
    /// still-referencing formulas remain valid. No-op if `pos` holds no
    /// cell record at all.
    pub fn clear_cell(&mut self, pos: Position) -> Result<()> {
        self.require_valid(pos)?;
        if !self.cells.contains_key(&pos) {
            return Ok(());
        }

        invalidate_up(self, pos);
        self.unregister_down_deps(pos);

        let cell = self.cells.get_mut(&pos).expect("checked above");
        cell.content = CellContent::Empty;
        cell.down_deps.clear();
        cell.cached.replace(None);

        self.squeeze();
        Ok(())
    }

    /// `None` for an absent position or one holding only an auto-created
    /// Empty sink; auto-created sinks behave observably as absent.
    pub fn get_cell(&self, pos: Position) -> Result<Option<CellHandle<'_>>> {
        self.require_valid(pos)?;
        match self.cells.get(&pos) {
            Some(cell) if !cell.is_empty() => Ok(Some(CellHandle { sheet: self, pos })),
            _ => Ok(None),
        }
    }

    pub fn get_printable_size(&self) -> Size {
        self.printable_size
    }

    /// Tab-separated displayed values, one newline-terminated row per line,
    /// over the printable rectangle.
    pub fn print_values(&self, sink: &mut dyn fmt::Write) -> fmt::Result {
        for row in 0..self.printable_size.rows {
            for col in 0..self.printable_size.cols {
                if col > 0 {
                    write!(sink, "\t")?;
                }
                write!(sink, "{}", self.value_at(Position::new(row, col)))?;
            }
            writeln!(sink)?;
        }
        Ok(())
    }

    /// Tab-separated raw text, one newline-terminated row per line, over
    /// the printable rectangle.
    pub fn print_texts(&self, sink: &mut dyn fmt::Write) -> fmt::Result {
        for row in 0..self.printable_size.rows {
            for col in 0..self.printable_size.cols {
                if col > 0 {
                    write!(sink, "\t")?;
                }
                let text = self.cell_at(Position::new(row, col)).map(Cell::text).unwrap_or_default();
                write!(sink, "{text}")?;
            }
            writeln!(sink)?;
        }
        Ok(())
    }

    fn require_valid(&self, pos: Position) -> Result<()> {
        if pos.is_valid() {
            Ok(())
        } else {
            Err(InvalidPosition(pos.format()).into())
        }
    }

    fn unregister_down_deps(&mut self, pos: Position) {
        let old_downs = self
            .cells
            .get(&pos)
            .map(|c| c.down_deps.clone())
            .unwrap_or_default();
        for down in old_downs {
            if let Some(cell) = self.cells.get_mut(&down) {
                cell.up_deps.remove(&pos);
            }
        }
    }

    fn grow_printable_size(&mut self, pos: Position) {
        self.printable_size.rows = self.printable_size.rows.max(pos.row + 1);
        self.printable_size.cols = self.printable_size.cols.max(pos.col + 1);
    }

    /// Rescan the whole grid for the tightest bounding rectangle over
    /// non-empty cells. Cells kept alive only as reference sinks (Empty,
    /// `up_deps` non-empty) do not count.
    fn squeeze(&mut self) {
        let mut rows = 0;
        let mut cols = 0;
        for (pos, cell) in &self.cells {
            if !cell.is_empty() {
                rows = rows.max(pos.row + 1);
                cols = cols.max(pos.col + 1);
            }
        }
        self.printable_size = Size::new(rows, cols);
    }

    pub(crate) fn cell_at(&self, pos: Position) -> Option<&Cell> {
        self.cells.get(&pos)
    }

    pub(crate) fn down_deps_of(&self, pos: Position) -> &[Position] {
        self.cells.get(&pos).map(Cell::referenced_cells).unwrap_or(&[])
    }

    /// Return the displayed value at `pos`, computing and memoizing it if
    /// not already cached. Positions with no cell record display as the
    /// empty string, same as an Empty cell.
    pub(crate) fn value_at(&self, pos: Position) -> Value {
        let Some(cell) = self.cells.get(&pos) else {
            return Value::Text(String::new());
        };
        if let Some(cached) = cell.cached.borrow().clone() {
            return cached;
        }
        let value = match &cell.content {
            CellContent::Empty => Value::Text(String::new()),
            CellContent::Text(raw) => Value::Text(strip_leading_apostrophe(raw).to_string()),
            CellContent::Formula(ast) => {
                let mut lookup = |p: Position| self.evaluator_lookup(p);
                match ast.execute(&mut lookup) {
                    Ok(n) => Value::Number(n),
                    Err(e) => Value::Error(e),
                }
            }
        };
        cell.cached.replace(Some(value.clone()));
        value
    }

    /// The lookup closure passed to a formula's AST (component C5): resolves
    /// a referenced position to a number, or raises the `FormulaError` that
    /// should propagate out of evaluation.
    fn evaluator_lookup(&self, pos: Position) -> std::result::Result<f64, FormulaError> {
        if !pos.is_valid() {
            return Err(FormulaError::Ref);
        }
        let Some(cell) = self.cells.get(&pos) else {
            return Ok(0.0);
        };
        match &cell.content {
            CellContent::Empty => Ok(0.0),
            CellContent::Text(raw) => {
                if raw.starts_with('\'') {
                    Err(FormulaError::Value)
                } else {
                    raw.parse::<f64>().map_err(|_| FormulaError::Value)
                }
            }
            CellContent::Formula(_) => match self.value_at(pos) {
                Value::Number(n) => Ok(n),
                Value::Error(e) => Err(e),
                Value::Text(_) => unreachable!("a formula cell's value is never text"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(s: &str) -> Position {
        Position::parse(s).unwrap()
    }

    #[test]
    fn plain_text_round_trips() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("A1"), "hello").unwrap();
        let cell = sheet.get_cell(pos("A1")).unwrap().unwrap();
        assert_eq!(cell.get_text(), "hello");
        assert_eq!(cell.get_value().to_string(), "hello");
    }

    #[test]
    fn escaped_text_retains_apostrophe_in_text_but_not_value() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("A1"), "'5").unwrap();
        let cell = sheet.get_cell(pos("A1")).unwrap().unwrap();
        assert_eq!(cell.get_text(), "'5");
        assert_eq!(cell.get_value().to_string(), "5");
    }

    #[test]
    fn formula_evaluates_and_caches() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("A1"), "1").unwrap();
        sheet.set_cell(pos("B1"), "2").unwrap();
        sheet.set_cell(pos("C1"), "=A1+B1").unwrap();
        let cell = sheet.get_cell(pos("C1")).unwrap().unwrap();
        assert_eq!(cell.get_value().to_string(), "3");
        assert_eq!(cell.get_text(), "=A1+B1");
    }

    #[test]
    fn self_reference_rejected_and_cell_absent() {
        let mut sheet = Sheet::new();
        let err = sheet.set_cell(pos("A1"), "=A1").unwrap_err();
        assert_eq!(err, EngineError::CircularDependency);
        assert!(sheet.get_cell(pos("A1")).unwrap().is_none());
    }

    #[test]
    fn failing_set_leaves_existing_cell_untouched() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("A1"), "1").unwrap();
        sheet.set_cell(pos("B1"), "=A1").unwrap();
        let err = sheet.set_cell(pos("A1"), "=B1").unwrap_err();
        assert_eq!(err, EngineError::CircularDependency);
        let cell = sheet.get_cell(pos("A1")).unwrap().unwrap();
        assert_eq!(cell.get_text(), "1");
        assert_eq!(cell.get_value().to_string(), "1");
    }

    #[test]
    fn clear_cell_removes_content_but_keeps_back_edges() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("A1"), "1").unwrap();
        sheet.set_cell(pos("B1"), "=A1+1").unwrap();
        sheet.clear_cell(pos("A1")).unwrap();
        assert!(sheet.get_cell(pos("A1")).unwrap().is_none());
        let b1 = sheet.get_cell(pos("B1")).unwrap().unwrap();
        assert_eq!(b1.get_value().to_string(), "1");
    }

    #[test]
    fn clear_cell_is_a_no_op_on_absent_position() {
        let mut sheet = Sheet::new();
        sheet.clear_cell(pos("Z9")).unwrap();
        assert!(sheet.get_cell(pos("Z9")).unwrap().is_none());
    }

    #[test]
    fn invalid_position_rejected() {
        let mut sheet = Sheet::new();
        let bogus = Position::new(99999, 0);
        assert!(matches!(
            sheet.set_cell(bogus, "1"),
            Err(EngineError::InvalidPosition(_))
        ));
        assert!(matches!(
            sheet.get_cell(bogus),
            Err(EngineError::InvalidPosition(_))
        ));
        assert!(matches!(
            sheet.clear_cell(bogus),
            Err(EngineError::InvalidPosition(_))
        ));
    }

    #[test]
    fn printable_size_grows_on_set_and_shrinks_on_squeeze() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("A2"), "meow").unwrap();
        sheet.set_cell(pos("B2"), "=1+2").unwrap();
        sheet.set_cell(pos("A1"), "=1/0").unwrap();
        assert_eq!(sheet.get_printable_size(), Size::new(2, 2));
        sheet.clear_cell(pos("B2")).unwrap();
        assert_eq!(sheet.get_printable_size(), Size::new(2, 1));
    }

    #[test]
    fn set_same_text_is_a_no_op() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("A1"), "1").unwrap();
        sheet.set_cell(pos("B1"), "=A1+1").unwrap();
        sheet.value_at(pos("B1"));
        sheet.set_cell(pos("A1"), "1").unwrap();
        assert_eq!(sheet.value_at(pos("B1")).to_string(), "2");
    }
}
