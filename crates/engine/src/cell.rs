//! Cell content and the displayed-value variant, plus the internal `Cell`
//! record the sheet stores. Mirrors the three-shape tagged variant of the
//! original `CellInterface`/`Cell` (`EmptyImpl`/`TextImpl`/`FormulaImpl`),
//! without the dynamic dispatch: one `match` per query is enough in Rust.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;

use sheetcalc_formula::{Ast, FormulaError, Position};

use crate::format::format_number;

/// What a cell currently holds.
#[derive(Debug, Clone, PartialEq)]
pub enum CellContent {
    Empty,
    /// Raw text, including a leading `'` escape if present.
    Text(String),
    Formula(Ast),
}

impl CellContent {
    fn is_empty(&self) -> bool {
        matches!(self, CellContent::Empty)
    }
}

/// A cell's displayed value: `{ string | number | FormulaError }`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
    Error(FormulaError),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{s}"),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::Error(e) => write!(f, "{e}"),
        }
    }
}

/// Strip a single leading escape apostrophe for display, per the content
/// model: the raw text always retains it, the displayed value never does.
pub(crate) fn strip_leading_apostrophe(s: &str) -> &str {
    s.strip_prefix('\'').unwrap_or(s)
}

/// The sheet's internal record for one addressable slot.
///
/// `cached` is behind a `RefCell`: evaluation is memoized from a method that
/// is logically read-only (`Sheet::value_at`), so the cache is mutated
/// through a field that is itself behind a shared reference.
pub(crate) struct Cell {
    pub content: CellContent,
    pub cached: RefCell<Option<Value>>,
    pub down_deps: Vec<Position>,
    pub up_deps: BTreeSet<Position>,
}

impl Cell {
    pub fn empty() -> Cell {
        Cell {
            content: CellContent::Empty,
            cached: RefCell::new(None),
            down_deps: Vec::new(),
            up_deps: BTreeSet::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn is_referenced(&self) -> bool {
        !self.up_deps.is_empty()
    }

    pub fn referenced_cells(&self) -> &[Position] {
        &self.down_deps
    }

    /// Raw text, per `getText`: plain/escaped text verbatim, or `"=" + print(ast)`
    /// for a formula.
    pub fn text(&self) -> String {
        match &self.content {
            CellContent::Empty => String::new(),
            CellContent::Text(s) => s.clone(),
            CellContent::Formula(ast) => format!("={ast}"),
        }
    }

    pub fn invalidate(&self) {
        *self.cached.borrow_mut() = None;
    }
}
