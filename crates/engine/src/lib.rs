//! The cell graph and evaluation engine: a sparse grid of cells whose
//! formulas reference each other, evaluated lazily and cached until an
//! input changes, with cycle rejection at assignment time.
//!
//! Built on [`sheetcalc_formula`] for addressing and the formula language.

mod cell;
mod cycle;
mod error;
mod format;
mod invalidate;
mod sheet;

pub use cell::{CellContent, Value};
pub use error::{EngineError, Result};
pub use sheet::{CellHandle, Sheet};

pub use sheetcalc_formula::{FormulaError, InvalidPosition, Position, Size, SyntaxError};
