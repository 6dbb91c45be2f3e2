//! Operational errors: propagated to the caller of a `Sheet` operation,
//! leaving the sheet unchanged. Distinct from [`sheetcalc_formula::FormulaError`],
//! which is a value stored in a cell, never thrown.

use thiserror::Error;

use sheetcalc_formula::{InvalidPosition, SyntaxError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error(transparent)]
    InvalidPosition(#[from] InvalidPosition),

    #[error(transparent)]
    FormulaSyntax(#[from] SyntaxError),

    #[error("circular dependency")]
    CircularDependency,
}

pub type Result<T> = std::result::Result<T, EngineError>;
