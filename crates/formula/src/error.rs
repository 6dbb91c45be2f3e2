//! Error types for addressing and formula parsing/evaluation.
//!
//! `InvalidPosition` and `SyntaxError` are `Result` errors returned to a
//! caller; `FormulaError` is data that flows through formula evaluation and
//! is displayed as a cell value, never unwound as an exception.

use std::fmt;

use thiserror::Error;

/// A position string did not match the A1 grammar, or decoded out of range.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid position: {0:?}")]
pub struct InvalidPosition(pub String);

/// A formula failed to parse. Carries the offending text for diagnostics;
/// the engine only needs to know parsing failed, not where.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("formula syntax error in {expr:?}: {reason}")]
pub struct SyntaxError {
    pub expr: String,
    pub reason: String,
}

impl SyntaxError {
    pub fn new(expr: impl Into<String>, reason: impl Into<String>) -> SyntaxError {
        SyntaxError {
            expr: expr.into(),
            reason: reason.into(),
        }
    }
}

/// A value-level error produced during formula evaluation. Stored as a
/// cell's displayed value, never propagated as an exception to callers of
/// `getValue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormulaError {
    /// Reference to a structurally invalid position.
    Ref,
    /// A referenced cell's text cannot be interpreted as a number.
    Value,
    /// Division by zero during arithmetic evaluation.
    Div0,
}

impl fmt::Display for FormulaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FormulaError::Ref => "#REF!",
            FormulaError::Value => "#VALUE!",
            FormulaError::Div0 => "#DIV0!",
        };
        write!(f, "{s}")
    }
}

impl std::error::Error for FormulaError {}
