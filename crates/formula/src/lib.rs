//! Cell addressing and the arithmetic formula language: [`Position`]/[`Size`]
//! addressing plus a formula grammar of numbers, cell references,
//! `+ - * /`, parentheses, and unary minus, exposed only through
//! [`Ast::parse`], [`Ast::execute`], [`Ast::referenced_cells`], and
//! [`Ast::print`]/`Display`. Nothing downstream may reach into the grammar
//! beyond that contract.

mod ast;
mod error;
mod lexer;
mod parser;
mod position;

pub use ast::{Ast, Expr};
pub use error::{FormulaError, InvalidPosition, SyntaxError};
pub use position::{Position, Size, MAX_COLS, MAX_ROWS};
