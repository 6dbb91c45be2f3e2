//! The formula abstract syntax tree. Nothing outside this crate may assume
//! anything about the grammar beyond
//! [`Ast::parse`]/[`Ast::execute`]/[`Ast::referenced_cells`]/[`Ast::print`].

use std::collections::BTreeSet;
use std::fmt;

use crate::error::{FormulaError, SyntaxError};
use crate::position::Position;

/// One node of a parsed formula expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Reference(Position),
    Neg(Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
}

/// Binding power used for deciding when `print` needs parentheses around a
/// subexpression. Higher binds tighter.
fn precedence(e: &Expr) -> u8 {
    match e {
        Expr::Number(_) | Expr::Reference(_) => 3,
        Expr::Neg(_) => 3,
        Expr::Add(..) | Expr::Sub(..) => 1,
        Expr::Mul(..) | Expr::Div(..) => 2,
    }
}

/// A parsed formula: the source text after the leading `=` and its AST root.
#[derive(Debug, Clone, PartialEq)]
pub struct Ast {
    root: Expr,
}

impl Ast {
    /// Parse the substring of a formula after the leading `=`. Fails with
    /// `SyntaxError` on any malformed expression, including references to
    /// out-of-range positions.
    pub fn parse(expr: &str) -> Result<Ast, SyntaxError> {
        crate::parser::parse(expr)
    }

    /// Evaluate the tree, resolving references through `lookup`. The lookup
    /// may raise a `FormulaError`; division by zero raises
    /// `FormulaError::Div0` regardless of what `lookup` returns.
    ///
    /// Errors propagate leftmost-first: if an operator's left operand errors,
    /// the right operand is not evaluated.
    pub fn execute(
        &self,
        lookup: &mut dyn FnMut(Position) -> Result<f64, FormulaError>,
    ) -> Result<f64, FormulaError> {
        Self::eval(&self.root, lookup)
    }

    fn eval(
        expr: &Expr,
        lookup: &mut dyn FnMut(Position) -> Result<f64, FormulaError>,
    ) -> Result<f64, FormulaError> {
        match expr {
            Expr::Number(n) => Ok(*n),
            Expr::Reference(p) => lookup(*p),
            Expr::Neg(inner) => Ok(-Self::eval(inner, lookup)?),
            Expr::Add(l, r) => Ok(Self::eval(l, lookup)? + Self::eval(r, lookup)?),
            Expr::Sub(l, r) => Ok(Self::eval(l, lookup)? - Self::eval(r, lookup)?),
            Expr::Mul(l, r) => Ok(Self::eval(l, lookup)? * Self::eval(r, lookup)?),
            Expr::Div(l, r) => {
                let lv = Self::eval(l, lookup)?;
                let rv = Self::eval(r, lookup)?;
                if rv == 0.0 {
                    Err(FormulaError::Div0)
                } else {
                    Ok(lv / rv)
                }
            }
        }
    }

    /// Positions this formula reads, sorted ascending with no duplicates.
    pub fn referenced_cells(&self) -> Vec<Position> {
        let mut set = BTreeSet::new();
        Self::collect(&self.root, &mut set);
        set.into_iter().collect()
    }

    fn collect(expr: &Expr, set: &mut BTreeSet<Position>) {
        match expr {
            Expr::Number(_) => {}
            Expr::Reference(p) => {
                set.insert(*p);
            }
            Expr::Neg(inner) => Self::collect(inner, set),
            Expr::Add(l, r) | Expr::Sub(l, r) | Expr::Mul(l, r) | Expr::Div(l, r) => {
                Self::collect(l, set);
                Self::collect(r, set);
            }
        }
    }

    /// Canonical pretty-print with redundant parentheses removed.
    pub fn print(&self, sink: &mut dyn fmt::Write) -> fmt::Result {
        write!(sink, "{self}")
    }

    fn fmt_expr(expr: &Expr, f: &mut fmt::Formatter<'_>, parent_prec: u8, is_right: bool) -> fmt::Result {
        let prec = precedence(expr);
        // Our parser is left-associative, so any right operand sharing the
        // parent's precedence can only have arisen from explicit source
        // parentheses: reprint them to preserve meaning.
        let needs_parens = prec < parent_prec || (is_right && prec == parent_prec);
        if needs_parens {
            write!(f, "(")?;
        }
        match expr {
            Expr::Number(n) => write_number(f, *n)?,
            Expr::Reference(p) => write!(f, "{p}")?,
            Expr::Neg(inner) => {
                write!(f, "-")?;
                Self::fmt_expr(inner, f, 3, false)?;
            }
            Expr::Add(l, r) => {
                Self::fmt_expr(l, f, 1, false)?;
                write!(f, "+")?;
                Self::fmt_expr(r, f, 1, true)?;
            }
            Expr::Sub(l, r) => {
                Self::fmt_expr(l, f, 1, false)?;
                write!(f, "-")?;
                Self::fmt_expr(r, f, 1, true)?;
            }
            Expr::Mul(l, r) => {
                Self::fmt_expr(l, f, 2, false)?;
                write!(f, "*")?;
                Self::fmt_expr(r, f, 2, true)?;
            }
            Expr::Div(l, r) => {
                Self::fmt_expr(l, f, 2, false)?;
                write!(f, "/")?;
                Self::fmt_expr(r, f, 2, true)?;
            }
        }
        if needs_parens {
            write!(f, ")")?;
        }
        Ok(())
    }

    /// Construct directly from an already-parsed tree (used by the parser).
    pub(crate) fn from_expr(root: Expr) -> Ast {
        Ast { root }
    }
}

fn write_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if n.fract() == 0.0 && n.is_finite() {
        write!(f, "{:.0}", n)
    } else {
        write!(f, "{n}")
    }
}

impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Self::fmt_expr(&self.root, f, 0, false)
    }
}
