//! Recursive-descent parser for the arithmetic formula grammar:
//! `expr := term (('+' | '-') term)*`, `term := factor (('*' | '/') factor)*`,
//! `factor := '-' factor | primary`, `primary := number | reference | '(' expr ')'`.

use crate::ast::{Ast, Expr};
use crate::error::SyntaxError;
use crate::lexer::{Lexer, Token};
use crate::position::Position;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    source: String,
}

pub fn parse(expr: &str) -> Result<Ast, SyntaxError> {
    let tokens = Lexer::new(expr)
        .tokenize()
        .map_err(|reason| SyntaxError::new(expr, reason))?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        source: expr.to_string(),
    };
    let root = parser.parse_expr()?;
    parser.expect_eof()?;
    Ok(Ast::from_expr(root))
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn bump(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn err(&self, reason: impl Into<String>) -> SyntaxError {
        SyntaxError::new(self.source.clone(), reason.into())
    }

    fn expect_eof(&mut self) -> Result<(), SyntaxError> {
        if matches!(self.peek(), Token::Eof) {
            Ok(())
        } else {
            Err(self.err(format!("unexpected trailing token {}", self.peek())))
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, SyntaxError> {
        let mut lhs = self.parse_term()?;
        loop {
            match self.peek() {
                Token::Plus => {
                    self.bump();
                    let rhs = self.parse_term()?;
                    lhs = Expr::Add(Box::new(lhs), Box::new(rhs));
                }
                Token::Minus => {
                    self.bump();
                    let rhs = self.parse_term()?;
                    lhs = Expr::Sub(Box::new(lhs), Box::new(rhs));
                }
                _ => break,
            }
        }
        Ok(lhs)
    }

    fn parse_term(&mut self) -> Result<Expr, SyntaxError> {
        let mut lhs = self.parse_factor()?;
        loop {
            match self.peek() {
                Token::Star => {
                    self.bump();
                    let rhs = self.parse_factor()?;
                    lhs = Expr::Mul(Box::new(lhs), Box::new(rhs));
                }
                Token::Slash => {
                    self.bump();
                    let rhs = self.parse_factor()?;
                    lhs = Expr::Div(Box::new(lhs), Box::new(rhs));
                }
                _ => break,
            }
        }
        Ok(lhs)
    }

    fn parse_factor(&mut self) -> Result<Expr, SyntaxError> {
        if matches!(self.peek(), Token::Minus) {
            self.bump();
            let inner = self.parse_factor()?;
            return Ok(Expr::Neg(Box::new(inner)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, SyntaxError> {
        match self.bump() {
            Token::Number(n) => Ok(Expr::Number(n)),
            Token::Reference(text) => {
                let pos = Position::parse(&text).map_err(|_| {
                    self.err(format!("invalid reference {text:?}"))
                })?;
                Ok(Expr::Reference(pos))
            }
            Token::LParen => {
                let inner = self.parse_expr()?;
                match self.bump() {
                    Token::RParen => Ok(inner),
                    other => Err(self.err(format!("expected ')', found {other}"))),
                }
            }
            other => Err(self.err(format!("unexpected token {other}"))),
        }
    }
}
