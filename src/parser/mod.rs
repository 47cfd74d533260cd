//! Program text parser
//!
//! Parses the canonical textual form printed by `Expr`'s `Display` back into
//! an expression tree, so a synthesized program can be saved and evaluated
//! later. The syntax is a chain of method calls on a leaf:
//!
//! ```text
//! var0.add(var1).transpose().scale(0.5)
//! identity(3).multiply(var0)
//! const[[1, 2], [3, 4]].subtract(zeros(2, 2))
//! ```

use std::fmt;
use std::str::FromStr;

use crate::ir::{ConstantSelector, Expr, Operation};
use crate::matrix::{ConcreteMatrix, Shape};

/// Parse error with location information
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// 1-based column of the offending character
    pub column: usize,
    pub message: String,
    pub input: String,
}

impl ParseError {
    pub fn new(column: usize, message: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            column,
            message: message.into(),
            input: input.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "column {}: {}\n  | {}\n  | {}^",
            self.column,
            self.message,
            self.input,
            " ".repeat(self.column.saturating_sub(1))
        )
    }
}

impl std::error::Error for ParseError {}

/// Cursor over the program text
struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(self.pos + 1, message, self.input)
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_whitespace();
        self.rest().chars().next()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> Result<(), ParseError> {
        if self.eat(c) {
            Ok(())
        } else {
            match self.peek() {
                Some(found) => Err(self.error(format!("expected '{}', found '{}'", c, found))),
                None => Err(self.error(format!("expected '{}', found end of input", c))),
            }
        }
    }

    /// Lowercase identifier made of letters, digits and underscores
    fn identifier(&mut self) -> Result<&'a str, ParseError> {
        self.skip_whitespace();
        let rest = self.rest();
        let len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        if len == 0 {
            return Err(self.error("expected a name"));
        }
        self.pos += len;
        Ok(&rest[..len])
    }

    fn unsigned(&mut self) -> Result<usize, ParseError> {
        self.skip_whitespace();
        let rest = self.rest();
        let len = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        if len == 0 {
            return Err(self.error("expected a non-negative integer"));
        }
        let value = rest[..len]
            .parse()
            .map_err(|e| self.error(format!("invalid integer '{}': {}", &rest[..len], e)))?;
        self.pos += len;
        Ok(value)
    }

    /// Decimal number with optional sign, fraction and exponent
    fn number(&mut self) -> Result<f64, ParseError> {
        self.skip_whitespace();
        let rest = self.rest();
        let bytes = rest.as_bytes();
        let mut len = 0;
        if matches!(bytes.first(), Some(b'-' | b'+')) {
            len += 1;
        }
        while len < bytes.len() && (bytes[len].is_ascii_digit() || bytes[len] == b'.') {
            len += 1;
        }
        if len < bytes.len() && matches!(bytes[len], b'e' | b'E') {
            len += 1;
            if len < bytes.len() && matches!(bytes[len], b'-' | b'+') {
                len += 1;
            }
            while len < bytes.len() && bytes[len].is_ascii_digit() {
                len += 1;
            }
        }
        let text = &rest[..len];
        let value: f64 = text
            .parse()
            .map_err(|_| self.error(format!("invalid number '{}'", text)))?;
        if !value.is_finite() {
            return Err(self.error(format!("number '{}' is not finite", text)));
        }
        self.pos += len;
        Ok(value)
    }

    fn expr(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.primary()?;
        while self.eat('.') {
            expr = self.call(expr)?;
        }
        Ok(expr)
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        match self.peek() {
            Some('(') => {
                self.pos += 1;
                let inner = self.expr()?;
                self.expect(')')?;
                Ok(inner)
            }
            Some('?') => {
                self.pos += 1;
                self.slot()
            }
            Some(c) if c.is_ascii_alphabetic() => {
                let start = self.pos;
                let name = self.identifier()?;
                match name {
                    "identity" => {
                        self.expect('(')?;
                        let size = self.unsigned()?;
                        self.expect(')')?;
                        Ok(Expr::constant(ConstantSelector::Identity(size)))
                    }
                    "zeros" => {
                        self.expect('(')?;
                        let rows = self.unsigned()?;
                        self.expect(',')?;
                        let columns = self.unsigned()?;
                        self.expect(')')?;
                        Ok(Expr::constant(ConstantSelector::Zeros(Shape::new(
                            rows, columns,
                        ))))
                    }
                    "const" => self.literal(),
                    _ => match name.strip_prefix("var").map(str::parse::<usize>) {
                        Some(Ok(index)) => Ok(Expr::var(index)),
                        _ => {
                            self.pos = start;
                            Err(self.error(format!("unknown leaf '{}'", name)))
                        }
                    },
                }
            }
            Some(c) => Err(self.error(format!("unexpected character '{}'", c))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    /// `?c<id>[<rows>x<columns>]`, after the question mark
    fn slot(&mut self) -> Result<Expr, ParseError> {
        let name = self.identifier()?;
        let id = name
            .strip_prefix('c')
            .and_then(|id| id.parse::<usize>().ok())
            .ok_or_else(|| self.error(format!("invalid slot name '{}'", name)))?;
        self.expect('[')?;
        let rows = self.unsigned()?;
        self.skip_whitespace();
        if !self.rest().starts_with('x') {
            return Err(self.error("expected 'x' between slot dimensions"));
        }
        self.pos += 1;
        let columns = self.unsigned()?;
        self.expect(']')?;
        Ok(Expr::slot(id, Shape::new(rows, columns)))
    }

    /// `[[a, b], [c, d]]`, after the `const` keyword
    fn literal(&mut self) -> Result<Expr, ParseError> {
        let start = self.pos;
        self.expect('[')?;
        let mut rows = Vec::new();
        loop {
            self.expect('[')?;
            let mut row = vec![self.number()?];
            while self.eat(',') {
                row.push(self.number()?);
            }
            self.expect(']')?;
            rows.push(row);
            if !self.eat(',') {
                break;
            }
        }
        self.expect(']')?;
        let matrix = ConcreteMatrix::from_rows(rows).map_err(|e| {
            ParseError::new(start + 1, format!("invalid constant: {}", e), self.input)
        })?;
        Ok(Expr::literal(matrix))
    }

    /// `name(immediates..., args...)` applied to `receiver`
    fn call(&mut self, receiver: Expr) -> Result<Expr, ParseError> {
        let start = self.pos;
        let name = self.identifier()?;
        self.expect('(')?;
        let expr = match name {
            "add" | "subtract" | "multiply" => {
                let op = match name {
                    "add" => Operation::Add,
                    "subtract" => Operation::Subtract,
                    _ => Operation::Multiply,
                };
                let arg = self.expr()?;
                Expr::binary(op, receiver, arg)
            }
            "scale" => Expr::unary(Operation::Scale(self.number()?), receiver),
            "pow" => {
                let exponent = self.unsigned()?;
                let exponent = u32::try_from(exponent)
                    .map_err(|_| self.error(format!("exponent {} is too large", exponent)))?;
                Expr::unary(Operation::Power(exponent), receiver)
            }
            "resize" => {
                let rows = self.unsigned()?;
                self.expect(',')?;
                let columns = self.unsigned()?;
                Expr::unary(Operation::Resize { rows, columns }, receiver)
            }
            "drop_row" => Expr::unary(Operation::DropRow(self.unsigned()?), receiver),
            "drop_column" => Expr::unary(Operation::DropColumn(self.unsigned()?), receiver),
            "negate" => Expr::unary(Operation::Negate, receiver),
            "transpose" => Expr::unary(Operation::Transpose, receiver),
            "identity_like" => Expr::unary(Operation::IdentityLike, receiver),
            "zeros_like" => Expr::unary(Operation::ZerosLike, receiver),
            "invert" => Expr::unary(Operation::Invert, receiver),
            _ => {
                return Err(ParseError::new(
                    start + 1,
                    format!("unknown operation '{}'", name),
                    self.input,
                ));
            }
        };
        self.expect(')')?;
        Ok(expr)
    }
}

/// Parse a program from its textual form
pub fn parse_expr(input: &str) -> Result<Expr, ParseError> {
    let mut parser = Parser::new(input);
    let expr = parser.expr()?;
    if let Some(c) = parser.peek() {
        return Err(parser.error(format!("unexpected trailing input starting at '{}'", c)));
    }
    Ok(expr)
}

impl FromStr for Expr {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_expr(s)
    }
}
