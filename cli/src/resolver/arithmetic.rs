//! # Arithmetic Expression Evaluator
//!
//! File: cli/src/resolver/arithmetic.rs
//!
//! A small recursive-descent evaluator for plain arithmetic. Only numeric
//! literals, whitespace, parentheses and the operators `+ - * / % // **` are
//! understood; anything else is rejected while tokenizing.
//!
//! Grammar (lowest to highest precedence):
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := unary (('*' | '/' | '//' | '%') unary)*
//! unary  := ('+' | '-') unary | power
//! power  := atom ('**' unary)?
//! atom   := NUMBER | '(' expr ')'
//! ```
//!
//! Integers stay integers until an operation needs a float: `/` always yields
//! a float, as does `**` with a negative integer exponent. `//` and `%` use
//! floor semantics, so the remainder takes the sign of the divisor.

use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("invalid number literal '{0}'")]
    InvalidNumber(String),

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("unexpected token {0}")]
    UnexpectedToken(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow")]
    Overflow,

    #[error("result is not a finite number")]
    NotFinite,

    #[error("expression nested too deeply")]
    TooDeep,
}

/// Nesting limit for parentheses and unary signs. Each level costs a few
/// stack frames, and the input is untrusted.
pub const MAX_DEPTH: usize = 200;

/// The result of an evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    fn is_zero(self) -> bool {
        match self {
            Number::Int(i) => i == 0,
            Number::Float(f) => f == 0.0,
        }
    }
}

impl fmt::Display for Number {
    /// Integers print bare; floats always carry a decimal point (`2.0`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(x) => f.write_str(&format_float(*x)),
        }
    }
}

/// Formats a float the way a calculator user expects: shortest round-trip
/// digits, with `.0` appended to whole values.
pub fn format_float(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let s = x.to_string();
    if s.contains('.') {
        s
    } else {
        format!("{}.0", s)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(Number),
    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    DoubleSlash,
    Percent,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Token::Num(n) => return write!(f, "'{}'", n),
            Token::Plus => "'+'",
            Token::Minus => "'-'",
            Token::Star => "'*'",
            Token::DoubleStar => "'**'",
            Token::Slash => "'/'",
            Token::DoubleSlash => "'//'",
            Token::Percent => "'%'",
            Token::LParen => "'('",
            Token::RParen => "')'",
        };
        f.write_str(s)
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, EvalError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(offset, ch)) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
            }
            '0'..='9' | '.' => {
                let mut literal = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_ascii_digit() || c == '.' {
                        literal.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Num(parse_literal(&literal)?));
            }
            '*' | '/' => {
                chars.next();
                let doubled = matches!(chars.peek(), Some(&(_, c)) if c == ch);
                if doubled {
                    chars.next();
                }
                tokens.push(match (ch, doubled) {
                    ('*', false) => Token::Star,
                    ('*', true) => Token::DoubleStar,
                    ('/', false) => Token::Slash,
                    _ => Token::DoubleSlash,
                });
            }
            '+' | '-' | '%' | '(' | ')' => {
                chars.next();
                tokens.push(match ch {
                    '+' => Token::Plus,
                    '-' => Token::Minus,
                    '%' => Token::Percent,
                    '(' => Token::LParen,
                    _ => Token::RParen,
                });
            }
            _ => return Err(EvalError::UnexpectedChar { ch, offset }),
        }
    }

    Ok(tokens)
}

fn parse_literal(literal: &str) -> Result<Number, EvalError> {
    let invalid = || EvalError::InvalidNumber(literal.to_string());
    if literal.contains('.') {
        if literal == "." || literal.matches('.').count() > 1 {
            return Err(invalid());
        }
        return literal.parse::<f64>().map(Number::Float).map_err(|_| invalid());
    }
    // "007" is not a valid integer literal, but "000" is.
    if literal.len() > 1 && literal.starts_with('0') && literal.chars().any(|c| c != '0') {
        return Err(invalid());
    }
    literal
        .parse::<i64>()
        .map(Number::Int)
        .map_err(|_| EvalError::Overflow)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expr(&mut self) -> Result<Number, EvalError> {
        let mut lhs = self.term()?;
        while let Some(op) = self.peek() {
            let op = match op {
                Token::Plus | Token::Minus => op.clone(),
                _ => break,
            };
            self.next();
            let rhs = self.term()?;
            lhs = binary(&op, lhs, rhs)?;
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Number, EvalError> {
        let mut lhs = self.unary()?;
        while let Some(op) = self.peek() {
            let op = match op {
                Token::Star | Token::Slash | Token::DoubleSlash | Token::Percent => op.clone(),
                _ => break,
            };
            self.next();
            let rhs = self.unary()?;
            lhs = binary(&op, lhs, rhs)?;
        }
        Ok(lhs)
    }

    /// Every recursive path (parentheses, repeated signs, exponents) passes
    /// through here, so this is where nesting is bounded.
    fn unary(&mut self) -> Result<Number, EvalError> {
        if self.depth >= MAX_DEPTH {
            return Err(EvalError::TooDeep);
        }
        self.depth += 1;
        let value = self.signed();
        self.depth -= 1;
        value
    }

    fn signed(&mut self) -> Result<Number, EvalError> {
        match self.peek() {
            Some(Token::Plus) => {
                self.next();
                self.unary()
            }
            Some(Token::Minus) => {
                self.next();
                negate(self.unary()?)
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<Number, EvalError> {
        let base = self.atom()?;
        if let Some(Token::DoubleStar) = self.peek() {
            self.next();
            // Right-associative, and the exponent may carry its own sign: 2 ** -1
            let exponent = self.unary()?;
            return pow(base, exponent);
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<Number, EvalError> {
        match self.next() {
            Some(Token::Num(n)) => Ok(n),
            Some(Token::LParen) => {
                let value = self.expr()?;
                match self.next() {
                    Some(Token::RParen) => Ok(value),
                    Some(other) => Err(EvalError::UnexpectedToken(other.to_string())),
                    None => Err(EvalError::UnexpectedEnd),
                }
            }
            Some(other) => Err(EvalError::UnexpectedToken(other.to_string())),
            None => Err(EvalError::UnexpectedEnd),
        }
    }
}

fn negate(n: Number) -> Result<Number, EvalError> {
    match n {
        Number::Int(i) => i.checked_neg().map(Number::Int).ok_or(EvalError::Overflow),
        Number::Float(f) => Ok(Number::Float(-f)),
    }
}

fn floor_div_i64(a: i64, b: i64) -> Result<i64, EvalError> {
    let q = a.checked_div(b).ok_or(EvalError::Overflow)?;
    if (a % b != 0) && ((a < 0) != (b < 0)) {
        Ok(q - 1)
    } else {
        Ok(q)
    }
}

fn binary(op: &Token, lhs: Number, rhs: Number) -> Result<Number, EvalError> {
    use Number::{Float, Int};

    if matches!(op, Token::Slash | Token::DoubleSlash | Token::Percent) && rhs.is_zero() {
        return Err(EvalError::DivisionByZero);
    }

    let result = match (op, lhs, rhs) {
        (Token::Plus, Int(a), Int(b)) => Int(a.checked_add(b).ok_or(EvalError::Overflow)?),
        (Token::Minus, Int(a), Int(b)) => Int(a.checked_sub(b).ok_or(EvalError::Overflow)?),
        (Token::Star, Int(a), Int(b)) => Int(a.checked_mul(b).ok_or(EvalError::Overflow)?),
        (Token::DoubleSlash, Int(a), Int(b)) => Int(floor_div_i64(a, b)?),
        (Token::Percent, Int(a), Int(b)) => {
            let r = a.checked_rem(b).ok_or(EvalError::Overflow)?;
            Int(if r != 0 && ((r < 0) != (b < 0)) { r + b } else { r })
        }
        (Token::Slash, a, b) => Float(a.as_f64() / b.as_f64()),
        (op, a, b) => {
            let (a, b) = (a.as_f64(), b.as_f64());
            Float(match op {
                Token::Plus => a + b,
                Token::Minus => a - b,
                Token::Star => a * b,
                Token::DoubleSlash => (a / b).floor(),
                Token::Percent => {
                    let r = a % b;
                    if r != 0.0 && ((r < 0.0) != (b < 0.0)) {
                        r + b
                    } else {
                        r
                    }
                }
                other => return Err(EvalError::UnexpectedToken(other.to_string())),
            })
        }
    };
    Ok(result)
}

fn pow(base: Number, exponent: Number) -> Result<Number, EvalError> {
    match (base, exponent) {
        (Number::Int(b), Number::Int(e)) if e >= 0 => {
            let e = u32::try_from(e).map_err(|_| EvalError::Overflow)?;
            b.checked_pow(e).map(Number::Int).ok_or(EvalError::Overflow)
        }
        (b, e) => {
            if b.is_zero() && e.as_f64() < 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            Ok(Number::Float(b.as_f64().powf(e.as_f64())))
        }
    }
}

/// Evaluates an arithmetic expression.
pub fn evaluate(input: &str) -> Result<Number, EvalError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    if let Some(extra) = parser.next() {
        return Err(EvalError::UnexpectedToken(extra.to_string()));
    }
    match value {
        Number::Float(f) if !f.is_finite() => Err(EvalError::NotFinite),
        _ => Ok(value),
    }
}
