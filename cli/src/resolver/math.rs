//! # Math Strategy
//!
//! File: cli/src/resolver/math.rs
//!
//! ## Overview
//!
//! Answers two kinds of questions locally:
//! - messages made only of digits, whitespace and `+ - * / % ( ) .`, which are
//!   handed to the arithmetic evaluator (`resolver::arithmetic`);
//! - "square root" / "cube root" phrases, answered from the first number in
//!   the message with four decimal places.
//!
//! A message that passes the character filter but does not evaluate (for
//! example `10 / 0`) is reported as an error so the cascade logs it and moves
//! on; it is never answered by the root phrases.

use super::arithmetic::{self, format_float};
use super::{Query, Strategy};
use crate::core::error::{AsiaError, Result};
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;

static ARITHMETIC_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9\s+\-*/%.()]+$").expect("valid arithmetic filter"));

static NUMBER_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+(?:\.[0-9]+)?").expect("valid number pattern"));

/// Returns the first non-negative number literal in `text`.
fn first_number(text: &str) -> Option<f64> {
    NUMBER_LITERAL
        .find(text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Solves `message` (already lower-cased) if it is arithmetic or a root phrase.
pub fn solve(folded: &str) -> Result<Option<String>> {
    if ARITHMETIC_ONLY.is_match(folded) {
        let value = arithmetic::evaluate(folded).map_err(AsiaError::from)?;
        return Ok(Some(format!("The answer is {}", value)));
    }
    if folded.contains("square root") {
        if let Some(n) = first_number(folded) {
            return Ok(Some(format!(
                "The square root of {} is {:.4}",
                format_float(n),
                n.sqrt()
            )));
        }
    }
    if folded.contains("cube root") {
        if let Some(n) = first_number(folded) {
            return Ok(Some(format!(
                "The cube root of {} is {:.4}",
                format_float(n),
                n.cbrt()
            )));
        }
    }
    Ok(None)
}

/// The arithmetic/math-phrase step of the cascade.
pub struct MathSolver;

#[async_trait]
impl Strategy for MathSolver {
    fn name(&self) -> &'static str {
        "math"
    }

    async fn answer(&self, query: &Query) -> Result<Option<String>> {
        solve(query.folded())
    }
}
