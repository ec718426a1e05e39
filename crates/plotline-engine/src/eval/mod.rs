//! Numeric evaluation of line expressions against per-row bindings.
//!
//! The arithmetic itself is delegated through [`ScalarEvaluator`], an
//! injected capability: anything that can bind named variables and reduce an
//! expression string to a number. [`ArithmeticEvaluator`] is the built-in
//! implementation; tests inject stubs through the same seam.

mod arith;

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use crate::expr;

pub use arith::ArithmeticEvaluator;

/// Why a scalar evaluation failed.
///
/// Callers in this crate never surface these; evaluation failures degrade to
/// missing values at the row level.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("unexpected character '{0}' in expression")]
    UnexpectedChar(char),
    #[error("unexpected token at offset {0}")]
    UnexpectedToken(usize),
    #[error("expression nesting is too deep")]
    TooDeep,
    #[error("unknown variable '{0}'")]
    UnknownVariable(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("{0}")]
    Other(String),
}

/// An external scalar expression evaluator.
///
/// `bindings` maps bare identifiers (no whitespace) to numbers; `expr` is the
/// expression after quoted labels have been rewritten to those identifiers.
/// Implementations may fail on malformed input but must not panic.
pub trait ScalarEvaluator {
    fn evaluate(&self, expr: &str, bindings: &HashMap<String, f64>) -> Result<f64, EvalError>;
}

/// Strips whitespace from a label so it matches the evaluator's identifier
/// rules, e.g. `Holy Cheese` -> `HolyCheese`.
fn identifier(label: &str) -> String {
    label.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Rewrites every quoted label occurrence in `expr` to its whitespace-stripped
/// identifier: `"Holy Cheese" * 2` -> `HolyCheese * 2`.
///
/// An unterminated trailing quote is left untouched; the evaluator will
/// reject it.
fn rewrite_labels(expr: &str) -> String {
    let mut rewritten = String::with_capacity(expr.len());
    let mut rest = expr;
    while let Some(start) = rest.find('"') {
        rewritten.push_str(&rest[..start]);
        let tail = &rest[start + 1..];
        match tail.find('"') {
            Some(end) => {
                rewritten.extend(tail[..end].chars().filter(|c| !c.is_whitespace()));
                rest = &tail[end + 1..];
            }
            None => {
                rest = &rest[start..];
                break;
            }
        }
    }
    rewritten.push_str(rest);
    rewritten
}

/// Evaluates `expr` against a per-row binding table.
///
/// Strict missing propagation: one unresolved binding poisons the whole
/// expression, whether or not the label is still referenced after rewriting.
/// Evaluator failures and non-finite results also yield `None`; nothing here
/// returns an error to the caller.
pub fn evaluate<E: ScalarEvaluator>(
    evaluator: &E,
    expr: &str,
    bindings: &BTreeMap<String, Option<f64>>,
) -> Option<f64> {
    let mut bound = HashMap::with_capacity(bindings.len());
    for (label, value) in bindings {
        bound.insert(identifier(label), (*value)?);
    }

    match evaluator.evaluate(&rewrite_labels(expr), &bound) {
        Ok(value) if value.is_finite() => Some(value),
        Ok(value) => {
            tracing::debug!(expr, value, "expression produced a non-finite value");
            None
        }
        Err(error) => {
            tracing::debug!(expr, %error, "expression evaluation failed");
            None
        }
    }
}

/// Dry-run check that `expr` evaluates to a finite number with every
/// referenced label bound to zero.
///
/// The zero binding deliberately trips expressions that divide by a
/// label-only denominator, so they are rejected at validation time instead of
/// degrading every plotted row.
pub fn numeric_output_is_valid<E: ScalarEvaluator>(evaluator: &E, expr: &str) -> bool {
    let bound: HashMap<String, f64> = expr::labels(expr)
        .into_iter()
        .map(|label| (identifier(&label), 0.0))
        .collect();

    match evaluator.evaluate(&rewrite_labels(expr), &bound) {
        Ok(value) => value.is_finite(),
        Err(error) => {
            tracing::debug!(expr, %error, "trial evaluation failed");
            false
        }
    }
}
