//! Per-line validation for the configuration layer.
//!
//! Checks run in a fixed priority order and the first failure wins, so the
//! configuration form always shows the most fundamental problem. Item lines
//! only need a value; every other check applies to expression lines.

use plotline_model::Line;
use serde::Serialize;
use thiserror::Error;

use crate::eval::{self, ScalarEvaluator};
use crate::{expr, graph};

/// Why a line failed validation. Display strings are the user-facing
/// messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineInvalid {
    #[error("lines must contain a value")]
    Required,
    #[error(r#"expressions may only contain numbers, letters, +, -, *, /, (, ), ", and spaces"#)]
    InvalidCharacters,
    #[error("expressions must have an even number of quotes")]
    UnbalancedQuotes,
    #[error("expressions must reference labels that exist in the current configuration")]
    NonexistentLabel,
    #[error("expressions must not contain circular references")]
    CircularReference,
    #[error("expressions must evaluate to a numerical value")]
    InvalidNumericOutput,
}

/// Validates one line against the full line set.
pub fn validate_line<E: ScalarEvaluator>(
    evaluator: &E,
    line: &Line,
    lines: &[Line],
) -> Result<(), LineInvalid> {
    if line.value().is_empty() {
        return Err(LineInvalid::Required);
    }

    // Item lines carry no expression; nothing further applies.
    let Some(formula) = line.formula() else {
        return Ok(());
    };

    if !expr::allowed_characters(formula) {
        return Err(LineInvalid::InvalidCharacters);
    }
    if !expr::balanced_quotes(formula) {
        return Err(LineInvalid::UnbalancedQuotes);
    }
    if !graph::labels_exist(&expr::labels(formula), lines) {
        return Err(LineInvalid::NonexistentLabel);
    }
    if graph::has_circular_reference(line, lines) {
        return Err(LineInvalid::CircularReference);
    }
    if !eval::numeric_output_is_valid(evaluator, formula) {
        return Err(LineInvalid::InvalidNumericOutput);
    }

    Ok(())
}

/// One line's validation outcome, keyed by label for the display layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineValidation {
    pub label: String,
    pub error: Option<LineInvalid>,
}

impl LineValidation {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }
}

/// Validates every line in the set.
///
/// A partially-invalid line set must not block unrelated lines, so each line
/// reports independently.
pub fn validate_lines<E: ScalarEvaluator>(evaluator: &E, lines: &[Line]) -> Vec<LineValidation> {
    lines
        .iter()
        .map(|line| LineValidation {
            label: line.label.clone(),
            error: validate_line(evaluator, line, lines).err(),
        })
        .collect()
}
