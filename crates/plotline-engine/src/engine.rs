use plotline_model::{Line, QueryResponse};

use crate::eval::{ArithmeticEvaluator, ScalarEvaluator};
use crate::validate::{self, LineInvalid, LineValidation};
use crate::{hydrate, query};

/// Facade bundling the engine's entry points around one injected evaluator.
///
/// The engine holds no other state: callers re-invoke `validate` /
/// `market_query` / `hydrate` whenever the line set changes, and concurrent
/// engines over different line sets are independent.
#[derive(Debug, Clone, Default)]
pub struct LineEngine<E = ArithmeticEvaluator> {
    evaluator: E,
}

impl LineEngine<ArithmeticEvaluator> {
    /// An engine backed by the built-in arithmetic evaluator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            evaluator: ArithmeticEvaluator,
        }
    }
}

impl<E: ScalarEvaluator> LineEngine<E> {
    /// An engine delegating scalar arithmetic to `evaluator`.
    pub fn with_evaluator(evaluator: E) -> Self {
        Self { evaluator }
    }

    /// Validates one line against the full set (`Err` carries the first
    /// failed check).
    pub fn validate_line(&self, line: &Line, lines: &[Line]) -> Result<(), LineInvalid> {
        validate::validate_line(&self.evaluator, line, lines)
    }

    /// Per-line validation report for the configuration layer.
    pub fn validate_lines(&self, lines: &[Line]) -> Vec<LineValidation> {
        validate::validate_lines(&self.evaluator, lines)
    }

    /// Query text to run against the market data source.
    pub fn market_query(&self, lines: &[Line]) -> String {
        query::market_query(lines)
    }

    /// Resolves every expression line over the raw rows of one query result.
    pub fn hydrate(&self, lines: &[Line], raw: &QueryResponse) -> QueryResponse {
        hydrate::hydrate(&self.evaluator, lines, raw)
    }
}
