//! Row hydration: raw query rows -> fully resolved plot rows.
//!
//! Each row passes through three stages: the raw row as the data source
//! returned it, a null-normalized row where the missing sentinel becomes
//! [`Datum::Missing`], and finally the expression-resolved row with one
//! trailing column per expression line, computed in dependency-safe order.

use std::collections::{BTreeMap, HashMap};

use plotline_model::{Datum, Line, QueryResponse, Row, MISSING_SENTINEL, TIME_COLUMN};

use crate::eval::{self, ScalarEvaluator};
use crate::{expr, graph};

/// Resolves every expression line over every row of `raw`.
///
/// Output columns are `time` followed by the safe-order labels: item lines in
/// their configured order, then expression lines after everything they depend
/// on. Every configured line gets a column; items the raw response does not
/// carry (for example the other table's statement) hydrate as missing, as do
/// the expressions depending on them.
#[must_use]
pub fn hydrate<E: ScalarEvaluator>(
    evaluator: &E,
    lines: &[Line],
    raw: &QueryResponse,
) -> QueryResponse {
    let order = graph::safe_evaluation_order(lines);

    let mut columns = Vec::with_capacity(order.len() + 1);
    columns.push(TIME_COLUMN.to_string());
    columns.extend(order.iter().map(|line| line.label.clone()));

    tracing::debug!(
        rows = raw.values.len(),
        lines = order.len(),
        "hydrating query response"
    );

    let values = raw
        .values
        .iter()
        .map(|row| hydrate_row(evaluator, &order, raw, row))
        .collect();

    QueryResponse { columns, values }
}

fn hydrate_row<E: ScalarEvaluator>(
    evaluator: &E,
    order: &[&Line],
    raw: &QueryResponse,
    row: &Row,
) -> Row {
    // The time marker passes through untouched; it is never an operand.
    let time = row.first().cloned().unwrap_or(Datum::Missing);

    let mut hydrated = Vec::with_capacity(order.len() + 1);
    hydrated.push(time);

    // Per-row binding source: label -> resolved value. First occurrence wins
    // for out-of-contract duplicate labels.
    let mut resolved: HashMap<&str, Option<f64>> = HashMap::with_capacity(order.len());

    for line in order {
        let value = if let Some(formula) = line.formula() {
            resolve_expression(evaluator, line, formula, &resolved)
        } else {
            item_value(line, raw, row)
        };

        resolved.entry(line.label.as_str()).or_insert(value);
        hydrated.push(Datum::from(value));
    }

    hydrated
}

/// Looks an item line's value up in the raw row and normalizes it: the
/// sentinel, SQL nulls, absent columns, and non-numeric cells all become
/// missing. Range clamping already happened inside the query.
fn item_value(line: &Line, raw: &QueryResponse, row: &Row) -> Option<f64> {
    let cell = raw.column_index(&line.label).and_then(|index| row.get(index))?;
    cell.as_number().filter(|value| *value != MISSING_SENTINEL)
}

/// Evaluates one expression line against the values resolved so far, then
/// clamps the result to the line's bounds.
fn resolve_expression<E: ScalarEvaluator>(
    evaluator: &E,
    line: &Line,
    formula: &str,
    resolved: &HashMap<&str, Option<f64>>,
) -> Option<f64> {
    let bindings: BTreeMap<String, Option<f64>> = expr::labels(formula)
        .into_iter()
        .map(|label| {
            let value = resolved.get(label.as_str()).copied().flatten();
            (label, value)
        })
        .collect();

    eval::evaluate(evaluator, formula, &bindings).filter(|value| line.in_bounds(*value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::ArithmeticEvaluator;
    use plotline_model::MarketTable;
    use pretty_assertions::assert_eq;

    fn raw(columns: &[&str], rows: Vec<Row>) -> QueryResponse {
        QueryResponse::new(columns.iter().map(|c| c.to_string()).collect(), rows)
    }

    fn t(marker: &str) -> Datum {
        Datum::from(marker)
    }

    #[test]
    fn normalizes_the_sentinel_to_missing() {
        let lines = vec![Line::item(MarketTable::Ask, "Milk", "Milk", 0.0, 5000.0)];
        let response = hydrate(
            &ArithmeticEvaluator,
            &lines,
            &raw(
                &["time", "Milk"],
                vec![
                    vec![t("t0"), Datum::from(20.0)],
                    vec![t("t1"), Datum::from(MISSING_SENTINEL)],
                    vec![t("t2"), Datum::Missing],
                ],
            ),
        );

        assert_eq!(response.columns, ["time", "Milk"]);
        assert_eq!(
            response.values,
            vec![
                vec![t("t0"), Datum::from(20.0)],
                vec![t("t1"), Datum::Missing],
                vec![t("t2"), Datum::Missing],
            ]
        );
    }

    #[test]
    fn resolves_expressions_from_item_columns() {
        let lines = vec![
            Line::item(MarketTable::Ask, "Holy Cheese", "Cheese", 0.0, 5000.0),
            Line::item(MarketTable::Ask, "Holy Milk", "Milk", 0.0, 5000.0),
            Line::expression(r#"("Cheese" - "Milk" * 2)"#, "Margin", -5000.0, 5000.0),
        ];

        let response = hydrate(
            &ArithmeticEvaluator,
            &lines,
            &raw(
                &["time", "Cheese", "Milk"],
                vec![vec![t("t0"), Datum::from(100.0), Datum::from(20.0)]],
            ),
        );

        assert_eq!(response.columns, ["time", "Cheese", "Milk", "Margin"]);
        assert_eq!(
            response.values,
            vec![vec![
                t("t0"),
                Datum::from(100.0),
                Datum::from(20.0),
                Datum::from(60.0),
            ]]
        );
    }

    #[test]
    fn missing_items_poison_dependent_expressions() {
        let lines = vec![
            Line::item(MarketTable::Ask, "Holy Cheese", "Cheese", 0.0, 5000.0),
            Line::item(MarketTable::Ask, "Holy Milk", "Milk", 0.0, 5000.0),
            Line::expression(r#"("Cheese" - "Milk" * 2)"#, "Margin", -5000.0, 5000.0),
        ];

        let response = hydrate(
            &ArithmeticEvaluator,
            &lines,
            &raw(
                &["time", "Cheese", "Milk"],
                vec![vec![t("t0"), Datum::from(MISSING_SENTINEL), Datum::from(20.0)]],
            ),
        );

        assert_eq!(
            response.values,
            vec![vec![t("t0"), Datum::Missing, Datum::from(20.0), Datum::Missing]]
        );
    }

    #[test]
    fn an_all_sentinel_row_hydrates_fully_missing() {
        let lines = vec![
            Line::item(MarketTable::Ask, "Cheese", "Cheese", 0.0, 5000.0),
            Line::item(MarketTable::Ask, "Milk", "Milk", 0.0, 5000.0),
            Line::expression(r#""Cheese" + "Milk""#, "Total", 0.0, 10000.0),
        ];

        let response = hydrate(
            &ArithmeticEvaluator,
            &lines,
            &raw(
                &["time", "Cheese", "Milk"],
                vec![vec![
                    t("t0"),
                    Datum::from(MISSING_SENTINEL),
                    Datum::from(MISSING_SENTINEL),
                ]],
            ),
        );

        assert_eq!(
            response.values,
            vec![vec![t("t0"), Datum::Missing, Datum::Missing, Datum::Missing]]
        );
    }

    #[test]
    fn out_of_range_expression_results_are_missing() {
        let lines = vec![
            Line::item(MarketTable::Ask, "Cheese", "Cheese", 0.0, 5000.0),
            Line::expression(r#""Cheese" * 3"#, "Tripled", 0.0, 250.0),
        ];

        let response = hydrate(
            &ArithmeticEvaluator,
            &lines,
            &raw(
                &["time", "Cheese"],
                vec![
                    vec![t("t0"), Datum::from(50.0)],
                    vec![t("t1"), Datum::from(100.0)],
                ],
            ),
        );

        assert_eq!(
            response.values,
            vec![
                vec![t("t0"), Datum::from(50.0), Datum::from(150.0)],
                // 300 lies outside [0, 250]; the arithmetic succeeded anyway.
                vec![t("t1"), Datum::from(100.0), Datum::Missing],
            ]
        );
    }

    #[test]
    fn zero_is_a_value_not_a_gap() {
        let lines = vec![
            Line::item(MarketTable::Ask, "Cheese", "Cheese", 0.0, 5000.0),
            Line::expression(r#""Cheese" - "Cheese""#, "Flat", -10.0, 10.0),
        ];

        let response = hydrate(
            &ArithmeticEvaluator,
            &lines,
            &raw(&["time", "Cheese"], vec![vec![t("t0"), Datum::from(7.0)]]),
        );

        assert_eq!(
            response.values,
            vec![vec![t("t0"), Datum::from(7.0), Datum::from(0.0)]]
        );
    }

    #[test]
    fn chained_expressions_read_earlier_results_never_forward() {
        let lines = vec![
            Line::item(MarketTable::Ask, "Cheese", "Cheese", 0.0, 5000.0),
            Line::expression(r#""Doubled" + 1"#, "Plus", 0.0, 5000.0),
            Line::expression(r#""Cheese" * 2"#, "Doubled", 0.0, 5000.0),
        ];

        let response = hydrate(
            &ArithmeticEvaluator,
            &lines,
            &raw(&["time", "Cheese"], vec![vec![t("t0"), Datum::from(10.0)]]),
        );

        // Safe order evaluates Doubled before Plus even though the
        // configuration lists them the other way around.
        assert_eq!(response.columns, ["time", "Cheese", "Doubled", "Plus"]);
        assert_eq!(
            response.values,
            vec![vec![
                t("t0"),
                Datum::from(10.0),
                Datum::from(20.0),
                Datum::from(21.0),
            ]]
        );
    }

    #[test]
    fn items_absent_from_this_response_hydrate_missing() {
        // The bid statement's columns are not in the ask response.
        let lines = vec![
            Line::item(MarketTable::Ask, "Cheese", "Cheese", 0.0, 5000.0),
            Line::item(MarketTable::Bid, "Milk", "Milk", 0.0, 5000.0),
            Line::expression(r#""Cheese" + "Milk""#, "Total", 0.0, 10000.0),
        ];

        let response = hydrate(
            &ArithmeticEvaluator,
            &lines,
            &raw(&["time", "Cheese"], vec![vec![t("t0"), Datum::from(5.0)]]),
        );

        assert_eq!(response.columns, ["time", "Cheese", "Milk", "Total"]);
        assert_eq!(
            response.values,
            vec![vec![t("t0"), Datum::from(5.0), Datum::Missing, Datum::Missing]]
        );
    }

    #[test]
    fn hydration_is_idempotent_over_reruns() {
        let lines = vec![
            Line::item(MarketTable::Ask, "Cheese", "Cheese", 0.0, 5000.0),
            Line::expression(r#""Cheese" * 2"#, "Doubled", 0.0, 10000.0),
        ];
        let input = raw(&["time", "Cheese"], vec![vec![t("t0"), Datum::from(3.0)]]);

        let first = hydrate(&ArithmeticEvaluator, &lines, &input);
        let second = hydrate(&ArithmeticEvaluator, &lines, &input);
        assert_eq!(first, second);
    }
}
