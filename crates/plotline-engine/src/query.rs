//! Query synthesis for the external tabular data source.
//!
//! Expressions never reach the data source: only item columns are selected,
//! range-clamped to the missing sentinel, and the arithmetic is deferred to
//! the hydration pipeline. Labels and item names come from a validated
//! configuration, so no quoting beyond the source's identifier quotes is
//! applied.

use plotline_model::{Line, MarketTable, QueryResponse, MISSING_SENTINEL, TIME_COLUMN};

/// Builds the multi-statement query for the given line set: one `SELECT` per
/// market table owning at least one named item line, each row carrying a
/// formatted time column plus one clamped column per item.
///
/// A line set with no named item lines synthesizes an empty string.
#[must_use]
pub fn market_query(lines: &[Line]) -> String {
    let statements: Vec<String> = MarketTable::ALL
        .into_iter()
        .filter_map(|table| table_statement(table, lines))
        .collect();

    let query = statements.join("; ");
    tracing::debug!(%query, "synthesized market query");
    query
}

fn table_statement(table: MarketTable, lines: &[Line]) -> Option<String> {
    let mut selections = vec![format!(
        r#"DATETIME({table}.time, "unixepoch") AS {TIME_COLUMN}"#
    )];

    let items = lines
        .iter()
        .filter(|line| line.table() == Some(table) && !line.value().is_empty());
    let mut any = false;
    for line in items {
        selections.push(clamped_column(line));
        any = true;
    }
    if !any {
        return None;
    }

    Some(format!("SELECT {} FROM {table}", selections.join(", ")))
}

/// Wraps an item column in a conditional clamp: raw values outside the line's
/// bounds come back as the missing sentinel instead of a price.
fn clamped_column(line: &Line) -> String {
    let item = line.value();
    format!(
        r#"CASE WHEN "{item}" > {max} OR "{item}" < {min} THEN {MISSING_SENTINEL} ELSE "{item}" END AS "{label}""#,
        min = line.min,
        max = line.max,
        label = line.label,
    )
}

/// One-row probe used to discover which items a table carries.
#[must_use]
pub fn item_discovery_query(table: MarketTable) -> String {
    format!("SELECT * FROM {table} LIMIT 1")
}

/// Item names offered by a discovery probe: every column after the leading
/// time column.
#[must_use]
pub fn item_names(response: &QueryResponse) -> Vec<String> {
    response.columns.iter().skip(1).cloned().collect()
}
