use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The physical market table an item line reads from.
///
/// The data source keeps one price table per side of the order book; every
/// item line is pinned to exactly one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketTable {
    Ask,
    Bid,
}

impl MarketTable {
    pub const ALL: [MarketTable; 2] = [MarketTable::Ask, MarketTable::Bid];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MarketTable::Ask => "ask",
            MarketTable::Bid => "bid",
        }
    }
}

impl fmt::Display for MarketTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown market table '{0}', expected 'ask' or 'bid'")]
pub struct TableParseError(String);

impl FromStr for MarketTable {
    type Err = TableParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ask" => Ok(MarketTable::Ask),
            "bid" => Ok(MarketTable::Bid),
            other => Err(TableParseError(other.to_string())),
        }
    }
}

/// What a line plots: a literal source column or a derived expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LineKind {
    /// A single item read straight from a market table column.
    Item { table: MarketTable, item: String },
    /// An arithmetic expression over other lines, referenced by quoted label.
    Expression { formula: String },
}

/// A named, user-configured data series.
///
/// `label` is the output column name for this line and the token other
/// expressions quote to reference it. Resolved values outside the inclusive
/// `[min, max]` range are treated as missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    #[serde(flatten)]
    pub kind: LineKind,
    pub label: String,
    pub min: f64,
    pub max: f64,
}

impl Line {
    pub fn item(
        table: MarketTable,
        item: impl Into<String>,
        label: impl Into<String>,
        min: f64,
        max: f64,
    ) -> Self {
        Self {
            kind: LineKind::Item {
                table,
                item: item.into(),
            },
            label: label.into(),
            min,
            max,
        }
    }

    pub fn expression(
        formula: impl Into<String>,
        label: impl Into<String>,
        min: f64,
        max: f64,
    ) -> Self {
        Self {
            kind: LineKind::Expression {
                formula: formula.into(),
            },
            label: label.into(),
            min,
            max,
        }
    }

    #[must_use]
    pub fn is_item(&self) -> bool {
        matches!(self.kind, LineKind::Item { .. })
    }

    #[must_use]
    pub fn is_expression(&self) -> bool {
        matches!(self.kind, LineKind::Expression { .. })
    }

    /// The expression text, if this line is derived.
    #[must_use]
    pub fn formula(&self) -> Option<&str> {
        match &self.kind {
            LineKind::Expression { formula } => Some(formula),
            LineKind::Item { .. } => None,
        }
    }

    /// The market table this line reads from, if it is an item line.
    #[must_use]
    pub fn table(&self) -> Option<MarketTable> {
        match &self.kind {
            LineKind::Item { table, .. } => Some(*table),
            LineKind::Expression { .. } => None,
        }
    }

    /// The user-entered payload: the item name for item lines, the raw
    /// expression text for expression lines.
    #[must_use]
    pub fn value(&self) -> &str {
        match &self.kind {
            LineKind::Item { item, .. } => item,
            LineKind::Expression { formula } => formula,
        }
    }

    /// Whether the resolved `value` lies within this line's inclusive bounds.
    #[must_use]
    pub fn in_bounds(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}
