use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of the leading time column in every query response.
pub const TIME_COLUMN: &str = "time";

/// Reserved numeric marker the synthesized queries emit for values the data
/// source could not supply in range. Rewritten to [`Datum::Missing`] during
/// hydration; never a legitimate price.
pub const MISSING_SENTINEL: f64 = -1.0;

/// One response cell.
///
/// `Missing` is data, not an error: it is distinct from zero, serializes as
/// JSON `null`, and propagates through every expression depending on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Datum {
    Number(f64),
    Text(String),
    Missing,
}

impl Datum {
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Datum::Missing)
    }

    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Datum::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<f64> for Datum {
    fn from(value: f64) -> Self {
        Datum::Number(value)
    }
}

impl From<&str> for Datum {
    fn from(value: &str) -> Self {
        Datum::Text(value.to_string())
    }
}

impl From<Option<f64>> for Datum {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(n) => Datum::Number(n),
            None => Datum::Missing,
        }
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datum::Number(n) => write!(f, "{n}"),
            Datum::Text(s) => f.write_str(s),
            Datum::Missing => f.write_str(""),
        }
    }
}

pub type Row = Vec<Datum>;

/// A tabular result: raw rows from the data source, or the hydrated output
/// handed to the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub columns: Vec<String>,
    pub values: Vec<Row>,
}

impl QueryResponse {
    #[must_use]
    pub fn new(columns: Vec<String>, values: Vec<Row>) -> Self {
        Self { columns, values }
    }

    /// Index of `label` in the column header, first occurrence winning.
    #[must_use]
    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_is_not_zero() {
        assert!(Datum::Missing.is_missing());
        assert!(!Datum::Number(0.0).is_missing());
        assert_eq!(Datum::Number(0.0).as_number(), Some(0.0));
        assert_eq!(Datum::Missing.as_number(), None);
    }

    #[test]
    fn column_lookup_prefers_first_occurrence() {
        let response = QueryResponse::new(
            vec!["time".into(), "Milk".into(), "Milk".into()],
            Vec::new(),
        );
        assert_eq!(response.column_index("Milk"), Some(1));
        assert_eq!(response.column_index("Cheese"), None);
    }
}
