//! `plotline-model` defines the shared data model for market line plots.
//!
//! The crate is intentionally self-contained so it can be reused by:
//! - the line engine (validation, dependency resolution, evaluation)
//! - the configuration layer that edits line sets
//! - presentation layers consuming hydrated responses via `serde`

mod line;
mod response;

pub use line::{Line, LineKind, MarketTable, TableParseError};
pub use response::{Datum, QueryResponse, Row, MISSING_SENTINEL, TIME_COLUMN};
