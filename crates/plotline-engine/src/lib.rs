#![forbid(unsafe_code)]

//! Line dependency & expression evaluation engine for market plots.
//!
//! A line set mixes literal item columns with derived arithmetic expressions
//! that reference other lines by quoted label. This crate validates those
//! expressions, resolves their reference graph, synthesizes the query that
//! fetches the raw item columns, and hydrates each returned row by
//! evaluating every expression in dependency-safe order with strict
//! missing-value propagation.
//!
//! The scalar arithmetic itself is an injected capability (see
//! [`ScalarEvaluator`]); [`ArithmeticEvaluator`] is the built-in
//! implementation. Everything here is synchronous and purely functional over
//! its inputs: no I/O, no shared mutable state, and re-running any entry
//! point over the same inputs yields identical output.

mod engine;
pub mod eval;
pub mod expr;
pub mod graph;
pub mod hydrate;
pub mod query;
pub mod validate;

pub use engine::LineEngine;
pub use eval::{ArithmeticEvaluator, EvalError, ScalarEvaluator};
pub use validate::{LineInvalid, LineValidation};
