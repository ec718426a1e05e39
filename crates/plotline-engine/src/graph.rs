//! Dependency resolution among lines.
//!
//! Nodes are line labels; an expression line has one edge per quoted label in
//! its formula. Item lines are always leaves. Duplicate labels are
//! out-of-contract input: every lookup here resolves to the first line
//! carrying the label, and nothing panics.

use std::collections::{HashMap, HashSet};

use plotline_model::Line;

use crate::expr;

/// True iff every entry of `labels` names some line in `lines`.
#[must_use]
pub fn labels_exist(labels: &[String], lines: &[Line]) -> bool {
    labels
        .iter()
        .all(|label| lines.iter().any(|line| line.label == *label))
}

/// Outgoing reference edges, keyed by expression line label.
fn expression_edges(lines: &[Line]) -> HashMap<&str, Vec<String>> {
    let mut edges = HashMap::new();
    let mut seen = HashSet::new();
    for line in lines {
        if !seen.insert(line.label.as_str()) {
            // Duplicate label: the first occurrence already owns it.
            continue;
        }
        if let Some(formula) = line.formula() {
            edges.insert(line.label.as_str(), expr::labels(formula));
        }
    }
    edges
}

/// True iff a reference cycle is reachable from `line`.
///
/// Depth-first walk with explicit visited/on-stack sets instead of call-frame
/// recursion, so pathological line sets cannot overflow the stack. A label
/// reappearing on the active walk (including `line` referencing itself)
/// signals a cycle; labels that resolve to item lines or to nothing terminate
/// the walk.
#[must_use]
pub fn has_circular_reference(line: &Line, lines: &[Line]) -> bool {
    let edges = expression_edges(lines);

    let mut visited: HashSet<String> = HashSet::new();
    let mut on_stack: HashSet<String> = HashSet::new();
    // Each frame is (label, index of the next edge to follow).
    let mut stack: Vec<(String, usize)> = Vec::new();

    visited.insert(line.label.clone());
    on_stack.insert(line.label.clone());
    stack.push((line.label.clone(), 0));

    while let Some(frame) = stack.last_mut() {
        let label = frame.0.clone();
        let next = frame.1;
        frame.1 += 1;

        let target = edges
            .get(label.as_str())
            .and_then(|targets| targets.get(next));

        match target {
            Some(target) if on_stack.contains(target.as_str()) => return true,
            Some(target) => {
                if visited.insert(target.clone()) {
                    on_stack.insert(target.clone());
                    stack.push((target.clone(), 0));
                }
            }
            None => {
                on_stack.remove(&label);
                stack.pop();
            }
        }
    }

    false
}

/// Re-arranges `lines` so that every expression appears strictly after all
/// lines it transitively depends on.
///
/// Item lines come first, in their original order; expression lines follow in
/// memoized post-order, each placed exactly once. Assumes cycle-free input
/// (callers validate first); on cyclic input the order is unspecified but the
/// walk still terminates.
#[must_use]
pub fn safe_evaluation_order(lines: &[Line]) -> Vec<&Line> {
    let mut order: Vec<&Line> = lines.iter().filter(|line| line.is_item()).collect();
    let mut placed: HashSet<&str> = HashSet::new();

    for line in lines.iter().filter(|line| line.is_expression()) {
        place_expression(line, lines, &mut placed, &mut order);
    }

    order
}

fn place_expression<'a>(
    line: &'a Line,
    lines: &'a [Line],
    placed: &mut HashSet<&'a str>,
    order: &mut Vec<&'a Line>,
) {
    if !placed.insert(line.label.as_str()) {
        return;
    }

    if let Some(formula) = line.formula() {
        for label in expr::labels(formula) {
            let dependency = lines.iter().find(|candidate| candidate.label == label);
            if let Some(dependency) = dependency {
                if dependency.is_expression() {
                    place_expression(dependency, lines, placed, order);
                }
            }
        }
    }

    order.push(line);
}
