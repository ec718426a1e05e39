#![no_main]

use libfuzzer_sys::fuzz_target;
use plotline_engine::{expr, ArithmeticEvaluator, LineEngine};
use plotline_model::Line;

/// Expressions are user-typed one-liners; cap the harness input so lexing
/// stays bounded even before the parser's own nesting limit kicks in.
const MAX_EXPR_CHARS: usize = 4_096;

fn truncate_to_chars(s: &str, max_chars: usize) -> &str {
    let mut count = 0usize;
    for (idx, _) in s.char_indices() {
        if count == max_chars {
            return &s[..idx];
        }
        count += 1;
    }
    s
}

fuzz_target!(|data: &[u8]| {
    // Accept arbitrary bytes as input; treat invalid UTF-8 lossy.
    let input = String::from_utf8_lossy(data);
    let formula = truncate_to_chars(&input, MAX_EXPR_CHARS);

    // Syntax checks and extraction are total; they must never panic.
    let _ = expr::allowed_characters(formula);
    let _ = expr::balanced_quotes(formula);
    let labels = expr::labels(formula);

    // Drive the whole validation path: the extracted labels double as item
    // lines so label-existence passes and the walk reaches the trial
    // evaluation.
    let engine = LineEngine::with_evaluator(ArithmeticEvaluator);
    let mut lines: Vec<Line> = labels
        .iter()
        .map(|label| {
            Line::item(
                plotline_model::MarketTable::Ask,
                label.clone(),
                label.clone(),
                0.0,
                5000.0,
            )
        })
        .collect();
    lines.push(Line::expression(formula, "fuzzed", -5000.0, 5000.0));

    let _ = engine.validate_lines(&lines);
    let _ = engine.market_query(&lines);
});
