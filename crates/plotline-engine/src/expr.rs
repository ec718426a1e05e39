//! Expression syntax checks and label extraction.
//!
//! Expressions are user-typed one-liners such as `("Cheese" - "Milk" * 2)`,
//! where every `"..."` pair references another line by label. These checks
//! are pure and total; they never allocate an error.

/// True iff every character of `expr` is in the allowed alphabet:
/// ASCII letters, digits, `+ - * / ( ) "` and space.
#[must_use]
pub fn allowed_characters(expr: &str) -> bool {
    expr.chars().all(|c| {
        c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '*' | '/' | '(' | ')' | '"' | ' ')
    })
}

/// True iff `expr` contains an even number of `"` characters.
///
/// Parity is the only pairing guarantee checked here; nesting is impossible
/// since the quote character cannot be escaped.
#[must_use]
pub fn balanced_quotes(expr: &str) -> bool {
    expr.chars().filter(|&c| c == '"').count() % 2 == 0
}

/// The content of every `"..."` pair in `expr`, left to right, duplicates
/// preserved.
///
/// Assumes quote parity has already been validated; a trailing unterminated
/// quote contributes nothing.
#[must_use]
pub fn labels(expr: &str) -> Vec<String> {
    let mut labels = Vec::new();
    let mut rest = expr;
    while let Some(start) = rest.find('"') {
        let tail = &rest[start + 1..];
        let Some(end) = tail.find('"') else {
            break;
        };
        labels.push(tail[..end].to_string());
        rest = &tail[end + 1..];
    }
    labels
}
