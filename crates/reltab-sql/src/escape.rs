//! SQL string literal escaping.

/// Escape a string for embedding in a single-quoted SQL literal.
/// Backslashes, single quotes and newlines are escaped, in that order of
/// concern; everything else passes through untouched.
pub fn escape_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out
}

/// Wrap a string in single quotes, escaped.
pub fn quote_string(text: &str) -> String {
    format!("'{}'", escape_string(text))
}
