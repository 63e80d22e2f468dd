//! Mechanical JSON repair for almost-valid candidates.
//!
//! Two defects dominate real model output: trailing commas and
//! truncation (the response was cut off mid-object or mid-string).
//! Both are fixable without guessing at content, so [`repair`] fixes
//! exactly those and nothing else. Clean input passes through
//! byte-identical, which makes the pass safe to apply unconditionally.

/// Trailing-comma strip, delimiter close, and a second strip for the
/// commas the close exposes (`{"a": 1,` closes to `{"a": 1,}` first).
pub fn repair(input: &str) -> String {
    let stripped = strip_trailing_commas(input);
    let closed = close_delimiters(&stripped);
    strip_trailing_commas(&closed)
}

/// Removes commas that sit directly before a closing brace or bracket,
/// whitespace allowed in between. String contents are untouched.
fn strip_trailing_commas(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_string = false;
    let mut escaped = false;
    for (i, ch) in input.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            out.push(ch);
            continue;
        }
        match ch {
            '"' => {
                in_string = true;
                out.push(ch);
            }
            ',' => {
                let next_significant = input[i + 1..].chars().find(|c| !c.is_whitespace());
                match next_significant {
                    Some('}') | Some(']') => {}
                    _ => out.push(ch),
                }
            }
            _ => out.push(ch),
        }
    }
    out
}

/// Closes whatever is still open at end-of-input: first an unterminated
/// string, then every unmatched brace and bracket, innermost first. A
/// string cut right after a backslash gets the backslash doubled so the
/// appended quote actually terminates it.
fn close_delimiters(input: &str) -> String {
    let mut expected = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    for ch in input.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => expected.push('}'),
            '[' => expected.push(']'),
            '}' | ']' => {
                if expected.last() == Some(&ch) {
                    expected.pop();
                }
            }
            _ => {}
        }
    }

    if expected.is_empty() && !in_string {
        return input.to_string();
    }
    let mut out = String::with_capacity(input.len() + expected.len() + 2);
    out.push_str(input);
    if in_string {
        if escaped {
            out.push('\\');
        }
        out.push('"');
    }
    while let Some(closer) = expected.pop() {
        out.push(closer);
    }
    out
}
