//! Pulling JSON candidates out of surrounding prose.
//!
//! Model responses wrap their payload in explanations, markdown fences,
//! status objects, and apologies. The two extractors here cut the text
//! into spans worth handing to the JSON parser; deciding whether a span
//! is actually a document happens elsewhere.

/// Inner text of every markdown code fence, in order. The opening
/// fence's language tag (```` ```json ````) is not part of the block.
/// An unterminated fence yields everything to the end of the input.
pub fn fenced_blocks(input: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut rest = input;
    while let Some(open) = rest.find("```") {
        let after_fence = &rest[open + 3..];
        // The language tag runs to the end of the fence line.
        let body_start = match after_fence.find('\n') {
            Some(newline) => newline + 1,
            None => {
                blocks.push("");
                return blocks;
            }
        };
        let body = &after_fence[body_start..];
        match body.find("```") {
            Some(close) => {
                blocks.push(&body[..close]);
                rest = &body[close + 3..];
            }
            None => {
                blocks.push(body);
                return blocks;
            }
        }
    }
    blocks
}

/// Candidate object spans found by brace matching.
pub struct ObjectCandidates<'a> {
    /// Balanced `{...}` spans, outermost first, in source order.
    pub balanced: Vec<&'a str>,
    /// Tails from every `{` whose brace never closes, in source order.
    /// Non-empty when the input looks truncated mid-object; only a
    /// repair pass can make anything of these.
    pub truncated_tails: Vec<&'a str>,
}

/// Scans every `{` in the input and pairs it with its matching `}`,
/// tracking JSON string and escape state so braces inside string
/// values do not count. Unmatched opens contribute truncated tails
/// instead.
pub fn object_candidates(input: &str) -> ObjectCandidates<'_> {
    let mut balanced = Vec::new();
    let mut truncated_tails = Vec::new();
    for (start, _) in input.match_indices('{') {
        match balanced_end(&input[start..]) {
            Some(len) => balanced.push(&input[start..start + len]),
            None => truncated_tails.push(&input[start..]),
        }
    }
    ObjectCandidates {
        balanced,
        truncated_tails,
    }
}

/// Length of the balanced object starting at the front of `s`, which
/// must begin with `{`. `None` when the closing brace never arrives.
fn balanced_end(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, ch) in s.char_indices() {
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
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + ch.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fences_yield_their_inner_text() {
        let input = "Here you go:\n```json\n{\"a\": 1}\n```\nand a bare one\n```\nplain\n```\n";
        let blocks = fenced_blocks(input);
        assert_eq!(blocks, vec!["{\"a\": 1}\n", "plain\n"]);
    }

    #[test]
    fn an_unterminated_fence_runs_to_the_end() {
        let input = "```json\n{\"cut\": ";
        assert_eq!(fenced_blocks(input), vec!["{\"cut\": "]);
    }

    #[test]
    fn prose_without_fences_yields_nothing() {
        assert!(fenced_blocks("no code here").is_empty());
    }

    #[test]
    fn balanced_objects_are_found_in_order() {
        let input = r#"first {"a": {"b": 1}} then {"c": 2}"#;
        let found = object_candidates(input);
        assert_eq!(
            found.balanced,
            vec![r#"{"a": {"b": 1}}"#, r#"{"b": 1}"#, r#"{"c": 2}"#]
        );
        assert!(found.truncated_tails.is_empty());
    }

    #[test]
    fn braces_inside_strings_do_not_count() {
        let input = r#"{"text": "a } inside", "n": 1}"#;
        let found = object_candidates(input);
        assert_eq!(found.balanced, vec![input]);
    }

    #[test]
    fn escaped_quotes_keep_string_state_straight() {
        let input = r#"{"text": "quote \" then } still inside"}"#;
        let found = object_candidates(input);
        assert_eq!(found.balanced, vec![input]);
    }

    #[test]
    fn a_truncated_object_becomes_a_tail() {
        let input = r#"prefix {"a": 1, "b": {"c": 2}"#;
        let found = object_candidates(input);
        // The inner object closes; the outer one never does.
        assert_eq!(found.balanced, vec![r#"{"c": 2}"#]);
        assert_eq!(found.truncated_tails, vec![r#"{"a": 1, "b": {"c": 2}"#]);
    }

    #[test]
    fn a_stray_brace_cannot_shadow_a_later_truncated_object() {
        let input = "set {X} aside... {\"version\": 1, \"headAttributes\": {}";
        let found = object_candidates(input);
        assert_eq!(found.balanced, vec!["{X}", "{}"]);
        assert_eq!(
            found.truncated_tails,
            vec!["{\"version\": 1, \"headAttributes\": {}"]
        );
    }
}
