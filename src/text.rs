//! Character-budget helpers shared by the prompt builder and the retry loop.
//!
//! All truncation is in characters, not bytes, so multi-byte UTF-8 output
//! from the completion service never splits a code point.

/// Returns at most the first `max_chars` characters of `s`.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Returns at most the last `max_chars` characters of `s`.
///
/// Used for diagnostic tails: compiler output grows from the top, but the
/// actionable errors sit at the bottom.
pub fn tail_chars(s: &str, max_chars: usize) -> &str {
    let total = s.chars().count();
    if total <= max_chars {
        return s;
    }
    let skip = total - max_chars;
    match s.char_indices().nth(skip) {
        Some((idx, _)) => &s[idx..],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_shorter_input_unchanged() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("", 5), "");
    }

    #[test]
    fn test_truncate_cuts_at_char_boundary() {
        assert_eq!(truncate_chars("hello world", 5), "hello");
        // Multi-byte characters count as one each.
        assert_eq!(truncate_chars("héllo", 2), "hé");
    }

    #[test]
    fn test_tail_keeps_last_chars() {
        assert_eq!(tail_chars("hello world", 5), "world");
        assert_eq!(tail_chars("short", 100), "short");
        assert_eq!(tail_chars("héllo", 4), "éllo");
    }

    #[test]
    fn test_tail_zero_budget() {
        assert_eq!(tail_chars("anything", 0), "");
    }
}
