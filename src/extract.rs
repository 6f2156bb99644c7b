//! Code extractor
//!
//! Pulls an embedded Scrypto source block out of a free-text completion
//! response. Recognizers are tried most-specific-first; a candidate block is
//! accepted only if it passes the language signature check, which guards
//! against mistaking prose for code. When no fenced block qualifies but the
//! whole response reads as Scrypto, the full response is taken verbatim:
//! models frequently omit the fences entirely.

use regex::Regex;
use std::sync::OnceLock;

/// Tokens whose presence marks text as plausibly Scrypto source.
const SIGNATURE_TOKENS: [&str; 7] = [
    "use scrypto::prelude::*",
    "#[blueprint]",
    "impl",
    "ResourceAddress",
    "ComponentAddress",
    "Bucket",
    "Vault",
];

/// Ordered fence recognizers, most to least specific. Each is a named pure
/// pattern so individual strategies stay unit-testable.
const RECOGNIZER_PATTERNS: [(&str, &str); 5] = [
    ("rust_fence", r"(?s)```rust\n(.*?)\n```"),
    ("scrypto_fence", r"(?s)```scrypto\n(.*?)\n```"),
    ("bare_fence", r"(?s)```\n(.*?)\n```"),
    ("rust_fence_inline", r"(?s)```rust(.*?)```"),
    ("any_fence", r"(?s)```(.*?)```"),
];

fn recognizers() -> &'static [(&'static str, Regex)] {
    static RECOGNIZERS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    RECOGNIZERS.get_or_init(|| {
        RECOGNIZER_PATTERNS
            .iter()
            .map(|(name, pattern)| (*name, Regex::new(pattern).expect("valid regex")))
            .collect()
    })
}

/// Heuristic acceptance test: does `text` plausibly belong to the target
/// contract language?
pub fn looks_like_scrypto(text: &str) -> bool {
    SIGNATURE_TOKENS.iter().any(|token| text.contains(token))
}

/// Extracts a source block from a completion response.
///
/// Returns `None` when no fenced block passes the signature check and the
/// response as a whole does not either. Idempotent.
pub fn extract_code(response: &str) -> Option<String> {
    for (_name, re) in recognizers() {
        if let Some(captures) = re.captures(response) {
            if let Some(block) = captures.get(1) {
                let code = block.as_str().trim();
                if !code.is_empty() && looks_like_scrypto(code) {
                    return Some(code.to_string());
                }
            }
        }
    }

    // Fallback: the whole response may be unfenced code.
    if looks_like_scrypto(response) {
        return Some(response.trim().to_string());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLUEPRINT: &str = "use scrypto::prelude::*;\n\n#[blueprint]\nmod hello {\n    struct Hello {\n        greeting: String,\n    }\n}";

    #[test]
    fn test_rust_fence_preferred() {
        let response = format!("Here is the code:\n```rust\n{}\n```\nEnjoy!", BLUEPRINT);
        assert_eq!(extract_code(&response), Some(BLUEPRINT.to_string()));
    }

    #[test]
    fn test_scrypto_fence_recognized() {
        let response = format!("```scrypto\n{}\n```", BLUEPRINT);
        assert_eq!(extract_code(&response), Some(BLUEPRINT.to_string()));
    }

    #[test]
    fn test_bare_fence_recognized() {
        let response = format!("```\n{}\n```", BLUEPRINT);
        assert_eq!(extract_code(&response), Some(BLUEPRINT.to_string()));
    }

    #[test]
    fn test_inline_rust_fence_recognized() {
        let response = format!("```rust{}```", BLUEPRINT);
        assert_eq!(extract_code(&response), Some(BLUEPRINT.to_string()));
    }

    #[test]
    fn test_whole_response_fallback() {
        // No fences at all, but clearly Scrypto.
        assert_eq!(extract_code(BLUEPRINT), Some(BLUEPRINT.to_string()));
    }

    #[test]
    fn test_prose_rejected() {
        let response = "I'm sorry, I cannot generate that contract for you.";
        assert_eq!(extract_code(response), None);
    }

    #[test]
    fn test_fenced_prose_rejected() {
        let response = "```\njust some notes, no contract here\n```";
        assert_eq!(extract_code(response), None);
    }

    #[test]
    fn test_empty_fence_falls_through() {
        // An empty first fence never matches; the cascade ends at the
        // whole-response fallback because the signature check still passes.
        let response = format!("```rust\n\n```\nActual code follows:\n{}", BLUEPRINT);
        assert_eq!(extract_code(&response), Some(response.trim().to_string()));
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let response = format!("```rust\n{}\n```", BLUEPRINT);
        let first = extract_code(&response);
        let second = extract_code(&response);
        assert_eq!(first, second);

        let none_response = "no code here";
        assert_eq!(extract_code(none_response), extract_code(none_response));
    }

    #[test]
    fn test_cascade_keeps_every_recognizer_in_order() {
        let names: Vec<&str> = recognizers().iter().map(|(name, _)| *name).collect();
        let expected: Vec<&str> = RECOGNIZER_PATTERNS.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_signature_check() {
        assert!(looks_like_scrypto("use scrypto::prelude::*;"));
        assert!(looks_like_scrypto("let v: Vault = Vault::new(addr);"));
        assert!(!looks_like_scrypto("the quick brown fox"));
    }
}
