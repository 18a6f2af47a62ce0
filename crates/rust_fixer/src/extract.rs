//! Pull source text out of a raw model response.
//!
//! Responses arrive wrapped in `<rust>` markers or markdown fences, often
//! with prose around them. Extraction order matters: marker split first,
//! then leading fence, then trailing fence.

use log::warn;
use regex::Regex;

/// Case-insensitive sentinel for files the model declines to translate.
pub fn is_skip_response(answer: &str) -> bool {
    answer.to_lowercase().contains("skip this file")
}

/// Extract the Rust source from a raw completion.
pub fn extract_rust_code(answer: &str) -> String {
    let mut code = answer;

    if let Some(idx) = code.find("<rust>") {
        code = code[idx + "<rust>".len()..].trim();
    }
    if let Some(idx) = code.find("</rust>") {
        code = code[..idx].trim();
    }

    let mut code = code.to_string();
    for marker in ["```rust", "'''rust"] {
        if code.starts_with(marker) {
            code = code[marker.len()..].trim().to_string();
            break;
        }
    }
    for end_marker in ["```", "'''"] {
        if code.ends_with(end_marker) {
            code = code[..code.len() - end_marker.len()].trim().to_string();
            break;
        }
    }

    if code.is_empty() {
        warn!("extraction produced empty code, falling back to raw response");
        return answer.trim().to_string();
    }
    code
}

/// Remove any markdown fences left in a repair-pass response. The repair
/// prompt forbids fences but models add them anyway.
pub fn strip_markdown_fences(text: &str) -> String {
    let fence = Regex::new(r"```rust\s*|```\s*").unwrap();
    fence.replace_all(text, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_rust_tags() {
        let answer = "This file implements max.\n\n<rust>\npub fn max(a: i32, b: i32) -> i32 { a.max(b) }\n</rust>\n";
        let code = extract_rust_code(answer);
        assert_eq!(code, "pub fn max(a: i32, b: i32) -> i32 { a.max(b) }");
    }

    #[test]
    fn test_extract_markdown_fence() {
        let answer = "```rust\nfn main() {}\n```";
        assert_eq!(extract_rust_code(answer), "fn main() {}");
    }

    #[test]
    fn test_extract_triple_quote_fence() {
        let answer = "'''rust\nfn main() {}\n'''";
        assert_eq!(extract_rust_code(answer), "fn main() {}");
    }

    #[test]
    fn test_extract_tags_take_precedence_over_fences() {
        let answer = "<rust>\n```rust\nfn main() {}\n```\n</rust>";
        assert_eq!(extract_rust_code(answer), "fn main() {}");
    }

    #[test]
    fn test_extract_plain_text_passthrough() {
        let answer = "fn main() {}";
        assert_eq!(extract_rust_code(answer), "fn main() {}");
    }

    #[test]
    fn test_skip_sentinel_case_insensitive() {
        assert!(is_skip_response("Skip this file"));
        assert!(is_skip_response("I think we should SKIP THIS FILE."));
        assert!(!is_skip_response("fn main() {}"));
    }

    #[test]
    fn test_strip_markdown_fences() {
        let text = "```rust\nfn main() {}\n```";
        assert_eq!(strip_markdown_fences(text), "fn main() {}");
    }
}
