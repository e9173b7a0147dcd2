//! Salvage the diagram script from a raw model reply.
//!
//! The prompt asks for one fenced code block, but replies sometimes wrap it
//! in prose or omit the fence entirely. Extraction prefers the first fenced
//! block and falls back to the trimmed raw text.

use once_cell::sync::Lazy;
use regex::Regex;

static CODE_FENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```[a-zA-Z0-9_-]*\r?\n(.*?)```").expect("valid code fence regex")
});

/// Extracts the diagram script from a raw completion.
///
/// Returns `None` when nothing usable remains after extraction; callers
/// treat that as a malformed completion.
pub fn extract_diagram_script(raw: &str) -> Option<String> {
    let body = CODE_FENCE_RE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(raw);

    let trimmed = body.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::extract_diagram_script;

    #[test]
    fn extracts_fenced_block_with_language_tag() {
        let raw = "Here you go:\n```mermaid\nclassDiagram\n    A --> B\n```\nHope that helps!";
        let script = extract_diagram_script(raw).expect("fenced block should be extracted");
        assert_eq!(script, "classDiagram\n    A --> B");
    }

    #[test]
    fn extracts_bare_fenced_block() {
        let raw = "```\nsequenceDiagram\n    A->>B: ping\n```";
        let script = extract_diagram_script(raw).expect("fenced block should be extracted");
        assert!(script.starts_with("sequenceDiagram"));
    }

    #[test]
    fn falls_back_to_trimmed_raw_text_without_fence() {
        let raw = "  erDiagram\n    USERS ||--o{ POSTS : \"has\"\n  ";
        let script = extract_diagram_script(raw).expect("raw text should be kept");
        assert!(script.starts_with("erDiagram"));
        assert!(!script.ends_with(' '));
    }

    #[test]
    fn empty_fence_and_blank_reply_yield_none() {
        assert!(extract_diagram_script("```\n\n```").is_none());
        assert!(extract_diagram_script("   \n ").is_none());
    }

    #[test]
    fn only_first_fenced_block_is_used() {
        let raw = "```\nfirst\n```\ntext\n```\nsecond\n```";
        assert_eq!(extract_diagram_script(raw).as_deref(), Some("first"));
    }
}
