//! Turns free-form model output into a single JSON object.
//!
//! Stages run in order and each is a no-op when its pattern is absent:
//! reasoning-block strip, code-fence strip, brace-span extraction, parse.

use serde_json::Value;
use thiserror::Error;

const REASONING_TAGS: &[&str] = &["think", "thinking"];
const FENCE: &str = "```";

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("no JSON object found in model output: {raw}")]
    NoObjectFound { raw: String },

    #[error("model output is not valid JSON ({source}): {raw}")]
    InvalidJson {
        raw: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Runs the full pipeline over raw model text.
pub fn normalize(raw: &str) -> Result<Value, NormalizeError> {
    let without_reasoning = strip_reasoning_blocks(raw);
    let unfenced = strip_code_fence(&without_reasoning);
    let candidate = extract_object_span(unfenced).ok_or_else(|| NormalizeError::NoObjectFound {
        raw: raw.to_string(),
    })?;

    serde_json::from_str::<Value>(candidate).map_err(|source| NormalizeError::InvalidJson {
        raw: raw.to_string(),
        source,
    })
}

/// Removes `<think>...</think>` style blocks, case-insensitively and across lines.
///
/// A closing tag with no opening tag drops everything before it, since some
/// models start their output already inside the reasoning block.
pub fn strip_reasoning_blocks(text: &str) -> String {
    let mut output = text.to_string();

    for tag in REASONING_TAGS {
        let open = format!("<{}>", tag);
        let close = format!("</{}>", tag);

        loop {
            // ASCII lowercasing keeps byte offsets aligned with `output`.
            let lower = output.to_ascii_lowercase();
            let Some(start) = lower.find(&open) else {
                break;
            };
            let Some(close_rel) = lower[start + open.len()..].find(&close) else {
                break;
            };
            let end = start + open.len() + close_rel + close.len();
            output.replace_range(start..end, "");
        }

        let lower = output.to_ascii_lowercase();
        if !lower.contains(&open) {
            if let Some(pos) = lower.rfind(&close) {
                output = output[pos + close.len()..].to_string();
            }
        }
    }

    output
}

/// Strips a leading fence (with optional language tag) and a trailing fence.
pub fn strip_code_fence(text: &str) -> &str {
    let mut body = text.trim();

    if let Some(rest) = body.strip_prefix(FENCE) {
        body = match rest.find('\n') {
            Some(newline) => &rest[newline + 1..],
            // Single-line fenced output: drop an alphabetic language tag only.
            None => rest.trim_start_matches(|ch: char| ch.is_ascii_alphabetic()),
        };
    }

    if let Some(rest) = body.trim_end().strip_suffix(FENCE) {
        body = rest;
    }

    body.trim()
}

/// Span from the first `{` to the last `}`, if they form a pair.
pub fn extract_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const CLEAN: &str = r#"{"risk_score":0.25,"risk_factors":["Cross-border transaction"],"reasoning":"Minor geographic mismatch","recommended_action":"allow"}"#;

    fn clean_value() -> Value {
        serde_json::from_str(CLEAN).unwrap()
    }

    #[test]
    fn passes_clean_json_through() {
        assert_eq!(normalize(CLEAN).unwrap(), clean_value());
    }

    #[test]
    fn fenced_output_matches_unwrapped() {
        let fenced = format!("```json\n{}\n```", CLEAN);
        assert_eq!(normalize(&fenced).unwrap(), normalize(CLEAN).unwrap());
    }

    #[test]
    fn fence_without_language_tag() {
        let fenced = format!("```\n{}\n```", CLEAN);
        assert_eq!(normalize(&fenced).unwrap(), clean_value());
    }

    #[test]
    fn single_line_fence() {
        let fenced = format!("```json{}```", CLEAN);
        assert_eq!(strip_code_fence(&fenced), CLEAN);
    }

    #[test]
    fn discards_think_block() {
        let text = format!(
            "<think>\nThe customer is in the US, card is from CA {{maybe}}.\nLow risk.\n</think>\n\n{}",
            CLEAN
        );
        assert_eq!(normalize(&text).unwrap(), clean_value());
    }

    #[test]
    fn think_tags_are_case_insensitive() {
        let text = format!("<THINK>{{\"risk_score\": 0.99}}</Think>{}", CLEAN);
        assert_eq!(strip_reasoning_blocks(&text), CLEAN);
    }

    #[test]
    fn removes_multiple_blocks_and_thinking_variant() {
        let text = format!("<think>a</think><thinking>b</thinking>{}<think>c</think>", CLEAN);
        assert_eq!(strip_reasoning_blocks(&text), CLEAN);
    }

    #[test]
    fn orphan_closing_tag_drops_preamble() {
        let text = format!("still reasoning {{ here\n</think>\n{}", CLEAN);
        assert_eq!(normalize(&text).unwrap(), clean_value());
    }

    #[test]
    fn think_block_then_fence() {
        let text = format!("<think>hmm</think>\n```json\n{}\n```", CLEAN);
        assert_eq!(normalize(&text).unwrap(), clean_value());
    }

    #[test]
    fn extracts_object_from_commentary() {
        let text = format!("Here is my analysis:\n{}\nLet me know if you need more.", CLEAN);
        assert_eq!(normalize(&text).unwrap(), clean_value());
    }

    #[test]
    fn nested_objects_survive_extraction() {
        let text = r#"Result: {"risk_score": 0.5, "meta": {"a": 1}} done"#;
        assert_eq!(
            normalize(text).unwrap(),
            json!({"risk_score": 0.5, "meta": {"a": 1}})
        );
    }

    #[test]
    fn no_braces_is_no_object_found() {
        let err = normalize("I cannot help with that.").unwrap_err();
        assert!(matches!(err, NormalizeError::NoObjectFound { .. }));
    }

    #[test]
    fn reversed_braces_is_no_object_found() {
        assert!(extract_object_span("} nothing {").is_none());
        assert!(matches!(
            normalize("} nothing {"),
            Err(NormalizeError::NoObjectFound { .. })
        ));
    }

    #[test]
    fn malformed_json_keeps_raw_text() {
        let malformed = r#"{
    "risk_score": "medium",
    "reasoning": "missing comma"
    "recommended_action": "allow",
}"#;
        match normalize(malformed) {
            Err(NormalizeError::InvalidJson { raw, .. }) => assert_eq!(raw, malformed),
            other => panic!("expected InvalidJson, got {:?}", other),
        }
    }

    #[test]
    fn stages_are_noops_without_their_pattern() {
        assert_eq!(strip_reasoning_blocks(CLEAN), CLEAN);
        assert_eq!(strip_code_fence(CLEAN), CLEAN);
        assert_eq!(extract_object_span(CLEAN), Some(CLEAN));
    }
}
