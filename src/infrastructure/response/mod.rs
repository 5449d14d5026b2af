use crate::domain::error::{AppError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static THINK_TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<think>[\s\S]*?</think>|<think\s*/>").unwrap());

static REASONING_TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<reasoning>[\s\S]*?</reasoning>").unwrap());

static FENCED_BLOCK_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```[a-zA-Z]*\s*\n?(.*?)```").unwrap());

/// Removes reasoning tags models sometimes emit ahead of the answer.
pub fn clean_llm_response(response: &str) -> String {
    let cleaned = THINK_TAG_PATTERN.replace_all(response, "");
    let cleaned = REASONING_TAG_PATTERN.replace_all(&cleaned, "");
    cleaned.trim().to_string()
}

/// Pulls the JSON document out of a model reply.
///
/// Handles markdown fences (` ```json ... ``` `) anywhere in the text and
/// prose around a bare object by falling back to the outermost braces.
pub fn extract_json_payload(output: &str) -> String {
    let trimmed = output.trim();
    if let Some(captures) = FENCED_BLOCK_PATTERN.captures(trimmed) {
        if let Some(inner) = captures.get(1) {
            return inner.as_str().trim().to_string();
        }
    }
    if serde_json::from_str::<Value>(trimmed).is_ok() {
        return trimmed.to_string();
    }
    match (
        trimmed.find(|c: char| c == '{' || c == '['),
        trimmed.rfind(|c: char| c == '}' || c == ']'),
    ) {
        (Some(start), Some(end)) if end > start => trimmed[start..=end].to_string(),
        _ => trimmed.to_string(),
    }
}

/// Clean, unfence and parse a model reply as JSON.
pub fn parse_json_reply(raw: &str) -> Result<Value> {
    let cleaned = clean_llm_response(raw);
    let payload = extract_json_payload(&cleaned);
    serde_json::from_str(&payload).map_err(|e| {
        AppError::ParseError(format!(
            "Model reply is not valid JSON: {} | output_snippet={}",
            e,
            preview_text(&payload, 200)
        ))
    })
}

pub fn preview_text(text: &str, max_chars: usize) -> String {
    let mut preview: String = text.chars().take(max_chars).collect();
    if text.chars().count() > max_chars {
        preview.push_str("...");
    }
    preview
}
