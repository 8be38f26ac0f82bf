//! Tolerant extraction of generated text from upstream response bodies.
//!
//! Upstream response shapes drift; extraction walks the document with
//! optional-path lookups instead of deserializing into a rigid struct, so a
//! missing or extra field never turns a usable answer into an error.

use crate::error::GatewayError;
use serde_json::Value;

/// Longest detail excerpt carried inside an error. Keeps upstream payloads
/// from ballooning log lines and caller-visible error bodies.
pub const DETAIL_LIMIT: usize = 600;

/// Pulls the generated text out of a 2xx upstream body.
///
/// All text parts of the first candidate are joined with newlines and
/// trimmed. A response that parses but yields no text is classified as
/// [`GatewayError::Blocked`], never an empty success; any block or finish
/// metadata in the document becomes the block reason.
///
/// # Errors
///
/// Returns [`GatewayError::MalformedUpstreamResponse`] if the body is not
/// JSON, or [`GatewayError::Blocked`] if the document carries no candidate
/// text.
pub fn extract_text(body: &str) -> Result<String, GatewayError> {
    let doc: Value = serde_json::from_str(body).map_err(|err| {
        GatewayError::MalformedUpstreamResponse {
            detail: format!("response is not JSON ({err}): {}", excerpt(body)),
        }
    })?;

    let text = doc
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default();

    let text = text.trim();
    if text.is_empty() {
        return Err(GatewayError::Blocked {
            reason: block_reason(&doc),
        });
    }
    Ok(text.to_string())
}

/// Why upstream suppressed the content, if the document says so.
///
/// Prompt-level feedback takes priority; otherwise any candidate finish
/// reason other than a normal stop counts as suppression.
fn block_reason(doc: &Value) -> Option<String> {
    if let Some(reason) = doc
        .pointer("/promptFeedback/blockReason")
        .and_then(Value::as_str)
    {
        return Some(reason.to_string());
    }
    doc.pointer("/candidates/0/finishReason")
        .and_then(Value::as_str)
        .filter(|reason| *reason != "STOP")
        .map(str::to_string)
}

/// One extraction rule for a human-readable error detail.
type DetailRule = fn(&Value) -> Option<String>;

/// Ordered rules for pulling a detail string out of a non-2xx body.
/// First match wins; the raw excerpt fallback is applied by the caller.
const DETAIL_RULES: &[DetailRule] = &[
    |doc| {
        doc.pointer("/error/message")
            .and_then(Value::as_str)
            .map(str::to_string)
    },
    |doc| {
        doc.pointer("/error/status")
            .and_then(Value::as_str)
            .map(str::to_string)
    },
];

/// Best human-readable detail for a failed upstream response.
///
/// Tries the structured error fields first and falls back to a bounded
/// excerpt of the raw body. Never fails and never returns more than
/// [`DETAIL_LIMIT`] characters of upstream text.
#[must_use]
pub fn error_detail(body: &str) -> String {
    if let Ok(doc) = serde_json::from_str::<Value>(body) {
        for rule in DETAIL_RULES {
            if let Some(detail) = rule(&doc) {
                return truncate(&detail);
            }
        }
    }
    excerpt(body)
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }
    truncate(trimmed)
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= DETAIL_LIMIT {
        text.to_string()
    } else {
        let cut: String = text.chars().take(DETAIL_LIMIT).collect();
        format!("{cut}…")
    }
}
