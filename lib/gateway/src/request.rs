//! Request validation and normalization.
//!
//! Raw caller input (an untyped JSON document) is turned into an immutable
//! [`RequestSpec`]: the prompt is required, everything else is defaulted from
//! configuration, numeric fields are clamped into bounds rather than
//! rejected, and unknown fields are ignored for forward compatibility.

use crate::config::GenerationDefaults;
use crate::error::GatewayError;
use serde_json::Value;
use std::collections::BTreeMap;

/// Requested output format, forwarded to upstream as a MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    /// Plain text output.
    #[default]
    Plain,
    /// Markdown output.
    Markdown,
}

impl ResponseFormat {
    /// MIME type the upstream contract expects.
    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Plain => "text/plain",
            Self::Markdown => "text/markdown",
        }
    }

    fn parse(value: &str) -> Self {
        match value.trim() {
            "markdown" | "text/markdown" => Self::Markdown,
            _ => Self::Plain,
        }
    }
}

/// A validated, normalized generation request.
///
/// Immutable once constructed; every invocation builds a fresh spec, so no
/// state is shared between concurrent invocations.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    /// The prompt text. Non-empty after trimming.
    pub prompt: String,
    /// Model identifier. Restricted to `[A-Za-z0-9._-]` since it is routed
    /// into the upstream URL path.
    pub model: String,
    /// Sampling temperature, clamped to `[0.0, 2.0]`.
    pub temperature: f32,
    /// Nucleus sampling parameter, clamped to `[0.0, 1.0]`.
    pub top_p: f32,
    /// Output token budget, clamped to the configured range.
    pub max_output_tokens: u32,
    /// Number of candidates to request, clamped to `[1, 8]`.
    pub candidate_count: u32,
    /// Optional system instruction.
    pub system_instruction: Option<String>,
    /// Requested output format.
    pub response_format: ResponseFormat,
    /// Safety category → threshold overrides. Sorted so the built payload
    /// is deterministic; absent categories use upstream defaults.
    pub safety_overrides: BTreeMap<String, String>,
}

impl RequestSpec {
    /// Validates raw caller input against the configured defaults.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if the input is not a JSON
    /// object, the prompt is absent, not a string, or empty after trimming,
    /// or the model name contains characters outside `[A-Za-z0-9._-]`.
    /// Out-of-range numeric fields are clamped, not rejected.
    pub fn from_value(raw: &Value, defaults: &GenerationDefaults) -> Result<Self, GatewayError> {
        let Some(body) = raw.as_object() else {
            return Err(GatewayError::InvalidRequest {
                reason: "request body must be a JSON object".to_string(),
            });
        };

        let prompt = body
            .get("prompt")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| GatewayError::InvalidRequest {
                reason: "missing prompt".to_string(),
            })?
            .to_string();

        let model = body
            .get("model")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(&defaults.model)
            .to_string();
        // The model name lands in the upstream URL path; a restricted
        // charset keeps caller input from reshaping the request path.
        if !model
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        {
            return Err(GatewayError::InvalidRequest {
                reason: "invalid model name".to_string(),
            });
        }

        let temperature = f32_field(body, "temperature")
            .unwrap_or(defaults.temperature)
            .clamp(0.0, 2.0);
        let top_p = f32_field(body, "top_p")
            .unwrap_or(defaults.top_p)
            .clamp(0.0, 1.0);
        let max_output_tokens = u32_field(body, "max_output_tokens")
            .unwrap_or(defaults.max_output_tokens)
            .clamp(defaults.output_tokens_floor, defaults.output_tokens_ceiling);
        let candidate_count = u32_field(body, "candidate_count")
            .unwrap_or(defaults.candidate_count)
            .clamp(1, 8);

        let system_instruction = body
            .get("system")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let response_format = body
            .get("response_mime_type")
            .and_then(Value::as_str)
            .map(ResponseFormat::parse)
            .unwrap_or_default();

        let safety_overrides = body
            .get("safety_settings")
            .and_then(Value::as_object)
            .map(|map| {
                map.iter()
                    .filter_map(|(category, threshold)| {
                        threshold
                            .as_str()
                            .map(|t| (category.clone(), t.to_string()))
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            prompt,
            model,
            temperature,
            top_p,
            max_output_tokens,
            candidate_count,
            system_instruction,
            response_format,
            safety_overrides,
        })
    }
}

#[allow(clippy::cast_possible_truncation)]
fn f32_field(body: &serde_json::Map<String, Value>, key: &str) -> Option<f32> {
    body.get(key).and_then(Value::as_f64).map(|v| v as f32)
}

// Negative or fractional values narrow to the nearest representable u32 so
// clamping sees the caller's actual value, not a silent default.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn u32_field(body: &serde_json::Map<String, Value>, key: &str) -> Option<u32> {
    body.get(key)
        .and_then(Value::as_f64)
        .map(|v| v.clamp(0.0, f64::from(u32::MAX)) as u32)
}
