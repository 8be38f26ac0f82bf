//! Upstream wire payload construction.
//!
//! [`WirePayload`] is the `generateContent` request document. Building one
//! from a [`RequestSpec`] is pure and deterministic: the same spec always
//! serializes to byte-identical JSON (struct field order is fixed and safety
//! overrides arrive pre-sorted).

use crate::request::RequestSpec;
use serde::Serialize;

/// The upstream request document. Opaque to everything except the
/// response extractor's counterpart on the way back.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePayload {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    max_output_tokens: u32,
    candidate_count: u32,
    response_mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct SafetySetting {
    category: String,
    threshold: String,
}

impl Content {
    fn text(text: &str) -> Self {
        Self {
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

impl WirePayload {
    /// Builds the upstream document for a validated spec. Infallible: every
    /// valid [`RequestSpec`] builds.
    #[must_use]
    pub fn build(spec: &RequestSpec) -> Self {
        Self {
            contents: vec![Content::text(&spec.prompt)],
            generation_config: GenerationConfig {
                temperature: spec.temperature,
                top_p: spec.top_p,
                max_output_tokens: spec.max_output_tokens,
                candidate_count: spec.candidate_count,
                response_mime_type: spec.response_format.mime_type().to_string(),
            },
            system_instruction: spec.system_instruction.as_deref().map(Content::text),
            safety_settings: spec
                .safety_overrides
                .iter()
                .map(|(category, threshold)| SafetySetting {
                    category: category.clone(),
                    threshold: threshold.clone(),
                })
                .collect(),
        }
    }
}
