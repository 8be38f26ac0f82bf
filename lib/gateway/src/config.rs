//! Gateway configuration types.
//!
//! All tunables live in [`RelayConfig`], handed to the gateway at
//! construction time. Nothing in this crate reads the environment; the
//! server binary loads these structs via the `config` crate.

use serde::Deserialize;

/// Complete configuration for one gateway instance.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelayConfig {
    /// Upstream endpoint and credential.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Defaults and bounds for generation parameters.
    #[serde(default)]
    pub generation: GenerationDefaults,

    /// Retry and time-budget settings.
    #[serde(default)]
    pub retry: RetrySettings,
}

/// Where and how to reach the upstream API.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the upstream API.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Upstream API key. Absent means every invocation fails with a
    /// configuration error; the key is never logged or echoed.
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: None,
        }
    }
}

/// Defaults applied to request fields the caller omits, plus the clamping
/// bounds for `max_output_tokens`.
///
/// Out-of-range numeric inputs are clamped rather than rejected. That is a
/// deliberate permissiveness policy: a caller asking for too much output gets
/// the ceiling, not an error.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationDefaults {
    /// Model identifier used when the request names none.
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature default.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Nucleus sampling default.
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Output token budget default.
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Candidate count default.
    #[serde(default = "default_candidate_count")]
    pub candidate_count: u32,

    /// Lower clamp bound for `max_output_tokens`.
    #[serde(default = "default_output_tokens_floor")]
    pub output_tokens_floor: u32,

    /// Upper clamp bound for `max_output_tokens`.
    #[serde(default = "default_output_tokens_ceiling")]
    pub output_tokens_ceiling: u32,
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_top_p() -> f32 {
    0.95
}

fn default_max_output_tokens() -> u32 {
    8192
}

fn default_candidate_count() -> u32 {
    1
}

fn default_output_tokens_floor() -> u32 {
    2048
}

fn default_output_tokens_ceiling() -> u32 {
    16384
}

impl Default for GenerationDefaults {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            max_output_tokens: default_max_output_tokens(),
            candidate_count: default_candidate_count(),
            output_tokens_floor: default_output_tokens_floor(),
            output_tokens_ceiling: default_output_tokens_ceiling(),
        }
    }
}

/// Retry and time-budget settings, converted into a
/// [`RetryPolicy`](crate::retry::RetryPolicy) by the dispatcher.
#[derive(Debug, Clone, Deserialize)]
pub struct RetrySettings {
    /// Maximum attempts per invocation (1 = no retry).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff base in milliseconds; delay doubles each attempt.
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// Per-attempt timeout in seconds.
    #[serde(default = "default_attempt_timeout_secs")]
    pub attempt_timeout_secs: u64,

    /// Overall deadline in seconds across all attempts and backoff sleeps.
    /// Keeps the invocation inside the caller-facing SLA.
    #[serde(default = "default_overall_deadline_secs")]
    pub overall_deadline_secs: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    800
}

fn default_attempt_timeout_secs() -> u64 {
    20
}

fn default_overall_deadline_secs() -> u64 {
    30
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            attempt_timeout_secs: default_attempt_timeout_secs(),
            overall_deadline_secs: default_overall_deadline_secs(),
        }
    }
}
