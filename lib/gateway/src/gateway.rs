//! The invocation pipeline, end to end.
//!
//! [`Gateway`] wires validation, payload construction, and dispatch into a
//! single entry point. It holds no per-request state; one instance serves
//! any number of concurrent invocations.

use crate::config::RelayConfig;
use crate::dispatch::Dispatcher;
use crate::error::GatewayError;
use crate::request::RequestSpec;
use crate::retry::RetryPolicy;
use crate::wire::WirePayload;
use serde_json::Value;

/// A configured upstream invocation gateway.
#[derive(Debug, Clone)]
pub struct Gateway {
    config: RelayConfig,
    dispatcher: Dispatcher,
}

impl Gateway {
    #[must_use]
    pub fn new(config: RelayConfig) -> Self {
        let dispatcher = Dispatcher::new(RetryPolicy::from(&config.retry));
        Self { config, dispatcher }
    }

    /// Runs one invocation: validate, build, dispatch, extract.
    ///
    /// Validation happens before the credential check so a caller with a
    /// broken request learns about their own fault even on a misconfigured
    /// deployment.
    ///
    /// # Errors
    ///
    /// Returns the [`GatewayError`] classifying the first stage that failed.
    pub async fn invoke(&self, raw: &Value) -> Result<String, GatewayError> {
        let spec = RequestSpec::from_value(raw, &self.config.generation)?;

        let Some(credential) = self.config.upstream.api_key.as_deref() else {
            return Err(GatewayError::MissingCredential);
        };

        let payload = WirePayload::build(&spec);
        let url = self.generate_url(&spec.model);

        tracing::info!(
            model = %spec.model,
            prompt_chars = spec.prompt.chars().count(),
            "invoking upstream"
        );
        self.dispatcher.send(&url, credential, &payload).await
    }

    fn generate_url(&self, model: &str) -> String {
        let endpoint = self.config.upstream.endpoint.trim_end_matches('/');
        format!("{endpoint}/v1beta/models/{model}:generateContent")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RetrySettings, UpstreamConfig};
    use httpmock::prelude::*;
    use serde_json::json;

    fn config_for(server: &MockServer) -> RelayConfig {
        RelayConfig {
            upstream: UpstreamConfig {
                endpoint: server.base_url(),
                api_key: Some("test-key".to_string()),
            },
            retry: RetrySettings {
                max_attempts: 2,
                backoff_base_ms: 5,
                attempt_timeout_secs: 5,
                overall_deadline_secs: 10,
            },
            ..RelayConfig::default()
        }
    }

    #[tokio::test]
    async fn invoke_returns_generated_text() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1beta/models/gemini-1.5-flash:generateContent")
                    .header("x-goog-api-key", "test-key")
                    .json_body_includes(
                        json!({"contents": [{"parts": [{"text": "say hi"}]}]}).to_string(),
                    );
                then.status(200).json_body(
                    json!({"candidates": [{"content": {"parts": [{"text": "hi!"}]}}]}),
                );
            })
            .await;

        let gateway = Gateway::new(config_for(&server));
        let text = gateway.invoke(&json!({"prompt": "say hi"})).await.expect("text");

        assert_eq!(text, "hi!");
        assert_eq!(mock.calls_async().await, 1);
    }

    #[tokio::test]
    async fn requested_model_is_routed_into_the_path() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1beta/models/gemini-1.5-pro:generateContent");
                then.status(200).json_body(
                    json!({"candidates": [{"content": {"parts": [{"text": "done"}]}}]}),
                );
            })
            .await;

        let gateway = Gateway::new(config_for(&server));
        let text = gateway
            .invoke(&json!({"prompt": "hi", "model": "gemini-1.5-pro"}))
            .await
            .expect("text");

        assert_eq!(text, "done");
        assert_eq!(mock.calls_async().await, 1);
    }

    #[tokio::test]
    async fn invalid_request_never_reaches_upstream() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200);
            })
            .await;

        let gateway = Gateway::new(config_for(&server));
        let err = gateway.invoke(&json!({})).await.unwrap_err();

        assert!(matches!(err, GatewayError::InvalidRequest { .. }));
        assert_eq!(mock.calls_async().await, 0);
    }

    #[tokio::test]
    async fn missing_credential_is_reported_after_validation() {
        let mut config = RelayConfig::default();
        config.upstream.api_key = None;
        let gateway = Gateway::new(config);

        // A broken request still reports the caller's fault first.
        let err = gateway.invoke(&json!({})).await.unwrap_err();
        assert!(matches!(err, GatewayError::InvalidRequest { .. }));

        let err = gateway.invoke(&json!({"prompt": "hi"})).await.unwrap_err();
        assert_eq!(err, GatewayError::MissingCredential);
    }

    #[tokio::test]
    async fn repeated_invocations_are_independent() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200).json_body(
                    json!({"candidates": [{"content": {"parts": [{"text": "same"}]}}]}),
                );
            })
            .await;

        let gateway = Gateway::new(config_for(&server));
        let first = gateway.invoke(&json!({"prompt": "hi"})).await.expect("text");
        let second = gateway.invoke(&json!({"prompt": "hi"})).await.expect("text");
        assert_eq!(first, second);
    }
}
