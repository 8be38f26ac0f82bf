//! Bounded-time upstream dispatch with retry.
//!
//! The dispatcher owns the HTTP client and the retry loop. Each attempt runs
//! under its own timeout, the whole invocation runs under an overall
//! deadline, and only transient failures (429, 5xx, connection errors,
//! timeouts) are retried. The credential travels in a request header and is
//! never logged.

use crate::error::GatewayError;
use crate::extract::{error_detail, extract_text};
use crate::retry::RetryPolicy;
use crate::wire::WirePayload;
use std::cmp;
use std::time::Instant;

const CREDENTIAL_HEADER: &str = "x-goog-api-key";

/// Sends built payloads upstream and classifies the outcome.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    client: reqwest::Client,
    policy: RetryPolicy,
}

impl Dispatcher {
    #[must_use]
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            client: reqwest::Client::new(),
            policy,
        }
    }

    /// Dispatches one payload, retrying transient failures until the attempt
    /// budget or overall deadline runs out.
    ///
    /// # Errors
    ///
    /// Returns the classified [`GatewayError`] for the final attempt. A
    /// permanent failure (4xx other than 429, blocked content, malformed
    /// body) is returned immediately without further attempts.
    pub async fn send(
        &self,
        url: &str,
        credential: &str,
        payload: &WirePayload,
    ) -> Result<String, GatewayError> {
        let started = Instant::now();
        let mut last_err = GatewayError::Timeout;
        let mut attempts_made = 0;

        for attempt in 1..=self.policy.max_attempts {
            let Some(remaining) = self.policy.overall_deadline.checked_sub(started.elapsed())
            else {
                break;
            };
            let budget = cmp::min(self.policy.attempt_timeout, remaining);
            attempts_made = attempt;

            tracing::debug!(attempt, ?budget, "dispatching upstream request");
            let outcome = tokio::time::timeout(budget, self.attempt(url, credential, payload));
            match outcome.await {
                Ok(Ok(text)) => {
                    tracing::debug!(attempt, chars = text.len(), "upstream request succeeded");
                    return Ok(text);
                }
                Ok(Err(err)) if !err.is_transient() => return Err(err),
                Ok(Err(err)) => {
                    tracing::warn!(attempt, error = %err, "transient upstream failure");
                    last_err = err;
                }
                Err(_) => {
                    tracing::warn!(attempt, "upstream attempt timed out");
                    last_err = GatewayError::Timeout;
                }
            }

            if attempt < self.policy.max_attempts {
                let delay = self.policy.delay_for_attempt(attempt);
                if started.elapsed() + delay >= self.policy.overall_deadline {
                    break;
                }
                tokio::time::sleep(delay).await;
            }
        }

        Err(exhausted(last_err, attempts_made))
    }

    async fn attempt(
        &self,
        url: &str,
        credential: &str,
        payload: &WirePayload,
    ) -> Result<String, GatewayError> {
        let response = self
            .client
            .post(url)
            .header(CREDENTIAL_HEADER, credential)
            .json(payload)
            .send()
            .await
            .map_err(|err| GatewayError::UpstreamUnavailable {
                status: None,
                detail: connection_detail(&err),
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| GatewayError::UpstreamUnavailable {
                status: Some(status.as_u16()),
                detail: connection_detail(&err),
            })?;

        if status.is_success() {
            return extract_text(&body);
        }

        let detail = error_detail(&body);
        if status.as_u16() == 429 || status.is_server_error() {
            Err(GatewayError::UpstreamUnavailable {
                status: Some(status.as_u16()),
                detail,
            })
        } else {
            Err(GatewayError::UpstreamRejected {
                status: status.as_u16(),
                detail,
            })
        }
    }
}

/// Connection-level failure description. `reqwest` error text can embed the
/// full request URL; strip to the error kind so nothing sensitive leaks.
fn connection_detail(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "connection timed out".to_string()
    } else if err.is_connect() {
        "connection failed".to_string()
    } else {
        "request failed".to_string()
    }
}

fn exhausted(last_err: GatewayError, attempts: u32) -> GatewayError {
    match last_err {
        GatewayError::UpstreamUnavailable { status, detail } => {
            GatewayError::UpstreamUnavailable {
                status,
                detail: format!("exhausted {attempts} attempts: {detail}"),
            }
        }
        other => other,
    }
}
