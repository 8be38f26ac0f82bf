//! Resilient upstream-invocation pipeline for the prompt-relay gateway.
//!
//! The pipeline runs in fixed stages:
//!
//! - **Validate**: untyped caller JSON becomes a [`RequestSpec`]
//! - **Build**: the spec becomes a deterministic [`WirePayload`]
//! - **Dispatch**: bounded-time delivery with classified retry
//! - **Extract**: tolerant parsing of the upstream response into text
//!
//! [`Gateway::invoke`] is the single entry point; every failure mode is a
//! [`GatewayError`] variant the HTTP adapter can map onto a status code.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod extract;
pub mod gateway;
pub mod request;
pub mod retry;
pub mod wire;

pub use config::{GenerationDefaults, RelayConfig, RetrySettings, UpstreamConfig};
pub use dispatch::Dispatcher;
pub use error::GatewayError;
pub use gateway::Gateway;
pub use request::{RequestSpec, ResponseFormat};
pub use retry::RetryPolicy;
pub use wire::WirePayload;
