//! Server-side building blocks for the prompt-relay binary.

pub mod config;
pub mod routes;
