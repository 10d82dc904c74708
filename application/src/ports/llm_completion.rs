//! LLM completion port
//!
//! Defines the single request/response call an LLM-backed plugin needs.
//! Adapters (HTTP clients, scripted fakes) live outside the application layer.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while requesting a completion
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompletionError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// Single-shot chat completion
#[async_trait]
pub trait LlmCompletion: Send + Sync {
    /// Send `prompt` under `system_prompt` and return the raw model text
    async fn complete(&self, system_prompt: &str, prompt: &str)
    -> Result<String, CompletionError>;
}
