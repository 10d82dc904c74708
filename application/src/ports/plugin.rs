//! Plugin port
//!
//! Defines the capability every agent role is built from. A plugin owns the
//! domain knowledge of its role (how to judge a proposal, how to carry out an
//! approved operation); the [`AgentRuntime`](crate::runtime::AgentRuntime)
//! owns its lifecycle and isolates its faults.

use async_trait::async_trait;
use serde_json::{Map, Value};
use swarm_domain::{Assessment, EvaluationContext};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Plugin failed to start. Fatal to that agent only.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InitializationError {
    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    #[error("Invalid plugin settings: {0}")]
    InvalidSettings(String),

    #[error("Plugin panicked during initialization: {0}")]
    Panicked(String),

    #[error("Initialization failed: {0}")]
    Failed(String),
}

/// Fault raised while evaluating a proposal.
///
/// The runtime downgrades every variant to an abstention; repeated failures
/// move the agent to `degraded`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PluginError {
    #[error("Evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("Completion backend error: {0}")]
    Backend(String),

    #[error("Plugin panicked: {0}")]
    Panicked(String),

    #[error("Evaluation cancelled")]
    Cancelled,
}

impl PluginError {
    /// Cancellation is the round's decision, not a plugin fault
    pub fn is_cancellation(&self) -> bool {
        matches!(self, PluginError::Cancelled)
    }
}

/// Fault raised by `execute`. Surfaced to the caller verbatim, never retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExecutionError {
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Plugin panicked: {0}")]
    Panicked(String),

    #[error("Execution failed: {0}")]
    Failed(String),
}

/// Role capability implemented by every agent plugin.
///
/// Implementations live in the infrastructure layer (built-in plugins) or in
/// embedding applications. `evaluate` is called concurrently from consensus
/// rounds and must be safe to call while another `evaluate` is in flight;
/// `execute` is serialized by the runtime.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Prepare resources. Called once before the agent joins any round.
    async fn initialize(&self) -> Result<(), InitializationError>;

    /// Judge a proposal.
    ///
    /// `cancel` fires when the round's deadline passes; long-running
    /// implementations should stop early and return [`PluginError::Cancelled`].
    async fn evaluate(
        &self,
        context: &EvaluationContext,
        cancel: CancellationToken,
    ) -> Result<Assessment, PluginError>;

    /// Carry out an operation on behalf of the agent.
    async fn execute(
        &self,
        operation: &str,
        params: &Map<String, Value>,
    ) -> Result<Value, ExecutionError>;

    /// Release resources. Must tolerate being called more than once.
    async fn cleanup(&self);
}
