//! Application layer for swarm-consensus
//!
//! This crate contains the agent runtime, the consensus round use cases,
//! port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod runtime;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use config::SandboxPolicy;
pub use ports::{
    audit_logger::{AuditEvent, AuditLogger, NoAuditLogger},
    llm_completion::{CompletionError, LlmCompletion},
    plugin::{ExecutionError, InitializationError, Plugin, PluginError},
    round_observer::{NoRoundObserver, RoundObserver},
};
pub use runtime::{AgentRegistry, AgentRuntime, ExecuteError, PluginSandbox, StartupReport};
pub use use_cases::collect_votes::{RecordOutcome, VoteAggregator, VoteLedger};
pub use use_cases::propose_action::{ProposalCoordinator, ProposeError, ProposeInput};
pub use use_cases::swarm::{ActionRequest, Swarm};
