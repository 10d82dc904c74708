//! Domain layer for swarm-consensus
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure, async runtimes or presentation
//! concerns.
//!
//! # Core Concepts
//!
//! ## Proposal
//!
//! A [`Proposal`] is an action candidate (a swap, a transfer, a rebalance)
//! that a swarm of agents must approve before it may execute.
//!
//! ## Decision
//!
//! Each peer answers with one [`AgentDecision`]: approve, reject or abstain,
//! scored with a confidence in `[0, 1]`.
//!
//! ## Consensus
//!
//! [`ConsensusPolicy`] reduces the decisions of a round into a
//! [`SwarmConsensus`] using the proposer's [`SwarmConfig`] thresholds.

pub mod agent;
pub mod config;
pub mod core;
pub mod prompt;
pub mod proposal;
pub mod quorum;

// Re-export commonly used types
pub use agent::{
    identity::{AgentId, AgentIdentity, AgentRole},
    state::{AgentStatus, PluginState},
};
pub use config::{
    ConfigIssue, ConfigIssueCode, LlmSettings, OutputFormat, Severity, SwarmConfig,
};
pub use crate::core::error::ConfigurationError;
pub use prompt::PromptTemplate;
pub use proposal::{EvaluationContext, Proposal, ProposalId};

// Re-export quorum types
pub use quorum::{
    AgentDecision, Assessment, ConsensusPolicy, Decision, SwarmConsensus, parse_assessment,
};
