//! Domain error types

use thiserror::Error;

/// Setup-time configuration errors.
///
/// These are raised before any consensus round starts: when a
/// [`SwarmConfig`](crate::config::SwarmConfig) is validated, when an agent is
/// registered, or when a quorum cannot possibly be satisfied by the peers
/// handed to a proposal.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("role is required")]
    MissingRole,

    #[error("min_confidence must be between 0 and 1 (got {0})")]
    MinConfidenceOutOfRange(f64),

    #[error("min_votes must be at least 1")]
    MinVotesTooSmall,

    #[error("timeout must be positive")]
    NonPositiveTimeout,

    #[error("timeout must not exceed {max}s (got {got}s)")]
    TimeoutTooLarge { got: u64, max: u64 },

    #[error("invalid llm settings: {0}")]
    InvalidLlmSettings(String),

    #[error("quorum unsatisfiable: min_votes is {min_votes} but only {responders} agents can respond")]
    QuorumUnsatisfiable { min_votes: usize, responders: usize },

    #[error("agent '{0}' is already registered")]
    DuplicateAgent(String),

    #[error("unknown agent role: {0}")]
    UnknownRole(String),
}

impl ConfigurationError {
    /// Whether this error is caused by the quorum size rather than a bad value
    pub fn is_quorum_error(&self) -> bool {
        matches!(self, ConfigurationError::QuorumUnsatisfiable { .. })
    }
}
