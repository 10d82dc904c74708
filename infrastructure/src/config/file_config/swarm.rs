//! Swarm defaults from TOML (`[swarm]` section)
//!
//! Thresholds every agent uses unless its `[[agents]]` entry overrides them.
//!
//! ```toml
//! [swarm]
//! min_confidence = 0.7
//! min_votes = 2
//! timeout_secs = 60
//!
//! [swarm.llm]
//! provider = "openrouter"
//! model = "anthropic/claude-3.5-sonnet"
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;
use swarm_domain::config::validation::{ConfigIssue, ConfigIssueCode};
use swarm_domain::{AgentRole, ConfigurationError, LlmSettings, SwarmConfig};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSwarmConfig {
    /// Approval threshold for consensus (0.0 to 1.0)
    pub min_confidence: f64,
    /// Minimum number of recorded votes for a valid consensus
    pub min_votes: usize,
    /// Round deadline in seconds
    pub timeout_secs: u64,
    /// Settings for LLM-backed agents
    pub llm: Option<LlmSettings>,
}

impl Default for FileSwarmConfig {
    fn default() -> Self {
        let defaults = SwarmConfig::new(AgentRole::DecisionMaker);
        Self {
            min_confidence: defaults.min_confidence,
            min_votes: defaults.min_votes,
            timeout_secs: defaults.timeout.as_secs(),
            llm: None,
        }
    }
}

impl FileSwarmConfig {
    /// Build a validated domain config for an agent playing `role`.
    pub fn to_swarm_config(&self, role: AgentRole) -> Result<SwarmConfig, ConfigurationError> {
        let mut config = SwarmConfig::new(role)
            .with_min_confidence(self.min_confidence)
            .with_min_votes(self.min_votes)
            .with_timeout(Duration::from_secs(self.timeout_secs));
        if let Some(llm) = &self.llm {
            config = config.with_llm(llm.clone());
        }
        config.validate()?;
        Ok(config)
    }

    /// Range checks for the `[swarm]` section.
    pub fn issues(&self) -> Vec<ConfigIssue> {
        match self.to_swarm_config(AgentRole::DecisionMaker) {
            Ok(_) => vec![],
            Err(e) => vec![ConfigIssue::error(
                ConfigIssueCode::OutOfRange {
                    field: field_for(&e, "swarm"),
                },
                format!("[swarm]: {}", e),
            )],
        }
    }
}

/// Config key a validation error refers to, under `section`.
pub(super) fn field_for(error: &ConfigurationError, section: &str) -> String {
    let key = match error {
        ConfigurationError::MinConfidenceOutOfRange(_) => "min_confidence",
        ConfigurationError::MinVotesTooSmall => "min_votes",
        ConfigurationError::NonPositiveTimeout | ConfigurationError::TimeoutTooLarge { .. } => {
            "timeout_secs"
        }
        ConfigurationError::InvalidLlmSettings(_) => "llm",
        ConfigurationError::MissingRole | ConfigurationError::UnknownRole(_) => "role",
        _ => return section.to_string(),
    };
    format!("{}.{}", section, key)
}
