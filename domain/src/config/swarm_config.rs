//! Swarm agent configuration.

use crate::agent::identity::AgentRole;
use crate::core::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default approval threshold for a consensus round
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.7;
/// Default quorum size
pub const DEFAULT_MIN_VOTES: usize = 2;
/// Default round deadline
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
/// Longest round deadline accepted by [`SwarmConfig::validate`]
pub const MAX_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Per-agent consensus configuration.
///
/// When an agent proposes, its own config governs the round: the deadline,
/// the quorum size and the approval threshold. Validated once by
/// [`SwarmConfig::validate`] when the agent runtime is built, and never
/// changed afterwards.
///
/// # Example
///
/// ```
/// use swarm_domain::{AgentRole, SwarmConfig};
/// use std::time::Duration;
///
/// let config = SwarmConfig::new(AgentRole::RiskManager)
///     .with_min_votes(3)
///     .with_timeout(Duration::from_secs(5));
/// assert!(config.validate().is_ok());
/// assert_eq!(config.min_confidence, 0.7);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SwarmConfig {
    pub role: AgentRole,
    /// Minimum approval rate for consensus (0.0 to 1.0)
    pub min_confidence: f64,
    /// Minimum number of recorded decisions for a valid verdict
    pub min_votes: usize,
    /// Round deadline, measured from fan-out start
    pub timeout: Duration,
    pub llm: Option<LlmSettings>,
}

impl SwarmConfig {
    pub fn new(role: AgentRole) -> Self {
        Self {
            role,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            min_votes: DEFAULT_MIN_VOTES,
            timeout: DEFAULT_TIMEOUT,
            llm: None,
        }
    }

    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    pub fn with_min_votes(mut self, min_votes: usize) -> Self {
        self.min_votes = min_votes;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_llm(mut self, llm: LlmSettings) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Validate all values, returning the first problem found.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.role.as_str().trim().is_empty() {
            return Err(ConfigurationError::MissingRole);
        }
        // NaN fails both comparisons, so it is rejected here too
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(ConfigurationError::MinConfidenceOutOfRange(
                self.min_confidence,
            ));
        }
        if self.min_votes < 1 {
            return Err(ConfigurationError::MinVotesTooSmall);
        }
        if self.timeout.is_zero() {
            return Err(ConfigurationError::NonPositiveTimeout);
        }
        if self.timeout > MAX_TIMEOUT {
            return Err(ConfigurationError::TimeoutTooLarge {
                got: self.timeout.as_secs(),
                max: MAX_TIMEOUT.as_secs(),
            });
        }
        if let Some(llm) = &self.llm {
            llm.validate()?;
        }
        Ok(())
    }

    /// Check that a round with `responders` possible voters can reach quorum.
    pub fn check_quorum(&self, responders: usize) -> Result<(), ConfigurationError> {
        if self.min_votes > responders {
            return Err(ConfigurationError::QuorumUnsatisfiable {
                min_votes: self.min_votes,
                responders,
            });
        }
        Ok(())
    }
}

/// LLM settings carried for LLM-backed plugins.
///
/// The engine never talks to a model itself; these values are only passed
/// through to plugins that do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub provider: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub api_url: String,
    pub system_prompt: Option<String>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: "openrouter".to_string(),
            model: "anthropic/claude-3.5-sonnet".to_string(),
            temperature: 0.7,
            max_tokens: 2000,
            api_url: "https://openrouter.ai/api/v1".to_string(),
            system_prompt: None,
        }
    }
}

impl LlmSettings {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.model.trim().is_empty() {
            return Err(ConfigurationError::InvalidLlmSettings(
                "model must not be empty".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(ConfigurationError::InvalidLlmSettings(format!(
                "temperature must be between 0 and 1 (got {})",
                self.temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(ConfigurationError::InvalidLlmSettings(
                "max_tokens must be positive".to_string(),
            ));
        }
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(ConfigurationError::InvalidLlmSettings(format!(
                "api_url must start with http:// or https:// (got {})",
                self.api_url
            )));
        }
        Ok(())
    }
}
