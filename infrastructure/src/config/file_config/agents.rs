//! Agent entries from TOML (`[[agents]]` array)
//!
//! ```toml
//! [[agents]]
//! id = "risk-1"
//! role = "risk_manager"
//! kind = "baseline"          # "baseline" or "advisor"
//! confidence = 0.6           # baseline only
//! latency_ms = 250           # baseline only, simulated think time
//! min_votes = 3              # optional override of [swarm]
//! ```

use super::swarm::{FileSwarmConfig, field_for};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use swarm_domain::config::validation::{ConfigIssue, ConfigIssueCode};
use swarm_domain::{AgentRole, ConfigurationError, SwarmConfig};

/// Which built-in plugin backs an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PluginKind {
    /// Rule-based evaluation with a fixed confidence; no external calls
    #[default]
    Baseline,
    /// LLM-backed evaluation through a completion endpoint
    Advisor,
}

impl PluginKind {
    pub const VALID: [&'static str; 2] = ["baseline", "advisor"];

    pub fn as_str(&self) -> &'static str {
        match self {
            PluginKind::Baseline => "baseline",
            PluginKind::Advisor => "advisor",
        }
    }
}

impl FromStr for PluginKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "baseline" | "basic" => Ok(PluginKind::Baseline),
            "advisor" | "llm" => Ok(PluginKind::Advisor),
            other => Err(format!("unknown plugin kind: {}", other)),
        }
    }
}

/// One configured agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentConfig {
    pub id: String,
    pub role: String,
    pub kind: String,
    /// Confidence a baseline agent reports
    pub confidence: Option<f64>,
    /// Artificial evaluation latency for a baseline agent
    pub latency_ms: Option<u64>,
    pub min_confidence: Option<f64>,
    pub min_votes: Option<usize>,
    pub timeout_secs: Option<u64>,
}

impl Default for FileAgentConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            role: String::new(),
            kind: PluginKind::Baseline.as_str().to_string(),
            confidence: None,
            latency_ms: None,
            min_confidence: None,
            min_votes: None,
            timeout_secs: None,
        }
    }
}

impl FileAgentConfig {
    pub fn new(id: impl Into<String>, role: &AgentRole) -> Self {
        Self {
            id: id.into(),
            role: role.as_str().to_string(),
            ..Self::default()
        }
    }

    /// Parse the role string; built-in names map to their variant, any other
    /// identifier becomes a custom role.
    pub fn parse_role(&self) -> (Option<AgentRole>, Vec<ConfigIssue>) {
        match self.role.parse::<AgentRole>() {
            Ok(role) => (Some(role), vec![]),
            Err(e) => {
                let issue = ConfigIssue::error(
                    ConfigIssueCode::InvalidEnumValue {
                        field: format!("agents.{}.role", self.id),
                        value: self.role.clone(),
                        valid_values: AgentRole::builtin()
                            .iter()
                            .map(|r| r.as_str().to_string())
                            .collect(),
                    },
                    format!("agents.{}.role: {}", self.id, e),
                );
                (None, vec![issue])
            }
        }
    }

    pub fn parse_kind(&self) -> (Option<PluginKind>, Vec<ConfigIssue>) {
        match self.kind.parse::<PluginKind>() {
            Ok(kind) => (Some(kind), vec![]),
            Err(e) => {
                let issue = ConfigIssue::error(
                    ConfigIssueCode::InvalidEnumValue {
                        field: format!("agents.{}.kind", self.id),
                        value: self.kind.clone(),
                        valid_values: PluginKind::VALID.iter().map(|s| s.to_string()).collect(),
                    },
                    format!("agents.{}.kind: {}", self.id, e),
                );
                (None, vec![issue])
            }
        }
    }

    /// Merge this entry's overrides over `defaults` into a validated config.
    pub fn to_swarm_config(
        &self,
        defaults: &FileSwarmConfig,
    ) -> Result<SwarmConfig, ConfigurationError> {
        let role = self.role.parse::<AgentRole>()?;
        let mut config = defaults.to_swarm_config(role)?;
        if let Some(min_confidence) = self.min_confidence {
            config = config.with_min_confidence(min_confidence);
        }
        if let Some(min_votes) = self.min_votes {
            config = config.with_min_votes(min_votes);
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(timeout_secs));
        }
        config.validate()?;
        Ok(config)
    }

    /// Every problem with this entry, given the swarm defaults.
    pub fn issues(&self, defaults: &FileSwarmConfig) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.id.trim().is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::OutOfRange {
                    field: "agents.id".to_string(),
                },
                "agents: every agent needs a non-empty id",
            ));
        }

        let (role, role_issues) = self.parse_role();
        issues.extend(role_issues);
        issues.extend(self.parse_kind().1);

        if let Some(confidence) = self.confidence
            && !(0.0..=1.0).contains(&confidence)
        {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::OutOfRange {
                    field: format!("agents.{}.confidence", self.id),
                },
                format!(
                    "agents.{}.confidence must be between 0 and 1 (got {})",
                    self.id, confidence
                ),
            ));
        }

        // Role errors are already reported above
        if role.is_some()
            && let Err(e) = self.to_swarm_config(defaults)
        {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::OutOfRange {
                    field: field_for(&e, &format!("agents.{}", self.id)),
                },
                format!("agents.{}: {}", self.id, e),
            ));
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind() {
        assert_eq!("baseline".parse::<PluginKind>(), Ok(PluginKind::Baseline));
        assert_eq!("LLM".parse::<PluginKind>(), Ok(PluginKind::Advisor));
        assert!("oracle".parse::<PluginKind>().is_err());
    }

    #[test]
    fn test_overrides_applied() {
        let agent = FileAgentConfig {
            min_votes: Some(3),
            timeout_secs: Some(5),
            ..FileAgentConfig::new("risk-1", &AgentRole::RiskManager)
        };
        let config = agent.to_swarm_config(&FileSwarmConfig::default()).unwrap();
        assert_eq!(config.role, AgentRole::RiskManager);
        assert_eq!(config.min_votes, 3);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.min_confidence, 0.7);
    }

    #[test]
    fn test_custom_role_accepted() {
        let agent = FileAgentConfig {
            id: "gas".into(),
            role: "gas_oracle".into(),
            ..FileAgentConfig::default()
        };
        let (role, issues) = agent.parse_role();
        assert_eq!(role, Some(AgentRole::Custom("gas_oracle".into())));
        assert!(issues.is_empty());
    }

    #[test]
    fn test_issues_collected() {
        let agent = FileAgentConfig {
            id: "bad".into(),
            role: "".into(),
            kind: "oracle".into(),
            confidence: Some(2.0),
            ..FileAgentConfig::default()
        };
        let issues = agent.issues(&FileSwarmConfig::default());
        assert_eq!(issues.len(), 3);
        assert!(issues.iter().all(ConfigIssue::is_error));
    }

    #[test]
    fn test_override_out_of_range() {
        let agent = FileAgentConfig {
            min_confidence: Some(-0.1),
            ..FileAgentConfig::new("risk-1", &AgentRole::RiskManager)
        };
        let issues = agent.issues(&FileSwarmConfig::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].code,
            ConfigIssueCode::OutOfRange {
                field: "agents.risk-1.min_confidence".into()
            }
        );
    }
}
