//! Raw TOML configuration data types
//!
//! These structs mirror the structure of the TOML config file. They are
//! deserialized directly and converted to domain types on demand.

mod agents;
mod logging;
mod output;
mod swarm;

pub use agents::{FileAgentConfig, PluginKind};
pub use logging::FileLoggingConfig;
pub use output::FileOutputConfig;
pub use swarm::FileSwarmConfig;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use swarm_application::SandboxPolicy;
use swarm_domain::AgentRole;
use swarm_domain::config::validation::{ConfigIssue, ConfigIssueCode};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Default consensus thresholds
    pub swarm: FileSwarmConfig,
    /// Failure isolation and concurrency limits
    pub sandbox: SandboxPolicy,
    /// Swarm members; empty means the built-in default swarm
    pub agents: Vec<FileAgentConfig>,
    pub logging: FileLoggingConfig,
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Checks, in order:
    /// 1. `[swarm]` value ranges
    /// 2. Each `[[agents]]` entry (role, kind, confidence, overrides)
    /// 3. Duplicate agent ids
    /// 4. Quorum sizes no round could ever reach
    /// 5. Sandbox limits
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.swarm.issues();

        if self.agents.is_empty() {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::NoAgents,
                "no [[agents]] configured, using the default swarm",
            ));
        }

        for agent in &self.agents {
            issues.extend(agent.issues(&self.swarm));
        }

        let mut seen = HashSet::new();
        for agent in &self.agents {
            if !seen.insert(agent.id.as_str()) {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::DuplicateAgentId {
                        id: agent.id.clone(),
                    },
                    format!("agents: id '{}' is used more than once", agent.id),
                ));
            }
        }

        let members = self.effective_agents().len();
        for agent in self.effective_agents() {
            let min_votes = agent.min_votes.unwrap_or(self.swarm.min_votes);
            if min_votes > members {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::QuorumUnsatisfiable {
                        min_votes,
                        agents: members,
                    },
                    format!(
                        "agent '{}' needs {} votes but the swarm only has {} member(s)",
                        agent.id, min_votes, members
                    ),
                ));
            }
        }

        if self.sandbox.max_concurrent_evaluations == Some(0) {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::OutOfRange {
                    field: "sandbox.max_concurrent_evaluations".to_string(),
                },
                "sandbox.max_concurrent_evaluations = 0 disables the limit",
            ));
        }

        issues
    }

    /// Configured agents, or the default three-member swarm when none are.
    pub fn effective_agents(&self) -> Vec<FileAgentConfig> {
        if !self.agents.is_empty() {
            return self.agents.clone();
        }
        [
            ("decision-maker", AgentRole::DecisionMaker),
            ("risk-manager", AgentRole::RiskManager),
            ("market-analyzer", AgentRole::MarketAnalyzer),
        ]
        .iter()
        .map(|(id, role)| FileAgentConfig::new(*id, role))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swarm_domain::OutputFormat;
    use swarm_domain::config::validation::has_errors;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[swarm]
min_confidence = 0.6
min_votes = 3
timeout_secs = 10

[sandbox]
degrade_after = 5
max_concurrent_evaluations = 8

[[agents]]
id = "decider"
role = "decision_maker"

[[agents]]
id = "risk"
role = "risk_manager"
confidence = 0.8

[[agents]]
id = "market"
role = "market_analyzer"
latency_ms = 200

[logging]
audit_file = "audit.jsonl"

[output]
format = "full"
color = false
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.swarm.min_votes, 3);
        assert_eq!(config.sandbox.degrade_after, 5);
        assert_eq!(config.sandbox.max_concurrent_evaluations, Some(8));
        assert_eq!(config.agents.len(), 3);
        assert_eq!(config.agents[1].confidence, Some(0.8));
        assert_eq!(config.agents[2].kind, "baseline");
        assert_eq!(config.output.format, Some(OutputFormat::Full));
        assert!(!config.output.color);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_default_config() {
        let config = FileConfig::default();
        assert_eq!(config.sandbox, SandboxPolicy::default());
        assert!(config.logging.audit_file.is_none());

        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, ConfigIssueCode::NoAgents);
        assert!(!has_errors(&issues));

        let ids: Vec<_> = config.effective_agents().into_iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["decision-maker", "risk-manager", "market-analyzer"]);
    }

    #[test]
    fn test_duplicate_ids() {
        let toml_str = r#"
[[agents]]
id = "a"
role = "risk_manager"

[[agents]]
id = "a"
role = "market_analyzer"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let issues = config.validate();
        assert!(
            issues
                .iter()
                .any(|i| i.code == ConfigIssueCode::DuplicateAgentId { id: "a".into() })
        );
    }

    #[test]
    fn test_unsatisfiable_quorum() {
        let toml_str = r#"
[swarm]
min_votes = 4
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let issues = config.validate();
        assert!(has_errors(&issues));
        assert!(issues.iter().any(|i| i.code
            == ConfigIssueCode::QuorumUnsatisfiable {
                min_votes: 4,
                agents: 3
            }));
    }

    #[test]
    fn test_unknown_kind_is_error() {
        let toml_str = r#"
[[agents]]
id = "a"
role = "risk_manager"
kind = "oracle"

[[agents]]
id = "b"
role = "risk_manager"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert!(has_errors(&config.validate()));
    }
}
