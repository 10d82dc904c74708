//! Agent identity value objects.
//!
//! An agent is addressed by its [`AgentId`] and carries an [`AgentRole`] as
//! plain data. Every role shares the same behavioral contract; the role only
//! selects prompts and reporting labels.

use crate::core::error::ConfigurationError;
use serde::{Deserialize, Serialize};

/// Stable identifier of an agent inside a swarm.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    /// Creates an AgentId from an existing string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AgentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&AgentId> for AgentId {
    fn from(id: &AgentId) -> Self {
        id.clone()
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role an agent plays in the swarm.
///
/// Parsed from and serialized to snake_case (`"risk_manager"`). Unknown names
/// are kept as [`AgentRole::Custom`] so operators can add their own roles
/// without touching the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AgentRole {
    MarketAnalyzer,
    RiskManager,
    StrategyOptimizer,
    DecisionMaker,
    PortfolioManager,
    ArbitrageAgent,
    YieldFarmer,
    Custom(String),
}

impl AgentRole {
    /// All built-in roles, in display order.
    pub fn builtin() -> &'static [AgentRole] {
        &[
            AgentRole::MarketAnalyzer,
            AgentRole::RiskManager,
            AgentRole::StrategyOptimizer,
            AgentRole::DecisionMaker,
            AgentRole::PortfolioManager,
            AgentRole::ArbitrageAgent,
            AgentRole::YieldFarmer,
        ]
    }

    pub fn as_str(&self) -> &str {
        match self {
            AgentRole::MarketAnalyzer => "market_analyzer",
            AgentRole::RiskManager => "risk_manager",
            AgentRole::StrategyOptimizer => "strategy_optimizer",
            AgentRole::DecisionMaker => "decision_maker",
            AgentRole::PortfolioManager => "portfolio_manager",
            AgentRole::ArbitrageAgent => "arbitrage_agent",
            AgentRole::YieldFarmer => "yield_farmer",
            AgentRole::Custom(name) => name,
        }
    }

    /// Human-readable label, e.g. "Risk Manager"
    pub fn display_name(&self) -> String {
        self.as_str()
            .split('_')
            .filter(|w| !w.is_empty())
            .map(|w| {
                let mut chars = w.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, AgentRole::Custom(_))
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AgentRole {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        if normalized.is_empty() {
            return Err(ConfigurationError::MissingRole);
        }
        if !normalized
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(ConfigurationError::UnknownRole(s.to_string()));
        }

        let role = AgentRole::builtin()
            .iter()
            .find(|r| r.as_str() == normalized)
            .cloned()
            .unwrap_or(AgentRole::Custom(normalized));
        Ok(role)
    }
}

impl Serialize for AgentRole {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AgentRole {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Identity of an agent: stable id plus role label.
///
/// Set once when the agent runtime is constructed and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentIdentity {
    pub id: AgentId,
    pub role: AgentRole,
}

impl AgentIdentity {
    pub fn new(id: impl Into<AgentId>, role: AgentRole) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }
}

impl std::fmt::Display for AgentIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.id, self.role)
    }
}
