//! Proposal entity.

use crate::agent::identity::AgentIdentity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Unique identifier of a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProposalId(Uuid);

impl ProposalId {
    /// Generates a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for ProposalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ProposalId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// A single action candidate submitted for swarm approval.
///
/// Created once per proposal round and read-only afterwards; peers only ever
/// see it behind a shared reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    /// Kind of action, e.g. "swap" or "transfer"
    pub action_type: String,
    pub params: Map<String, Value>,
    pub proposer: AgentIdentity,
    pub created_at: DateTime<Utc>,
}

impl Proposal {
    pub fn new(
        action_type: impl Into<String>,
        params: Map<String, Value>,
        proposer: AgentIdentity,
    ) -> Self {
        Self {
            id: ProposalId::generate(),
            action_type: action_type.into(),
            params,
            proposer,
            created_at: Utc::now(),
        }
    }

    /// Look up a single parameter
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// Parameters rendered as pretty JSON (for prompts and logs)
    pub fn params_pretty(&self) -> String {
        serde_json::to_string_pretty(&self.params).unwrap_or_else(|_| "{}".to_string())
    }
}
