//! Decision types for swarm consensus
//!
//! This module defines the voting primitives: the three-way [`Decision`], a
//! plugin's raw [`Assessment`], and the identity-stamped [`AgentDecision`]
//! that is recorded in a round.

use crate::agent::identity::AgentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Confidence below which a derived decision becomes a rejection
pub const ABSTAIN_FLOOR: f64 = 0.4;

/// Reasoning recorded for agents that missed the round deadline
pub const TIMEOUT_REASONING: &str = "timeout";

/// An agent's verdict on a proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Reject,
    /// No opinion; also used for timeouts and downgraded failures
    Abstain,
}

impl Decision {
    /// Derive a decision from a bare confidence score.
    ///
    /// At or above `min_confidence` approves, at or above [`ABSTAIN_FLOOR`]
    /// abstains, anything lower rejects.
    ///
    /// ```
    /// use swarm_domain::Decision;
    ///
    /// assert_eq!(Decision::from_confidence(0.8, 0.7), Decision::Approve);
    /// assert_eq!(Decision::from_confidence(0.5, 0.7), Decision::Abstain);
    /// assert_eq!(Decision::from_confidence(0.1, 0.7), Decision::Reject);
    /// ```
    pub fn from_confidence(confidence: f64, min_confidence: f64) -> Self {
        if confidence >= min_confidence {
            Decision::Approve
        } else if confidence >= ABSTAIN_FLOOR {
            Decision::Abstain
        } else {
            Decision::Reject
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Approve => "approve",
            Decision::Reject => "reject",
            Decision::Abstain => "abstain",
        }
    }

    /// Single-character marker for vote summaries
    pub fn symbol(&self) -> char {
        match self {
            Decision::Approve => '●',
            Decision::Reject => '○',
            Decision::Abstain => '·',
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Decision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "approve" | "approved" | "yes" => Ok(Decision::Approve),
            "reject" | "rejected" | "no" => Ok(Decision::Reject),
            "abstain" | "abstained" => Ok(Decision::Abstain),
            other => Err(format!(
                "Unknown decision: {}. Valid: approve, reject, abstain",
                other
            )),
        }
    }
}

/// A plugin's opinion before the runtime stamps identity and time onto it.
///
/// Plugins that only produce a confidence score leave `decision` empty; the
/// runtime then derives it with [`Decision::from_confidence`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub decision: Option<Decision>,
    pub confidence: f64,
    pub reasoning: String,
}

impl Assessment {
    /// An assessment with an explicit decision
    pub fn new(decision: Decision, confidence: f64, reasoning: impl Into<String>) -> Self {
        Self {
            decision: Some(decision),
            confidence,
            reasoning: reasoning.into(),
        }
    }

    /// An assessment carrying only a confidence score
    pub fn scored(confidence: f64, reasoning: impl Into<String>) -> Self {
        Self {
            decision: None,
            confidence,
            reasoning: reasoning.into(),
        }
    }

    pub fn approve(confidence: f64, reasoning: impl Into<String>) -> Self {
        Self::new(Decision::Approve, confidence, reasoning)
    }

    pub fn reject(confidence: f64, reasoning: impl Into<String>) -> Self {
        Self::new(Decision::Reject, confidence, reasoning)
    }

    /// Resolve into a recorded decision for `agent_id`.
    pub fn into_decision(self, agent_id: AgentId, min_confidence: f64) -> AgentDecision {
        let confidence = sanitize_confidence(self.confidence);
        let decision = self
            .decision
            .unwrap_or_else(|| Decision::from_confidence(confidence, min_confidence));
        AgentDecision::new(agent_id, decision, confidence, self.reasoning)
    }
}

/// A single recorded decision from an agent in a consensus round
///
/// # Example
///
/// ```
/// use swarm_domain::{AgentDecision, Decision};
///
/// let vote = AgentDecision::approve("risk-1", 0.9, "Position size within limits");
/// assert_eq!(vote.decision, Decision::Approve);
///
/// let silent = AgentDecision::timeout("market-1");
/// assert_eq!(silent.decision, Decision::Abstain);
/// assert_eq!(silent.confidence, 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentDecision {
    pub agent_id: AgentId,
    pub decision: Decision,
    /// Confidence level, always within 0.0 to 1.0
    pub confidence: f64,
    pub reasoning: String,
    pub timestamp: DateTime<Utc>,
}

impl AgentDecision {
    /// Create a new decision; confidence is clamped into range
    pub fn new(
        agent_id: impl Into<AgentId>,
        decision: Decision,
        confidence: f64,
        reasoning: impl Into<String>,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            decision,
            confidence: sanitize_confidence(confidence),
            reasoning: reasoning.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn approve(
        agent_id: impl Into<AgentId>,
        confidence: f64,
        reasoning: impl Into<String>,
    ) -> Self {
        Self::new(agent_id, Decision::Approve, confidence, reasoning)
    }

    pub fn reject(
        agent_id: impl Into<AgentId>,
        confidence: f64,
        reasoning: impl Into<String>,
    ) -> Self {
        Self::new(agent_id, Decision::Reject, confidence, reasoning)
    }

    /// Zero-confidence abstention with a diagnostic reason
    pub fn abstain(agent_id: impl Into<AgentId>, reasoning: impl Into<String>) -> Self {
        Self::new(agent_id, Decision::Abstain, 0.0, reasoning)
    }

    /// Abstention recorded for an agent that missed the round deadline
    pub fn timeout(agent_id: impl Into<AgentId>) -> Self {
        Self::abstain(agent_id, TIMEOUT_REASONING)
    }

    pub fn is_approval(&self) -> bool {
        self.decision == Decision::Approve
    }

    pub fn is_timeout(&self) -> bool {
        self.decision == Decision::Abstain && self.reasoning == TIMEOUT_REASONING
    }
}

/// Clamp into `[0, 1]`, mapping NaN to 0.
fn sanitize_confidence(confidence: f64) -> f64 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}
