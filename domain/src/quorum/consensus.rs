//! Swarm consensus types
//!
//! [`ConsensusPolicy`] turns the votes of a closed round into an immutable
//! [`SwarmConsensus`].

use super::decision::{AgentDecision, Decision};
use crate::agent::identity::AgentId;
use crate::config::SwarmConfig;
use crate::proposal::ProposalId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The verdict of one consensus round
///
/// # Example
///
/// ```
/// use swarm_domain::{AgentDecision, AgentRole, ConsensusPolicy, ProposalId, SwarmConfig};
///
/// let config = SwarmConfig::new(AgentRole::DecisionMaker);
/// let votes = vec![
///     AgentDecision::approve("agent-b", 0.9, "Liquidity is deep"),
///     AgentDecision::approve("agent-c", 0.6, "Acceptable slippage"),
/// ];
///
/// let result = ConsensusPolicy::decide(ProposalId::generate(), votes, &config);
/// assert!(result.consensus); // (0.9 + 0.6) / 2 = 0.75 >= 0.7
/// assert_eq!(result.total_votes, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwarmConsensus {
    pub proposal_id: ProposalId,
    /// Whether both the approval threshold and the quorum were met
    pub consensus: bool,
    /// Confidence-weighted approval rate (0.0 to 1.0)
    pub approval_rate: f64,
    pub total_votes: usize,
    /// Recorded decisions in arrival order
    pub votes: Vec<AgentDecision>,
    pub timestamp: DateTime<Utc>,
}

impl SwarmConsensus {
    pub fn approvals(&self) -> impl Iterator<Item = &AgentDecision> {
        self.by_decision(Decision::Approve)
    }

    pub fn rejections(&self) -> impl Iterator<Item = &AgentDecision> {
        self.by_decision(Decision::Reject)
    }

    pub fn abstentions(&self) -> impl Iterator<Item = &AgentDecision> {
        self.by_decision(Decision::Abstain)
    }

    fn by_decision(&self, decision: Decision) -> impl Iterator<Item = &AgentDecision> {
        self.votes.iter().filter(move |v| v.decision == decision)
    }

    /// Agents whose vote was an approval; candidates for `execute`
    pub fn approving_agents(&self) -> Vec<AgentId> {
        self.approvals().map(|v| v.agent_id.clone()).collect()
    }

    /// Look up the vote of a single agent
    pub fn vote_of(&self, agent_id: &AgentId) -> Option<&AgentDecision> {
        self.votes.iter().find(|v| &v.agent_id == agent_id)
    }

    /// Number of agents that missed the deadline
    pub fn timeouts(&self) -> usize {
        self.votes.iter().filter(|v| v.is_timeout()).count()
    }

    /// Generate a visual vote summary (e.g., "[●○·]")
    pub fn vote_summary(&self) -> String {
        let mut summary = String::from("[");
        for vote in &self.votes {
            summary.push(vote.decision.symbol());
        }
        summary.push(']');
        summary
    }

    /// Reasoning of every vote, in arrival order
    pub fn reasons(&self) -> Vec<&str> {
        self.votes.iter().map(|v| v.reasoning.as_str()).collect()
    }
}

/// Pure function from a closed vote set to a verdict.
///
/// - `total_votes` counts every recorded decision, abstentions and timeouts
///   included.
/// - `approval_rate` is the sum of approving confidences divided by
///   `total_votes`; rejections and abstentions add nothing to the numerator
///   but still count in the denominator.
/// - `consensus` requires `approval_rate >= min_confidence` **and**
///   `total_votes >= min_votes`.
pub struct ConsensusPolicy;

impl ConsensusPolicy {
    /// Compute the verdict for `votes` under `config`.
    pub fn decide(
        proposal_id: ProposalId,
        votes: Vec<AgentDecision>,
        config: &SwarmConfig,
    ) -> SwarmConsensus {
        let total_votes = votes.len();
        let approval_rate = Self::approval_rate(&votes);
        let consensus = Self::is_reached(approval_rate, total_votes, config);

        SwarmConsensus {
            proposal_id,
            consensus,
            approval_rate,
            total_votes,
            votes,
            timestamp: Utc::now(),
        }
    }

    /// Confidence-weighted approval rate; 0 when there are no votes.
    pub fn approval_rate(votes: &[AgentDecision]) -> f64 {
        if votes.is_empty() {
            return 0.0;
        }
        let approved: f64 = votes
            .iter()
            .filter(|v| v.is_approval())
            .map(|v| v.confidence)
            .sum();
        (approved / votes.len() as f64).clamp(0.0, 1.0)
    }

    /// Both conditions are required; quorum failure wins regardless of rate.
    pub fn is_reached(approval_rate: f64, total_votes: usize, config: &SwarmConfig) -> bool {
        total_votes >= config.min_votes && approval_rate >= config.min_confidence
    }
}
