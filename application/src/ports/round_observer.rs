//! Round observer port
//!
//! Defines the interface for reporting progress while a consensus round runs.

use swarm_domain::{AgentDecision, Proposal, SwarmConsensus};

/// Callback for progress updates during a consensus round
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (progress bars, plain lines, nothing).
pub trait RoundObserver: Send + Sync {
    /// Called once the proposal is built, before fan-out
    fn on_round_start(&self, proposal: &Proposal, expected_voters: usize);

    /// Called for every decision recorded in the ledger, including timeouts
    fn on_vote(&self, decision: &AgentDecision);

    /// Called when the round has closed and the verdict is computed
    fn on_round_complete(&self, consensus: &SwarmConsensus);
}

/// No-op observer for when progress reporting is not needed
pub struct NoRoundObserver;

impl RoundObserver for NoRoundObserver {
    fn on_round_start(&self, _proposal: &Proposal, _expected_voters: usize) {}
    fn on_vote(&self, _decision: &AgentDecision) {}
    fn on_round_complete(&self, _consensus: &SwarmConsensus) {}
}
