//! Propose Action use case
//!
//! Runs one consensus round: validate, build the shared evaluation context,
//! fan out to the ready peers, collect votes under the proposer's deadline
//! and reduce them with [`ConsensusPolicy`].

use super::collect_votes::VoteAggregator;
use crate::ports::audit_logger::{AuditEvent, AuditLogger, NoAuditLogger};
use crate::ports::round_observer::{NoRoundObserver, RoundObserver};
use crate::runtime::AgentRuntime;
use serde_json::{Map, Value, json};
use std::collections::HashSet;
use std::sync::Arc;
use swarm_domain::{
    AgentId, ConfigurationError, ConsensusPolicy, EvaluationContext, Proposal, SwarmConsensus,
};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that stop a round before fan-out
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProposeError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Agent {0} is not running")]
    ProposerNotRunning(AgentId),

    #[error("Unknown agent: {0}")]
    UnknownAgent(AgentId),
}

/// Input for one consensus round
pub struct ProposeInput {
    pub action_type: String,
    pub params: Map<String, Value>,
    /// Agent submitting the proposal; its config sets thresholds and deadline
    pub proposer: Arc<AgentRuntime>,
    pub peers: Vec<Arc<AgentRuntime>>,
    /// Shared market snapshot handed to every evaluator
    pub market_context: Map<String, Value>,
    /// Whether the proposer also casts a vote
    pub self_vote: bool,
}

impl ProposeInput {
    pub fn new(
        action_type: impl Into<String>,
        params: Map<String, Value>,
        proposer: Arc<AgentRuntime>,
        peers: Vec<Arc<AgentRuntime>>,
    ) -> Self {
        Self {
            action_type: action_type.into(),
            params,
            proposer,
            peers,
            market_context: Map::new(),
            self_vote: false,
        }
    }

    pub fn with_market_context(mut self, market_context: Map<String, Value>) -> Self {
        self.market_context = market_context;
        self
    }

    pub fn with_self_vote(mut self, self_vote: bool) -> Self {
        self.self_vote = self_vote;
        self
    }
}

/// Use case for running a consensus round
pub struct ProposalCoordinator {
    aggregator: VoteAggregator,
    audit_logger: Arc<dyn AuditLogger>,
}

impl Default for ProposalCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl ProposalCoordinator {
    pub fn new() -> Self {
        Self {
            aggregator: VoteAggregator::new(),
            audit_logger: Arc::new(NoAuditLogger),
        }
    }

    pub fn with_audit_logger(mut self, logger: Arc<dyn AuditLogger>) -> Self {
        self.aggregator = VoteAggregator::new().with_audit_logger(Arc::clone(&logger));
        self.audit_logger = logger;
        self
    }

    /// Run a round with default (no-op) progress
    pub async fn propose(&self, input: ProposeInput) -> Result<SwarmConsensus, ProposeError> {
        self.propose_with_observer(input, &NoRoundObserver).await
    }

    /// Run a round with progress callbacks
    pub async fn propose_with_observer(
        &self,
        input: ProposeInput,
        observer: &dyn RoundObserver,
    ) -> Result<SwarmConsensus, ProposeError> {
        let proposer = input.proposer;
        let config = proposer.config().clone();

        if !proposer.is_ready() {
            return Err(ProposeError::ProposerNotRunning(proposer.id().clone()));
        }

        // Distinct peers other than the proposer, in the order given
        let mut seen = HashSet::from([proposer.id().clone()]);
        let peers: Vec<_> = input
            .peers
            .into_iter()
            .filter(|p| seen.insert(p.id().clone()))
            .collect();

        config.check_quorum(peers.len() + 1)?;

        let mut voters: Vec<_> = peers
            .into_iter()
            .filter(|p| {
                let ready = p.is_ready();
                if !ready {
                    debug!("Skipping peer {} ({})", p.id(), p.state());
                }
                ready
            })
            .collect();
        if input.self_vote {
            voters.push(Arc::clone(&proposer));
        }

        let proposal = Proposal::new(input.action_type, input.params, proposer.identity().clone());
        let proposal_id = proposal.id;
        let context = Arc::new(
            EvaluationContext::new(proposal).with_market_context(input.market_context),
        );

        info!(
            "Proposal {} ({}) from {}: asking {} voter(s), deadline {}s",
            proposal_id,
            context.proposal().action_type,
            proposer.id(),
            voters.len(),
            config.timeout.as_secs_f64()
        );
        observer.on_round_start(context.proposal(), voters.len());
        self.audit_logger.log(AuditEvent::new(
            "round_started",
            json!({
                "proposal_id": proposal_id,
                "action_type": context.proposal().action_type,
                "params": context.proposal().params,
                "proposer": proposer.id(),
                "voters": voters.iter().map(|v| v.id().clone()).collect::<Vec<_>>(),
                "timeout_secs": config.timeout.as_secs_f64(),
            }),
        ));

        let votes = self
            .aggregator
            .collect(proposal_id, context, voters, config.timeout, observer)
            .await;

        let consensus = ConsensusPolicy::decide(proposal_id, votes, &config);

        info!(
            "Proposal {} closed: consensus={} approval_rate={:.2} votes={}",
            proposal_id, consensus.consensus, consensus.approval_rate, consensus.total_votes
        );
        observer.on_round_complete(&consensus);
        self.audit_logger.log(AuditEvent::new(
            "round_closed",
            json!({
                "proposal_id": proposal_id,
                "consensus": consensus.consensus,
                "approval_rate": consensus.approval_rate,
                "total_votes": consensus.total_votes,
                "timeouts": consensus.timeouts(),
            }),
        ));

        Ok(consensus)
    }
}
