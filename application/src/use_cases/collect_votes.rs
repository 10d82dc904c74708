//! Vote collection for one consensus round
//!
//! Fans a proposal out to every voter and gathers their decisions into a
//! [`VoteLedger`] until either everybody answered or the deadline passed.
//! Voters still running at the deadline are recorded as `timeout`
//! abstentions, signalled through the round's cancellation token and left
//! to finish on their own.

use crate::ports::audit_logger::{AuditEvent, AuditLogger, NoAuditLogger};
use crate::ports::round_observer::RoundObserver;
use crate::runtime::AgentRuntime;
use serde_json::json;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use swarm_domain::{AgentDecision, AgentId, EvaluationContext, ProposalId};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Stand-in deadline when `now + timeout` does not fit in an `Instant`
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Result of offering a decision to the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Recorded,
    /// The agent already has a vote in this round
    Duplicate,
    /// The agent was not asked in this round
    Unexpected,
    /// The round has already closed
    Closed,
}

impl RecordOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordOutcome::Recorded => "recorded",
            RecordOutcome::Duplicate => "duplicate",
            RecordOutcome::Unexpected => "unexpected",
            RecordOutcome::Closed => "closed",
        }
    }
}

/// The vote set of one round plus its open/closed flag.
///
/// Holds at most one decision per expected agent, in arrival order.
#[derive(Debug)]
pub struct VoteLedger {
    expected: Vec<AgentId>,
    votes: Vec<AgentDecision>,
    closed: bool,
}

impl VoteLedger {
    pub fn new(expected: impl IntoIterator<Item = AgentId>) -> Self {
        let mut seen = HashSet::new();
        let expected = expected
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .collect();
        Self {
            expected,
            votes: Vec::new(),
            closed: false,
        }
    }

    pub fn record(&mut self, decision: AgentDecision) -> RecordOutcome {
        if self.closed {
            return RecordOutcome::Closed;
        }
        if !self.expected.contains(&decision.agent_id) {
            return RecordOutcome::Unexpected;
        }
        if self.has_voted(&decision.agent_id) {
            return RecordOutcome::Duplicate;
        }
        self.votes.push(decision);
        RecordOutcome::Recorded
    }

    pub fn has_voted(&self, agent_id: &AgentId) -> bool {
        self.votes.iter().any(|v| &v.agent_id == agent_id)
    }

    pub fn is_complete(&self) -> bool {
        self.votes.len() == self.expected.len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Expected agents without a vote, in the order they were asked
    pub fn missing(&self) -> Vec<AgentId> {
        self.expected
            .iter()
            .filter(|id| !self.has_voted(id))
            .cloned()
            .collect()
    }

    /// Close the round, force-recording a timeout for every missing agent.
    ///
    /// Returns the forced decisions. Closing twice is a no-op.
    pub fn close(&mut self) -> Vec<AgentDecision> {
        if self.closed {
            return Vec::new();
        }
        let forced: Vec<_> = self.missing().into_iter().map(AgentDecision::timeout).collect();
        self.votes.extend(forced.iter().cloned());
        self.closed = true;
        forced
    }

    pub fn votes(&self) -> &[AgentDecision] {
        &self.votes
    }
}

/// Collects the votes of one round under a deadline
pub struct VoteAggregator {
    audit_logger: Arc<dyn AuditLogger>,
}

impl Default for VoteAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl VoteAggregator {
    pub fn new() -> Self {
        Self {
            audit_logger: Arc::new(NoAuditLogger),
        }
    }

    pub fn with_audit_logger(mut self, logger: Arc<dyn AuditLogger>) -> Self {
        self.audit_logger = logger;
        self
    }

    /// Ask every voter concurrently and return the closed vote set.
    ///
    /// Resolves no later than `timeout` after fan-out (plus scheduling
    /// jitter), however many voters there are and however they behave.
    pub async fn collect(
        &self,
        proposal_id: ProposalId,
        context: Arc<EvaluationContext>,
        voters: Vec<Arc<AgentRuntime>>,
        timeout: Duration,
        observer: &dyn RoundObserver,
    ) -> Vec<AgentDecision> {
        let ledger = Arc::new(Mutex::new(VoteLedger::new(
            voters.iter().map(|v| v.id().clone()),
        )));
        let cancel = CancellationToken::new();
        let now = Instant::now();
        let deadline = now.checked_add(timeout).unwrap_or(now + FAR_FUTURE);
        let mut join_set = JoinSet::new();

        for voter in voters {
            let ledger = Arc::clone(&ledger);
            let context = Arc::clone(&context);
            let cancel = cancel.child_token();
            let audit_logger = Arc::clone(&self.audit_logger);

            join_set.spawn(async move {
                let decision = voter.evaluate(&context, cancel).await;
                let outcome = lock(&ledger).record(decision.clone());
                // a cancelled voter's own timeout after close is already in the ledger
                let late_timeout = outcome == RecordOutcome::Closed && decision.is_timeout();
                if outcome != RecordOutcome::Recorded && !late_timeout {
                    debug!(
                        "Discarded vote from {} for {}: {}",
                        decision.agent_id,
                        proposal_id,
                        outcome.as_str()
                    );
                    audit_logger.log(AuditEvent::new(
                        "vote_discarded",
                        json!({
                            "proposal_id": proposal_id,
                            "agent_id": decision.agent_id,
                            "reason": outcome.as_str(),
                        }),
                    ));
                }
                (decision, outcome)
            });
        }

        let mut notified: HashSet<AgentId> = HashSet::new();

        loop {
            match tokio::time::timeout_at(deadline, join_set.join_next()).await {
                Ok(Some(Ok((decision, RecordOutcome::Recorded)))) => {
                    self.notify_vote(proposal_id, &decision, observer);
                    notified.insert(decision.agent_id);
                }
                Ok(Some(Ok(_))) => {}
                Ok(Some(Err(e))) => {
                    warn!("Voter task for {} failed: {}", proposal_id, e);
                }
                Ok(None) => break,
                Err(_) => {
                    info!(
                        "Round {} deadline reached after {}s",
                        proposal_id,
                        timeout.as_secs_f64()
                    );
                    break;
                }
            }
        }

        let votes = {
            let mut ledger = lock(&ledger);
            let forced = ledger.close();
            if !forced.is_empty() {
                info!(
                    "Round {}: {} voter(s) timed out",
                    proposal_id,
                    forced.len()
                );
            }
            ledger.votes().to_vec()
        };

        cancel.cancel();
        join_set.detach_all();

        // Votes recorded just before the deadline and forced timeouts
        for decision in votes.iter().filter(|v| !notified.contains(&v.agent_id)) {
            self.notify_vote(proposal_id, decision, observer);
        }

        votes
    }

    fn notify_vote(
        &self,
        proposal_id: ProposalId,
        decision: &AgentDecision,
        observer: &dyn RoundObserver,
    ) {
        debug!(
            "Vote from {} on {}: {} ({:.2})",
            decision.agent_id, proposal_id, decision.decision, decision.confidence
        );
        observer.on_vote(decision);
        self.audit_logger.log(AuditEvent::new(
            "vote_recorded",
            json!({
                "proposal_id": proposal_id,
                "agent_id": decision.agent_id,
                "decision": decision.decision,
                "confidence": decision.confidence,
                "reasoning": decision.reasoning,
            }),
        ));
    }
}

fn lock(ledger: &Mutex<VoteLedger>) -> MutexGuard<'_, VoteLedger> {
    ledger.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SandboxPolicy;
    use crate::ports::plugin::Plugin;
    use crate::ports::round_observer::NoRoundObserver;
    use crate::testing::{RecordingAuditLogger, ScriptedPlugin, test_context};
    use swarm_domain::{AgentIdentity, AgentRole, Decision, SwarmConfig};

    async fn voter(id: &str, plugin: impl Plugin + 'static) -> Arc<AgentRuntime> {
        let runtime = AgentRuntime::new(
            AgentIdentity::new(id, AgentRole::RiskManager),
            SwarmConfig::new(AgentRole::RiskManager),
            Arc::new(plugin),
            SandboxPolicy::default(),
        )
        .unwrap();
        runtime.initialize().await.unwrap();
        Arc::new(runtime)
    }

    #[test]
    fn test_ledger_one_vote_per_agent() {
        let mut ledger = VoteLedger::new([AgentId::new("a"), AgentId::new("b")]);

        assert_eq!(
            ledger.record(AgentDecision::approve("a", 0.9, "")),
            RecordOutcome::Recorded
        );
        assert_eq!(
            ledger.record(AgentDecision::reject("a", 0.9, "changed my mind")),
            RecordOutcome::Duplicate
        );
        assert_eq!(
            ledger.record(AgentDecision::approve("mallory", 1.0, "")),
            RecordOutcome::Unexpected
        );
        assert!(!ledger.is_complete());
        assert_eq!(ledger.missing(), vec![AgentId::new("b")]);

        let forced = ledger.close();
        assert_eq!(forced.len(), 1);
        assert!(forced[0].is_timeout());
        assert!(ledger.is_complete());
        assert_eq!(
            ledger.record(AgentDecision::approve("b", 0.9, "")),
            RecordOutcome::Closed
        );
        assert_eq!(ledger.votes()[0].decision, Decision::Approve);
        assert!(ledger.close().is_empty());
    }

    #[test]
    fn test_ledger_dedupes_expected() {
        let ledger = VoteLedger::new([AgentId::new("a"), AgentId::new("a")]);
        assert_eq!(ledger.missing().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_collect_finishes_early_when_all_voted() {
        let voters = vec![
            voter("b", ScriptedPlugin::approve(0.9).with_delay(Duration::from_secs(1))).await,
            voter("c", ScriptedPlugin::approve(0.6).with_delay(Duration::from_secs(2))).await,
        ];
        let start = Instant::now();
        let votes = VoteAggregator::new()
            .collect(
                ProposalId::generate(),
                Arc::new(test_context()),
                voters,
                Duration::from_secs(5),
                &NoRoundObserver,
            )
            .await;

        assert_eq!(start.elapsed(), Duration::from_secs(2));
        let ids: Vec<_> = votes.iter().map(|v| v.agent_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_bounded_regardless_of_peer_count() {
        let mut voters = Vec::new();
        for i in 0..50 {
            voters.push(
                voter(
                    &format!("slow-{i}"),
                    ScriptedPlugin::approve(0.9).with_delay(Duration::from_secs(3600)),
                )
                .await,
            );
        }
        let audit = Arc::new(RecordingAuditLogger::default());
        let start = Instant::now();
        let votes = VoteAggregator::new()
            .with_audit_logger(audit.clone())
            .collect(
                ProposalId::generate(),
                Arc::new(test_context()),
                voters,
                Duration::from_secs(5),
                &NoRoundObserver,
            )
            .await;

        assert_eq!(start.elapsed(), Duration::from_secs(5));
        assert_eq!(votes.len(), 50);
        assert!(votes.iter().all(|v| v.is_timeout()));
        let recorded = audit
            .event_types()
            .into_iter()
            .filter(|t| *t == "vote_recorded")
            .count();
        assert_eq!(recorded, 50);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_voters_do_not_log_discards() {
        let voters = vec![
            voter("fast", ScriptedPlugin::approve(0.9)).await,
            voter(
                "slow",
                ScriptedPlugin::approve(0.9).with_delay(Duration::from_secs(3600)),
            )
            .await,
        ];
        let audit = Arc::new(RecordingAuditLogger::default());
        VoteAggregator::new()
            .with_audit_logger(audit.clone())
            .collect(
                ProposalId::generate(),
                Arc::new(test_context()),
                voters,
                Duration::from_secs(5),
                &NoRoundObserver,
            )
            .await;

        // let the detached voter observe cancellation and finish
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(audit.event_types(), vec!["vote_recorded", "vote_recorded"]);
    }

    #[tokio::test]
    async fn test_huge_timeout_does_not_overflow() {
        let voters = vec![voter("b", ScriptedPlugin::approve(0.9)).await];
        let votes = VoteAggregator::new()
            .collect(
                ProposalId::generate(),
                Arc::new(test_context()),
                voters,
                Duration::from_secs(u64::MAX),
                &NoRoundObserver,
            )
            .await;
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].decision, Decision::Approve);
    }

    #[tokio::test]
    async fn test_collect_with_no_voters() {
        let votes = VoteAggregator::new()
            .collect(
                ProposalId::generate(),
                Arc::new(test_context()),
                vec![],
                Duration::from_secs(5),
                &NoRoundObserver,
            )
            .await;
        assert!(votes.is_empty());
    }
}
