//! Swarm facade
//!
//! Ties a registry of agents to a coordinator: agents join, any member can
//! propose an action to all the others, and approved actions are executed
//! by the agents that voted for them. Finished rounds are kept in a bounded
//! history.

use super::propose_action::{ProposalCoordinator, ProposeError, ProposeInput};
use crate::ports::audit_logger::AuditLogger;
use crate::ports::round_observer::{NoRoundObserver, RoundObserver};
use crate::runtime::{AgentRegistry, AgentRuntime, ExecuteError, StartupReport};
use futures::future::join_all;
use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use swarm_domain::{AgentId, AgentStatus, ConfigurationError, SwarmConsensus};
use tracing::{info, warn};

/// Default number of finished rounds kept in history
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// A proposal submitted through the [`Swarm`] facade
#[derive(Debug, Clone)]
pub struct ActionRequest {
    pub proposer: AgentId,
    pub action_type: String,
    pub params: Map<String, Value>,
    pub market_context: Map<String, Value>,
    pub self_vote: bool,
}

impl ActionRequest {
    pub fn new(
        proposer: impl Into<AgentId>,
        action_type: impl Into<String>,
        params: Map<String, Value>,
    ) -> Self {
        Self {
            proposer: proposer.into(),
            action_type: action_type.into(),
            params,
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

pub struct Swarm {
    registry: AgentRegistry,
    coordinator: ProposalCoordinator,
    history: Mutex<VecDeque<SwarmConsensus>>,
    history_limit: usize,
}

impl Swarm {
    pub fn new(registry: AgentRegistry) -> Self {
        Self {
            registry,
            coordinator: ProposalCoordinator::new(),
            history: Mutex::new(VecDeque::new()),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn with_audit_logger(mut self, logger: Arc<dyn AuditLogger>) -> Self {
        self.coordinator = ProposalCoordinator::new().with_audit_logger(logger);
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// Add an agent to the swarm. It takes part in rounds once initialized.
    pub fn join(&mut self, runtime: AgentRuntime) -> Result<Arc<AgentRuntime>, ConfigurationError> {
        let runtime = self.registry.register(runtime)?;
        info!("Agent {} joined the swarm", runtime.identity());
        Ok(runtime)
    }

    pub async fn start(&self) -> StartupReport {
        self.registry.start_all().await
    }

    pub async fn shutdown(&self) {
        self.registry.shutdown_all().await;
    }

    pub fn statuses(&self) -> Vec<AgentStatus> {
        self.registry.statuses()
    }

    /// Propose an action from `proposer` to every other member
    pub async fn propose_action(
        &self,
        proposer: impl Into<AgentId>,
        action_type: impl Into<String>,
        params: Map<String, Value>,
    ) -> Result<SwarmConsensus, ProposeError> {
        self.propose(ActionRequest::new(proposer, action_type, params), &NoRoundObserver)
            .await
    }

    pub async fn propose(
        &self,
        request: ActionRequest,
        observer: &dyn RoundObserver,
    ) -> Result<SwarmConsensus, ProposeError> {
        let proposer = self
            .registry
            .get(&request.proposer)
            .cloned()
            .ok_or_else(|| ProposeError::UnknownAgent(request.proposer.clone()))?;
        let peers = self.registry.peers_of(&request.proposer);

        let input = ProposeInput::new(request.action_type, request.params, proposer, peers)
            .with_market_context(request.market_context)
            .with_self_vote(request.self_vote);

        let consensus = self.coordinator.propose_with_observer(input, observer).await?;
        self.remember(consensus.clone());
        Ok(consensus)
    }

    /// Run an operation on one agent
    pub async fn execute(
        &self,
        agent_id: &AgentId,
        operation: &str,
        params: &Map<String, Value>,
    ) -> Result<Value, ExecuteError> {
        let agent = self
            .registry
            .get(agent_id)
            .ok_or_else(|| ExecuteError::UnknownAgent(agent_id.clone()))?;
        agent.execute(operation, params).await
    }

    /// Run an operation concurrently on every agent that approved.
    ///
    /// Returns nothing when the round did not reach consensus.
    pub async fn execute_approved(
        &self,
        consensus: &SwarmConsensus,
        operation: &str,
        params: &Map<String, Value>,
    ) -> Vec<(AgentId, Result<Value, ExecuteError>)> {
        if !consensus.consensus {
            warn!(
                "Not executing {} for {}: consensus not reached",
                operation, consensus.proposal_id
            );
            return Vec::new();
        }

        let approving = consensus.approving_agents();
        info!(
            "Executing {} on {} approving agent(s)",
            operation,
            approving.len()
        );
        join_all(approving.into_iter().map(|id| async move {
            let result = self.execute(&id, operation, params).await;
            (id, result)
        }))
        .await
    }

    /// Finished rounds, oldest first
    pub fn history(&self) -> Vec<SwarmConsensus> {
        self.history_lock().iter().cloned().collect()
    }

    pub fn clear_history(&self) {
        self.history_lock().clear();
    }

    fn remember(&self, consensus: SwarmConsensus) {
        if self.history_limit == 0 {
            return;
        }
        let mut history = self.history_lock();
        while history.len() >= self.history_limit {
            history.pop_front();
        }
        history.push_back(consensus);
    }

    fn history_lock(&self) -> MutexGuard<'_, VecDeque<SwarmConsensus>> {
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SandboxPolicy;
    use crate::ports::plugin::Plugin;
    use crate::testing::ScriptedPlugin;
    use std::time::Duration;
    use swarm_domain::{AgentIdentity, AgentRole, SwarmConfig};

    fn runtime(id: &str, role: AgentRole, plugin: impl Plugin + 'static) -> AgentRuntime {
        AgentRuntime::new(
            AgentIdentity::new(id, role.clone()),
            SwarmConfig::new(role).with_timeout(Duration::from_secs(5)),
            Arc::new(plugin),
            SandboxPolicy::default(),
        )
        .unwrap()
    }

    async fn swarm(peers: Vec<(&str, ScriptedPlugin)>) -> Swarm {
        let mut swarm = Swarm::new(AgentRegistry::new());
        swarm
            .join(runtime(
                "decider",
                AgentRole::DecisionMaker,
                ScriptedPlugin::approve(1.0),
            ))
            .unwrap();
        for (id, plugin) in peers {
            swarm
                .join(runtime(id, AgentRole::RiskManager, plugin))
                .unwrap();
        }
        assert!(swarm.start().await.all_started());
        swarm
    }

    #[tokio::test]
    async fn test_join_rejects_duplicates() {
        let mut swarm = Swarm::new(AgentRegistry::new());
        swarm
            .join(runtime("a", AgentRole::RiskManager, ScriptedPlugin::approve(0.9)))
            .unwrap();
        assert!(
            swarm
                .join(runtime("a", AgentRole::MarketAnalyzer, ScriptedPlugin::approve(0.9)))
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_propose_uses_all_other_members() {
        let swarm = swarm(vec![
            ("risk", ScriptedPlugin::approve(0.9)),
            ("market", ScriptedPlugin::approve(0.8)),
        ])
        .await;

        let result = swarm
            .propose_action("decider", "swap", Map::new())
            .await
            .unwrap();
        assert_eq!(result.total_votes, 2);
        assert!(result.consensus);
        assert!(result.vote_of(&AgentId::new("decider")).is_none());
        assert_eq!(swarm.history().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_proposer() {
        let swarm = swarm(vec![("risk", ScriptedPlugin::approve(0.9))]).await;
        let err = swarm
            .propose_action("ghost", "swap", Map::new())
            .await
            .unwrap_err();
        assert_eq!(err, ProposeError::UnknownAgent(AgentId::new("ghost")));
        assert!(swarm.history().is_empty());
    }

    #[tokio::test]
    async fn test_execute_approved_runs_on_approvers_only() {
        let swarm = swarm(vec![
            ("risk", ScriptedPlugin::approve(0.9)),
            ("market", ScriptedPlugin::approve(0.9)),
            ("skeptic", ScriptedPlugin::reject(0.9)),
        ])
        .await;

        // 1.8 / 3 misses the 0.7 threshold; force the verdict to exercise execution
        let consensus = SwarmConsensus {
            consensus: true,
            ..swarm
                .propose_action("decider", "swap", Map::new())
                .await
                .unwrap()
        };
        let results = swarm.execute_approved(&consensus, "swap", &Map::new()).await;

        let mut ids: Vec<_> = results.iter().map(|(id, _)| id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["market", "risk"]);
        assert!(results.iter().all(|(_, r)| r.is_ok()));
    }

    #[tokio::test]
    async fn test_execute_approved_skips_failed_round() {
        let swarm = swarm(vec![
            ("s1", ScriptedPlugin::reject(0.9)),
            ("s2", ScriptedPlugin::reject(0.9)),
        ])
        .await;
        let consensus = swarm
            .propose_action("decider", "swap", Map::new())
            .await
            .unwrap();
        assert!(!consensus.consensus);
        assert!(
            swarm
                .execute_approved(&consensus, "swap", &Map::new())
                .await
                .is_empty()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_scenario_e_execute_single_flight() {
        let swarm = Arc::new(
            swarm(vec![(
                "trader",
                ScriptedPlugin::approve(0.9).with_execute_delay(Duration::from_secs(3)),
            )])
            .await,
        );
        let trader = AgentId::new("trader");

        let first = {
            let swarm = Arc::clone(&swarm);
            let trader = trader.clone();
            tokio::spawn(async move { swarm.execute(&trader, "swap", &Map::new()).await })
        };
        tokio::task::yield_now().await;

        let second = swarm.execute(&trader, "swap", &Map::new()).await;
        assert_eq!(second, Err(ExecuteError::Busy));
        assert!(first.await.unwrap().is_ok());

        let unknown = swarm.execute(&AgentId::new("ghost"), "swap", &Map::new()).await;
        assert_eq!(unknown, Err(ExecuteError::UnknownAgent(AgentId::new("ghost"))));
    }

    #[tokio::test]
    async fn test_history_bounded_and_clearable() {
        let mut swarm = Swarm::new(AgentRegistry::new()).with_history_limit(2);
        for (id, role) in [
            ("decider", AgentRole::DecisionMaker),
            ("risk", AgentRole::RiskManager),
            ("market", AgentRole::MarketAnalyzer),
        ] {
            swarm
                .join(runtime(id, role, ScriptedPlugin::approve(0.9)))
                .unwrap();
        }
        swarm.start().await;

        let mut ids = Vec::new();
        for _ in 0..3 {
            ids.push(
                swarm
                    .propose_action("decider", "swap", Map::new())
                    .await
                    .unwrap()
                    .proposal_id,
            );
        }
        let history: Vec<_> = swarm.history().iter().map(|c| c.proposal_id).collect();
        assert_eq!(history, ids[1..].to_vec());

        swarm.clear_history();
        assert!(swarm.history().is_empty());
    }
}
