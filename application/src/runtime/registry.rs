//! Agent registry
//!
//! An explicit, insertion-ordered arena of agent runtimes keyed by
//! [`AgentId`]. Built at startup and torn down with
//! [`shutdown_all`](AgentRegistry::shutdown_all); agents never hold
//! references to each other, only ids.

use super::agent_runtime::AgentRuntime;
use crate::ports::plugin::InitializationError;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use swarm_domain::{AgentId, AgentStatus, ConfigurationError};
use tracing::{info, warn};

/// Outcome of [`AgentRegistry::start_all`]
#[derive(Debug, Default)]
pub struct StartupReport {
    pub started: Vec<AgentId>,
    pub failed: Vec<(AgentId, InitializationError)>,
}

impl StartupReport {
    pub fn all_started(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Default)]
pub struct AgentRegistry {
    agents: Vec<Arc<AgentRuntime>>,
    index: HashMap<AgentId, usize>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an agent. Ids must be unique within the registry.
    pub fn register(
        &mut self,
        runtime: AgentRuntime,
    ) -> Result<Arc<AgentRuntime>, ConfigurationError> {
        let id = runtime.id().clone();
        if self.index.contains_key(&id) {
            return Err(ConfigurationError::DuplicateAgent(id.to_string()));
        }
        let runtime = Arc::new(runtime);
        self.index.insert(id, self.agents.len());
        self.agents.push(Arc::clone(&runtime));
        Ok(runtime)
    }

    pub fn get(&self, id: &AgentId) -> Option<&Arc<AgentRuntime>> {
        self.index.get(id).map(|&i| &self.agents[i])
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Agents in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<AgentRuntime>> {
        self.agents.iter()
    }

    /// Every agent except `id`, in registration order
    pub fn peers_of(&self, id: &AgentId) -> Vec<Arc<AgentRuntime>> {
        self.agents
            .iter()
            .filter(|a| a.id() != id)
            .cloned()
            .collect()
    }

    /// Ids of the agents currently accepting evaluations
    pub fn active_ids(&self) -> Vec<AgentId> {
        self.agents
            .iter()
            .filter(|a| a.is_ready())
            .map(|a| a.id().clone())
            .collect()
    }

    pub fn statuses(&self) -> Vec<AgentStatus> {
        self.agents.iter().map(|a| a.status()).collect()
    }

    /// Initialize every agent concurrently.
    ///
    /// A failing agent is logged and left `closed`; it does not stop the others.
    pub async fn start_all(&self) -> StartupReport {
        info!("Starting {} agents", self.agents.len());
        let results = join_all(self.agents.iter().map(|agent| async move {
            (agent.id().clone(), agent.initialize().await)
        }))
        .await;

        let mut report = StartupReport::default();
        for (id, result) in results {
            match result {
                Ok(()) => report.started.push(id),
                Err(e) => {
                    warn!("Agent {} excluded from rounds: {}", id, e);
                    report.failed.push((id, e));
                }
            }
        }
        info!(
            "{} agents started, {} failed",
            report.started.len(),
            report.failed.len()
        );
        report
    }

    /// Clean up every agent concurrently.
    pub async fn shutdown_all(&self) {
        join_all(self.agents.iter().map(|agent| agent.cleanup())).await;
        info!("All agents shut down");
    }
}
