//! Plugin factory
//!
//! Turns `[[agents]]` entries into ready-to-start agent runtimes. Baseline
//! agents need nothing external; advisor agents share one completion backend
//! supplied by the caller.

use super::{AdvisorPlugin, BaselinePlugin};
use crate::config::{FileAgentConfig, FileConfig, PluginKind};
use std::sync::Arc;
use std::time::Duration;
use swarm_application::{
    AgentRegistry, AgentRuntime, AuditLogger, LlmCompletion, NoAuditLogger, Plugin, Swarm,
};
use swarm_domain::{AgentIdentity, ConfigurationError, SwarmConfig};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum FactoryError {
    #[error("Invalid configuration: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Agent {id}: {message}")]
    UnknownKind { id: String, message: String },

    #[error("Agent {0} is an advisor but no LLM completion backend is configured")]
    MissingCompletion(String),
}

pub struct PluginFactory {
    completion: Option<Arc<dyn LlmCompletion>>,
    audit_logger: Arc<dyn AuditLogger>,
}

impl Default for PluginFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginFactory {
    pub fn new() -> Self {
        Self {
            completion: None,
            audit_logger: Arc::new(NoAuditLogger),
        }
    }

    /// Backend shared by every advisor agent
    pub fn with_completion(mut self, completion: Arc<dyn LlmCompletion>) -> Self {
        self.completion = Some(completion);
        self
    }

    pub fn with_audit_logger(mut self, logger: Arc<dyn AuditLogger>) -> Self {
        self.audit_logger = logger;
        self
    }

    /// Build the plugin for one entry.
    pub fn build_plugin(
        &self,
        agent: &FileAgentConfig,
        config: &SwarmConfig,
    ) -> Result<Arc<dyn Plugin>, FactoryError> {
        let kind = agent
            .kind
            .parse::<PluginKind>()
            .map_err(|message| FactoryError::UnknownKind {
                id: agent.id.clone(),
                message,
            })?;

        let plugin: Arc<dyn Plugin> = match kind {
            PluginKind::Baseline => {
                let mut plugin = BaselinePlugin::new(config.role.clone());
                if let Some(confidence) = agent.confidence {
                    plugin = plugin.with_confidence(confidence);
                }
                if let Some(latency_ms) = agent.latency_ms {
                    plugin = plugin.with_latency(Duration::from_millis(latency_ms));
                }
                Arc::new(plugin)
            }
            PluginKind::Advisor => {
                let completion = self
                    .completion
                    .clone()
                    .ok_or_else(|| FactoryError::MissingCompletion(agent.id.clone()))?;
                let mut plugin = AdvisorPlugin::new(config.role.clone(), completion);
                if let Some(system_prompt) =
                    config.llm.as_ref().and_then(|llm| llm.system_prompt.clone())
                {
                    plugin = plugin.with_system_prompt(system_prompt);
                }
                Arc::new(plugin)
            }
        };
        debug!("Built {} plugin for {}", kind.as_str(), agent.id);
        Ok(plugin)
    }

    /// Build an uninitialized runtime for one entry of `file`.
    pub fn build_runtime(
        &self,
        agent: &FileAgentConfig,
        file: &FileConfig,
    ) -> Result<AgentRuntime, FactoryError> {
        let config = agent.to_swarm_config(&file.swarm)?;
        let plugin = self.build_plugin(agent, &config)?;
        let identity = AgentIdentity::new(agent.id.as_str(), config.role.clone());
        let runtime = AgentRuntime::new(identity, config, plugin, file.sandbox.clone())?
            .with_audit_logger(Arc::clone(&self.audit_logger));
        Ok(runtime)
    }

    /// Build a swarm with every configured agent joined (not yet started).
    pub fn build_swarm(&self, file: &FileConfig) -> Result<Swarm, FactoryError> {
        let mut swarm =
            Swarm::new(AgentRegistry::new()).with_audit_logger(Arc::clone(&self.audit_logger));
        for agent in file.effective_agents() {
            swarm.join(self.build_runtime(&agent, file)?)?;
        }
        Ok(swarm)
    }

    /// Whether any configured agent needs a completion backend
    pub fn needs_completion(file: &FileConfig) -> bool {
        file.effective_agents()
            .iter()
            .any(|a| a.kind.parse::<PluginKind>() == Ok(PluginKind::Advisor))
    }
}
