//! Agent runtime
//!
//! One [`AgentRuntime`] wraps one plugin: it owns the plugin's lifecycle
//! state, stamps the agent's identity onto every decision, and turns plugin
//! faults into abstentions so a consensus round always gets a valid vote.

use super::sandbox::PluginSandbox;
use crate::config::SandboxPolicy;
use crate::ports::audit_logger::{AuditEvent, AuditLogger, NoAuditLogger};
use crate::ports::plugin::{ExecutionError, InitializationError, Plugin, PluginError};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value, json};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use swarm_domain::{
    AgentDecision, AgentId, AgentIdentity, AgentStatus, ConfigurationError, EvaluationContext,
    PluginState, SwarmConfig,
};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors returned by [`AgentRuntime::execute`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExecuteError {
    #[error("Agent is busy with another operation")]
    Busy,

    #[error("Agent is not ready (state: {0})")]
    NotReady(PluginState),

    #[error("Unknown agent: {0}")]
    UnknownAgent(AgentId),

    #[error(transparent)]
    Failed(#[from] ExecutionError),
}

#[derive(Debug, Default)]
struct RuntimeState {
    state: PluginState,
    consecutive_failures: u32,
    last_decision: Option<AgentDecision>,
    last_action_timestamp: Option<DateTime<Utc>>,
}

/// Lifecycle and fault isolation for one agent
pub struct AgentRuntime {
    identity: AgentIdentity,
    config: SwarmConfig,
    policy: SandboxPolicy,
    sandbox: PluginSandbox,
    inner: Mutex<RuntimeState>,
    /// Held across plugin `initialize`/`cleanup` so lifecycle calls never overlap
    lifecycle: tokio::sync::Mutex<()>,
    audit_logger: Arc<dyn AuditLogger>,
}

impl fmt::Debug for AgentRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentRuntime")
            .field("identity", &self.identity)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl AgentRuntime {
    /// Create a runtime in the `uninitialized` state.
    ///
    /// The configuration is validated here; an invalid config never reaches
    /// a round.
    pub fn new(
        identity: AgentIdentity,
        config: SwarmConfig,
        plugin: Arc<dyn Plugin>,
        policy: SandboxPolicy,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let sandbox = PluginSandbox::new(plugin, &policy);
        Ok(Self {
            identity,
            config,
            policy,
            sandbox,
            inner: Mutex::new(RuntimeState::default()),
            lifecycle: tokio::sync::Mutex::new(()),
            audit_logger: Arc::new(NoAuditLogger),
        })
    }

    pub fn with_audit_logger(mut self, logger: Arc<dyn AuditLogger>) -> Self {
        self.audit_logger = logger;
        self
    }

    pub fn id(&self) -> &AgentId {
        &self.identity.id
    }

    pub fn identity(&self) -> &AgentIdentity {
        &self.identity
    }

    pub fn config(&self) -> &SwarmConfig {
        &self.config
    }

    pub fn state(&self) -> PluginState {
        self.lock().state
    }

    /// Whether the agent takes part in new rounds
    pub fn is_ready(&self) -> bool {
        self.state().accepts_evaluations()
    }

    /// Start the plugin: `uninitialized → ready`.
    ///
    /// On failure the agent is left `closed` and only [`restart`](Self::restart)
    /// brings it back. Calling this on a running agent is a no-op.
    pub async fn initialize(&self) -> Result<(), InitializationError> {
        let _lifecycle = self.lifecycle.lock().await;
        self.initialize_locked().await
    }

    async fn initialize_locked(&self) -> Result<(), InitializationError> {
        match self.state() {
            PluginState::Uninitialized => {}
            PluginState::Ready | PluginState::Degraded => return Ok(()),
            PluginState::Closed => {
                return Err(InitializationError::Failed(format!(
                    "agent {} is closed; restart it instead",
                    self.identity.id
                )));
            }
        }

        match self.sandbox.initialize().await {
            Ok(()) => {
                self.transition(PluginState::Ready);
                info!("Agent {} initialized", self.identity);
                Ok(())
            }
            Err(e) => {
                self.transition(PluginState::Closed);
                warn!("Agent {} failed to initialize: {}", self.identity, e);
                Err(e)
            }
        }
    }

    /// Evaluate a proposal. Never fails.
    ///
    /// Plugin errors, panics and a non-ready state all come back as a
    /// zero-confidence abstention carrying a diagnostic reason. Cancellation
    /// comes back as a timeout abstention and is not counted as a failure.
    pub async fn evaluate(
        &self,
        context: &EvaluationContext,
        cancel: CancellationToken,
    ) -> AgentDecision {
        let state = self.state();
        if !state.accepts_evaluations() {
            return AgentDecision::abstain(
                self.identity.id.clone(),
                format!("agent is {}", state),
            );
        }

        let decision = match self.sandbox.evaluate(context, cancel).await {
            Ok(assessment) => {
                self.lock().consecutive_failures = 0;
                assessment.into_decision(self.identity.id.clone(), self.config.min_confidence)
            }
            Err(PluginError::Cancelled) => {
                debug!("Agent {} evaluation cancelled", self.identity.id);
                AgentDecision::timeout(self.identity.id.clone())
            }
            Err(e) => {
                self.record_failure(&e);
                AgentDecision::abstain(self.identity.id.clone(), format!("plugin error: {}", e))
            }
        };

        {
            let mut inner = self.lock();
            inner.last_decision = Some(decision.clone());
            inner.last_action_timestamp = Some(decision.timestamp);
        }
        decision
    }

    /// Run an operation through the plugin.
    ///
    /// Single-flight: a second call while one is running returns
    /// [`ExecuteError::Busy`] immediately. Allowed while `ready` or
    /// `degraded`. Plugin errors are returned as they are.
    pub async fn execute(
        &self,
        operation: &str,
        params: &Map<String, Value>,
    ) -> Result<Value, ExecuteError> {
        let state = self.state();
        if !state.accepts_executions() {
            return Err(ExecuteError::NotReady(state));
        }

        let Some(slot) = self.sandbox.try_claim_execute() else {
            debug!("Agent {} rejected {}: busy", self.identity.id, operation);
            return Err(ExecuteError::Busy);
        };

        self.audit_logger.log(AuditEvent::new(
            "execute_started",
            json!({
                "agent_id": self.identity.id,
                "operation": operation,
                "params": params,
            }),
        ));

        let result = slot.run(operation, params).await;
        self.lock().last_action_timestamp = Some(Utc::now());

        self.audit_logger.log(AuditEvent::new(
            "execute_finished",
            json!({
                "agent_id": self.identity.id,
                "operation": operation,
                "success": result.is_ok(),
                "error": result.as_ref().err().map(|e| e.to_string()),
            }),
        ));

        result.map_err(ExecuteError::from)
    }

    /// Release plugin resources. Idempotent; ends in `closed`.
    pub async fn cleanup(&self) {
        let _lifecycle = self.lifecycle.lock().await;
        if self.state() == PluginState::Closed {
            return;
        }
        self.sandbox.cleanup().await;
        self.transition(PluginState::Closed);
        info!("Agent {} closed", self.identity);
    }

    /// Bring a `closed` or `degraded` agent back: clean up, clear the failure
    /// counter and initialize again.
    ///
    /// A `ready` agent is left alone and an `uninitialized` one is simply
    /// initialized.
    pub async fn restart(&self) -> Result<(), InitializationError> {
        let _lifecycle = self.lifecycle.lock().await;
        match self.state() {
            PluginState::Ready => {
                debug!("Agent {} is ready; restart skipped", self.identity.id);
                return Ok(());
            }
            PluginState::Uninitialized => return self.initialize_locked().await,
            PluginState::Degraded => self.sandbox.cleanup().await,
            PluginState::Closed => {}
        }
        {
            let mut inner = self.lock();
            inner.state = PluginState::Uninitialized;
            inner.consecutive_failures = 0;
        }
        info!("Restarting agent {}", self.identity);
        self.initialize_locked().await
    }

    /// Clear the degraded flag without re-initializing.
    ///
    /// Returns `true` if the agent was degraded.
    pub fn reset(&self) -> bool {
        let mut inner = self.lock();
        if inner.state != PluginState::Degraded {
            return false;
        }
        inner.state = PluginState::Ready;
        inner.consecutive_failures = 0;
        info!("Agent {} reset to ready", self.identity);
        true
    }

    pub fn status(&self) -> AgentStatus {
        let inner = self.lock();
        AgentStatus {
            agent_id: self.identity.id.clone(),
            role: self.identity.role.clone(),
            state: inner.state,
            last_decision: inner.last_decision.clone(),
            last_action_timestamp: inner.last_action_timestamp,
            consecutive_failures: inner.consecutive_failures,
        }
    }

    fn record_failure(&self, error: &PluginError) {
        let degraded = {
            let mut inner = self.lock();
            inner.consecutive_failures += 1;
            let failures = inner.consecutive_failures;
            warn!(
                "Agent {} evaluation failed ({} consecutive): {}",
                self.identity.id, failures, error
            );
            if inner.state == PluginState::Ready && self.policy.should_degrade(failures) {
                inner.state = PluginState::Degraded;
                Some(failures)
            } else {
                None
            }
        };

        if let Some(failures) = degraded {
            warn!(
                "Agent {} degraded after {} consecutive failures",
                self.identity, failures
            );
            self.audit_logger.log(AuditEvent::new(
                "agent_degraded",
                json!({
                    "agent_id": self.identity.id,
                    "consecutive_failures": failures,
                    "last_error": error.to_string(),
                }),
            ));
        }
    }

    fn transition(&self, next: PluginState) {
        let mut inner = self.lock();
        if inner.state.can_transition_to(next) {
            inner.state = next;
        } else {
            warn!(
                "Agent {}: ignoring illegal transition {} -> {}",
                self.identity.id, inner.state, next
            );
        }
    }

    fn lock(&self) -> MutexGuard<'_, RuntimeState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
