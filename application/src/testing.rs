//! In-process fake plugins for tests. Nothing here touches a network.

use crate::ports::plugin::{ExecutionError, InitializationError, Plugin, PluginError};
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use swarm_domain::{AgentIdentity, AgentRole, Assessment, EvaluationContext, Proposal};
use tokio_util::sync::CancellationToken;

pub fn test_context() -> EvaluationContext {
    let mut params = Map::new();
    params.insert("input_token".into(), json!("SOL"));
    params.insert("amount".into(), json!(1.5));
    EvaluationContext::new(Proposal::new(
        "swap",
        params,
        AgentIdentity::new("proposer", AgentRole::DecisionMaker),
    ))
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum InitBehavior {
    Ok,
    Fail,
    Panic,
}

/// Returns a fixed assessment after an optional delay; ignores cancellation.
pub struct ScriptedPlugin {
    assessment: Assessment,
    delay: Option<Duration>,
    execute_delay: Option<Duration>,
    lifecycle_delay: Option<Duration>,
    init: InitBehavior,
    pub initializations: AtomicUsize,
    pub evaluations: AtomicUsize,
    pub executions: AtomicUsize,
    pub cleanups: AtomicUsize,
}

impl ScriptedPlugin {
    pub fn new(assessment: Assessment) -> Self {
        Self {
            assessment,
            delay: None,
            execute_delay: None,
            lifecycle_delay: None,
            init: InitBehavior::Ok,
            initializations: AtomicUsize::new(0),
            evaluations: AtomicUsize::new(0),
            executions: AtomicUsize::new(0),
            cleanups: AtomicUsize::new(0),
        }
    }

    pub fn approve(confidence: f64) -> Self {
        Self::new(Assessment::approve(confidence, "looks good"))
    }

    pub fn reject(confidence: f64) -> Self {
        Self::new(Assessment::reject(confidence, "too risky"))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_execute_delay(mut self, delay: Duration) -> Self {
        self.execute_delay = Some(delay);
        self
    }

    /// Make `initialize` and `cleanup` sleep before returning
    pub fn with_lifecycle_delay(mut self, delay: Duration) -> Self {
        self.lifecycle_delay = Some(delay);
        self
    }

    pub fn with_failing_init(mut self) -> Self {
        self.init = InitBehavior::Fail;
        self
    }

    pub fn with_panicking_init(mut self) -> Self {
        self.init = InitBehavior::Panic;
        self
    }
}

#[async_trait]
impl Plugin for ScriptedPlugin {
    async fn initialize(&self) -> Result<(), InitializationError> {
        self.initializations.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.lifecycle_delay {
            tokio::time::sleep(delay).await;
        }
        match self.init {
            InitBehavior::Ok => Ok(()),
            InitBehavior::Fail => Err(InitializationError::MissingDependency(
                "price feed".to_string(),
            )),
            InitBehavior::Panic => panic!("init exploded"),
        }
    }

    async fn evaluate(
        &self,
        _context: &EvaluationContext,
        _cancel: CancellationToken,
    ) -> Result<Assessment, PluginError> {
        self.evaluations.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.assessment.clone())
    }

    async fn execute(
        &self,
        operation: &str,
        _params: &Map<String, Value>,
    ) -> Result<Value, ExecutionError> {
        self.executions.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.execute_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(json!({ "operation": operation, "status": "done" }))
    }

    async fn cleanup(&self) {
        self.cleanups.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.lifecycle_delay {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Fails every evaluate and execute call with the same message.
pub struct FailingPlugin {
    message: String,
}

impl FailingPlugin {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl Plugin for FailingPlugin {
    async fn initialize(&self) -> Result<(), InitializationError> {
        Ok(())
    }

    async fn evaluate(
        &self,
        _context: &EvaluationContext,
        _cancel: CancellationToken,
    ) -> Result<Assessment, PluginError> {
        Err(PluginError::EvaluationFailed(self.message.clone()))
    }

    async fn execute(
        &self,
        _operation: &str,
        _params: &Map<String, Value>,
    ) -> Result<Value, ExecutionError> {
        Err(ExecutionError::Failed(self.message.clone()))
    }

    async fn cleanup(&self) {}
}

/// Panics inside evaluate and execute.
pub struct PanickingPlugin;

#[async_trait]
impl Plugin for PanickingPlugin {
    async fn initialize(&self) -> Result<(), InitializationError> {
        Ok(())
    }

    async fn evaluate(
        &self,
        _context: &EvaluationContext,
        _cancel: CancellationToken,
    ) -> Result<Assessment, PluginError> {
        panic!("evaluate exploded")
    }

    async fn execute(
        &self,
        _operation: &str,
        _params: &Map<String, Value>,
    ) -> Result<Value, ExecutionError> {
        panic!("execute exploded")
    }

    async fn cleanup(&self) {
        panic!("cleanup exploded")
    }
}

/// Collects audit event types in order.
#[derive(Default)]
pub struct RecordingAuditLogger {
    pub events: std::sync::Mutex<Vec<(&'static str, Value)>>,
}

impl RecordingAuditLogger {
    pub fn event_types(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(|(t, _)| *t).collect()
    }
}

impl crate::ports::audit_logger::AuditLogger for RecordingAuditLogger {
    fn log(&self, event: crate::ports::audit_logger::AuditEvent) {
        self.events
            .lock()
            .unwrap()
            .push((event.event_type, event.payload));
    }
}
