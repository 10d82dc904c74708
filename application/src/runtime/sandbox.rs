//! Plugin sandbox: a bulkhead around every call into plugin code.
//!
//! Each call is wrapped so that a plugin fault stays inside its agent:
//!
//! | Call | Isolation |
//! |------|-----------|
//! | `initialize` / `cleanup` | panic containment |
//! | `evaluate` | panic containment, round cancellation, optional concurrency cap |
//! | `execute` | panic containment, single-flight lock |

use crate::config::SandboxPolicy;
use crate::ports::plugin::{ExecutionError, InitializationError, Plugin, PluginError};
use futures::FutureExt;
use serde_json::{Map, Value};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use swarm_domain::{Assessment, EvaluationContext};
use tokio::sync::{Mutex, MutexGuard, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Isolating wrapper around one plugin instance
pub struct PluginSandbox {
    plugin: Arc<dyn Plugin>,
    execute_lock: Mutex<()>,
    evaluation_permits: Option<Semaphore>,
}

impl PluginSandbox {
    pub fn new(plugin: Arc<dyn Plugin>, policy: &SandboxPolicy) -> Self {
        Self {
            plugin,
            execute_lock: Mutex::new(()),
            evaluation_permits: policy
                .max_concurrent_evaluations
                .filter(|&max| max > 0)
                .map(Semaphore::new),
        }
    }

    pub async fn initialize(&self) -> Result<(), InitializationError> {
        match AssertUnwindSafe(self.plugin.initialize())
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(payload) => Err(InitializationError::Panicked(panic_message(payload))),
        }
    }

    /// Evaluate under the round's cancellation token.
    ///
    /// Returns [`PluginError::Cancelled`] as soon as `cancel` fires, even if
    /// the plugin ignores the token.
    pub async fn evaluate(
        &self,
        context: &EvaluationContext,
        cancel: CancellationToken,
    ) -> Result<Assessment, PluginError> {
        let _permit = match &self.evaluation_permits {
            Some(permits) => {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(PluginError::Cancelled),
                    permit = permits.acquire() => match permit {
                        Ok(permit) => Some(permit),
                        Err(_) => return Err(PluginError::EvaluationFailed(
                            "evaluation semaphore closed".to_string(),
                        )),
                    },
                }
            }
            None => None,
        };

        let evaluation = AssertUnwindSafe(self.plugin.evaluate(context, cancel.clone()))
            .catch_unwind();

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(PluginError::Cancelled),
            outcome = evaluation => match outcome {
                Ok(result) => result,
                Err(payload) => Err(PluginError::Panicked(panic_message(payload))),
            },
        }
    }

    /// Claim the single execute slot without waiting.
    ///
    /// Returns `None` when another `execute` holds the slot.
    pub fn try_claim_execute(&self) -> Option<ExecuteSlot<'_>> {
        self.execute_lock.try_lock().ok().map(|guard| ExecuteSlot {
            plugin: self.plugin.as_ref(),
            _guard: guard,
        })
    }

    /// Release plugin resources; a panicking cleanup is logged and swallowed.
    pub async fn cleanup(&self) {
        if let Err(payload) = AssertUnwindSafe(self.plugin.cleanup())
            .catch_unwind()
            .await
        {
            warn!("Plugin panicked during cleanup: {}", panic_message(payload));
        }
    }
}

/// Exclusive right to run one `execute` call; released on drop
pub struct ExecuteSlot<'a> {
    plugin: &'a dyn Plugin,
    _guard: MutexGuard<'a, ()>,
}

impl ExecuteSlot<'_> {
    pub async fn run(
        self,
        operation: &str,
        params: &Map<String, Value>,
    ) -> Result<Value, ExecutionError> {
        match AssertUnwindSafe(self.plugin.execute(operation, params))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(payload) => Err(ExecutionError::Panicked(panic_message(payload))),
        }
    }
}

/// Best-effort text of a panic payload
fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
