//! Built-in agent plugins
//!
//! - [`BaselinePlugin`]: fixed-confidence evaluation, no external calls
//! - [`AdvisorPlugin`]: evaluation through an [`LlmCompletion`](swarm_application::LlmCompletion)
//! - [`PluginFactory`]: builds agents from `[[agents]]` entries

mod advisor;
mod baseline;
mod factory;

pub use advisor::AdvisorPlugin;
pub use baseline::{BaselinePlugin, DEFAULT_BASELINE_CONFIDENCE};
pub use factory::{FactoryError, PluginFactory};

use serde_json::{Map, Value, json};
use swarm_application::ExecutionError;

/// Operations a built-in plugin does not implement are acknowledged
/// without side effects.
pub(crate) fn simulated_execution(
    operation: &str,
    params: &Map<String, Value>,
) -> Result<Value, ExecutionError> {
    if operation.trim().is_empty() {
        return Err(ExecutionError::InvalidParams(
            "operation name must not be empty".to_string(),
        ));
    }
    Ok(json!({
        "status": "simulated",
        "operation": operation,
        "params": params,
    }))
}
