//! Sandbox policy: per-agent fault isolation limits.
//!
//! [`SandboxPolicy`] groups the parameters that control how a
//! [`PluginSandbox`](crate::runtime::PluginSandbox) contains a plugin.
//! These are application-layer concerns, not domain policy.

use serde::{Deserialize, Serialize};

/// Default number of consecutive evaluation failures before degrading.
pub const DEFAULT_DEGRADE_AFTER: u32 = 3;

/// Fault isolation parameters for one agent.
///
/// | Field | Effect |
/// |-------|--------|
/// | `degrade_after` | consecutive `PluginError`s before the agent is degraded |
/// | `max_concurrent_evaluations` | cap on in-flight `evaluate` calls (`None` = unlimited) |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxPolicy {
    /// Consecutive evaluation failures tolerated before the agent is
    /// excluded from rounds. Zero disables degradation.
    pub degrade_after: u32,
    /// Maximum number of concurrent `evaluate` calls into the plugin.
    pub max_concurrent_evaluations: Option<usize>,
}

impl Default for SandboxPolicy {
    fn default() -> Self {
        Self {
            degrade_after: DEFAULT_DEGRADE_AFTER,
            max_concurrent_evaluations: None,
        }
    }
}

impl SandboxPolicy {
    // ==================== Builder Methods ====================

    pub fn with_degrade_after(mut self, failures: u32) -> Self {
        self.degrade_after = failures;
        self
    }

    pub fn with_max_concurrent_evaluations(mut self, max: usize) -> Self {
        self.max_concurrent_evaluations = Some(max);
        self
    }

    /// Whether `consecutive_failures` has reached the degradation threshold
    pub fn should_degrade(&self, consecutive_failures: u32) -> bool {
        self.degrade_after > 0 && consecutive_failures >= self.degrade_after
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let policy = SandboxPolicy::default();
        assert_eq!(policy.degrade_after, 3);
        assert!(policy.max_concurrent_evaluations.is_none());
    }

    #[test]
    fn test_builder() {
        let policy = SandboxPolicy::default()
            .with_degrade_after(5)
            .with_max_concurrent_evaluations(2);

        assert_eq!(policy.degrade_after, 5);
        assert_eq!(policy.max_concurrent_evaluations, Some(2));
    }

    #[test]
    fn test_should_degrade() {
        let policy = SandboxPolicy::default();
        assert!(!policy.should_degrade(2));
        assert!(policy.should_degrade(3));

        let disabled = SandboxPolicy::default().with_degrade_after(0);
        assert!(!disabled.should_degrade(100));
    }
}
