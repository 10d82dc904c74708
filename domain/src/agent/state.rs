//! Plugin lifecycle state machine and agent status snapshots.
//!
//! ```text
//!                 initialize ok
//!  Uninitialized ───────────────▶ Ready ◀──────┐ reset
//!        │                         │  ▲         │
//!        │ initialize failed       │  └ ok ─ Degraded
//!        ▼                         │ repeated    ▲
//!      Closed ◀── cleanup ─────────┴─ failures ──┘
//!        │
//!        └── restart ──▶ Uninitialized
//! ```

use super::identity::{AgentId, AgentRole};
use crate::quorum::decision::AgentDecision;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of the plugin held by an agent runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PluginState {
    #[default]
    Uninitialized,
    Ready,
    /// Too many consecutive evaluation failures; excluded from fan-outs
    /// until explicitly reset.
    Degraded,
    Closed,
}

impl PluginState {
    /// Whether the agent takes part in new consensus rounds.
    pub fn accepts_evaluations(&self) -> bool {
        matches!(self, PluginState::Ready)
    }

    /// Whether the agent may run side-effecting operations.
    pub fn accepts_executions(&self) -> bool {
        matches!(self, PluginState::Ready | PluginState::Degraded)
    }

    /// Check whether moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(&self, next: PluginState) -> bool {
        use PluginState::*;
        match (self, next) {
            (Uninitialized, Ready) => true,
            (Ready, Degraded) | (Degraded, Ready) => true,
            (Closed, Uninitialized) => true,
            (_, Closed) => true,
            (a, b) => *a == b,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PluginState::Uninitialized => "uninitialized",
            PluginState::Ready => "ready",
            PluginState::Degraded => "degraded",
            PluginState::Closed => "closed",
        }
    }
}

impl std::fmt::Display for PluginState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Point-in-time view of one agent, exposed to CLI and dashboard callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentStatus {
    pub agent_id: AgentId,
    pub role: AgentRole,
    pub state: PluginState,
    pub last_decision: Option<AgentDecision>,
    pub last_action_timestamp: Option<DateTime<Utc>>,
    pub consecutive_failures: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_uninitialized() {
        assert_eq!(PluginState::default(), PluginState::Uninitialized);
    }

    #[test]
    fn test_legal_transitions() {
        use PluginState::*;
        assert!(Uninitialized.can_transition_to(Ready));
        assert!(Uninitialized.can_transition_to(Closed));
        assert!(Ready.can_transition_to(Degraded));
        assert!(Degraded.can_transition_to(Ready));
        assert!(Degraded.can_transition_to(Closed));
        assert!(Closed.can_transition_to(Uninitialized));
        assert!(Closed.can_transition_to(Closed));
    }

    #[test]
    fn test_illegal_transitions() {
        use PluginState::*;
        assert!(!Closed.can_transition_to(Ready));
        assert!(!Uninitialized.can_transition_to(Degraded));
        assert!(!Ready.can_transition_to(Uninitialized));
        assert!(!Closed.can_transition_to(Degraded));
    }

    #[test]
    fn test_participation_flags() {
        assert!(PluginState::Ready.accepts_evaluations());
        assert!(!PluginState::Degraded.accepts_evaluations());
        assert!(PluginState::Degraded.accepts_executions());
        assert!(!PluginState::Closed.accepts_executions());
        assert!(!PluginState::Uninitialized.accepts_executions());
    }

    #[test]
    fn test_display() {
        assert_eq!(PluginState::Degraded.to_string(), "degraded");
    }
}
