//! Swarm consensus domain
//!
//! This module contains the core concepts for swarm decision making.
//!
//! # Core Concepts
//!
//! ## Decisions
//! Every agent asked in a round ends up with exactly one recorded
//! [`AgentDecision`]: approve, reject or abstain, with a confidence score.
//! Timeouts and plugin failures are recorded as zero-confidence abstentions.
//!
//! ## Consensus
//! [`ConsensusPolicy`] derives a [`SwarmConsensus`] from the closed vote set.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  approval_rate = Σ confidence(approve) / total_votes            │
//! │                                                                 │
//! │  consensus     = approval_rate ≥ min_confidence                 │
//! │                  AND total_votes ≥ min_votes                    │
//! │                                                                 │
//! │  Silence is not free: timeouts and abstentions sit in the       │
//! │  denominator with a zero numerator contribution.                │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod consensus;
pub mod decision;
pub mod parsing;

// Re-export main types
pub use consensus::{ConsensusPolicy, SwarmConsensus};
pub use decision::{AgentDecision, Assessment, Decision};
pub use parsing::parse_assessment;
