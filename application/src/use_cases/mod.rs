//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod collect_votes;
pub mod propose_action;
pub mod swarm;
