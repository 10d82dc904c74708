//! Proposal domain
//!
//! A [`Proposal`] is the action candidate a round votes on; an
//! [`EvaluationContext`] is what each peer receives to judge it.

pub mod context;
pub mod entities;

pub use context::EvaluationContext;
pub use entities::{Proposal, ProposalId};
