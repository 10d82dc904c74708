//! Evaluation context handed to every peer of a round.

use super::entities::Proposal;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Immutable input of one `evaluate` call.
///
/// One context is built per round and shared by reference-count between all
/// peers, so every agent sees exactly the same proposal and market snapshot.
#[derive(Debug, Clone)]
pub struct EvaluationContext {
    pub proposal: Arc<Proposal>,
    /// Optional market/portfolio snapshot supplied by the caller
    pub market_context: Map<String, Value>,
}

impl EvaluationContext {
    pub fn new(proposal: Proposal) -> Self {
        Self {
            proposal: Arc::new(proposal),
            market_context: Map::new(),
        }
    }

    pub fn with_market_context(mut self, market_context: Map<String, Value>) -> Self {
        self.market_context = market_context;
        self
    }

    pub fn proposal(&self) -> &Proposal {
        &self.proposal
    }

    /// Full context as a JSON object, the shape plugins written against a
    /// dictionary interface expect.
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "proposal": {
                "id": self.proposal.id.to_string(),
                "type": self.proposal.action_type,
                "params": self.proposal.params,
                "proposer": self.proposal.proposer.role.as_str(),
                "proposer_id": self.proposal.proposer.id.as_str(),
            },
            "market_context": self.market_context,
        })
    }
}
