//! LLM completion adapters
//!
//! Implementations of the [`LlmCompletion`](swarm_application::LlmCompletion)
//! port used by [`AdvisorPlugin`](crate::plugins::AdvisorPlugin).

mod openrouter;

pub use openrouter::{API_KEY_ENV, OpenRouterCompletion};
