//! Agent domain
//!
//! - [`identity`]: [`AgentId`](identity::AgentId), [`AgentRole`](identity::AgentRole), [`AgentIdentity`](identity::AgentIdentity)
//! - [`state`]: [`PluginState`](state::PluginState) lifecycle and [`AgentStatus`](state::AgentStatus) snapshots

pub mod identity;
pub mod state;
