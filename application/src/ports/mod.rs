//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that plugins and infrastructure adapters must
//! implement.

pub mod audit_logger;
pub mod llm_completion;
pub mod plugin;
pub mod round_observer;
