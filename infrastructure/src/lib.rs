//! Infrastructure layer for swarm-consensus
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: configuration file loading, the JSONL audit log,
//! the built-in agent plugins and (with the `llm` feature) an HTTP
//! completion client.

pub mod config;
#[cfg(feature = "llm")]
pub mod llm;
pub mod logging;
pub mod plugins;

// Re-export commonly used types
pub use config::{
    ConfigLoader, FileAgentConfig, FileConfig, FileLoggingConfig, FileOutputConfig,
    FileSwarmConfig, PluginKind,
};
#[cfg(feature = "llm")]
pub use llm::OpenRouterCompletion;
pub use logging::JsonlAuditLogger;
pub use plugins::{AdvisorPlugin, BaselinePlugin, FactoryError, PluginFactory};
