//! Configuration value objects for the domain layer
//!
//! - [`SwarmConfig`]: per-agent consensus thresholds, validated once at construction
//! - [`LlmSettings`]: opaque settings handed to LLM-backed plugins
//! - [`ConfigIssue`]: structured findings from file-level validation
//! - [`OutputFormat`]: how results are rendered

mod output_format;
mod swarm_config;
pub mod validation;

pub use output_format::OutputFormat;
pub use swarm_config::{LlmSettings, SwarmConfig};
pub use validation::{ConfigIssue, ConfigIssueCode, Severity};
