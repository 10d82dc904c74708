//! Configuration file loading for swarm-consensus
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `SWARM_*` environment variables (`__` separates nested keys)
//! 2. `--config <path>` specified file
//! 3. Project root: `./swarm.toml` or `./.swarm.toml`
//! 4. Global: `$XDG_CONFIG_HOME/swarm-consensus/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    FileAgentConfig, FileConfig, FileLoggingConfig, FileOutputConfig, FileSwarmConfig, PluginKind,
};
pub use loader::ConfigLoader;
