//! Agent runtimes and the registry that owns them.

pub mod agent_runtime;
pub mod registry;
pub mod sandbox;

pub use agent_runtime::{AgentRuntime, ExecuteError};
pub use registry::{AgentRegistry, StartupReport};
pub use sandbox::PluginSandbox;
