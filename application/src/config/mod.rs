//! Application-level configuration.
//!
//! - [`SandboxPolicy`]: per-agent fault isolation (degradation threshold, evaluation cap)

pub mod sandbox_policy;

pub use sandbox_policy::SandboxPolicy;
