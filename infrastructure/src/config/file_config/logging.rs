//! Logging configuration from TOML (`[logging]` section)
//!
//! ```toml
//! [logging]
//! audit_file = "~/.local/share/swarm-consensus/audit.jsonl"
//! log_file = "swarm.log"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL file receiving one record per round event
    pub audit_file: Option<PathBuf>,
    /// Diagnostic log file, in addition to stderr
    pub log_file: Option<PathBuf>,
}

impl FileLoggingConfig {
    /// Audit file path with a leading `~/` expanded
    pub fn audit_path(&self) -> Option<PathBuf> {
        self.audit_file.as_deref().map(expand_home)
    }

    pub fn log_path(&self) -> Option<PathBuf> {
        self.log_file.as_deref().map(expand_home)
    }
}

fn expand_home(path: &std::path::Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}
