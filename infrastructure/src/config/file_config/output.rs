//! `[output]` section: how results are shown on the terminal
//!
//! ```toml
//! [output]
//! format = "full"        # "full", "summary" or "json"
//! color = true
//! show_progress = true
//! ```

use serde::{Deserialize, Serialize};
use swarm_domain::OutputFormat;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Unset means the domain default (summary)
    pub format: Option<OutputFormat>,
    pub color: bool,
    /// Live progress display while votes arrive
    pub show_progress: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
            show_progress: true,
        }
    }
}

impl FileOutputConfig {
    /// A format given on the command line wins over the file.
    pub fn resolve_format(&self, requested: Option<OutputFormat>) -> OutputFormat {
        requested.or(self.format).unwrap_or_default()
    }
}
