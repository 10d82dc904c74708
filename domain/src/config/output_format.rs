//! Output format value object

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How a consensus result is rendered for the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Verdict plus the full vote table
    Full,
    /// One-line verdict (default)
    #[default]
    Summary,
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Full => "full",
            OutputFormat::Summary => "summary",
            OutputFormat::Json => "json",
        }
    }

    /// Output meant for other programs; progress display must stay off stdout.
    pub fn is_machine_readable(&self) -> bool {
        matches!(self, OutputFormat::Json)
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full" => Ok(OutputFormat::Full),
            "summary" | "short" => Ok(OutputFormat::Summary),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_summary() {
        assert_eq!(OutputFormat::default(), OutputFormat::Summary);
        assert!(!OutputFormat::default().is_machine_readable());
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&OutputFormat::Full).unwrap(), "\"full\"");
        let format: OutputFormat = serde_json::from_str("\"json\"").unwrap();
        assert!(format.is_machine_readable());
    }

    #[test]
    fn test_from_str() {
        assert_eq!("Short".parse::<OutputFormat>(), Ok(OutputFormat::Summary));
        assert!("yaml".parse::<OutputFormat>().is_err());
    }
}
