//! Output formatter trait

use swarm_domain::{OutputFormat, SwarmConsensus};

/// Trait for formatting consensus results
pub trait OutputFormatter {
    /// Verdict plus the full vote table
    fn format(&self, result: &SwarmConsensus) -> String;

    /// Format as JSON
    fn format_json(&self, result: &SwarmConsensus) -> String;

    /// One-line verdict
    fn format_summary(&self, result: &SwarmConsensus) -> String;

    /// Dispatch on `format`
    fn render(&self, result: &SwarmConsensus, format: OutputFormat) -> String {
        match format {
            OutputFormat::Full => self.format(result),
            OutputFormat::Summary => self.format_summary(result),
            OutputFormat::Json => self.format_json(result),
        }
    }
}
