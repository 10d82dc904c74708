//! Console output formatter for consensus results

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use serde_json::Value;
use swarm_application::ExecuteError;
use swarm_domain::core::string::{single_line, truncate};
use swarm_domain::{AgentDecision, AgentId, AgentStatus, Decision, PluginState, SwarmConsensus};

/// Widest reasoning shown in a table row
const REASONING_WIDTH: usize = 72;

/// Formats consensus results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Turn ANSI colors on or off for everything this crate prints
    pub fn set_colors(enabled: bool) {
        colored::control::set_override(enabled);
    }

    /// Verdict plus the full vote table
    pub fn format(result: &SwarmConsensus) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Swarm Consensus"));
        output.push('\n');

        output.push_str(&format!(
            "{} {}\n",
            "Proposal:".cyan().bold(),
            result.proposal_id
        ));
        output.push_str(&format!("{} {}\n", "Verdict:".cyan().bold(), Self::verdict(result)));
        output.push_str(&format!(
            "{} {:.1}%  {} {} {}\n",
            "Approval:".cyan().bold(),
            result.approval_rate * 100.0,
            "Votes:".cyan().bold(),
            result.total_votes,
            result.vote_summary()
        ));
        if result.timeouts() > 0 {
            output.push_str(&format!(
                "{} {}\n",
                "Timed out:".yellow().bold(),
                result.timeouts()
            ));
        }

        output.push_str(&Self::section_header("Votes"));
        if result.votes.is_empty() {
            output.push_str(&format!("  {}\n", "(no votes recorded)".dimmed()));
        }
        for vote in &result.votes {
            output.push_str(&Self::vote_line(vote));
        }

        output.push_str(&Self::footer());
        output
    }

    /// Format as JSON
    pub fn format_json(result: &SwarmConsensus) -> String {
        serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
    }

    /// One-line verdict
    pub fn format_summary(result: &SwarmConsensus) -> String {
        format!(
            "{} {} approval {:.1}% with {} vote(s) {}\n",
            Self::verdict(result),
            "|".dimmed(),
            result.approval_rate * 100.0,
            result.total_votes,
            result.vote_summary()
        )
    }

    /// Table of agent status snapshots
    pub fn format_statuses(statuses: &[AgentStatus]) -> String {
        let mut output = Self::section_header("Agents");
        for status in statuses {
            let state = match status.state {
                PluginState::Ready => status.state.as_str().green(),
                PluginState::Degraded => status.state.as_str().yellow(),
                PluginState::Closed => status.state.as_str().red(),
                PluginState::Uninitialized => status.state.as_str().dimmed(),
            };
            let last = status
                .last_decision
                .as_ref()
                .map(|d| format!("last: {} ({:.2})", d.decision, d.confidence))
                .unwrap_or_else(|| "no votes yet".to_string());
            output.push_str(&format!(
                "  {:<20} {:<20} {:<14} failures={} {}\n",
                status.agent_id.as_str().bold(),
                status.role.as_str(),
                state,
                status.consecutive_failures,
                last.dimmed()
            ));
        }
        output
    }

    /// Per-agent results of executing an approved action
    pub fn format_execution(results: &[(AgentId, Result<Value, ExecuteError>)]) -> String {
        let mut output = Self::section_header("Execution");
        if results.is_empty() {
            output.push_str(&format!("  {}\n", "nothing executed".dimmed()));
        }
        for (agent_id, result) in results {
            match result {
                Ok(value) => output.push_str(&format!(
                    "  {} {:<20} {}\n",
                    "v".green(),
                    agent_id.as_str(),
                    value
                )),
                Err(e) => output.push_str(&format!(
                    "  {} {:<20} {}\n",
                    "x".red(),
                    agent_id.as_str(),
                    e.to_string().red()
                )),
            }
        }
        output
    }

    /// Execution results as a JSON object keyed by agent id
    pub fn format_execution_json(results: &[(AgentId, Result<Value, ExecuteError>)]) -> String {
        let map: serde_json::Map<String, Value> = results
            .iter()
            .map(|(agent_id, result)| {
                let value = match result {
                    Ok(value) => serde_json::json!({ "ok": value }),
                    Err(e) => serde_json::json!({ "error": e.to_string() }),
                };
                (agent_id.to_string(), value)
            })
            .collect();
        serde_json::to_string_pretty(&map).unwrap_or_else(|_| "{}".to_string())
    }

    fn verdict(result: &SwarmConsensus) -> String {
        if result.consensus {
            "CONSENSUS REACHED".green().bold().to_string()
        } else {
            "NO CONSENSUS".red().bold().to_string()
        }
    }

    fn vote_line(vote: &AgentDecision) -> String {
        let decision = match vote.decision {
            Decision::Approve => format!("{:<8}", vote.decision).green(),
            Decision::Reject => format!("{:<8}", vote.decision).red(),
            Decision::Abstain => format!("{:<8}", vote.decision).yellow(),
        };
        format!(
            "  {} {:<20} {} {:.2}  {}\n",
            vote.decision.symbol(),
            vote.agent_id.as_str(),
            decision,
            vote.confidence,
            truncate(&single_line(&vote.reasoning), REASONING_WIDTH).dimmed()
        )
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, result: &SwarmConsensus) -> String {
        Self::format(result)
    }

    fn format_json(&self, result: &SwarmConsensus) -> String {
        Self::format_json(result)
    }

    fn format_summary(&self, result: &SwarmConsensus) -> String {
        Self::format_summary(result)
    }
}
