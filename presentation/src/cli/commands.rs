//! CLI command definitions

use clap::{Parser, ValueEnum};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Output format for consensus results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Verdict plus the full vote table
    Full,
    /// One-line verdict
    Summary,
    /// JSON output
    Json,
}

impl From<OutputFormat> for swarm_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => swarm_domain::OutputFormat::Full,
            OutputFormat::Summary => swarm_domain::OutputFormat::Summary,
            OutputFormat::Json => swarm_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for swarm-consensus
#[derive(Parser, Debug)]
#[command(name = "swarm-consensus")]
#[command(author, version, about = "Agent swarm - Peers vote on an action before it runs")]
#[command(long_about = r#"
swarm-consensus asks a swarm of role-specialised agents to vote on a proposed
action. Every agent except the proposer evaluates the proposal concurrently;
the round closes when all have voted or the deadline passes.

Consensus requires both:
  approval rate >= min_confidence   (confidence-weighted, abstentions count)
  recorded votes >= min_votes

Configuration files are loaded from (in priority order):
1. SWARM_* environment variables  (e.g. SWARM_SWARM__MIN_VOTES=3)
2. --config <path>                Explicit config file
3. ./swarm.toml                   Project-level config
4. ~/.config/swarm-consensus/config.toml   Global config

Example:
  swarm-consensus swap -p input_token=SOL -p amount=1.5
  swarm-consensus swap -p amount=10 --context sol_price=142.3 --output full
  swarm-consensus swap -p amount=1 --execute
  swarm-consensus --status
"#)]
pub struct Cli {
    /// Action to propose, e.g. "swap" (not required with --status)
    pub action: Option<String>,

    /// Action parameter as key=value (repeatable; values parsed as JSON when possible)
    #[arg(short, long = "param", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub params: Vec<(String, Value)>,

    /// Market context entry passed to evaluators as key=value (repeatable)
    #[arg(long = "context", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub context: Vec<(String, Value)>,

    /// Agent proposing the action (defaults to the first configured agent)
    #[arg(long, value_name = "AGENT_ID")]
    pub proposer: Option<String>,

    /// Let the proposer vote on its own proposal
    #[arg(long)]
    pub self_vote: bool,

    /// Run the action on every approving agent when consensus is reached
    #[arg(long)]
    pub execute: bool,

    /// Start the swarm, print every agent's status and exit
    #[arg(long)]
    pub status: bool,

    /// Output format (overrides [output] format in config)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Append audit events (JSONL) to this file
    #[arg(long, value_name = "PATH")]
    pub audit_file: Option<PathBuf>,

    /// Also write diagnostic logs to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn params_map(&self) -> Map<String, Value> {
        self.params.iter().cloned().collect()
    }

    pub fn context_map(&self) -> Map<String, Value> {
        self.context.iter().cloned().collect()
    }
}

/// Parse `key=value`; the value is read as JSON and falls back to a string.
pub fn parse_key_value(s: &str) -> Result<(String, Value), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{}'", s));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(parse_key_value("amount=1.5"), Ok(("amount".into(), json!(1.5))));
        assert_eq!(parse_key_value("token=SOL"), Ok(("token".into(), json!("SOL"))));
        assert_eq!(parse_key_value("note=a=b"), Ok(("note".into(), json!("a=b"))));
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=1").is_err());
    }

    #[test]
    fn test_propose_arguments() {
        let cli = Cli::try_parse_from([
            "swarm-consensus",
            "swap",
            "-p",
            "input_token=SOL",
            "--param",
            "amount=2",
            "--context",
            "sol_price=142.3",
            "--proposer",
            "decider",
            "--output",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.action.as_deref(), Some("swap"));
        assert_eq!(cli.params_map()["amount"], json!(2));
        assert_eq!(cli.context_map()["sol_price"], json!(142.3));
        assert_eq!(cli.proposer.as_deref(), Some("decider"));
        assert_eq!(cli.output, Some(OutputFormat::Json));
        assert!(!cli.self_vote);
    }

    #[test]
    fn test_status_mode() {
        let cli = Cli::try_parse_from(["swarm-consensus", "--status", "-vv"]).unwrap();
        assert!(cli.status);
        assert!(cli.action.is_none());
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_bad_param_rejected() {
        assert!(Cli::try_parse_from(["swarm-consensus", "swap", "-p", "oops"]).is_err());
    }
}
