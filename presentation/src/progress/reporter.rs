//! Progress reporting for consensus rounds

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::{Mutex, MutexGuard};
use swarm_application::RoundObserver;
use swarm_domain::{AgentDecision, Decision, Proposal, SwarmConsensus};

/// Reports round progress with a live progress bar
pub struct ProgressReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn round_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn bar(&self) -> MutexGuard<'_, Option<ProgressBar>> {
        self.bar.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn vote_marker(decision: &AgentDecision) -> String {
        let label = format!("{} {}", decision.decision.symbol(), decision.agent_id);
        if decision.is_timeout() {
            return format!("{} (timeout)", label).dimmed().to_string();
        }
        match decision.decision {
            Decision::Approve => label.green().to_string(),
            Decision::Reject => label.red().to_string(),
            Decision::Abstain => label.yellow().to_string(),
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl RoundObserver for ProgressReporter {
    fn on_round_start(&self, proposal: &Proposal, expected_voters: usize) {
        let pb = ProgressBar::new(expected_voters as u64);
        pb.set_style(Self::round_style());
        pb.set_prefix(format!("Voting on {}", proposal.action_type));
        pb.set_message("Waiting for peers...");
        pb.enable_steady_tick(std::time::Duration::from_millis(120));
        *self.bar() = Some(pb);
    }

    fn on_vote(&self, decision: &AgentDecision) {
        if let Some(pb) = self.bar().as_ref() {
            pb.set_message(Self::vote_marker(decision));
            pb.inc(1);
        }
    }

    fn on_round_complete(&self, consensus: &SwarmConsensus) {
        if let Some(pb) = self.bar().take() {
            let verdict = if consensus.consensus {
                "consensus reached".green()
            } else {
                "no consensus".red()
            };
            pb.finish_with_message(format!("{} {}", verdict, consensus.vote_summary()));
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl RoundObserver for SimpleProgress {
    fn on_round_start(&self, proposal: &Proposal, expected_voters: usize) {
        println!(
            "{} {} {} ({} voters)",
            "->".cyan(),
            "Proposing".bold(),
            proposal.action_type,
            expected_voters
        );
    }

    fn on_vote(&self, decision: &AgentDecision) {
        println!(
            "  {} {:.2}",
            ProgressReporter::vote_marker(decision),
            decision.confidence
        );
    }

    fn on_round_complete(&self, _consensus: &SwarmConsensus) {
        println!();
    }
}
