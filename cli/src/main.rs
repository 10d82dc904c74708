//! CLI entrypoint for swarm-consensus
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use swarm_application::{ActionRequest, AuditLogger, NoAuditLogger, NoRoundObserver, RoundObserver};
use swarm_domain::{AgentId, Severity, config::validation::has_errors};
use swarm_infrastructure::{
    ConfigLoader, FileConfig, JsonlAuditLogger, OpenRouterCompletion, PluginFactory,
};
use swarm_presentation::{Cli, ConsoleFormatter, OutputFormatter, ProgressReporter};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(());
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };

    let log_file = cli.log_file.clone().or_else(|| config.logging.log_path());
    let _log_guard = init_logging(cli.verbose, log_file.as_deref())?;

    info!("Starting swarm-consensus");

    let issues = config.validate();
    for issue in &issues {
        let label = match issue.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        eprintln!("{}: {}", label, issue.message);
    }
    if has_errors(&issues) {
        bail!("Invalid configuration, see the errors above");
    }

    ConsoleFormatter::set_colors(config.output.color);

    // === Dependency Injection ===
    let audit_logger: Arc<dyn AuditLogger> =
        match cli.audit_file.clone().or_else(|| config.logging.audit_path()) {
            Some(path) => Arc::new(
                JsonlAuditLogger::open(&path)
                    .with_context(|| format!("Failed to open audit file {}", path.display()))?,
            ),
            None => Arc::new(NoAuditLogger),
        };

    let mut factory = PluginFactory::new().with_audit_logger(audit_logger);
    if PluginFactory::needs_completion(&config) {
        let settings = config.swarm.llm.clone().unwrap_or_default();
        factory = factory.with_completion(Arc::new(OpenRouterCompletion::from_env(settings)?));
    }

    let swarm = factory.build_swarm(&config)?;
    let report = swarm.start().await;
    for (agent_id, error) in &report.failed {
        warn!("Agent {} failed to start: {}", agent_id, error);
    }

    let outcome = run(&cli, &config, &swarm).await;
    swarm.shutdown().await;
    outcome
}

async fn run(cli: &Cli, config: &FileConfig, swarm: &swarm_application::Swarm) -> Result<()> {
    if cli.status {
        println!("{}", ConsoleFormatter::format_statuses(&swarm.statuses()));
        return Ok(());
    }

    let Some(action) = cli.action.clone() else {
        bail!("An action is required. Use --status to inspect the swarm.");
    };

    let proposer = match &cli.proposer {
        Some(id) => AgentId::new(id.as_str()),
        None => swarm
            .registry()
            .iter()
            .next()
            .map(|agent| agent.id().clone())
            .ok_or_else(|| anyhow!("The swarm has no agents"))?,
    };

    let params = cli.params_map();
    let request = ActionRequest::new(proposer, action.as_str(), params.clone())
        .with_market_context(cli.context_map())
        .with_self_vote(cli.self_vote);

    let format = config.output.resolve_format(cli.output.map(Into::into));

    let show_progress =
        !cli.quiet && config.output.show_progress && !format.is_machine_readable();
    let observer: Box<dyn RoundObserver> = if show_progress {
        Box::new(ProgressReporter::new())
    } else {
        Box::new(NoRoundObserver)
    };

    let consensus = swarm.propose(request, observer.as_ref()).await?;
    println!("{}", ConsoleFormatter.render(&consensus, format));

    if cli.execute {
        let results = swarm.execute_approved(&consensus, &action, &params).await;
        let output = if format.is_machine_readable() {
            ConsoleFormatter::format_execution_json(&results)
        } else {
            ConsoleFormatter::format_execution(&results)
        };
        println!("{}", output);
    }

    Ok(())
}

/// Stderr logging filtered by `-v`, plus an optional plain-text log file.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(level));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let file_name = path
                .file_name()
                .ok_or_else(|| anyhow!("Invalid log file path: {}", path.display()))?;
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file_level = if verbose < 1 { "info" } else { level };
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(EnvFilter::new(file_level));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}
