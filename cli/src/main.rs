//! CLI entrypoint for consilium
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use consilium_application::{
    ConsultInput, ConsultOptions, ConsultUseCase, ConversationLogger, CouncilConfig, NoConversationLogger,
    NoProgress, ProgressNotifier, ResponseCache,
};
use consilium_domain::{AgentSpec, OutputFormat, Task};
use consilium_infrastructure::config::{FileCacheConfig, FileLoggingConfig};
use consilium_infrastructure::{
    CacheBackend, ConfigLoader, FileResponseCache, InMemoryResponseCache, JsonlConversationLogger,
    RoutingAgentGateway,
};
use consilium_presentation::{Cli, ConsoleFormatter, ProgressReporter, SimpleProgress};
use std::io::IsTerminal;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const LOG_FILE_PREFIX: &str = "consilium.log";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // === Configuration ===
    let file_config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref()).context("failed to load configuration")?
    };

    // Held until exit so the file log is flushed
    let _log_guard = init_logging(&cli, &file_config.logging);
    info!("Starting consilium");

    if !file_config.output.color {
        colored::control::set_override(false);
    }

    if cli.show_config {
        for line in ConfigLoader::describe_sources(cli.config.as_deref()) {
            println!("{}", line);
        }
        println!();
        println!("{}", toml::to_string_pretty(&file_config).context("failed to render configuration")?);
        return Ok(());
    }

    let cache = build_cache(&file_config.cache);

    if cli.sweep_cache {
        let removed = cache.sweep().await.context("failed to sweep the response cache")?;
        println!("Removed {} expired cache entries", removed);
        return Ok(());
    }

    let Some(prompt) = cli.prompt.clone() else {
        bail!("A prompt is required. Run with --help for usage.");
    };

    let council = file_config.to_council_config()?;
    for issue in file_config.warnings() {
        warn!("{}", issue);
    }

    // === Input ===
    let mut task = Task::new(prompt)?;
    if let Some(path) = &cli.context {
        let context = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read context file {}", path.display()))?;
        task = task.with_context(context);
    }
    if let Some(category) = &cli.category {
        task = task.with_category(category);
    }

    let agents = select_agents(&council, &cli.agent)?;
    let options = apply_overrides(council.options().clone(), &cli);
    let format = cli
        .output
        .map(OutputFormat::from)
        .or(file_config.output.format)
        .unwrap_or_default();

    // === Dependency Injection ===
    let gateway = Arc::new(RoutingAgentGateway::from_config(&file_config.agents));
    for agent in &agents {
        if !gateway.has_adapter(&agent.name) {
            warn!("Agent {} has no usable adapter and will fail", agent.name);
        }
    }

    let cancellation = CancellationToken::new();
    spawn_interrupt_handler(cancellation.clone());

    let use_case = ConsultUseCase::new(gateway, council)
        .with_cache(cache)
        .with_logger(build_logger(&file_config.logging))
        .with_cancellation(cancellation);

    if !cli.quiet && format != OutputFormat::Json {
        eprintln!();
        eprintln!("Task: {}", task.prompt());
        eprintln!(
            "Agents: {}",
            agents.iter().map(|a| a.name.as_str()).collect::<Vec<_>>().join(", ")
        );
        eprintln!();
    }

    let progress: Box<dyn ProgressNotifier> = if cli.quiet {
        Box::new(NoProgress)
    } else if std::io::stderr().is_terminal() {
        Box::new(ProgressReporter::new())
    } else {
        Box::new(SimpleProgress)
    };

    let input = ConsultInput::new(task, agents).with_options(options);
    let result = use_case.execute_with_progress(input, progress.as_ref()).await?;

    println!("{}", ConsoleFormatter::render(&result, format));

    Ok(())
}

/// stderr log filtered by `-v`/`-q` (or `RUST_LOG`), plus a daily rolling
/// file when `[logging] dir` is set
fn init_logging(cli: &Cli, logging: &FileLoggingConfig) -> Option<WorkerGuard> {
    let level = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = match &logging.dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    guard
}

fn build_cache(config: &FileCacheConfig) -> Arc<dyn ResponseCache> {
    match config.backend {
        CacheBackend::Memory => Arc::new(InMemoryResponseCache::default()),
        CacheBackend::File => match config.resolved_dir() {
            Some(dir) => {
                info!("Response cache at {}", dir.display());
                Arc::new(FileResponseCache::new(dir))
            }
            None => {
                warn!("No cache directory available; caching in memory for this run");
                Arc::new(InMemoryResponseCache::default())
            }
        },
    }
}

fn build_logger(config: &FileLoggingConfig) -> Arc<dyn ConversationLogger> {
    match config
        .transcript
        .as_deref()
        .and_then(JsonlConversationLogger::new)
    {
        Some(logger) => {
            info!("Transcript at {} (run {})", logger.path().display(), logger.run_id());
            Arc::new(logger)
        }
        None => Arc::new(NoConversationLogger),
    }
}

/// Configured agents, narrowed to `--agent` names when any are given.
/// Repeated names keep their first position.
fn select_agents(council: &CouncilConfig, names: &[String]) -> Result<Vec<AgentSpec>> {
    if names.is_empty() {
        return Ok(council.agents().to_vec());
    }
    let mut picked: Vec<AgentSpec> = Vec::with_capacity(names.len());
    for name in names {
        if picked.iter().any(|a| &a.name == name) {
            warn!("Agent {} given more than once; asking it once", name);
            continue;
        }
        let agent = council
            .agent(name)
            .cloned()
            .with_context(|| format!("unknown agent '{}'", name))?;
        picked.push(agent);
    }
    Ok(picked)
}

fn apply_overrides(mut options: ConsultOptions, cli: &Cli) -> ConsultOptions {
    if cli.wants_debate() {
        options.enable_debate = true;
    }
    if let Some(rounds) = cli.rounds {
        options.debate_rounds = rounds;
    }
    if cli.no_cache {
        options.enable_cache = false;
    }
    if cli.no_escalation {
        options.enable_escalation = false;
    }
    if let Some(strategy) = cli.strategy {
        options.strategy = strategy.into();
    }
    options
}

/// First Ctrl-C cancels the consultation; whatever rounds finished are
/// still reported
fn spawn_interrupt_handler(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted; finishing with the rounds already collected");
            token.cancel();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use consilium_domain::SynthesisStrategy;
    use consilium_infrastructure::FileConfig;

    fn council() -> CouncilConfig {
        let config: FileConfig = toml::from_str(
            r#"
[[agents]]
name = "claude"
command = "claude"

[[agents]]
name = "gemini"
command = "gemini"

[[agents]]
name = "codex"
command = "codex"
"#,
        )
        .unwrap();
        config.to_council_config().unwrap()
    }

    #[test]
    fn test_select_agents() {
        let council = council();
        assert_eq!(select_agents(&council, &[]).unwrap().len(), 3);

        let picked = select_agents(&council, &["codex".into(), "claude".into()]).unwrap();
        let names: Vec<_> = picked.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["codex", "claude"]);

        let err = select_agents(&council, &["nobody".into()]).unwrap_err();
        assert!(err.to_string().contains("nobody"));
    }

    #[test]
    fn test_select_agents_repeated_name_asked_once() {
        let council = council();
        let picked = select_agents(
            &council,
            &["gemini".into(), "claude".into(), "gemini".into()],
        )
        .unwrap();
        let names: Vec<_> = picked.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["gemini", "claude"]);
    }

    #[test]
    fn test_cli_overrides_config_options() {
        let cli = Cli::parse_from([
            "consilium",
            "--rounds",
            "4",
            "--no-cache",
            "--no-escalation",
            "--strategy",
            "compare_only",
            "q",
        ]);
        let options = apply_overrides(ConsultOptions::default(), &cli);

        assert!(options.enable_debate);
        assert_eq!(options.debate_rounds, 4);
        assert!(!options.enable_cache);
        assert!(!options.enable_escalation);
        assert_eq!(options.strategy, SynthesisStrategy::CompareOnly);
    }

    #[test]
    fn test_no_flags_keep_config_options() {
        let cli = Cli::parse_from(["consilium", "q"]);
        let configured = ConsultOptions::default().with_debate(5).without_cache();
        assert_eq!(apply_overrides(configured.clone(), &cli), configured);
    }
}
