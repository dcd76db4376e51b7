//! CLI command definitions

use clap::{Parser, ValueEnum};
use consilium_domain::{OutputFormat as DomainOutputFormat, SynthesisStrategy};
use std::path::PathBuf;

/// Output format for consultation results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Every round, every agent answer, and the consensus
    Full,
    /// Consensus, verdict and per-agent statuses
    Summary,
    /// JSON output
    Json,
}

impl From<OutputFormat> for DomainOutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => DomainOutputFormat::Full,
            OutputFormat::Summary => DomainOutputFormat::Summary,
            OutputFormat::Json => DomainOutputFormat::Json,
        }
    }
}

/// How the final consensus becomes a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum StrategyArg {
    Majority,
    RiskAverse,
    CompareOnly,
}

impl From<StrategyArg> for SynthesisStrategy {
    fn from(strategy: StrategyArg) -> Self {
        match strategy {
            StrategyArg::Majority => SynthesisStrategy::Majority,
            StrategyArg::RiskAverse => SynthesisStrategy::RiskAverse,
            StrategyArg::CompareOnly => SynthesisStrategy::CompareOnly,
        }
    }
}

/// CLI arguments for consilium
#[derive(Parser, Debug)]
#[command(name = "consilium")]
#[command(author, version, about = "Ask a panel of AI agents and measure how far they agree")]
#[command(long_about = r#"
Consilium sends one task to a panel of independent agents, normalizes their
answers, and measures how strongly they agree.

A consultation runs in up to three steps:
1. Round 1: every agent answers in parallel (cached answers are reused)
2. Escalation: low-confidence agents are re-asked on a stronger model
3. Debate: agents see each other's answers and revise, while they disagree

Configuration files are loaded from (in priority order):
1. CONSILIUM_* environment variables
2. --config <path>         Explicit config file
3. ./consilium.toml        Project-level config
4. ~/.config/consilium/config.toml   Global config

Example:
  consilium "Kafka or RabbitMQ for a 10k msg/s event bus?"
  consilium --debate --rounds 3 -a claude -a gemini "Monorepo or polyrepo?"
  consilium --category security --context threat-model.md "Is this auth flow safe?"
"#)]
pub struct Cli {
    /// The task to put to the panel (not required with --show-config or --sweep-cache)
    pub prompt: Option<String>,

    /// Agents to consult, by configured name (can be specified multiple times)
    #[arg(short, long, value_name = "NAME")]
    pub agent: Vec<String>,

    /// Task category, used for routing and mandatory debate
    #[arg(long, value_name = "CATEGORY")]
    pub category: Option<String>,

    /// File whose contents are sent to every agent as context
    #[arg(long, value_name = "FILE")]
    pub context: Option<PathBuf>,

    /// Run debate rounds after round 1
    #[arg(long)]
    pub debate: bool,

    /// Total rounds including round 1 (implies --debate)
    #[arg(long, value_name = "N")]
    pub rounds: Option<u32>,

    /// Neither read nor write the response cache
    #[arg(long)]
    pub no_cache: bool,

    /// Never re-ask low-confidence agents on a stronger model
    #[arg(long)]
    pub no_escalation: bool,

    /// How the final consensus becomes a recommendation
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Output format
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

    /// Remove expired entries from the response cache and exit
    #[arg(long)]
    pub sweep_cache: bool,
}

impl Cli {
    /// Debate was requested, either directly or through `--rounds`
    pub fn wants_debate(&self) -> bool {
        self.debate || self.rounds.is_some()
    }
}
