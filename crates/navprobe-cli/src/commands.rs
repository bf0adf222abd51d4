//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// navprobe: model-based UI test generation for the news site model
#[derive(Parser, Debug)]
#[command(name = "navprobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate and run a test walk against the simulated news site
    Run(RunArgs),

    /// Print the transition graph and its validation issues
    Graph(GraphArgs),

    /// Print the effective site configuration
    Config(ConfigArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Step budget
    #[arg(short = 'n', long, default_value_t = navprobe::tester::DEFAULT_STEPS)]
    pub steps: usize,

    /// Seed for the random source
    #[arg(short, long, default_value_t = navprobe::tester::DEFAULT_SEED)]
    pub seed: u64,

    /// Action selection strategy
    #[arg(long, default_value = "greedy")]
    pub strategy: StrategyArg,

    /// Make every search return no results
    #[arg(long)]
    pub zero_results: bool,

    /// Site configuration file (YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: RunFormat,
}

/// Arguments for the graph command
#[derive(Parser, Debug)]
pub struct GraphArgs {
    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: GraphFormat,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Site configuration file (YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Selection strategy
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StrategyArg {
    /// Least-visited destination first
    #[default]
    Greedy,
    /// Uniform over enabled actions
    Random,
}

impl From<StrategyArg> for navprobe::Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Greedy => Self::Greedy,
            StrategyArg::Random => Self::Random,
        }
    }
}

/// Run report format
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON report
    Json,
}

/// Graph output format
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GraphFormat {
    /// Adjacency listing
    #[default]
    Text,
    /// Graphviz DOT
    Dot,
}

/// Color argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
