//! navprobe CLI: model-based UI test generation
//!
//! ## Usage
//!
//! ```bash
//! navprobe run                          # 30 greedy steps, seed 42
//! navprobe run --steps 10 --format json # JSON report
//! navprobe graph --format dot           # Graphviz output
//! navprobe config --config site.yaml    # Effective configuration
//! ```

use clap::Parser;
use navprobe_cli::{
    run_generation, show_config, show_graph, Cli, CliConfig, CliResult, Commands, Verbosity,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    config.init_logging();

    match cli.command {
        Commands::Run(args) => run_generation(&config, &args),
        Commands::Graph(args) => show_graph(&config, &args),
        Commands::Config(args) => show_config(&args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.verbose, cli.quiet))
        .with_color(cli.color.into())
}
