//! navprobe CLI library
//!
//! Command-line front end for navprobe: generates runs of the news site model
//! against the simulated site, prints the transition graph, and shows the
//! effective site configuration.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Error types are self-documenting

mod commands;
mod config;
mod error;
mod output;
mod runner;

pub use commands::{
    Cli, ColorArg, Commands, ConfigArgs, GraphArgs, GraphFormat, RunArgs, RunFormat, StrategyArg,
};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{render_outcome, render_trace, Reporter};
pub use runner::{execute_run, load_site_config, run_generation, show_config, show_graph};
