//! Subcommand execution

use crate::commands::{ConfigArgs, GraphArgs, GraphFormat, RunArgs, RunFormat};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::Reporter;
use navprobe::mock::{SimulatedLauncher, SiteBehavior};
use navprobe::news::{NewsPage, NewsSiteModel, SiteConfig};
use navprobe::{GreedyTester, RunReport, Seed, SeededRandom, TransitionGraph, VerboseListener};
use std::path::Path;

type SimulatedModel = NewsSiteModel<SimulatedLauncher>;

/// Load a site config from `path`, or the defaults
pub fn load_site_config(path: Option<&Path>) -> CliResult<SiteConfig> {
    let config = match path {
        Some(path) => SiteConfig::from_file(path)?,
        None => SiteConfig::new(),
    };
    config.validate()?;
    tracing::debug!(base_url = %config.base_url, "site config loaded");
    Ok(config)
}

/// Generate one run against the simulated site.
///
/// Every run starts with a live reset, so each one gets a fresh session.
/// Only a reset failure is an error here; step failures are in the report.
pub fn execute_run(config: &CliConfig, args: &RunArgs) -> CliResult<RunReport<NewsPage>> {
    let site = load_site_config(args.config.as_deref())?;
    let behavior = if args.zero_results {
        SiteBehavior::new().with_zero_results()
    } else {
        SiteBehavior::new()
    };
    let launcher = SimulatedLauncher::new(site.base_url.clone()).with_behavior(behavior);
    let mut model = NewsSiteModel::new(launcher, site);

    let mut tester: GreedyTester<SimulatedModel, _> =
        GreedyTester::new(SeededRandom::new(Seed::from_u64(args.seed)))
            .with_strategy(args.strategy.into());
    if config.verbosity.is_verbose() {
        tester.add_listener(VerboseListener::new());
    }

    let report = tester.generate(&mut model, args.steps)?;
    if let Err(err) = model.close() {
        tracing::warn!(error = %err, "failed to close driver");
    }
    Ok(report)
}

/// `navprobe run`
///
/// Prints the report, then returns [`CliError::RunFailed`] when a step
/// failed. Completed and dead-end runs are `Ok`.
pub fn run_generation(config: &CliConfig, args: &RunArgs) -> CliResult<()> {
    let report = execute_run(config, args)?;

    match args.format {
        RunFormat::Json => println!("{}", report.to_json()?),
        RunFormat::Text => {
            Reporter::new(config.color.should_color(), config.verbosity.is_quiet())
                .run_report(&report);
        }
    }

    if report.is_success() {
        Ok(())
    } else {
        Err(CliError::run_failed(report.outcome.to_string()))
    }
}

/// `navprobe graph`
pub fn show_graph(config: &CliConfig, args: &GraphArgs) -> CliResult<()> {
    let graph = TransitionGraph::build::<SimulatedModel>();
    let reporter = Reporter::new(config.color.should_color(), config.verbosity.is_quiet());

    match args.format {
        GraphFormat::Dot => reporter.raw(&graph.to_dot()),
        GraphFormat::Text => {
            reporter.raw(&graph.to_text());
            reporter.graph_issues(&graph.validate());
        }
    }
    Ok(())
}

/// `navprobe config`
pub fn show_config(args: &ConfigArgs) -> CliResult<()> {
    let site = load_site_config(args.config.as_deref())?;
    print!("{}", site.to_yaml()?);
    Ok(())
}
