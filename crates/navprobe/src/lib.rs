//! navprobe: model-based UI testing with guarded finite-state machines.
//!
//! A model declares its states and a table of guarded actions. navprobe
//! derives the transition graph from that table, walks it with a greedy
//! generator that favours rarely reached states, and accounts for state,
//! transition and action coverage along the way.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   actions()   ┌──────────────────┐
//! │  FsmModel    │──────────────►│ TransitionGraph  │
//! │ (news site)  │               └────────┬─────────┘
//! │              │   fire()      ┌────────▼─────────┐   ┌──────────────────┐
//! │              │◄──────────────│  GreedyTester    │──►│ CoverageTracker  │
//! └──────┬───────┘               └──────────────────┘   └──────────────────┘
//!        │ PageDriver
//! ┌──────▼───────┐
//! │ browser or   │
//! │ SimulatedSite│
//! └──────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use navprobe::mock::SimulatedLauncher;
//! use navprobe::news::{NewsSiteModel, SiteConfig};
//!
//! let config = SiteConfig::new().with_base_url("https://news.test/");
//! let mut model = NewsSiteModel::new(SimulatedLauncher::new("https://news.test/"), config);
//! let report = navprobe::generate(&mut model, 10, 42).unwrap();
//! assert!(report.is_success());
//! assert_eq!(report.steps_taken(), 10);
//! ```

#![warn(missing_docs)]

pub mod coverage;
pub mod driver;
pub mod graph;
pub mod listener;
pub mod locator;
pub mod mock;
pub mod model;
pub mod news;
pub mod page_object;
pub mod result;
pub mod rng;
pub mod tester;
pub mod wait;

pub use coverage::{CoverageMetric, CoverageReport, CoverageTracker};
pub use driver::{DriverConfig, DriverLauncher, Element, PageDriver};
pub use graph::{GraphIssue, GraphValidation, IssueSeverity, TransitionGraph};
pub use listener::{FnListener, RunListener, VerboseListener};
pub use locator::Locator;
pub use model::{ActionDef, FsmModel, ModelState, StepContext};
pub use result::{DriverError, DriverResult, FailureKind, ModelError, ModelResult};
pub use rng::{RandomSource, ScriptedChoices, Seed, SeededRandom};
pub use tester::{
    generate, generate_with, GeneratorConfig, GreedyTester, RunOutcome, RunReport, StepFailure,
    StepRecord, StopReason, Strategy,
};
pub use wait::{WaitCondition, WaitOptions};

/// Everything a model author needs
pub mod prelude {
    pub use super::coverage::*;
    pub use super::driver::*;
    pub use super::graph::*;
    pub use super::listener::*;
    pub use super::locator::*;
    pub use super::model::*;
    pub use super::page_object::*;
    pub use super::result::*;
    pub use super::rng::*;
    pub use super::tester::*;
    pub use super::wait::*;
}
