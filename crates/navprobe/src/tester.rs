//! Test generation.
//!
//! [`GreedyTester`] walks a model's transition graph one action at a time,
//! preferring actions whose destination has been reached least often in the
//! current run. Every run starts with a reset, honours a step budget, and
//! stops at the first failure.
//!
//! # Example
//!
//! ```
//! use navprobe::mock::SimulatedLauncher;
//! use navprobe::news::{NewsSiteModel, SiteConfig};
//! use navprobe::{GreedyTester, Seed, SeededRandom, Strategy};
//!
//! let config = SiteConfig::new().with_base_url("https://news.test/");
//! let mut model = NewsSiteModel::new(SimulatedLauncher::new("https://news.test/"), config);
//! let mut tester = GreedyTester::new(SeededRandom::new(Seed::from_u64(7)))
//!     .with_strategy(Strategy::Greedy);
//! let report = tester.generate(&mut model, 12).unwrap();
//! assert_eq!(report.coverage.states.covered, 4);
//! println!("{}", report.coverage);
//! ```

use crate::coverage::{CoverageReport, CoverageTracker};
use crate::graph::{Edge, TransitionGraph};
use crate::listener::RunListener;
use crate::model::{ActionDef, FsmModel, ModelState};
use crate::result::{FailureKind, ModelError, ModelResult};
use crate::rng::{RandomSource, Seed, SeededRandom};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Default step budget
pub const DEFAULT_STEPS: usize = 30;

/// Default seed
pub const DEFAULT_SEED: u64 = 42;

/// Action selection strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Prefer destinations with the fewest arrivals so far
    #[default]
    Greedy,
    /// Uniform choice among enabled actions
    Random,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Greedy => write!(f, "greedy"),
            Self::Random => write!(f, "random"),
        }
    }
}

/// Generator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Step budget per run
    pub steps: usize,
    /// Seed for the random source
    pub seed: u64,
    /// Acquire a fresh driver on reset
    pub live: bool,
    /// Selection strategy
    pub strategy: Strategy,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            steps: DEFAULT_STEPS,
            seed: DEFAULT_SEED,
            live: true,
            strategy: Strategy::Greedy,
        }
    }
}

impl GeneratorConfig {
    /// Create a config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the step budget
    #[must_use]
    pub const fn with_steps(mut self, steps: usize) -> Self {
        self.steps = steps;
        self
    }

    /// Set the seed
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set whether reset acquires a fresh driver
    #[must_use]
    pub const fn with_live(mut self, live: bool) -> Self {
        self.live = live;
        self
    }

    /// Set the selection strategy
    #[must_use]
    pub const fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }
}

/// One executed step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepRecord<S> {
    /// 1-based step number
    pub index: usize,
    /// Source state
    pub from: S,
    /// Action fired
    pub action: &'static str,
    /// Destination state
    pub to: S,
}

impl<S: fmt::Display> fmt::Display for StepRecord<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} --{}--> {}", self.from, self.action, self.to)
    }
}

/// The attempt that stopped a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepFailure {
    /// State the action was attempted from
    pub state: String,
    /// Action attempted
    pub action: String,
    /// Failure category
    pub kind: FailureKind,
    /// Human-readable error
    pub message: String,
    /// Underlying error
    #[serde(skip)]
    pub error: ModelError,
}

impl StepFailure {
    /// Record `error` raised by `action` from `state`
    #[must_use]
    pub fn new(state: impl fmt::Display, action: impl Into<String>, error: ModelError) -> Self {
        Self {
            state: state.to_string(),
            action: action.into(),
            kind: error.kind(),
            message: error.to_string(),
            error,
        }
    }
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} from {} failed: {}", self.action, self.state, self.message)
    }
}

/// Why a run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Step budget reached
    BudgetExhausted,
    /// No action enabled in the current state
    DeadEnd,
    /// An action failed
    Failure,
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// The whole budget ran without failure
    Completed,
    /// A state with no enabled action was reached
    DeadEnd {
        /// The dead-end state
        state: String,
    },
    /// A step failed
    Failed(StepFailure),
}

impl RunOutcome {
    /// Why the run stopped
    #[must_use]
    pub const fn stop_reason(&self) -> StopReason {
        match self {
            Self::Completed => StopReason::BudgetExhausted,
            Self::DeadEnd { .. } => StopReason::DeadEnd,
            Self::Failed(_) => StopReason::Failure,
        }
    }

    /// Failure, if the run failed
    #[must_use]
    pub const fn failure(&self) -> Option<&StepFailure> {
        match self {
            Self::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    /// Whether no step failed
    #[must_use]
    pub const fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::DeadEnd { state } => write!(f, "dead end at {state}"),
            Self::Failed(failure) => write!(f, "failed: {failure}"),
        }
    }
}

/// Result of one generated run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport<S> {
    /// Unique run identifier
    pub run_id: String,
    /// Strategy used
    pub strategy: Strategy,
    /// Step budget
    pub budget: usize,
    /// Successful steps, in order
    pub trace: Vec<StepRecord<S>>,
    /// Coverage at the end of the run
    pub coverage: CoverageReport,
    /// How the run ended
    pub outcome: RunOutcome,
}

impl<S: ModelState> RunReport<S> {
    /// Number of successful steps
    #[must_use]
    pub fn steps_taken(&self) -> usize {
        self.trace.len()
    }

    /// Whether no step failed
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.outcome.is_success()
    }

    /// States along the trace, starting with the first source
    #[must_use]
    pub fn path(&self) -> Vec<S> {
        let mut path: Vec<S> = self.trace.first().map(|s| s.from).into_iter().collect();
        path.extend(self.trace.iter().map(|s| s.to));
        path
    }

    /// Serialize as pretty-printed JSON
    ///
    /// # Errors
    /// Returns error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Format as text summary
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Run {}\n\
            Strategy: {}\n\
            Steps:    {}/{}\n\
            Outcome:  {}\n\n{}",
            self.run_id,
            self.strategy,
            self.steps_taken(),
            self.budget,
            self.outcome,
            self.coverage.summary()
        )
    }
}

/// Walks a model, choosing actions by strategy
pub struct GreedyTester<M: FsmModel, R: RandomSource> {
    graph: TransitionGraph<M::State>,
    actions: Vec<ActionDef<M>>,
    random: R,
    strategy: Strategy,
    live: bool,
    coverage: CoverageTracker<M::State>,
    listeners: Vec<Box<dyn RunListener<M::State>>>,
}

impl<M: FsmModel, R: RandomSource> fmt::Debug for GreedyTester<M, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GreedyTester")
            .field("strategy", &self.strategy)
            .field("live", &self.live)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl<M: FsmModel, R: RandomSource> GreedyTester<M, R> {
    /// Create a tester drawing choices from `random`
    #[must_use]
    pub fn new(random: R) -> Self {
        let actions = M::actions();
        let graph = TransitionGraph::from_actions(M::INITIAL, M::STATES, &actions);
        let coverage = CoverageTracker::for_graph(&graph);
        Self {
            graph,
            actions,
            random,
            strategy: Strategy::Greedy,
            live: true,
            coverage,
            listeners: Vec::new(),
        }
    }

    /// Set the selection strategy
    #[must_use]
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set whether reset acquires a fresh driver
    #[must_use]
    pub fn with_live(mut self, live: bool) -> Self {
        self.live = live;
        self
    }

    /// Register a listener
    pub fn add_listener(&mut self, listener: impl RunListener<M::State> + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Transition graph the tester walks
    #[must_use]
    pub const fn graph(&self) -> &TransitionGraph<M::State> {
        &self.graph
    }

    /// Coverage of the current or most recent run
    #[must_use]
    pub const fn coverage(&self) -> &CoverageTracker<M::State> {
        &self.coverage
    }

    /// Random source
    #[must_use]
    pub const fn random(&self) -> &R {
        &self.random
    }

    /// Reset `model` and run up to `steps` actions.
    ///
    /// Fails only when the reset fails; step failures are reported in the
    /// returned outcome. Coverage restarts with every run.
    pub fn generate(&mut self, model: &mut M, steps: usize) -> ModelResult<RunReport<M::State>> {
        let run_id = Uuid::new_v4().to_string();
        self.coverage = CoverageTracker::for_graph(&self.graph);

        tracing::info!(run_id = %run_id, steps, strategy = %self.strategy, live = self.live, "starting run");
        if let Err(err) = model.reset(self.live) {
            tracing::warn!(run_id = %run_id, error = %err, "reset failed");
            return Err(err);
        }

        let initial = model.state();
        self.coverage.record_start(initial);
        for listener in &mut self.listeners {
            listener.on_reset(&run_id, initial);
        }

        let mut trace = Vec::with_capacity(steps);
        let mut outcome = RunOutcome::Completed;

        for index in 1..=steps {
            let from = model.state();
            let enabled = self.graph.edges_from(from).to_vec();
            if enabled.is_empty() {
                tracing::info!(state = %from, "no enabled action");
                outcome = RunOutcome::DeadEnd {
                    state: from.to_string(),
                };
                break;
            }

            let edge = self.select(&enabled);
            let action = self.actions[edge.action_index];
            tracing::debug!(step = index, from = %from, action = action.name, "firing");

            match model.fire(&action) {
                Ok(to) => {
                    self.coverage.record_transition(from, action.name, to);
                    let record = StepRecord {
                        index,
                        from,
                        action: action.name,
                        to,
                    };
                    for listener in &mut self.listeners {
                        listener.on_step(&record);
                    }
                    trace.push(record);
                }
                Err(err) => {
                    let failure = StepFailure::new(from, action.name, err);
                    tracing::warn!(step = index, kind = %failure.kind, "{failure}");
                    for listener in &mut self.listeners {
                        listener.on_failure(&failure);
                    }
                    outcome = RunOutcome::Failed(failure);
                    break;
                }
            }
        }

        tracing::info!(
            run_id = %run_id,
            steps = trace.len(),
            outcome = %outcome,
            coverage = %self.coverage.summary(),
            "run finished"
        );
        for listener in &mut self.listeners {
            listener.on_finish(&outcome);
        }

        Ok(RunReport {
            run_id,
            strategy: self.strategy,
            budget: steps,
            trace,
            coverage: self.coverage.report(),
            outcome,
        })
    }

    fn select(&mut self, enabled: &[Edge<M::State>]) -> Edge<M::State> {
        let candidates: Vec<Edge<M::State>> = match self.strategy {
            Strategy::Random => enabled.to_vec(),
            Strategy::Greedy => {
                let least = enabled
                    .iter()
                    .map(|e| self.coverage.arrivals(e.target))
                    .min()
                    .unwrap_or(0);
                enabled
                    .iter()
                    .filter(|e| self.coverage.arrivals(e.target) == least)
                    .copied()
                    .collect()
            }
        };
        let pick = if candidates.len() == 1 {
            0
        } else {
            self.random.next_index(candidates.len())
        };
        candidates[pick.min(candidates.len() - 1)]
    }
}

/// Run the greedy strategy over `model` with a seeded random source
pub fn generate<M: FsmModel>(
    model: &mut M,
    steps: usize,
    seed: u64,
) -> ModelResult<RunReport<M::State>> {
    GreedyTester::<M, _>::new(SeededRandom::new(Seed::from_u64(seed))).generate(model, steps)
}

/// Run with every knob taken from `config`
pub fn generate_with<M: FsmModel>(
    model: &mut M,
    config: &GeneratorConfig,
) -> ModelResult<RunReport<M::State>> {
    GreedyTester::<M, _>::new(SeededRandom::new(Seed::from_u64(config.seed)))
        .with_strategy(config.strategy)
        .with_live(config.live)
        .generate(model, config.steps)
}
