//! Coverage accounting for generated test runs.
//!
//! Tracks which states, transitions and actions a run exercised, against the
//! totals declared by the model's transition graph. Everything here only ever
//! grows; entries are never removed.
//!
//! ```
//! use navprobe::coverage::CoverageMetric;
//!
//! let metric = CoverageMetric::new(3, 4);
//! assert_eq!(metric.percent(), 75.0);
//! ```

use crate::graph::TransitionGraph;
use crate::model::ModelState;
use crate::result::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Covered versus declared count for one category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageMetric {
    /// Entries exercised
    pub covered: usize,
    /// Entries declared
    pub total: usize,
}

impl CoverageMetric {
    /// Create a metric
    #[must_use]
    pub const fn new(covered: usize, total: usize) -> Self {
        Self { covered, total }
    }

    /// Coverage ratio (0.0 to 1.0); an empty category counts as covered
    #[must_use]
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.covered as f64 / self.total as f64
        }
    }

    /// Coverage as a percentage (0-100)
    #[must_use]
    pub fn percent(&self) -> f64 {
        self.ratio() * 100.0
    }

    /// Whether every declared entry was exercised
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.covered >= self.total
    }
}

impl fmt::Display for CoverageMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}% ({}/{})", self.percent(), self.covered, self.total)
    }
}

/// Accumulates coverage during a run
#[derive(Debug, Clone)]
pub struct CoverageTracker<S: Ord> {
    total_states: usize,
    total_transitions: usize,
    total_actions: usize,
    visited_states: BTreeSet<S>,
    transitions: BTreeSet<(S, &'static str)>,
    actions: BTreeSet<&'static str>,
    arrivals: BTreeMap<S, u64>,
    transition_hits: BTreeMap<(S, &'static str), u64>,
    executed: u64,
}

impl<S: ModelState> CoverageTracker<S> {
    /// Create an empty tracker with explicit totals
    #[must_use]
    pub const fn new(total_states: usize, total_transitions: usize, total_actions: usize) -> Self {
        Self {
            total_states,
            total_transitions,
            total_actions,
            visited_states: BTreeSet::new(),
            transitions: BTreeSet::new(),
            actions: BTreeSet::new(),
            arrivals: BTreeMap::new(),
            transition_hits: BTreeMap::new(),
            executed: 0,
        }
    }

    /// Create an empty tracker sized from a transition graph
    #[must_use]
    pub fn for_graph(graph: &TransitionGraph<S>) -> Self {
        Self::new(
            graph.states().len(),
            graph.edge_count(),
            graph.action_names().len(),
        )
    }

    /// Mark a state visited without an arrival (the run's starting point)
    pub fn record_start(&mut self, state: S) {
        self.visited_states.insert(state);
    }

    /// Record one successful transition
    pub fn record_transition(&mut self, from: S, action: &'static str, to: S) {
        self.visited_states.insert(from);
        self.visited_states.insert(to);
        self.transitions.insert((from, action));
        self.actions.insert(action);
        *self.arrivals.entry(to).or_insert(0) += 1;
        *self.transition_hits.entry((from, action)).or_insert(0) += 1;
        self.executed += 1;
    }

    /// Number of successful transitions that ended in `state`
    #[must_use]
    pub fn arrivals(&self, state: S) -> u64 {
        self.arrivals.get(&state).copied().unwrap_or(0)
    }

    /// Number of times `action` fired from `state`
    #[must_use]
    pub fn transition_hits(&self, state: S, action: &str) -> u64 {
        self.transition_hits
            .iter()
            .find(|((s, a), _)| *s == state && *a == action)
            .map_or(0, |(_, n)| *n)
    }

    /// Whether `state` was visited
    #[must_use]
    pub fn visited(&self, state: S) -> bool {
        self.visited_states.contains(&state)
    }

    /// Visited states
    #[must_use]
    pub const fn visited_states(&self) -> &BTreeSet<S> {
        &self.visited_states
    }

    /// Exercised `(state, action)` transitions
    #[must_use]
    pub const fn exercised_transitions(&self) -> &BTreeSet<(S, &'static str)> {
        &self.transitions
    }

    /// Invoked action names
    #[must_use]
    pub const fn invoked_actions(&self) -> &BTreeSet<&'static str> {
        &self.actions
    }

    /// Total successful transition executions, repeats included
    #[must_use]
    pub const fn executed(&self) -> u64 {
        self.executed
    }

    /// State coverage
    #[must_use]
    pub fn state_coverage(&self) -> CoverageMetric {
        CoverageMetric::new(self.visited_states.len(), self.total_states)
    }

    /// Transition coverage
    #[must_use]
    pub fn transition_coverage(&self) -> CoverageMetric {
        CoverageMetric::new(self.transitions.len(), self.total_transitions)
    }

    /// Action coverage
    #[must_use]
    pub fn action_coverage(&self) -> CoverageMetric {
        CoverageMetric::new(self.actions.len(), self.total_actions)
    }

    /// Snapshot the current coverage
    #[must_use]
    pub fn report(&self) -> CoverageReport {
        CoverageReport {
            states: self.state_coverage(),
            transitions: self.transition_coverage(),
            actions: self.action_coverage(),
            visited_states: self.visited_states.iter().map(ToString::to_string).collect(),
            exercised_transitions: self
                .transitions
                .iter()
                .map(|(s, a)| format!("{s}.{a}"))
                .collect(),
            invoked_actions: self.actions.iter().map(ToString::to_string).collect(),
            transitions_executed: self.executed,
        }
    }

    /// One-line summary
    ///
    /// Returns: `"states 75% (3/4), transitions 33% (3/9), actions 33% (3/9)"`
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "states {:.0}% ({}/{}), transitions {:.0}% ({}/{}), actions {:.0}% ({}/{})",
            self.state_coverage().percent(),
            self.visited_states.len(),
            self.total_states,
            self.transition_coverage().percent(),
            self.transitions.len(),
            self.total_transitions,
            self.action_coverage().percent(),
            self.actions.len(),
            self.total_actions,
        )
    }
}

/// Read-only coverage snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    /// State coverage
    pub states: CoverageMetric,
    /// Transition coverage
    pub transitions: CoverageMetric,
    /// Action coverage
    pub actions: CoverageMetric,
    /// Names of visited states
    pub visited_states: Vec<String>,
    /// Exercised transitions as `STATE.action`
    pub exercised_transitions: Vec<String>,
    /// Names of invoked actions
    pub invoked_actions: Vec<String>,
    /// Successful transition executions, repeats included
    pub transitions_executed: u64,
}

impl CoverageReport {
    /// Fail unless transition coverage reaches `min_percent`
    pub fn assert_transition_coverage(&self, min_percent: f64) -> ModelResult<()> {
        let actual = self.transitions.percent();
        if actual >= min_percent {
            Ok(())
        } else {
            Err(ModelError::AssertionFailure {
                state: "-".to_string(),
                action: "coverage".to_string(),
                message: format!(
                    "transition coverage {actual:.1}% is below minimum {min_percent:.1}%"
                ),
            })
        }
    }

    /// Format as text summary
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Coverage Report\n\
            ===============\n\
            State Coverage:      {}\n\
            Transition Coverage: {}\n\
            Action Coverage:     {}\n\
            Transitions Run:     {}",
            self.states, self.transitions, self.actions, self.transitions_executed
        )
    }
}

impl fmt::Display for CoverageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn tracker() -> CoverageTracker<u8> {
        CoverageTracker::new(4, 9, 9)
    }

    #[test]
    fn test_metric_ratio() {
        assert_eq!(CoverageMetric::new(3, 4).ratio(), 0.75);
        assert_eq!(CoverageMetric::new(0, 0).ratio(), 1.0);
        assert!(CoverageMetric::new(4, 4).is_complete());
        assert!(!CoverageMetric::new(1, 4).is_complete());
        assert_eq!(CoverageMetric::new(1, 4).to_string(), "25.0% (1/4)");
    }

    #[test]
    fn test_start_counts_as_visit_not_arrival() {
        let mut t = tracker();
        t.record_start(0);
        assert!(t.visited(0));
        assert_eq!(t.arrivals(0), 0);
        assert_eq!(t.transition_coverage().covered, 0);
    }

    #[test]
    fn test_record_transition() {
        let mut t = tracker();
        t.record_start(0);
        t.record_transition(0, "clickArticle", 1);
        t.record_transition(1, "returnFromArticleToHome", 0);
        t.record_transition(0, "clickArticle", 1);

        assert_eq!(t.state_coverage(), CoverageMetric::new(2, 4));
        assert_eq!(t.transition_coverage(), CoverageMetric::new(2, 9));
        assert_eq!(t.action_coverage(), CoverageMetric::new(2, 9));
        assert_eq!(t.arrivals(1), 2);
        assert_eq!(t.arrivals(0), 1);
        assert_eq!(t.transition_hits(0, "clickArticle"), 2);
        assert_eq!(t.transition_hits(1, "clickArticle"), 0);
        assert_eq!(t.executed(), 3);
    }

    #[test]
    fn test_report_and_summary() {
        let mut t = tracker();
        t.record_start(0);
        t.record_transition(0, "search", 2);
        let report = t.report();
        assert_eq!(report.visited_states, vec!["0", "2"]);
        assert_eq!(report.exercised_transitions, vec!["0.search"]);
        assert_eq!(report.invoked_actions, vec!["search"]);
        assert_eq!(report.transitions_executed, 1);
        assert!(report.summary().contains("State Coverage:      50.0% (2/4)"));
        assert_eq!(
            t.summary(),
            "states 50% (2/4), transitions 11% (1/9), actions 11% (1/9)"
        );
    }

    #[test]
    fn test_assert_transition_coverage() {
        let mut t = tracker();
        t.record_transition(0, "search", 2);
        let report = t.report();
        assert!(report.assert_transition_coverage(10.0).is_ok());
        let err = report.assert_transition_coverage(50.0).unwrap_err();
        assert!(err.to_string().contains("below minimum"));
    }

    #[test]
    fn test_report_json_roundtrip() {
        let mut t = tracker();
        t.record_transition(0, "search", 2);
        let json = serde_json::to_string(&t.report()).unwrap();
        let back: CoverageReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t.report());
    }
}
