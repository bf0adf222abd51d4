//! Transition graph construction and analysis.
//!
//! The graph is derived from a model's action table by evaluating every guard
//! against every declared state. Nothing is executed. Reachability, dead-end
//! and unused-action checks follow the usual model-checking treatment:
//! BFS from the initial state over the derived edges.

use crate::model::{ActionDef, FsmModel};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt::Write as _;

/// An outgoing edge of the transition graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge<S> {
    /// Position of the action in the model's table
    pub action_index: usize,
    /// Action name
    pub action: &'static str,
    /// Declared destination
    pub target: S,
}

/// Directed graph: states are nodes, enabled actions are edges
#[derive(Debug, Clone)]
pub struct TransitionGraph<S: Ord> {
    initial: S,
    states: Vec<S>,
    action_names: Vec<&'static str>,
    adjacency: BTreeMap<S, Vec<Edge<S>>>,
}

impl<S: crate::model::ModelState> TransitionGraph<S> {
    /// Build the graph for model type `M`
    #[must_use]
    pub fn build<M: FsmModel<State = S>>() -> Self {
        Self::from_actions(M::INITIAL, M::STATES, &M::actions())
    }

    /// Build the graph from an explicit action table
    #[must_use]
    pub fn from_actions<M: FsmModel<State = S>>(
        initial: S,
        states: &[S],
        actions: &[ActionDef<M>],
    ) -> Self {
        let mut adjacency: BTreeMap<S, Vec<Edge<S>>> =
            states.iter().map(|s| (*s, Vec::new())).collect();

        for (action_index, action) in actions.iter().enumerate() {
            for state in states {
                if action.enabled_in(*state) {
                    adjacency.entry(*state).or_default().push(Edge {
                        action_index,
                        action: action.name,
                        target: action.target,
                    });
                }
            }
        }

        // keep each state's edges in table order
        for edges in adjacency.values_mut() {
            edges.sort_by_key(|e| e.action_index);
        }

        tracing::debug!(
            states = states.len(),
            actions = actions.len(),
            "built transition graph"
        );

        Self {
            initial,
            states: states.to_vec(),
            action_names: actions.iter().map(|a| a.name).collect(),
            adjacency,
        }
    }

    /// Initial state
    #[must_use]
    pub const fn initial(&self) -> S {
        self.initial
    }

    /// Declared states, in declaration order
    #[must_use]
    pub fn states(&self) -> &[S] {
        &self.states
    }

    /// Declared action names, in table order
    #[must_use]
    pub fn action_names(&self) -> &[&'static str] {
        &self.action_names
    }

    /// Edges leaving `state`, in table order
    #[must_use]
    pub fn edges_from(&self, state: S) -> &[Edge<S>] {
        self.adjacency.get(&state).map(Vec::as_slice).unwrap_or_default()
    }

    /// All `(source, edge)` pairs
    pub fn edges(&self) -> impl Iterator<Item = (S, &Edge<S>)> + '_ {
        self.adjacency
            .iter()
            .flat_map(|(s, edges)| edges.iter().map(move |e| (*s, e)))
    }

    /// Number of edges
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    /// States reachable from the initial state
    #[must_use]
    pub fn reachable_states(&self) -> BTreeSet<S> {
        let mut reachable = BTreeSet::new();
        let mut queue = VecDeque::new();
        reachable.insert(self.initial);
        queue.push_back(self.initial);

        while let Some(current) = queue.pop_front() {
            for edge in self.edges_from(current) {
                if reachable.insert(edge.target) {
                    queue.push_back(edge.target);
                }
            }
        }
        reachable
    }

    /// Declared states that cannot be reached
    #[must_use]
    pub fn orphaned_states(&self) -> Vec<S> {
        let reachable = self.reachable_states();
        self.states
            .iter()
            .filter(|s| !reachable.contains(s))
            .copied()
            .collect()
    }

    /// States with no enabled action
    #[must_use]
    pub fn dead_ends(&self) -> Vec<S> {
        self.states
            .iter()
            .filter(|s| self.edges_from(**s).is_empty())
            .copied()
            .collect()
    }

    /// Actions whose guard holds in no state
    #[must_use]
    pub fn unused_actions(&self) -> Vec<&'static str> {
        let used: BTreeSet<&str> = self.edges().map(|(_, e)| e.action).collect();
        self.action_names
            .iter()
            .filter(|name| !used.contains(*name))
            .copied()
            .collect()
    }

    /// Run every structural check
    #[must_use]
    pub fn validate(&self) -> GraphValidation<S> {
        let mut issues = Vec::new();
        for state in self.orphaned_states() {
            issues.push(GraphIssue::OrphanedState { state });
        }
        for state in self.dead_ends() {
            issues.push(GraphIssue::DeadEndState { state });
        }
        for action in self.unused_actions() {
            issues.push(GraphIssue::UnusedAction { action });
        }
        for (state, edge) in self.edges() {
            if edge.target == state {
                issues.push(GraphIssue::SelfLoop {
                    state,
                    action: edge.action,
                });
            }
        }

        let is_valid = !issues.iter().any(|i| i.severity() == IssueSeverity::Error);
        GraphValidation { is_valid, issues }
    }

    /// Render the graph in Graphviz DOT format
    #[must_use]
    pub fn to_dot(&self) -> String {
        let mut dot = String::new();
        dot.push_str("digraph StateMachine {\n");
        dot.push_str("  rankdir=LR;\n");
        dot.push_str("  node [shape=ellipse];\n");
        let _ = writeln!(dot, "  __start [shape=point];\n  __start -> \"{}\";", self.initial);

        for state in &self.states {
            let _ = writeln!(dot, "  \"{state}\";");
        }
        for (source, edge) in self.edges() {
            let _ = writeln!(
                dot,
                "  \"{}\" -> \"{}\" [label=\"{}\"];",
                source, edge.target, edge.action
            );
        }

        dot.push_str("}\n");
        dot
    }

    /// Plain-text adjacency listing
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for state in &self.states {
            let marker = if *state == self.initial { " (initial)" } else { "" };
            let _ = writeln!(out, "{state}{marker}");
            for edge in self.edges_from(*state) {
                let _ = writeln!(out, "  --{}--> {}", edge.action, edge.target);
            }
        }
        out
    }
}

/// Structural problems found by [`TransitionGraph::validate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphIssue<S> {
    /// State is not reachable from the initial state
    OrphanedState { state: S },
    /// State has no enabled action; a run ends there
    DeadEndState { state: S },
    /// Action is enabled nowhere
    UnusedAction { action: &'static str },
    /// Action leads back to its own source
    SelfLoop { state: S, action: &'static str },
}

impl<S> GraphIssue<S> {
    /// Get the severity of this issue.
    pub const fn severity(&self) -> IssueSeverity {
        match self {
            Self::OrphanedState { .. } | Self::UnusedAction { .. } => IssueSeverity::Error,
            Self::DeadEndState { .. } => IssueSeverity::Warning,
            Self::SelfLoop { .. } => IssueSeverity::Info,
        }
    }
}

impl<S: std::fmt::Display> std::fmt::Display for GraphIssue<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OrphanedState { state } => write!(f, "state {state} is unreachable"),
            Self::DeadEndState { state } => write!(f, "state {state} has no enabled action"),
            Self::UnusedAction { action } => write!(f, "action {action} is never enabled"),
            Self::SelfLoop { state, action } => write!(f, "action {action} loops on {state}"),
        }
    }
}

/// Severity levels for graph issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IssueSeverity {
    Info,
    Warning,
    Error,
}

/// Result of graph validation.
#[derive(Debug, Clone)]
pub struct GraphValidation<S> {
    /// No error-severity issue was found
    pub is_valid: bool,
    /// Detected issues
    pub issues: Vec<GraphIssue<S>>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::result::ModelResult;
    use serde::Serialize;
    use std::fmt;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
    enum Step {
        Start,
        Middle,
        End,
        Orphan,
    }

    impl fmt::Display for Step {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{self:?}")
        }
    }

    #[derive(Debug)]
    struct Chain {
        state: Step,
    }

    fn go(m: &mut Chain, to: Step) -> ModelResult<()> {
        m.state = to;
        Ok(())
    }

    impl FsmModel for Chain {
        type State = Step;
        const STATES: &'static [Step] = &[Step::Start, Step::Middle, Step::End, Step::Orphan];
        const INITIAL: Step = Step::Start;

        fn actions() -> Vec<ActionDef<Self>> {
            vec![
                ActionDef::new("next", |s: Step| s == Step::Start, Step::Middle, |m| go(m, Step::Middle)),
                ActionDef::new("finish", |s: Step| s == Step::Middle, Step::End, |m| go(m, Step::End)),
                ActionDef::new("stay", |s: Step| s == Step::Middle, Step::Middle, |m| go(m, Step::Middle)),
                ActionDef::new("never", |_: Step| false, Step::Orphan, |m| go(m, Step::Orphan)),
                ActionDef::new("leave", |s: Step| s == Step::Orphan, Step::Start, |m| go(m, Step::Start)),
            ]
        }

        fn state(&self) -> Step {
            self.state
        }

        fn reset(&mut self, _live: bool) -> ModelResult<()> {
            self.state = Step::Start;
            Ok(())
        }
    }

    #[test]
    fn test_edges_follow_guards() {
        let graph = TransitionGraph::build::<Chain>();
        assert_eq!(graph.edge_count(), 4);
        let from_middle: Vec<&str> = graph.edges_from(Step::Middle).iter().map(|e| e.action).collect();
        assert_eq!(from_middle, vec!["finish", "stay"]);
        assert!(graph.edges_from(Step::End).is_empty());
        assert_eq!(graph.edges_from(Step::Start)[0].target, Step::Middle);
    }

    #[test]
    fn test_reachability() {
        let graph = TransitionGraph::build::<Chain>();
        let reachable = graph.reachable_states();
        assert!(reachable.contains(&Step::End));
        assert!(!reachable.contains(&Step::Orphan));
        assert_eq!(graph.orphaned_states(), vec![Step::Orphan]);
    }

    #[test]
    fn test_validate_reports_issues() {
        let graph = TransitionGraph::build::<Chain>();
        let result = graph.validate();
        assert!(!result.is_valid);
        assert!(result.issues.contains(&GraphIssue::OrphanedState { state: Step::Orphan }));
        assert!(result.issues.contains(&GraphIssue::DeadEndState { state: Step::End }));
        assert!(result.issues.contains(&GraphIssue::UnusedAction { action: "never" }));
        assert!(result.issues.contains(&GraphIssue::SelfLoop {
            state: Step::Middle,
            action: "stay"
        }));
        assert_eq!(
            GraphIssue::<Step>::UnusedAction { action: "never" }.to_string(),
            "action never is never enabled"
        );
    }

    #[test]
    fn test_dot_generation() {
        let graph = TransitionGraph::build::<Chain>();
        let dot = graph.to_dot();
        assert!(dot.contains("digraph StateMachine"));
        assert!(dot.contains("__start -> \"Start\""));
        assert!(dot.contains("\"Start\" -> \"Middle\" [label=\"next\"]"));
    }

    #[test]
    fn test_text_listing() {
        let graph = TransitionGraph::build::<Chain>();
        let text = graph.to_text();
        assert!(text.starts_with("Start (initial)\n  --next--> Middle\n"));
    }
}
