//! Run listeners.
//!
//! Listeners observe a generated run without influencing it. The tester calls
//! them synchronously, in registration order.

use crate::model::ModelState;
use crate::tester::{RunOutcome, StepFailure, StepRecord};
use std::fmt;

/// Observer of test generation events
pub trait RunListener<S: ModelState> {
    /// Called after the model was reset to its initial state
    fn on_reset(&mut self, _run_id: &str, _initial: S) {}

    /// Called after every successful step
    fn on_step(&mut self, step: &StepRecord<S>);

    /// Called when a step fails; the run stops afterwards
    fn on_failure(&mut self, _failure: &StepFailure) {}

    /// Called once the run has stopped
    fn on_finish(&mut self, _outcome: &RunOutcome) {}
}

/// Logs every event through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct VerboseListener;

impl VerboseListener {
    /// Create a new verbose listener
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl<S: ModelState> RunListener<S> for VerboseListener {
    fn on_reset(&mut self, run_id: &str, initial: S) {
        tracing::info!(run_id, %initial, "model reset");
    }

    fn on_step(&mut self, step: &StepRecord<S>) {
        tracing::info!(
            step = step.index,
            from = %step.from,
            action = step.action,
            to = %step.to,
            "done ({}, {}, {})",
            step.from,
            step.action,
            step.to
        );
    }

    fn on_failure(&mut self, failure: &StepFailure) {
        tracing::warn!(
            state = %failure.state,
            action = %failure.action,
            kind = %failure.kind,
            "FAILURE: {}",
            failure.error
        );
    }

    fn on_finish(&mut self, outcome: &RunOutcome) {
        tracing::info!(%outcome, "run finished");
    }
}

/// Closure-based listener for successful steps
pub struct FnListener<F> {
    handler: F,
}

impl<F> fmt::Debug for FnListener<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnListener").finish_non_exhaustive()
    }
}

impl<F> FnListener<F> {
    /// Create a listener calling `handler` on every step
    #[must_use]
    pub const fn new(handler: F) -> Self {
        Self { handler }
    }
}

impl<S, F> RunListener<S> for FnListener<F>
where
    S: ModelState,
    F: FnMut(&StepRecord<S>),
{
    fn on_step(&mut self, step: &StepRecord<S>) {
        (self.handler)(step);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::result::ModelError;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn step(index: usize) -> StepRecord<u8> {
        StepRecord {
            index,
            from: 0,
            action: "go",
            to: 1,
        }
    }

    #[test]
    fn test_fn_listener_sees_steps() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut listener = FnListener::new(move |s: &StepRecord<u8>| sink.borrow_mut().push(s.index));
        listener.on_step(&step(1));
        listener.on_step(&step(2));
        RunListener::<u8>::on_finish(&mut listener, &RunOutcome::Completed);
        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_verbose_listener_accepts_all_events() {
        let mut listener = VerboseListener::new();
        RunListener::<u8>::on_reset(&mut listener, "run", 0);
        listener.on_step(&step(1));
        let failure = StepFailure::new(1, "go", ModelError::illegal(1, "go"));
        RunListener::<u8>::on_failure(&mut listener, &failure);
        RunListener::<u8>::on_finish(&mut listener, &RunOutcome::Failed(failure));
    }
}
