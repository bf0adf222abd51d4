//! FSM test models.
//!
//! A model owns its current state and declares a table of guarded actions.
//! The table is the only description of the state machine: the graph builder
//! and the tester both read it, nothing else lists transitions.
//!
//! # Example
//!
//! ```
//! use navprobe::model::{ActionDef, FsmModel};
//! use navprobe::result::ModelResult;
//! use serde::Serialize;
//! use std::fmt;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
//! enum Door { Closed, Open }
//!
//! impl fmt::Display for Door {
//!     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
//!         write!(f, "{self:?}")
//!     }
//! }
//!
//! #[derive(Debug, Default)]
//! struct DoorModel { state: Option<Door> }
//!
//! impl FsmModel for DoorModel {
//!     type State = Door;
//!     const STATES: &'static [Door] = &[Door::Closed, Door::Open];
//!     const INITIAL: Door = Door::Closed;
//!
//!     fn actions() -> Vec<ActionDef<Self>> {
//!         vec![
//!             ActionDef::new("open", |s: Door| s == Door::Closed, Door::Open, |m: &mut Self| {
//!                 m.state = Some(Door::Open);
//!                 Ok(())
//!             }),
//!             ActionDef::new("close", |s: Door| s == Door::Open, Door::Closed, |m: &mut Self| {
//!                 m.state = Some(Door::Closed);
//!                 Ok(())
//!             }),
//!         ]
//!     }
//!
//!     fn state(&self) -> Door {
//!         self.state.unwrap_or(Self::INITIAL)
//!     }
//!
//!     fn reset(&mut self, _live: bool) -> ModelResult<()> {
//!         self.state = Some(Self::INITIAL);
//!         Ok(())
//!     }
//! }
//!
//! let mut door = DoorModel::default();
//! assert_eq!(door.fire_named("open").unwrap(), Door::Open);
//! assert!(door.fire_named("open").is_err());
//! ```

use crate::result::{DriverError, DriverResult, ModelError, ModelResult};
use serde::Serialize;
use std::fmt;
use std::hash::Hash;

/// Bounds every model state type satisfies
pub trait ModelState:
    Copy + Eq + Ord + Hash + fmt::Debug + fmt::Display + Serialize + 'static
{
}

impl<T> ModelState for T where
    T: Copy + Eq + Ord + Hash + fmt::Debug + fmt::Display + Serialize + 'static
{
}

/// Guard predicate over a state
pub type Guard<S> = fn(S) -> bool;

/// Action effect
pub type Effect<M> = fn(&mut M) -> ModelResult<()>;

/// One entry of a model's action table
pub struct ActionDef<M: FsmModel> {
    /// Unique action name
    pub name: &'static str,
    /// Legality predicate over the current state only
    pub guard: Guard<M::State>,
    /// State the effect lands in when it succeeds
    pub target: M::State,
    /// Side-effecting body
    pub effect: Effect<M>,
}

impl<M: FsmModel> ActionDef<M> {
    /// Declare an action
    #[must_use]
    pub const fn new(
        name: &'static str,
        guard: Guard<M::State>,
        target: M::State,
        effect: Effect<M>,
    ) -> Self {
        Self {
            name,
            guard,
            target,
            effect,
        }
    }

    /// Whether the guard holds in `state`
    #[must_use]
    pub fn enabled_in(&self, state: M::State) -> bool {
        (self.guard)(state)
    }
}

impl<M: FsmModel> Clone for ActionDef<M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: FsmModel> Copy for ActionDef<M> {}

impl<M: FsmModel> fmt::Debug for ActionDef<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDef")
            .field("name", &self.name)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

/// A finite-state test model
pub trait FsmModel: Sized {
    /// Enumerated state type
    type State: ModelState;

    /// Every state, in declaration order
    const STATES: &'static [Self::State];

    /// Designated initial state
    const INITIAL: Self::State;

    /// The action table
    fn actions() -> Vec<ActionDef<Self>>;

    /// Current state; an uninitialised model reports [`Self::INITIAL`]
    fn state(&self) -> Self::State;

    /// Return to the initial state, re-acquiring external resources when `live`
    fn reset(&mut self, live: bool) -> ModelResult<()>;

    /// Run `action` from the current state.
    ///
    /// Fails with [`ModelError::IllegalTransition`] and leaves the state alone
    /// when the guard is false. Returns the state reached.
    fn fire(&mut self, action: &ActionDef<Self>) -> ModelResult<Self::State> {
        let from = self.state();
        if !action.enabled_in(from) {
            return Err(ModelError::illegal(from, action.name));
        }
        (action.effect)(self)?;
        let reached = self.state();
        if reached != action.target {
            return Err(ModelError::DestinationMismatch {
                action: action.name.to_string(),
                expected: action.target.to_string(),
                actual: reached.to_string(),
            });
        }
        Ok(reached)
    }

    /// Look up an action by name and fire it
    fn fire_named(&mut self, name: &str) -> ModelResult<Self::State> {
        let action = Self::actions()
            .into_iter()
            .find(|a| a.name == name)
            .ok_or_else(|| ModelError::illegal(self.state(), name))?;
        self.fire(&action)
    }
}

/// The state and action an effect is executing, for error context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepContext {
    state: String,
    action: &'static str,
}

impl StepContext {
    /// Context for `action` starting in `state`
    #[must_use]
    pub fn new(state: impl fmt::Display, action: &'static str) -> Self {
        Self {
            state: state.to_string(),
            action,
        }
    }

    /// State the action started in
    #[must_use]
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Action name
    #[must_use]
    pub const fn action(&self) -> &'static str {
        self.action
    }

    /// Illegal transition error for this step
    #[must_use]
    pub fn illegal(&self) -> ModelError {
        ModelError::illegal(&self.state, self.action)
    }

    /// Assertion failure for this step
    #[must_use]
    pub fn fail(&self, message: impl Into<String>) -> ModelError {
        ModelError::AssertionFailure {
            state: self.state.clone(),
            action: self.action.to_string(),
            message: message.into(),
        }
    }

    /// Fail with `message` unless `condition` holds
    pub fn ensure(&self, condition: bool, message: &str) -> ModelResult<()> {
        if condition {
            Ok(())
        } else {
            Err(self.fail(message))
        }
    }

    /// Fail unless `expected == actual`
    pub fn ensure_eq<T>(&self, expected: &T, actual: &T, message: &str) -> ModelResult<()>
    where
        T: PartialEq + fmt::Debug + ?Sized,
    {
        if expected == actual {
            Ok(())
        } else {
            Err(self.fail(format!(
                "{message}: expected {expected:?}, got {actual:?}"
            )))
        }
    }

    /// Lift a driver error into this step.
    ///
    /// Timeouts stay timeouts; every other driver failure means the page did
    /// not look the way the action expected.
    #[must_use]
    pub fn driver(&self, err: DriverError) -> ModelError {
        match err {
            DriverError::Timeout { condition, ms } => ModelError::Timeout {
                state: self.state.clone(),
                action: self.action.to_string(),
                condition,
                ms,
            },
            other => self.fail(other.to_string()),
        }
    }
}

/// Attach step context to driver results
pub trait DriverResultExt<T> {
    /// Map the error through [`StepContext::driver`]
    fn in_step(self, ctx: &StepContext) -> ModelResult<T>;
}

impl<T> DriverResultExt<T> for DriverResult<T> {
    fn in_step(self, ctx: &StepContext) -> ModelResult<T> {
        self.map_err(|e| ctx.driver(e))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::result::FailureKind;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
    enum Light {
        Off,
        On,
        Broken,
    }

    impl fmt::Display for Light {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{self:?}")
        }
    }

    #[derive(Debug, Default)]
    struct LightModel {
        state: Option<Light>,
    }

    impl FsmModel for LightModel {
        type State = Light;
        const STATES: &'static [Light] = &[Light::Off, Light::On, Light::Broken];
        const INITIAL: Light = Light::Off;

        fn actions() -> Vec<ActionDef<Self>> {
            vec![
                ActionDef::new("switchOn", |s: Light| s == Light::Off, Light::On, |m: &mut Self| {
                    m.state = Some(Light::On);
                    Ok(())
                }),
                ActionDef::new("switchOff", |s: Light| s == Light::On, Light::Off, |m: &mut Self| {
                    m.state = Some(Light::Off);
                    Ok(())
                }),
                // lands somewhere other than declared
                ActionDef::new("flicker", |s: Light| s == Light::On, Light::Off, |m: &mut Self| {
                    m.state = Some(Light::Broken);
                    Ok(())
                }),
            ]
        }

        fn state(&self) -> Light {
            self.state.unwrap_or(Self::INITIAL)
        }

        fn reset(&mut self, _live: bool) -> ModelResult<()> {
            self.state = Some(Self::INITIAL);
            Ok(())
        }
    }

    #[test]
    fn test_uninitialised_model_reports_initial() {
        assert_eq!(LightModel::default().state(), Light::Off);
    }

    #[test]
    fn test_fire_follows_guard() {
        let mut m = LightModel::default();
        assert_eq!(m.fire_named("switchOn").unwrap(), Light::On);
        assert_eq!(m.fire_named("switchOff").unwrap(), Light::Off);
    }

    #[test]
    fn test_fire_rejects_disabled_action_without_moving() {
        let mut m = LightModel::default();
        let err = m.fire_named("switchOff").unwrap_err();
        assert_eq!(err, ModelError::illegal("Off", "switchOff"));
        assert_eq!(m.state(), Light::Off);
    }

    #[test]
    fn test_unknown_action_is_illegal() {
        let mut m = LightModel::default();
        assert_eq!(
            m.fire_named("explode").unwrap_err().kind(),
            FailureKind::IllegalTransition
        );
    }

    #[test]
    fn test_destination_mismatch_detected() {
        let mut m = LightModel::default();
        m.fire_named("switchOn").unwrap();
        let err = m.fire_named("flicker").unwrap_err();
        assert_eq!(err.kind(), FailureKind::DestinationMismatch);
        assert!(err.to_string().contains("Broken"));
    }

    #[test]
    fn test_reset_returns_to_initial() {
        let mut m = LightModel::default();
        m.fire_named("switchOn").unwrap();
        m.reset(false).unwrap();
        assert_eq!(m.state(), Light::Off);
    }

    #[test]
    fn test_action_def_debug_and_copy() {
        let actions = LightModel::actions();
        let copy = actions[0];
        assert_eq!(copy.name, "switchOn");
        assert!(format!("{copy:?}").contains("switchOn"));
        assert!(copy.enabled_in(Light::Off));
        assert!(!copy.enabled_in(Light::On));
    }

    #[test]
    fn test_step_context_maps_driver_errors() {
        let ctx = StepContext::new("HOMEPAGE", "clickArticle");
        let timeout = ctx.driver(DriverError::Timeout {
            condition: "presence of css:h1".into(),
            ms: 10,
        });
        assert_eq!(timeout.kind(), FailureKind::Timeout);

        let missing = ctx.driver(DriverError::not_found("css:h1"));
        assert_eq!(missing.kind(), FailureKind::AssertionFailure);
        assert!(missing.to_string().contains("css:h1"));
    }

    #[test]
    fn test_step_context_checks() {
        let ctx = StepContext::new("SEARCH_PAGE", "filterResults");
        assert!(ctx.ensure(true, "ok").is_ok());
        let err = ctx.ensure(false, "Filter should not add results").unwrap_err();
        assert!(err.to_string().contains("Filter should not add results"));

        assert!(ctx.ensure_eq("a", "a", "titles").is_ok());
        let err = ctx.ensure_eq("a", "b", "Article title should match").unwrap_err();
        assert!(err.to_string().contains("expected \"a\", got \"b\""));
        assert_eq!(ctx.illegal(), ModelError::illegal("SEARCH_PAGE", "filterResults"));
    }

    #[test]
    fn test_in_step_extension() {
        let ctx = StepContext::new("HOMEPAGE", "search");
        let ok: DriverResult<u8> = Ok(3);
        assert_eq!(ok.in_step(&ctx).unwrap(), 3);
        let err: DriverResult<u8> = Err(DriverError::SessionClosed);
        assert_eq!(err.in_step(&ctx).unwrap_err().kind(), FailureKind::AssertionFailure);
    }
}
