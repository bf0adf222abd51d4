//! Result and error types for navprobe.
//!
//! Two layers: [`DriverError`] is what the page driver capability reports,
//! [`ModelError`] is what aborts a generated test run. Driver errors raised
//! inside an action are lifted into model errors with the state and action
//! that were executing (see [`crate::model::StepContext`]).

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type for page driver operations
pub type DriverResult<T> = Result<T, DriverError>;

/// Result type for model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors reported by a [`crate::driver::PageDriver`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    /// No element matched the locator
    #[error("Element not found: {locator}")]
    NotFound {
        /// Locator that matched nothing
        locator: String,
    },

    /// A wait condition did not hold within its bound
    #[error("Timed out after {ms}ms waiting for {condition}")]
    Timeout {
        /// Description of the awaited condition
        condition: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Click, typing or selection failed
    #[error("Interaction failed: {message}")]
    Interaction {
        /// Error message
        message: String,
    },

    /// Indexed lookup past the end of a result list
    #[error("Index {index} is out of bounds for {what} (found {len})")]
    IndexOutOfBounds {
        /// What was being indexed
        what: String,
        /// Requested index
        index: usize,
        /// Number of elements present
        len: usize,
    },

    /// Browser could not be started
    #[error("Failed to launch browser: {message}")]
    Launch {
        /// Error message
        message: String,
    },

    /// The driver session has already been closed
    #[error("Driver session is closed")]
    SessionClosed,
}

impl DriverError {
    /// Create a not-found error
    #[must_use]
    pub fn not_found(locator: impl fmt::Display) -> Self {
        Self::NotFound {
            locator: locator.to_string(),
        }
    }

    /// Create an interaction error
    #[must_use]
    pub fn interaction(message: impl Into<String>) -> Self {
        Self::Interaction {
            message: message.into(),
        }
    }

    /// Create a launch error
    #[must_use]
    pub fn launch(message: impl Into<String>) -> Self {
        Self::Launch {
            message: message.into(),
        }
    }
}

/// Errors that abort a test run.
///
/// Every variant is fatal to the run that raised it. The runner never retries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// The action's guard was false in the current state
    #[error("Illegal transition: cannot {action} from state {state}")]
    IllegalTransition {
        /// State the model was in
        state: String,
        /// Action that was attempted
        action: String,
    },

    /// A post-condition did not hold
    #[error("Assertion failed during {action} from {state}: {message}")]
    AssertionFailure {
        /// State the action started from
        state: String,
        /// Action being executed
        action: String,
        /// Failed check
        message: String,
    },

    /// An awaited page condition did not become true in time
    #[error("Timeout during {action} from {state}: {condition} not met within {ms}ms")]
    Timeout {
        /// State the action started from
        state: String,
        /// Action being executed
        action: String,
        /// Awaited condition
        condition: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// The external driver could not be (re)acquired
    #[error("Failed to initialize test environment: {message}")]
    ResourceInit {
        /// Error message
        message: String,
    },

    /// An effect left the model somewhere other than its declared destination
    #[error("Action {action} declared destination {expected} but reached {actual}")]
    DestinationMismatch {
        /// Action that ran
        action: String,
        /// Declared destination
        expected: String,
        /// State actually reached
        actual: String,
    },
}

impl ModelError {
    /// Create an illegal transition error
    #[must_use]
    pub fn illegal(state: impl fmt::Display, action: impl Into<String>) -> Self {
        Self::IllegalTransition {
            state: state.to_string(),
            action: action.into(),
        }
    }

    /// Create a resource initialisation error
    #[must_use]
    pub fn resource_init(message: impl Into<String>) -> Self {
        Self::ResourceInit {
            message: message.into(),
        }
    }

    /// Classify this error
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::IllegalTransition { .. } => FailureKind::IllegalTransition,
            Self::AssertionFailure { .. } => FailureKind::AssertionFailure,
            Self::Timeout { .. } => FailureKind::Timeout,
            Self::ResourceInit { .. } => FailureKind::ResourceInit,
            Self::DestinationMismatch { .. } => FailureKind::DestinationMismatch,
        }
    }

    /// Whether the error points at a bug in the model rather than the site
    #[must_use]
    pub const fn is_model_bug(&self) -> bool {
        matches!(
            self,
            Self::IllegalTransition { .. } | Self::DestinationMismatch { .. }
        )
    }
}

/// Failure categories, as reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Guard false at invocation
    IllegalTransition,
    /// Post-condition failed
    AssertionFailure,
    /// Awaited condition timed out
    Timeout,
    /// Driver acquisition failed
    ResourceInit,
    /// Effect reached an undeclared state
    DestinationMismatch,
}

impl FailureKind {
    /// Stable label for reports
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::IllegalTransition => "illegal-transition",
            Self::AssertionFailure => "assertion-failure",
            Self::Timeout => "timeout",
            Self::ResourceInit => "resource-init",
            Self::DestinationMismatch => "destination-mismatch",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
