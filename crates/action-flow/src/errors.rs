//! Flow execution error types

use action_locator::LocatorError;
use action_primitives::ActionError;
use checkout_core_types::{BrowsingContext, DriverError};
use serde::Serialize;
use thiserror::Error;

use crate::types::Field;

/// Flow execution errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FlowError {
    /// Locator table has no expression for a target on the session's variant
    #[error(transparent)]
    Locator(#[from] LocatorError),

    /// Wait-act operation timed out or was rejected by the driver
    #[error(transparent)]
    Action(#[from] ActionError),

    /// Entering or leaving a browsing context failed, or a stage ran in the wrong one
    #[error("Context switch to {context} failed: {reason}")]
    ContextSwitch {
        context: BrowsingContext,
        reason: String,
    },

    /// Driver could not load the checkout page
    #[error("Navigation to {url} failed: {cause}")]
    Navigation {
        url: String,
        #[source]
        cause: DriverError,
    },

    /// A fill step had no value supplied
    #[error("No input supplied for {0}")]
    MissingInput(Field),
}

/// Failure classification callers branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    UnresolvedLocator,
    ElementNotReady,
    ActionFailed,
    ContextSwitch,
    Navigation,
    MissingInput,
}

impl FlowError {
    pub fn kind(&self) -> FailureKind {
        match self {
            FlowError::Locator(_) => FailureKind::UnresolvedLocator,
            FlowError::Action(ActionError::ElementNotReady { .. }) => FailureKind::ElementNotReady,
            FlowError::Action(ActionError::ActionFailed { .. }) => FailureKind::ActionFailed,
            FlowError::ContextSwitch { .. } => FailureKind::ContextSwitch,
            FlowError::Navigation { .. } => FailureKind::Navigation,
            FlowError::MissingInput(_) => FailureKind::MissingInput,
        }
    }

    /// Build a context switch failure
    pub fn context_switch(context: &BrowsingContext, reason: impl Into<String>) -> Self {
        FlowError::ContextSwitch {
            context: context.clone(),
            reason: reason.into(),
        }
    }
}
