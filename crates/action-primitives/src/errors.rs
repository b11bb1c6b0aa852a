//! Error types for wait-act primitives

use checkout_core_types::{BrowsingContext, DriverError, LogicalTarget};
use thiserror::Error;

/// Failures surfaced by wait-act operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// Target did not become actionable within the wait window
    #[error("Element '{target}' not ready in {context} after {elapsed_ms}ms (timeout {timeout_ms}ms)")]
    ElementNotReady {
        target: LogicalTarget,
        context: BrowsingContext,
        timeout_ms: u64,
        elapsed_ms: u64,
    },

    /// Target was ready but the driver rejected the interaction
    #[error("Action on '{target}' in {context} failed: {cause}")]
    ActionFailed {
        target: LogicalTarget,
        context: BrowsingContext,
        #[source]
        cause: DriverError,
    },
}

impl ActionError {
    pub fn target(&self) -> &LogicalTarget {
        match self {
            ActionError::ElementNotReady { target, .. } | ActionError::ActionFailed { target, .. } => {
                target
            }
        }
    }

    pub fn context(&self) -> &BrowsingContext {
        match self {
            ActionError::ElementNotReady { context, .. }
            | ActionError::ActionFailed { context, .. } => context,
        }
    }

    /// Check if this error is a wait-window expiry
    pub fn is_timeout(&self) -> bool {
        matches!(self, ActionError::ElementNotReady { .. })
    }
}
