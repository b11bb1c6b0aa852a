//! Bounded polling shared by every wait-act operation

use crate::errors::ActionError;
use checkout_core_types::{BrowsingContext, Driver, ElementHandle, ElementState, ResolvedTarget};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::{sleep, timeout_at, Instant};
use tracing::debug;

/// Wait window and poll cadence, shared by all operations of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitPolicy {
    /// Wait window in milliseconds
    pub timeout_ms: u64,

    /// First poll interval (milliseconds); doubles after every miss
    pub poll_interval_ms: u64,

    /// Upper bound for the poll interval (milliseconds)
    pub max_poll_interval_ms: u64,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            timeout_ms: 15_000,
            poll_interval_ms: 100,
            max_poll_interval_ms: 1_000,
        }
    }
}

impl WaitPolicy {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn max_poll_interval(&self) -> Duration {
        Duration::from_millis(self.max_poll_interval_ms.max(self.poll_interval_ms).max(1))
    }
}

/// Element condition a wait is satisfied by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Attached to the document, displayed or not
    Present,
    /// Attached and displayed
    Visible,
}

impl Readiness {
    fn satisfied_by(&self, state: &ElementState) -> bool {
        let ready = match self {
            Readiness::Present => state.present,
            Readiness::Visible => state.present && state.visible,
        };
        ready && state.handle.is_some()
    }
}

/// Element that satisfied a wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyElement {
    pub handle: ElementHandle,
    pub text: Option<String>,
}

/// Poll `target` in the active context until `readiness` holds or `policy` expires.
///
/// Missing and stale elements keep the loop going; any other driver error
/// ends it immediately. The caller owns outcome logging.
pub async fn poll_until(
    driver: &dyn Driver,
    policy: &WaitPolicy,
    target: &ResolvedTarget,
    context: &BrowsingContext,
    readiness: Readiness,
) -> Result<ReadyElement, ActionError> {
    let started = Instant::now();
    let deadline = started + policy.timeout();
    let mut interval = policy.poll_interval();
    let not_ready = |now: Instant| ActionError::ElementNotReady {
        target: target.target.clone(),
        context: context.clone(),
        timeout_ms: policy.timeout_ms,
        elapsed_ms: now.duration_since(started).as_millis() as u64,
    };

    loop {
        match timeout_at(deadline, driver.query(&target.locator)).await {
            Ok(Ok(state)) => {
                if readiness.satisfied_by(&state) {
                    if let Some(handle) = state.handle {
                        return Ok(ReadyElement {
                            handle,
                            text: state.text,
                        });
                    }
                }
                debug!(
                    target = %target.target,
                    present = state.present,
                    visible = state.visible,
                    "Element not ready yet"
                );
            }
            Ok(Err(err)) if err.is_transient() => {
                debug!(target = %target.target, error = %err, "Transient driver error while waiting");
            }
            Ok(Err(cause)) => {
                return Err(ActionError::ActionFailed {
                    target: target.target.clone(),
                    context: context.clone(),
                    cause,
                })
            }
            Err(_) => return Err(not_ready(Instant::now())),
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(not_ready(now));
        }
        sleep(interval.min(deadline - now)).await;
        interval = (interval * 2).min(policy.max_poll_interval());
    }
}
