//! Session wiring
//!
//! Builds the locator table once per run and hands each driver a session
//! bound to the configured wait policy.

use std::sync::Arc;

use action_flow::stages::required_targets;
use action_flow::{checkout_registry, CheckoutSession, FlowError};
use action_locator::{LocatorError, LocatorRegistry};
use checkout_core_types::{Driver, LogicalTarget, VariantTag};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::Config;

/// Built-in table with the configured overrides applied
pub fn build_registry(config: &Config) -> Result<Arc<LocatorRegistry>, LocatorError> {
    let registry = checkout_registry(config.locator_overrides.iter().cloned())?;
    debug!(
        targets = registry.len(),
        overrides = config.locator_overrides.len(),
        "Locator table built"
    );
    Ok(Arc::new(registry))
}

pub fn open_session(
    driver: Arc<dyn Driver>,
    registry: Arc<LocatorRegistry>,
    config: &Config,
    variant: VariantTag,
) -> Result<CheckoutSession, FlowError> {
    CheckoutSession::with_policy(driver, registry, variant, config.wait.clone())
}

/// Which targets a variant uses that the table cannot resolve
#[derive(Debug, Clone, Serialize)]
pub struct LocatorCoverage {
    pub variant: VariantTag,
    pub required: usize,
    pub unresolved: Vec<LogicalTarget>,
}

impl LocatorCoverage {
    pub fn check(registry: &LocatorRegistry, variant: VariantTag) -> Self {
        let required = required_targets(variant);
        let unresolved = registry.unresolved(&required, variant);
        info!(
            variant = %variant,
            required = required.len(),
            unresolved = unresolved.len(),
            "Locator coverage checked"
        );
        Self {
            variant,
            required: required.len(),
            unresolved,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}
