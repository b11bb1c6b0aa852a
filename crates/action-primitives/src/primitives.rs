//! Wait-act primitives implementation
//!
//! Every interaction with the page goes through one of these:
//! 1. await_visible / await_present - bounded poll until the element is actionable
//! 2. click - wait for visibility, then one click
//! 3. type_text - wait for visibility, then clear and type once
//! 4. is_visible - bounded probe that reports instead of failing
//! 5. read_text - wait for visibility, then read the element's text

mod click;
mod type_text;
mod wait;

pub use click::*;
pub use type_text::*;
pub use wait::*;

use async_trait::async_trait;
use checkout_core_types::{BrowsingContext, Driver, ElementHandle, ResolvedTarget};
use std::sync::Arc;

use crate::{errors::ActionError, types::ActionReport, waiting::WaitPolicy};

/// Wait-act primitives trait
///
/// Each operation waits for its target in the active browsing context under
/// the session's [`WaitPolicy`], performs at most one driver interaction and
/// logs its own outcome. Nothing here retries.
#[async_trait]
pub trait ActionPrimitives: Send + Sync {
    /// Wait until the target is displayed
    async fn await_visible(
        &self,
        target: &ResolvedTarget,
        context: &BrowsingContext,
    ) -> Result<ElementHandle, ActionError>;

    /// Wait until the target is attached, displayed or not
    async fn await_present(
        &self,
        target: &ResolvedTarget,
        context: &BrowsingContext,
    ) -> Result<ElementHandle, ActionError>;

    /// Wait for visibility, then click once
    async fn click(
        &self,
        target: &ResolvedTarget,
        context: &BrowsingContext,
    ) -> Result<ActionReport, ActionError>;

    /// Wait for visibility, then clear the field and type `text`
    async fn type_text(
        &self,
        target: &ResolvedTarget,
        context: &BrowsingContext,
        text: &str,
    ) -> Result<ActionReport, ActionError>;

    /// Bounded visibility probe; never fails
    async fn is_visible(&self, target: &ResolvedTarget, context: &BrowsingContext) -> bool;

    /// Wait for visibility, then return the element's text
    async fn read_text(
        &self,
        target: &ResolvedTarget,
        context: &BrowsingContext,
    ) -> Result<String, ActionError>;

    fn policy(&self) -> &WaitPolicy;
}

/// Default implementation of wait-act primitives
pub struct DefaultActionPrimitives {
    /// Browser driver collaborator
    driver: Arc<dyn Driver>,

    /// Wait window for every operation
    policy: WaitPolicy,
}

impl DefaultActionPrimitives {
    /// Create primitives with the default 15s wait window
    pub fn new(driver: Arc<dyn Driver>) -> Self {
        Self::with_policy(driver, WaitPolicy::default())
    }

    pub fn with_policy(driver: Arc<dyn Driver>, policy: WaitPolicy) -> Self {
        Self { driver, policy }
    }

    pub fn driver(&self) -> &Arc<dyn Driver> {
        &self.driver
    }
}

#[async_trait]
impl ActionPrimitives for DefaultActionPrimitives {
    async fn await_visible(
        &self,
        target: &ResolvedTarget,
        context: &BrowsingContext,
    ) -> Result<ElementHandle, ActionError> {
        execute_await(self, target, context, crate::waiting::Readiness::Visible).await
    }

    async fn await_present(
        &self,
        target: &ResolvedTarget,
        context: &BrowsingContext,
    ) -> Result<ElementHandle, ActionError> {
        execute_await(self, target, context, crate::waiting::Readiness::Present).await
    }

    async fn click(
        &self,
        target: &ResolvedTarget,
        context: &BrowsingContext,
    ) -> Result<ActionReport, ActionError> {
        execute_click(self, target, context).await
    }

    async fn type_text(
        &self,
        target: &ResolvedTarget,
        context: &BrowsingContext,
        text: &str,
    ) -> Result<ActionReport, ActionError> {
        execute_type_text(self, target, context, text).await
    }

    async fn is_visible(&self, target: &ResolvedTarget, context: &BrowsingContext) -> bool {
        execute_probe(self, target, context).await
    }

    async fn read_text(
        &self,
        target: &ResolvedTarget,
        context: &BrowsingContext,
    ) -> Result<String, ActionError> {
        execute_read_text(self, target, context).await
    }

    fn policy(&self) -> &WaitPolicy {
        &self.policy
    }
}
