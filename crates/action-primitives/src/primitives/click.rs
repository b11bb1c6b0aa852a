//! Click primitive - wait for visibility, then click exactly once

use crate::{
    errors::ActionError,
    primitives::{wait::log_wait_failure, DefaultActionPrimitives},
    types::{ActionKind, ActionReport},
    waiting::{poll_until, Readiness},
};
use checkout_core_types::{BrowsingContext, ResolvedTarget};
use chrono::Utc;
use tokio::time::Instant;
use tracing::{debug, error, info};

/// Execute click primitive
///
/// Steps:
/// 1. Poll until the element is visible in the active context
/// 2. Issue one driver click
/// 3. Log the outcome and generate the action report
pub async fn execute_click(
    primitives: &DefaultActionPrimitives,
    target: &ResolvedTarget,
    context: &BrowsingContext,
) -> Result<ActionReport, ActionError> {
    let started_at = Utc::now();
    let start_instant = Instant::now();

    debug!(target = %target.target, context = %context, locator = %target.locator, "Executing click primitive");

    let ready = poll_until(
        primitives.driver().as_ref(),
        &primitives.policy,
        target,
        context,
        Readiness::Visible,
    )
    .await
    .map_err(|err| {
        log_wait_failure(target, context, &err);
        err
    })?;

    if let Err(cause) = primitives.driver().click(&ready.handle).await {
        error!(
            target = %target.target,
            context = %context,
            variant = %target.variant,
            locator = %target.locator,
            cause = %cause,
            "Click rejected by driver"
        );
        return Err(ActionError::ActionFailed {
            target: target.target.clone(),
            context: context.clone(),
            cause,
        });
    }

    let latency_ms = start_instant.elapsed().as_millis() as u64;
    info!(
        target = %target.target,
        context = %context,
        variant = %target.variant,
        latency_ms = latency_ms,
        "Click completed successfully"
    );

    Ok(ActionReport::success(
        ActionKind::Click,
        target.target.clone(),
        target.variant,
        context.clone(),
        started_at,
        latency_ms,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::ActionPrimitives;
    use checkout_core_types::stub::{DriverCall, StubDriver, StubElement};
    use checkout_core_types::{DriverError, LocatorExpression, LogicalTarget, VariantTag};
    use std::sync::Arc;
    use std::time::Duration;

    fn payment_button() -> (LocatorExpression, ResolvedTarget) {
        let locator = LocatorExpression::xpath("/html/body/div/div[1]/div/form/div[2]/div[2]/button");
        let target = ResolvedTarget::new(
            LogicalTarget::from_static("payment-button"),
            VariantTag::Mobile,
            locator.clone(),
        );
        (locator, target)
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_after_delayed_visibility() {
        let (locator, target) = payment_button();
        let driver = Arc::new(StubDriver::new().with_element(
            BrowsingContext::Top,
            locator.clone(),
            StubElement::visible_after(Duration::from_millis(250)),
        ));
        let primitives = DefaultActionPrimitives::new(driver.clone());

        let report = primitives.click(&target, &BrowsingContext::Top).await.unwrap();
        assert_eq!(report.kind, ActionKind::Click);
        assert_eq!(report.variant, VariantTag::Mobile);
        assert!(report.latency_ms >= 250);
        assert!(driver.clicked(&locator));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_click_is_not_retried() {
        let (locator, target) = payment_button();
        let driver = Arc::new(StubDriver::new().with_element(
            BrowsingContext::Top,
            locator.clone(),
            StubElement::visible(),
        ));
        driver.fail_clicks(
            BrowsingContext::Top,
            locator.clone(),
            DriverError::Obscured("div.overlay".into()),
        );
        let primitives = DefaultActionPrimitives::new(driver.clone());

        let err = primitives
            .click(&target, &BrowsingContext::Top)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ActionError::ActionFailed {
                target: LogicalTarget::from_static("payment-button"),
                context: BrowsingContext::Top,
                cause: DriverError::Obscured("div.overlay".into()),
            }
        );
        assert_eq!(driver.query_count(), 1);
        assert!(!driver
            .calls()
            .iter()
            .any(|call| matches!(call, DriverCall::Click { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_never_visible_does_not_click() {
        let (locator, target) = payment_button();
        let driver = Arc::new(StubDriver::new().with_element(
            BrowsingContext::Top,
            locator.clone(),
            StubElement::hidden(),
        ));
        let primitives = DefaultActionPrimitives::new(driver.clone());

        let err = primitives
            .click(&target, &BrowsingContext::Top)
            .await
            .unwrap_err();
        assert!(err.is_timeout());
        assert!(!driver.clicked(&locator));
    }
}
