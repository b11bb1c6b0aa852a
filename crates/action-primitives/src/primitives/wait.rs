//! Wait primitives - bounded waits and non-throwing probes

use crate::{
    errors::ActionError,
    primitives::DefaultActionPrimitives,
    waiting::{poll_until, Readiness},
};
use checkout_core_types::{BrowsingContext, ElementHandle, ResolvedTarget};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Wait until `target` satisfies `readiness` in `context`
pub async fn execute_await(
    primitives: &DefaultActionPrimitives,
    target: &ResolvedTarget,
    context: &BrowsingContext,
    readiness: Readiness,
) -> Result<ElementHandle, ActionError> {
    let start = Instant::now();
    debug!(target = %target.target, context = %context, readiness = ?readiness, "Awaiting element");

    match poll_until(
        primitives.driver().as_ref(),
        &primitives.policy,
        target,
        context,
        readiness,
    )
    .await
    {
        Ok(ready) => {
            info!(
                target = %target.target,
                context = %context,
                variant = %target.variant,
                readiness = ?readiness,
                latency_ms = start.elapsed().as_millis() as u64,
                "Element ready"
            );
            Ok(ready.handle)
        }
        Err(err) => {
            log_wait_failure(target, context, &err);
            Err(err)
        }
    }
}

/// Probe visibility without failing; expiry and driver errors both read as `false`
pub async fn execute_probe(
    primitives: &DefaultActionPrimitives,
    target: &ResolvedTarget,
    context: &BrowsingContext,
) -> bool {
    let start = Instant::now();
    let result = poll_until(
        primitives.driver().as_ref(),
        &primitives.policy,
        target,
        context,
        Readiness::Visible,
    )
    .await;
    let latency_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(_) => {
            info!(
                target = %target.target,
                context = %context,
                variant = %target.variant,
                latency_ms = latency_ms,
                "Probe found element visible"
            );
            true
        }
        Err(err) => {
            warn!(
                target = %target.target,
                context = %context,
                variant = %target.variant,
                locator = %target.locator,
                latency_ms = latency_ms,
                error = %err,
                "Probe did not find element visible"
            );
            false
        }
    }
}

/// Wait for visibility and return the element's text (empty when it has none)
pub async fn execute_read_text(
    primitives: &DefaultActionPrimitives,
    target: &ResolvedTarget,
    context: &BrowsingContext,
) -> Result<String, ActionError> {
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

    let text = ready.text.unwrap_or_default();
    info!(
        target = %target.target,
        context = %context,
        text_length = text.chars().count(),
        "Read element text"
    );
    Ok(text)
}

pub(crate) fn log_wait_failure(target: &ResolvedTarget, context: &BrowsingContext, err: &ActionError) {
    match err {
        ActionError::ElementNotReady {
            timeout_ms,
            elapsed_ms,
            ..
        } => error!(
            target = %target.target,
            context = %context,
            variant = %target.variant,
            locator = %target.locator,
            timeout_ms = *timeout_ms,
            elapsed_ms = *elapsed_ms,
            "Element not ready within wait window"
        ),
        ActionError::ActionFailed { cause, .. } => error!(
            target = %target.target,
            context = %context,
            variant = %target.variant,
            locator = %target.locator,
            cause = %cause,
            "Driver failed while waiting for element"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::ActionPrimitives;
    use crate::waiting::WaitPolicy;
    use checkout_core_types::stub::{StubDriver, StubElement};
    use checkout_core_types::{LocatorExpression, LogicalTarget, VariantTag};
    use std::collections::BTreeMap;
    use std::fmt;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tracing::field::{Field, Visit};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
    use tracing_subscriber::Registry;

    fn resolved(name: &'static str, locator: LocatorExpression) -> ResolvedTarget {
        ResolvedTarget::new(LogicalTarget::from_static(name), VariantTag::Desktop, locator)
    }

    #[tokio::test(start_paused = true)]
    async fn test_await_visible_succeeds_once_displayed() {
        let locator = LocatorExpression::id("button-1");
        let driver = Arc::new(StubDriver::new().with_element(
            BrowsingContext::Top,
            locator.clone(),
            StubElement::visible_after(Duration::from_secs(3)),
        ));
        let primitives = DefaultActionPrimitives::new(driver.clone());
        let target = resolved("initial-button", locator);

        let start = Instant::now();
        let handle = primitives
            .await_visible(&target, &BrowsingContext::Top)
            .await
            .unwrap();
        assert!(handle.0.starts_with("stub-"));
        assert!(start.elapsed() >= Duration::from_secs(3));
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[derive(Default)]
    struct Fields(BTreeMap<String, String>);

    impl Visit for Fields {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.0.insert(field.name().to_string(), format!("{:?}", value));
        }
    }

    /// Collects (level, fields) for every event on the current thread
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<(Level, BTreeMap<String, String>)>>>);

    impl<S: Subscriber> Layer<S> for Captured {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut fields = Fields::default();
            event.record(&mut fields);
            self.0.lock().unwrap().push((*event.metadata().level(), fields.0));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_await_success_logged_with_context() {
        let captured = Captured::default();
        let _guard = tracing::subscriber::set_default(Registry::default().with(captured.clone()));

        let locator = LocatorExpression::id("button-1");
        let driver = Arc::new(StubDriver::new().with_element(
            BrowsingContext::Top,
            locator.clone(),
            StubElement::visible(),
        ));
        let primitives = DefaultActionPrimitives::new(driver);
        let target = resolved("initial-button", locator);
        primitives
            .await_present(&target, &BrowsingContext::Top)
            .await
            .unwrap();

        let events = captured.0.lock().unwrap();
        let (level, fields) = events
            .iter()
            .find(|(_, fields)| fields.get("message").map(String::as_str) == Some("Element ready"))
            .expect("readiness event");
        assert_eq!(*level, Level::INFO);
        assert_eq!(fields["target"], "initial-button");
        assert_eq!(fields["context"], BrowsingContext::Top.to_string());
        assert_eq!(fields["variant"], VariantTag::Desktop.to_string());
        assert!(fields.contains_key("latency_ms"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_await_visible_times_out_at_window() {
        let target = resolved("missing-button", LocatorExpression::id("missing"));
        let primitives = DefaultActionPrimitives::new(Arc::new(StubDriver::new()));

        let err = primitives
            .await_visible(&target, &BrowsingContext::Top)
            .await
            .unwrap_err();
        match err {
            ActionError::ElementNotReady {
                target: name,
                timeout_ms,
                elapsed_ms,
                ..
            } => {
                assert_eq!(name, LogicalTarget::from_static("missing-button"));
                assert_eq!(timeout_ms, 15_000);
                assert!(elapsed_ms >= 15_000);
                assert!(elapsed_ms < 15_100);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_interval_backs_off() {
        let driver = Arc::new(StubDriver::new());
        let primitives = DefaultActionPrimitives::new(driver.clone());
        let target = resolved("missing-button", LocatorExpression::id("missing"));

        let _ = primitives.await_visible(&target, &BrowsingContext::Top).await;

        // 100+200+400+800 ms, then one query per second until the window closes
        let queries = driver.query_count();
        assert!(queries >= 15, "too few polls: {queries}");
        assert!(queries <= 20, "too many polls: {queries}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_await_present_accepts_hidden_element() {
        let locator = LocatorExpression::id("___tosspayments_iframe___");
        let driver = Arc::new(StubDriver::new().with_element(
            BrowsingContext::Top,
            locator.clone(),
            StubElement::hidden(),
        ));
        let primitives = DefaultActionPrimitives::with_policy(
            driver,
            WaitPolicy::default().with_timeout(Duration::from_secs(1)),
        );
        let target = resolved("payment-iframe", locator);

        assert!(primitives
            .await_present(&target, &BrowsingContext::Top)
            .await
            .is_ok());
        assert!(primitives
            .await_visible(&target, &BrowsingContext::Top)
            .await
            .unwrap_err()
            .is_timeout());
    }

    #[tokio::test(start_paused = true)]
    async fn test_is_visible_reports_false_without_error() {
        let primitives = DefaultActionPrimitives::with_policy(
            Arc::new(StubDriver::new()),
            WaitPolicy::default().with_timeout(Duration::from_secs(2)),
        );
        let target = resolved("completion-heading", LocatorExpression::xpath("//h1"));

        let start = Instant::now();
        assert!(!primitives.is_visible(&target, &BrowsingContext::Top).await);
        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_text() {
        let locator = LocatorExpression::text("요청사항을 저장했어요");
        let driver = Arc::new(StubDriver::new().with_element(
            BrowsingContext::Top,
            locator.clone(),
            StubElement::visible().with_text("요청사항을 저장했어요."),
        ));
        let primitives = DefaultActionPrimitives::new(driver);
        let target = resolved("memo-saved-toast", locator);

        let text = primitives
            .read_text(&target, &BrowsingContext::Top)
            .await
            .unwrap();
        assert_eq!(text, "요청사항을 저장했어요.");
    }
}
