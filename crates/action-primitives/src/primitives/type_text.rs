//! Type text primitive - wait for visibility, clear the field, type once

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

/// Execute type_text primitive
///
/// Existing content is replaced, not appended to. Only the text length is
/// logged since fields carry customer data.
pub async fn execute_type_text(
    primitives: &DefaultActionPrimitives,
    target: &ResolvedTarget,
    context: &BrowsingContext,
    text: &str,
) -> Result<ActionReport, ActionError> {
    let started_at = Utc::now();
    let start_instant = Instant::now();
    let text_length = text.chars().count();

    debug!(target = %target.target, context = %context, text_length, "Executing type_text primitive");

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

    if let Err(cause) = primitives.driver().clear_and_type(&ready.handle, text).await {
        error!(
            target = %target.target,
            context = %context,
            variant = %target.variant,
            locator = %target.locator,
            text_length,
            cause = %cause,
            "Typing rejected by driver"
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
        text_length,
        latency_ms = latency_ms,
        "Text typed successfully"
    );

    Ok(ActionReport::success(
        ActionKind::TypeText,
        target.target.clone(),
        target.variant,
        context.clone(),
        started_at,
        latency_ms,
    ))
}
