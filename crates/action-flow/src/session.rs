//! Checkout session - per-session state machine over wait-act primitives

use action_locator::{LocatorError, LocatorRegistry, TargetResolver};
use action_primitives::{ActionPrimitives, DefaultActionPrimitives, WaitPolicy};
use checkout_core_types::{
    BrowsingContext, Driver, DriverError, LogicalTarget, ResolvedTarget, SessionId, VariantTag,
};
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::errors::FlowError;
use crate::stages;
use crate::targets::{BANK_SELECTION, PAYMENT_CONFIRMATION_TEXT, PAYMENT_FRAME, PAYMENT_IFRAME};
use crate::types::*;

/// One checkout run against one driver.
///
/// Owns its variant, active browsing context and coarse stage. Operations
/// take `&mut self`, so a session has a single thread of control; parallel
/// runs use separate sessions sharing only the immutable registry.
pub struct CheckoutSession {
    id: SessionId,
    variant: VariantTag,
    driver: Arc<dyn Driver>,
    registry: Arc<LocatorRegistry>,
    primitives: Arc<dyn ActionPrimitives>,
    context: BrowsingContext,
    stage: CheckoutStage,
}

impl CheckoutSession {
    /// Create a session with the default 15s wait window
    pub fn new(
        driver: Arc<dyn Driver>,
        registry: Arc<LocatorRegistry>,
        variant: VariantTag,
    ) -> Result<Self, FlowError> {
        Self::with_policy(driver, registry, variant, WaitPolicy::default())
    }

    pub fn with_policy(
        driver: Arc<dyn Driver>,
        registry: Arc<LocatorRegistry>,
        variant: VariantTag,
        policy: WaitPolicy,
    ) -> Result<Self, FlowError> {
        let primitives = Arc::new(DefaultActionPrimitives::with_policy(driver.clone(), policy));
        Self::with_primitives(driver, registry, variant, primitives)
    }

    /// Create a session over caller-supplied primitives.
    ///
    /// Fails with `Locator(Unresolved)` when the registry cannot resolve
    /// every target the variant uses.
    pub fn with_primitives(
        driver: Arc<dyn Driver>,
        registry: Arc<LocatorRegistry>,
        variant: VariantTag,
        primitives: Arc<dyn ActionPrimitives>,
    ) -> Result<Self, FlowError> {
        let gaps = registry.unresolved(&stages::required_targets(variant), variant);
        if let Some(first) = gaps.first() {
            let missing: Vec<&str> = gaps.iter().map(LogicalTarget::as_str).collect();
            error!(
                variant = %variant,
                missing = ?missing,
                "Locator table does not cover the session variant"
            );
            return Err(LocatorError::Unresolved {
                target: first.clone(),
                variant,
            }
            .into());
        }

        let id = SessionId::new();
        info!(session = %id, variant = %variant, "Checkout session created");
        Ok(Self {
            id,
            variant,
            driver,
            registry,
            primitives,
            context: BrowsingContext::Top,
            stage: CheckoutStage::Start,
        })
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn variant(&self) -> VariantTag {
        self.variant
    }

    /// Active browsing context
    pub fn context(&self) -> &BrowsingContext {
        &self.context
    }

    pub fn stage(&self) -> CheckoutStage {
        self.stage
    }

    fn resolve(&self, target: &LogicalTarget) -> Result<ResolvedTarget, FlowError> {
        Ok(self.registry.resolve_target(target, self.variant)?)
    }

    fn transition(&mut self, to: CheckoutStage) {
        if self.stage != to {
            info!(
                session = %self.id,
                from = %self.stage,
                to = %to,
                "Checkout stage transition"
            );
        }
        self.stage = to;
    }

    fn report(&self, stage: &'static str, steps: Vec<StepReport>, start: Instant) -> StageReport {
        StageReport {
            stage,
            context: self.context.clone(),
            reached: self.stage,
            steps,
            latency_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// Execute `stage` step by step in the active context.
    ///
    /// Fails before touching the page if the stage belongs to another context
    /// or a fill step has no input. A failing step aborts the stage; earlier
    /// steps stay applied. The coarse stage is left unchanged.
    pub async fn run(
        &mut self,
        stage: &FlowStage,
        inputs: &StageInputs,
    ) -> Result<StageReport, FlowError> {
        let start = Instant::now();

        if stage.context != self.context {
            error!(
                session = %self.id,
                stage = stage.name,
                required = %stage.context,
                active = %self.context,
                "Stage requires a different browsing context"
            );
            return Err(FlowError::context_switch(
                &stage.context,
                format!(
                    "stage '{}' runs in {} but {} is active",
                    stage.name, stage.context, self.context
                ),
            ));
        }
        for step in &stage.steps {
            if let StepAction::Fill(field) = step.action {
                if inputs.get(field).is_none() {
                    return Err(FlowError::MissingInput(field));
                }
            }
        }

        info!(
            session = %self.id,
            stage = stage.name,
            context = %self.context,
            variant = %self.variant,
            "Starting stage"
        );

        let mut steps = Vec::with_capacity(stage.steps.len());
        for step in &stage.steps {
            let target = self.resolve(&step.target)?;
            let step_start = Instant::now();
            match step.action {
                StepAction::Click => {
                    self.primitives.click(&target, &self.context).await?;
                }
                StepAction::Fill(field) => {
                    let value = inputs.get(field).ok_or(FlowError::MissingInput(field))?;
                    self.primitives.type_text(&target, &self.context, value).await?;
                }
            }
            steps.push(StepReport {
                target: step.target.clone(),
                action: step.action,
                latency_ms: step_start.elapsed().as_millis() as u64,
            });
        }

        debug!(session = %self.id, stage = stage.name, "Stage completed");
        Ok(self.report(stage.name, steps, start))
    }

    /// Load the checkout page; resets the session to the top document and `Start`
    pub async fn navigate(&mut self, url: &str) -> Result<StageReport, FlowError> {
        let start = Instant::now();
        info!(session = %self.id, url = url, "Navigating to checkout page");

        self.driver.navigate(url).await.map_err(|cause| {
            error!(session = %self.id, url = url, cause = %cause, "Navigation failed");
            FlowError::Navigation {
                url: url.to_string(),
                cause,
            }
        })?;

        self.context = BrowsingContext::Top;
        self.transition(CheckoutStage::Start);
        Ok(self.report("navigate", Vec::new(), start))
    }

    pub async fn complete_initial_steps(&mut self) -> Result<StageReport, FlowError> {
        let mut report = self.run(&stages::initial_steps(), &StageInputs::new()).await?;
        self.transition(CheckoutStage::InitialSteps);
        report.reached = self.stage;
        Ok(report)
    }

    pub async fn fill_customer_info(
        &mut self,
        name: &str,
        phone_number: &str,
    ) -> Result<StageReport, FlowError> {
        let inputs = StageInputs::new()
            .with(Field::CustomerName, name)
            .with(Field::PhoneNumber, phone_number);
        let mut report = self.run(&stages::customer_info(), &inputs).await?;
        self.transition(CheckoutStage::CustomerInfo);
        report.reached = self.stage;
        Ok(report)
    }

    /// Pick virtual account and press pay.
    ///
    /// Reaches `PaymentMethodSelected` only if the bank-selection follow-up
    /// shows up within the wait window. Otherwise the session keeps its stage
    /// and the caller decides what the page shows instead.
    pub async fn select_virtual_account_payment(&mut self) -> Result<StageReport, FlowError> {
        let mut report = self.run(&stages::payment_method(), &StageInputs::new()).await?;

        let follow_up = self.resolve(&BANK_SELECTION)?;
        if self.primitives.is_visible(&follow_up, &self.context).await {
            self.transition(CheckoutStage::PaymentMethodSelected);
        } else {
            warn!(
                session = %self.id,
                stage = %self.stage,
                "Bank selection did not appear; payment method not selected"
            );
        }
        report.reached = self.stage;
        Ok(report)
    }

    pub async fn select_bank(&mut self, bank: Bank) -> Result<StageReport, FlowError> {
        self.run(&stages::bank_selection(bank), &StageInputs::new())
            .await
    }

    /// Type holder and account number, then confirm the bank choice.
    ///
    /// A malformed account number still completes; validation text is for
    /// the caller to probe.
    pub async fn fill_refund_account(
        &mut self,
        holder: &str,
        account_number: &str,
    ) -> Result<StageReport, FlowError> {
        let inputs = StageInputs::new()
            .with(Field::RefundHolder, holder)
            .with(Field::RefundAccountNumber, account_number);
        let mut report = self.run(&stages::refund_account(), &inputs).await?;
        self.transition(CheckoutStage::RefundAccountEntered);
        report.reached = self.stage;
        Ok(report)
    }

    /// Enter the embedded payment document.
    ///
    /// Two phases: await the host element's presence in the top document,
    /// then make the frame active. Either failure is `ContextSwitch`.
    pub async fn switch_into_payment_context(&mut self) -> Result<StageReport, FlowError> {
        let start = Instant::now();
        let frame = BrowsingContext::embedded(PAYMENT_FRAME);
        if self.context == frame {
            debug!(session = %self.id, context = %frame, "Already inside payment document");
            return Ok(self.report("switch_into_payment_context", Vec::new(), start));
        }
        if !self.context.is_top() {
            return Err(FlowError::context_switch(
                &frame,
                format!("can only be entered from the top document, {} is active", self.context),
            ));
        }

        let host = self.resolve(&PAYMENT_IFRAME)?;
        self.primitives
            .await_present(&host, &self.context)
            .await
            .map_err(|err| {
                error!(session = %self.id, context = %frame, error = %err, "Payment document host not present");
                FlowError::context_switch(&frame, err.to_string())
            })?;
        self.driver.switch_context(&frame).await.map_err(|cause| {
            error!(session = %self.id, context = %frame, cause = %cause, "Driver refused context switch");
            FlowError::context_switch(&frame, cause.to_string())
        })?;

        self.context = frame;
        info!(session = %self.id, context = %self.context, "Switched into payment document");
        self.transition(CheckoutStage::EmbeddedContext);
        Ok(self.report("switch_into_payment_context", Vec::new(), start))
    }

    /// Return to the top document; the coarse stage is unchanged
    pub async fn switch_to_top(&mut self) -> Result<StageReport, FlowError> {
        let start = Instant::now();
        if self.context.is_top() {
            return Ok(self.report("switch_to_top", Vec::new(), start));
        }

        let top = BrowsingContext::Top;
        self.driver.switch_context(&top).await.map_err(|cause| {
            error!(session = %self.id, from = %self.context, cause = %cause, "Could not leave embedded document");
            FlowError::context_switch(&top, cause.to_string())
        })?;

        info!(session = %self.id, from = %self.context, "Switched to top document");
        self.context = top;
        Ok(self.report("switch_to_top", Vec::new(), start))
    }

    /// Click the bank in the final bank list.
    ///
    /// Desktop renders the list inside the payment document, so the session
    /// must have switched into it first.
    pub async fn select_final_bank(&mut self, bank: Bank) -> Result<StageReport, FlowError> {
        let mut report = self
            .run(&stages::final_bank(bank, self.variant), &StageInputs::new())
            .await?;
        self.transition(CheckoutStage::Confirming);
        report.reached = self.stage;
        Ok(report)
    }

    /// Receipt opt-outs, privacy agreement, confirm, dismiss; in that order
    pub async fn confirm_payment(&mut self) -> Result<StageReport, FlowError> {
        let mut report = self
            .run(&stages::confirmation(self.variant), &StageInputs::new())
            .await?;
        self.transition(CheckoutStage::Confirmed);
        report.reached = self.stage;
        Ok(report)
    }

    /// Back to the payment-method screen; asserting the heading is up to the caller
    pub async fn go_back(&mut self) -> Result<StageReport, FlowError> {
        self.run(&stages::go_back(), &StageInputs::new()).await
    }

    pub async fn open_request_memo(&mut self) -> Result<StageReport, FlowError> {
        self.run(&stages::open_request_memo(), &StageInputs::new())
            .await
    }

    pub async fn fill_request_memo(&mut self, text: &str) -> Result<StageReport, FlowError> {
        let inputs = StageInputs::new().with(Field::RequestMemo, text);
        self.run(&stages::fill_request_memo(), &inputs).await
    }

    pub async fn save_request_memo(&mut self) -> Result<StageReport, FlowError> {
        self.run(&stages::save_request_memo(), &StageInputs::new())
            .await
    }

    /// Probe for the deposit summary in the active context
    pub async fn is_payment_confirmed(&self) -> Result<bool, FlowError> {
        let confirmed = self.is_visible(&PAYMENT_CONFIRMATION_TEXT).await?;
        info!(session = %self.id, confirmed, "Payment confirmation status");
        Ok(confirmed)
    }

    /// Bounded visibility probe; only a locator gap fails it
    pub async fn is_visible(&self, target: &LogicalTarget) -> Result<bool, FlowError> {
        let resolved = self.resolve(target)?;
        Ok(self.primitives.is_visible(&resolved, &self.context).await)
    }

    pub async fn read_text(&self, target: &LogicalTarget) -> Result<String, FlowError> {
        let resolved = self.resolve(target)?;
        Ok(self.primitives.read_text(&resolved, &self.context).await?)
    }

    /// Run the full checkout for the session's variant
    pub async fn complete_checkout(
        &mut self,
        url: &str,
        input: &CheckoutInput,
    ) -> Result<FlowReport, FlowError> {
        if stages::uses_embedded_payment(self.variant) {
            self.complete_desktop_checkout(url, input).await
        } else {
            self.complete_mobile_checkout(url, input).await
        }
    }

    /// Desktop sequence: confirmation happens inside the payment document,
    /// then the session returns to the top document for the completion heading
    pub async fn complete_desktop_checkout(
        &mut self,
        url: &str,
        input: &CheckoutInput,
    ) -> Result<FlowReport, FlowError> {
        let start = Instant::now();
        let mut reports = self.checkout_until_refund(url, input).await?;
        reports.push(self.switch_into_payment_context().await?);
        reports.push(self.select_final_bank(input.bank).await?);
        reports.push(self.confirm_payment().await?);
        reports.push(self.switch_to_top().await?);
        Ok(self.flow_report(reports, start))
    }

    /// Mobile sequence: everything stays in the top document
    pub async fn complete_mobile_checkout(
        &mut self,
        url: &str,
        input: &CheckoutInput,
    ) -> Result<FlowReport, FlowError> {
        let start = Instant::now();
        let mut reports = self.checkout_until_refund(url, input).await?;
        reports.push(self.select_final_bank(input.bank).await?);
        reports.push(self.confirm_payment().await?);
        Ok(self.flow_report(reports, start))
    }

    async fn checkout_until_refund(
        &mut self,
        url: &str,
        input: &CheckoutInput,
    ) -> Result<Vec<StageReport>, FlowError> {
        Ok(vec![
            self.navigate(url).await?,
            self.complete_initial_steps().await?,
            self.fill_customer_info(&input.customer_name, &input.phone_number)
                .await?,
            self.select_virtual_account_payment().await?,
            self.select_bank(input.bank).await?,
            self.fill_refund_account(&input.refund_holder, &input.refund_account_number)
                .await?,
        ])
    }

    fn flow_report(&self, stages: Vec<StageReport>, start: Instant) -> FlowReport {
        let report = FlowReport {
            session: self.id.clone(),
            variant: self.variant,
            stages,
            final_stage: self.stage,
            latency_ms: start.elapsed().as_millis() as u64,
        };
        info!(
            session = %self.id,
            variant = %self.variant,
            final_stage = %report.final_stage,
            latency_ms = report.latency_ms,
            "Checkout flow finished"
        );
        report
    }

    /// Tear the session down and quit the driver
    pub async fn close(self) -> Result<(), DriverError> {
        info!(session = %self.id, stage = %self.stage, "Closing checkout session");
        self.driver.quit().await
    }
}

#[cfg(test)]
mod tests;
