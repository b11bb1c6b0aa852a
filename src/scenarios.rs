//! Checkout scenarios
//!
//! Each scenario drives a session through part of the checkout and then
//! decides pass/fail from what the page shows. The orchestrator never
//! asserts on outcomes; this module is the only place that does.

use std::fmt;
use std::str::FromStr;

use action_flow::targets::{
    COMPLETION_HEADING, CUSTOMER_INFO_ERROR, MEMO_SAVED_TOAST, PAYMENT_HEADING,
    REFUND_ACCOUNT_ERROR,
};
use action_flow::{CheckoutInput, CheckoutSession, FailureKind, FlowError};
use checkout_core_types::{LogicalTarget, VariantTag};
use serde::Serialize;
use tokio::time::Instant;
use tracing::{error, info, warn};

pub const INVALID_CUSTOMER_NAME: &str = "test";
pub const INVALID_PHONE_NUMBER: &str = "123-1234-2454";
pub const INVALID_REFUND_ACCOUNT: &str = "2";

pub const MEMO_SAVED_MESSAGE: &str = "요청사항을 저장했어요.";
pub const REFUND_ACCOUNT_ERROR_MESSAGE: &str = "존재하지 않는 계좌이거나, 본인의 계좌가 아닙니다.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Scenario {
    /// Full virtual-account checkout ending on the completion heading
    VirtualAccountPayment,
    /// Malformed customer details are flagged when paying
    InvalidCustomerInfo,
    /// Request memo is saved with a confirmation toast
    RequestMemo,
    /// An unknown refund account is rejected
    InvalidRefundAccount,
    /// Going back from the refund form returns to the payment screen
    BackToPayment,
}

impl Scenario {
    pub const ALL: [Scenario; 5] = [
        Scenario::VirtualAccountPayment,
        Scenario::InvalidCustomerInfo,
        Scenario::RequestMemo,
        Scenario::InvalidRefundAccount,
        Scenario::BackToPayment,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::VirtualAccountPayment => "virtual-account-payment",
            Scenario::InvalidCustomerInfo => "invalid-customer-info",
            Scenario::RequestMemo => "request-memo",
            Scenario::InvalidRefundAccount => "invalid-refund-account",
            Scenario::BackToPayment => "back-to-payment",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Scenario::VirtualAccountPayment => {
                "Pay by virtual account and reach the issuance completion page"
            }
            Scenario::InvalidCustomerInfo => {
                "Submit malformed customer details and expect a validation message"
            }
            Scenario::RequestMemo => "Save a request memo and expect the saved toast",
            Scenario::InvalidRefundAccount => {
                "Enter an unknown refund account and expect the account error"
            }
            Scenario::BackToPayment => "Go back from the refund form to the payment screen",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Scenario::ALL
            .into_iter()
            .find(|scenario| scenario.name() == wanted)
            .ok_or_else(|| format!("unknown scenario '{}'", s))
    }
}

/// Verdict of one scenario run
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioOutcome {
    pub scenario: Scenario,
    pub variant: VariantTag,
    pub passed: bool,
    pub detail: String,
    /// Set when the flow itself failed before the outcome could be checked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    pub latency_ms: u64,
}

enum Check {
    Visible(LogicalTarget),
    TextEquals(LogicalTarget, &'static str),
}

/// Run `scenario` on `session`, then close the session.
///
/// A flow error becomes a failed outcome carrying its kind; only the
/// verdict is returned, never the error.
pub async fn run_scenario(
    mut session: CheckoutSession,
    scenario: Scenario,
    url: &str,
    input: &CheckoutInput,
) -> ScenarioOutcome {
    let start = Instant::now();
    let variant = session.variant();
    info!(
        session = %session.id(),
        scenario = %scenario,
        variant = %variant,
        "Running scenario"
    );

    let verdict = match drive(&mut session, scenario, url, input).await {
        Ok(check) => evaluate(&session, &check).await,
        Err(err) => Err(err),
    };

    if let Err(err) = session.close().await {
        warn!(scenario = %scenario, cause = %err, "Driver did not quit cleanly");
    }

    let latency_ms = start.elapsed().as_millis() as u64;
    let outcome = match verdict {
        Ok((passed, detail)) => ScenarioOutcome {
            scenario,
            variant,
            passed,
            detail,
            failure: None,
            latency_ms,
        },
        Err(err) => {
            error!(
                scenario = %scenario,
                variant = %variant,
                kind = ?err.kind(),
                "Scenario flow failed: {}",
                err
            );
            ScenarioOutcome {
                scenario,
                variant,
                passed: false,
                detail: err.to_string(),
                failure: Some(err.kind()),
                latency_ms,
            }
        }
    };

    info!(
        scenario = %scenario,
        variant = %variant,
        passed = outcome.passed,
        latency_ms = outcome.latency_ms,
        "Scenario finished"
    );
    outcome
}

async fn drive(
    session: &mut CheckoutSession,
    scenario: Scenario,
    url: &str,
    input: &CheckoutInput,
) -> Result<Check, FlowError> {
    match scenario {
        Scenario::VirtualAccountPayment => {
            session.complete_checkout(url, input).await?;
            Ok(Check::Visible(COMPLETION_HEADING))
        }
        Scenario::InvalidCustomerInfo => {
            session.navigate(url).await?;
            session.complete_initial_steps().await?;
            session
                .fill_customer_info(INVALID_CUSTOMER_NAME, INVALID_PHONE_NUMBER)
                .await?;
            session.select_virtual_account_payment().await?;
            Ok(Check::Visible(CUSTOMER_INFO_ERROR))
        }
        Scenario::RequestMemo => {
            session.navigate(url).await?;
            session.complete_initial_steps().await?;
            session.open_request_memo().await?;
            session.fill_request_memo(&input.request_memo).await?;
            session.save_request_memo().await?;
            Ok(Check::TextEquals(MEMO_SAVED_TOAST, MEMO_SAVED_MESSAGE))
        }
        Scenario::InvalidRefundAccount => {
            checkout_to_bank(session, url, input).await?;
            session
                .fill_refund_account(&input.refund_holder, INVALID_REFUND_ACCOUNT)
                .await?;
            Ok(Check::TextEquals(
                REFUND_ACCOUNT_ERROR,
                REFUND_ACCOUNT_ERROR_MESSAGE,
            ))
        }
        Scenario::BackToPayment => {
            checkout_to_bank(session, url, input).await?;
            session.go_back().await?;
            Ok(Check::Visible(PAYMENT_HEADING))
        }
    }
}

async fn checkout_to_bank(
    session: &mut CheckoutSession,
    url: &str,
    input: &CheckoutInput,
) -> Result<(), FlowError> {
    session.navigate(url).await?;
    session.complete_initial_steps().await?;
    session
        .fill_customer_info(&input.customer_name, &input.phone_number)
        .await?;
    session.select_virtual_account_payment().await?;
    session.select_bank(input.bank).await?;
    Ok(())
}

async fn evaluate(session: &CheckoutSession, check: &Check) -> Result<(bool, String), FlowError> {
    match check {
        Check::Visible(target) => {
            let visible = session.is_visible(target).await?;
            let detail = if visible {
                format!("{} is visible", target)
            } else {
                format!("{} did not appear", target)
            };
            Ok((visible, detail))
        }
        Check::TextEquals(target, expected) => {
            if !session.is_visible(target).await? {
                return Ok((false, format!("{} did not appear", target)));
            }
            let text = session.read_text(target).await?;
            let passed = text.trim() == *expected;
            let detail = if passed {
                format!("{} reads '{}'", target, expected)
            } else {
                format!("{} reads '{}', expected '{}'", target, text.trim(), expected)
            };
            Ok((passed, detail))
        }
    }
}
