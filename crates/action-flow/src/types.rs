//! Flow types and data structures

use checkout_core_types::{BrowsingContext, LogicalTarget, SessionId, VariantTag};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::targets;

/// Coarse checkout state of one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStage {
    Start,
    InitialSteps,
    CustomerInfo,
    PaymentMethodSelected,
    RefundAccountEntered,
    /// Desktop only: the embedded payment document is active
    EmbeddedContext,
    Confirming,
    Confirmed,
}

impl fmt::Display for CheckoutStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CheckoutStage::Start => "start",
            CheckoutStage::InitialSteps => "initial_steps",
            CheckoutStage::CustomerInfo => "customer_info",
            CheckoutStage::PaymentMethodSelected => "payment_method_selected",
            CheckoutStage::RefundAccountEntered => "refund_account_entered",
            CheckoutStage::EmbeddedContext => "embedded_context",
            CheckoutStage::Confirming => "confirming",
            CheckoutStage::Confirmed => "confirmed",
        };
        f.write_str(name)
    }
}

/// Form input a fill step draws its value from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    CustomerName,
    PhoneNumber,
    RefundHolder,
    RefundAccountNumber,
    RequestMemo,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::CustomerName => "customer name",
            Field::PhoneNumber => "phone number",
            Field::RefundHolder => "refund account holder",
            Field::RefundAccountNumber => "refund account number",
            Field::RequestMemo => "request memo",
        };
        f.write_str(name)
    }
}

/// Bank offered for virtual-account refunds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bank {
    #[default]
    Shinhan,
}

impl Bank {
    pub const ALL: [Bank; 1] = [Bank::Shinhan];

    pub fn as_str(&self) -> &'static str {
        match self {
            Bank::Shinhan => "shinhan",
        }
    }

    /// Bank icon in the refund form (same on every layout)
    pub fn icon_target(&self) -> LogicalTarget {
        match self {
            Bank::Shinhan => targets::BANK_ICON_SHINHAN,
        }
    }

    /// Bank entry in the final bank list (layout-specific)
    pub fn final_target(&self) -> LogicalTarget {
        match self {
            Bank::Shinhan => targets::FINAL_BANK_SHINHAN,
        }
    }
}

impl fmt::Display for Bank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Bank {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shinhan" => Ok(Bank::Shinhan),
            other => Err(format!("unsupported bank '{}'", other)),
        }
    }
}

/// What a flow step does with its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "field")]
pub enum StepAction {
    Click,
    Fill(Field),
}

/// One (target, action) pair of a stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowStep {
    pub target: LogicalTarget,
    pub action: StepAction,
}

impl FlowStep {
    pub fn click(target: LogicalTarget) -> Self {
        Self {
            target,
            action: StepAction::Click,
        }
    }

    pub fn fill(target: LogicalTarget, field: Field) -> Self {
        Self {
            target,
            action: StepAction::Fill(field),
        }
    }
}

/// Stateless description of an ordered checkout step.
///
/// Reusable across sessions; the session supplies variant, context and inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowStage {
    pub name: &'static str,
    /// Context every step runs in
    pub context: BrowsingContext,
    pub steps: Vec<FlowStep>,
}

impl FlowStage {
    pub fn new(name: &'static str, context: BrowsingContext) -> Self {
        Self {
            name,
            context,
            steps: Vec::new(),
        }
    }

    pub fn step(mut self, step: FlowStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn targets(&self) -> impl Iterator<Item = &LogicalTarget> {
        self.steps.iter().map(|step| &step.target)
    }
}

/// Values for the fill steps of a stage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageInputs {
    values: BTreeMap<Field, String>,
}

impl StageInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.values.insert(field, value.into());
        self
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }
}

/// Result of one executed step
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub target: LogicalTarget,
    pub action: StepAction,
    pub latency_ms: u64,
}

/// Result of one stage operation
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub stage: &'static str,
    pub context: BrowsingContext,
    /// Coarse state after the operation
    pub reached: CheckoutStage,
    pub steps: Vec<StepReport>,
    pub latency_ms: u64,
}

/// Result of a whole-flow convenience sequence
#[derive(Debug, Clone, Serialize)]
pub struct FlowReport {
    pub session: SessionId,
    pub variant: VariantTag,
    pub stages: Vec<StageReport>,
    pub final_stage: CheckoutStage,
    pub latency_ms: u64,
}

/// Literal values a checkout run types into the form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutInput {
    pub customer_name: String,
    pub phone_number: String,
    pub refund_holder: String,
    pub refund_account_number: String,
    pub request_memo: String,
    pub bank: Bank,
}

impl Default for CheckoutInput {
    fn default() -> Self {
        Self {
            customer_name: "김지훈".to_string(),
            phone_number: "010-4935-4537".to_string(),
            refund_holder: "박정웅".to_string(),
            refund_account_number: "110306197943".to_string(),
            request_memo: "요청사항 내용 입력 확인".to_string(),
            bank: Bank::Shinhan,
        }
    }
}
