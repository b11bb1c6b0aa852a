//! Checkout stage definitions
//!
//! Stages name targets only; the registry decides what each target looks like
//! on the session's variant. The one layout difference stages encode is where
//! the final bank and confirmation controls live.

use checkout_core_types::{BrowsingContext, LogicalTarget, VariantTag};

use crate::targets::*;
use crate::types::{Bank, Field, FlowStage, FlowStep};

/// Context holding the final bank list and confirmation controls
pub fn confirmation_context(variant: VariantTag) -> BrowsingContext {
    match variant {
        VariantTag::Desktop => BrowsingContext::embedded(PAYMENT_FRAME),
        VariantTag::Mobile | VariantTag::Tablet => BrowsingContext::Top,
    }
}

/// Whether the variant renders payment confirmation inside the embedded document
pub fn uses_embedded_payment(variant: VariantTag) -> bool {
    !confirmation_context(variant).is_top()
}

pub fn initial_steps() -> FlowStage {
    FlowStage::new("initial_steps", BrowsingContext::Top)
        .step(FlowStep::click(INITIAL_BUTTON))
        .step(FlowStep::click(SECOND_BUTTON))
}

pub fn customer_info() -> FlowStage {
    FlowStage::new("customer_info", BrowsingContext::Top)
        .step(FlowStep::fill(CUSTOMER_NAME_FIELD, Field::CustomerName))
        .step(FlowStep::fill(PHONE_NUMBER_FIELD, Field::PhoneNumber))
}

/// Icon plus pay button; the bank-selection follow-up is probed separately
pub fn payment_method() -> FlowStage {
    FlowStage::new("payment_method", BrowsingContext::Top)
        .step(FlowStep::click(VIRTUAL_ACCOUNT_ICON))
        .step(FlowStep::click(PAYMENT_BUTTON))
}

pub fn bank_selection(bank: Bank) -> FlowStage {
    FlowStage::new("bank_selection", BrowsingContext::Top).step(FlowStep::click(bank.icon_target()))
}

pub fn refund_account() -> FlowStage {
    FlowStage::new("refund_account", BrowsingContext::Top)
        .step(FlowStep::fill(REFUND_HOLDER_FIELD, Field::RefundHolder))
        .step(FlowStep::fill(REFUND_ACCOUNT_NUMBER_FIELD, Field::RefundAccountNumber))
        .step(FlowStep::click(BANK_SELECT_BUTTON))
}

pub fn final_bank(bank: Bank, variant: VariantTag) -> FlowStage {
    FlowStage::new("final_bank", confirmation_context(variant))
        .step(FlowStep::click(bank.final_target()))
}

/// Fixed-order confirmation clicks; each control is awaited on its own
pub fn confirmation(variant: VariantTag) -> FlowStage {
    FlowStage::new("confirmation", confirmation_context(variant))
        .step(FlowStep::click(INCOME_DEDUCTION_OPTION))
        .step(FlowStep::click(NO_ISSUANCE_OPTION))
        .step(FlowStep::click(PRIVACY_AGREEMENT))
        .step(FlowStep::click(CONFIRM_BUTTON))
        .step(FlowStep::click(NO_USAGE_BUTTON))
}

pub fn go_back() -> FlowStage {
    FlowStage::new("go_back", BrowsingContext::Top).step(FlowStep::click(BACK_BUTTON))
}

pub fn open_request_memo() -> FlowStage {
    FlowStage::new("open_request_memo", BrowsingContext::Top).step(FlowStep::click(REQUEST_BUTTON))
}

pub fn fill_request_memo() -> FlowStage {
    FlowStage::new("fill_request_memo", BrowsingContext::Top)
        .step(FlowStep::fill(REQUEST_MEMO_FIELD, Field::RequestMemo))
}

pub fn save_request_memo() -> FlowStage {
    FlowStage::new("save_request_memo", BrowsingContext::Top)
        .step(FlowStep::click(REQUEST_SAVE_BUTTON))
}

/// Every target a session on `variant` may resolve, deduplicated
pub fn required_targets(variant: VariantTag) -> Vec<LogicalTarget> {
    let mut stages = vec![
        initial_steps(),
        customer_info(),
        payment_method(),
        refund_account(),
        confirmation(variant),
        go_back(),
        open_request_memo(),
        fill_request_memo(),
        save_request_memo(),
    ];
    for bank in Bank::ALL {
        stages.push(bank_selection(bank));
        stages.push(final_bank(bank, variant));
    }

    let mut targets: Vec<LogicalTarget> = stages
        .iter()
        .flat_map(|stage| stage.targets().cloned())
        .collect();
    targets.push(BANK_SELECTION);
    targets.push(PAYMENT_CONFIRMATION_TEXT);
    targets.extend(OUTCOME_PROBES);
    if uses_embedded_payment(variant) {
        targets.push(PAYMENT_IFRAME);
    }

    targets.sort();
    targets.dedup();
    targets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::targets::checkout_registry;

    #[test]
    fn test_confirmation_context_per_variant() {
        assert_eq!(
            confirmation(VariantTag::Desktop).context,
            BrowsingContext::embedded(PAYMENT_FRAME)
        );
        assert!(confirmation(VariantTag::Mobile).context.is_top());
        assert!(uses_embedded_payment(VariantTag::Desktop));
        assert!(!uses_embedded_payment(VariantTag::Mobile));
    }

    #[test]
    fn test_confirmation_order() {
        let order: Vec<_> = confirmation(VariantTag::Mobile)
            .steps
            .into_iter()
            .map(|step| step.target)
            .collect();
        assert_eq!(
            order,
            vec![
                INCOME_DEDUCTION_OPTION,
                NO_ISSUANCE_OPTION,
                PRIVACY_AGREEMENT,
                CONFIRM_BUTTON,
                NO_USAGE_BUTTON,
            ]
        );
    }

    #[test]
    fn test_builtin_table_covers_desktop_and_mobile() {
        let registry = checkout_registry([]).unwrap();
        for variant in [VariantTag::Desktop, VariantTag::Mobile] {
            let required = required_targets(variant);
            assert!(
                registry.unresolved(&required, variant).is_empty(),
                "gaps for {variant}"
            );
        }
    }

    #[test]
    fn test_tablet_has_gaps() {
        let registry = checkout_registry([]).unwrap();
        let required = required_targets(VariantTag::Tablet);
        let gaps = registry.unresolved(&required, VariantTag::Tablet);
        assert!(gaps.contains(&CONFIRM_BUTTON));
        assert!(gaps.contains(&FINAL_BANK_SHINHAN));
        assert!(!gaps.contains(&INITIAL_BUTTON));
    }

    #[test]
    fn test_mobile_never_requires_payment_iframe() {
        assert!(!required_targets(VariantTag::Mobile).contains(&PAYMENT_IFRAME));
        assert!(required_targets(VariantTag::Desktop).contains(&PAYMENT_IFRAME));
    }
}
