//! Scripted checkout page for tests
//!
//! Builds a [`StubDriver`] that behaves like the checkout form for one
//! variant: controls appear as the previous step is clicked, desktop renders
//! the final bank list and confirmation controls inside the payment frame,
//! and validation messages can be switched on.

use action_locator::{LocatorError, LocatorRegistry};
use checkout_core_types::stub::{StubDriver, StubElement};
use checkout_core_types::{BrowsingContext, LocatorExpression, LogicalTarget, VariantTag};

use crate::stages::{confirmation_context, uses_embedded_payment};
use crate::targets::*;

pub const REFUND_ACCOUNT_ERROR_TEXT: &str = "존재하지 않는 계좌이거나, 본인의 계좌가 아닙니다.";
pub const MEMO_SAVED_TEXT: &str = "요청사항을 저장했어요.";
pub const COMPLETION_TEXT: &str = "가상계좌 발급완료";

/// Expression the built-in table uses for `target` on `variant`
pub fn locate(target: &LogicalTarget, variant: VariantTag) -> Result<LocatorExpression, LocatorError> {
    checkout_registry([])?.resolve(target, variant).cloned()
}

/// Checkout page builder
#[derive(Debug, Clone)]
pub struct CheckoutPage {
    variant: VariantTag,
    reject_customer_info: bool,
    reject_refund_account: bool,
}

impl CheckoutPage {
    pub fn new(variant: VariantTag) -> Self {
        Self {
            variant,
            reject_customer_info: false,
            reject_refund_account: false,
        }
    }

    /// Pressing pay shows the customer-info error instead of the bank list
    pub fn reject_customer_info(mut self) -> Self {
        self.reject_customer_info = true;
        self
    }

    /// Confirming the refund account shows the account error
    pub fn reject_refund_account(mut self) -> Self {
        self.reject_refund_account = true;
        self
    }

    pub fn build(self) -> Result<StubDriver, LocatorError> {
        let registry = checkout_registry([])?;
        let page = Page {
            driver: StubDriver::new(),
            registry: &registry,
            variant: self.variant,
        };
        let top = BrowsingContext::Top;
        let payment = confirmation_context(self.variant);

        for target in [
            INITIAL_BUTTON,
            SECOND_BUTTON,
            CUSTOMER_NAME_FIELD,
            PHONE_NUMBER_FIELD,
            REQUEST_BUTTON,
            VIRTUAL_ACCOUNT_ICON,
            PAYMENT_BUTTON,
        ] {
            page.show(&top, &target, StubElement::visible())?;
        }
        page.show(
            &top,
            &PAYMENT_HEADING,
            StubElement::visible().with_text("결제하기"),
        )?;

        page.reveal(&top, &REQUEST_BUTTON, &top, &REQUEST_MEMO_FIELD, StubElement::visible())?;
        page.reveal(&top, &REQUEST_BUTTON, &top, &REQUEST_SAVE_BUTTON, StubElement::visible())?;
        page.reveal(
            &top,
            &REQUEST_SAVE_BUTTON,
            &top,
            &MEMO_SAVED_TOAST,
            StubElement::visible().with_text(MEMO_SAVED_TEXT),
        )?;

        if self.reject_customer_info {
            page.reveal(
                &top,
                &PAYMENT_BUTTON,
                &top,
                &CUSTOMER_INFO_ERROR,
                StubElement::visible(),
            )?;
        } else {
            page.reveal(&top, &PAYMENT_BUTTON, &top, &BANK_SELECTION, StubElement::visible())?;
            page.reveal(&top, &PAYMENT_BUTTON, &top, &BANK_ICON_SHINHAN, StubElement::visible())?;
        }

        for target in [
            REFUND_HOLDER_FIELD,
            REFUND_ACCOUNT_NUMBER_FIELD,
            BANK_SELECT_BUTTON,
            BACK_BUTTON,
        ] {
            page.reveal(&top, &BANK_ICON_SHINHAN, &top, &target, StubElement::visible())?;
        }
        if self.reject_refund_account {
            page.reveal(
                &top,
                &BANK_SELECT_BUTTON,
                &top,
                &REFUND_ACCOUNT_ERROR,
                StubElement::visible().with_text(REFUND_ACCOUNT_ERROR_TEXT),
            )?;
        }

        if uses_embedded_payment(self.variant) {
            let host = page.locate(&PAYMENT_IFRAME)?;
            page.driver.add_frame(PAYMENT_FRAME, host);
        }
        page.show(&payment, &FINAL_BANK_SHINHAN, StubElement::visible())?;
        page.reveal(
            &payment,
            &FINAL_BANK_SHINHAN,
            &payment,
            &PAYMENT_CONFIRMATION_TEXT,
            StubElement::visible().with_text("신한은행으로 100원 무통장입금"),
        )?;
        for target in [
            INCOME_DEDUCTION_OPTION,
            NO_ISSUANCE_OPTION,
            PRIVACY_AGREEMENT,
            CONFIRM_BUTTON,
            NO_USAGE_BUTTON,
        ] {
            page.show(&payment, &target, StubElement::visible())?;
        }
        page.reveal(
            &payment,
            &NO_USAGE_BUTTON,
            &top,
            &COMPLETION_HEADING,
            StubElement::visible().with_text(COMPLETION_TEXT),
        )?;

        Ok(page.driver)
    }
}

/// Happy-path checkout page for `variant`
pub fn checkout_page(variant: VariantTag) -> Result<StubDriver, LocatorError> {
    CheckoutPage::new(variant).build()
}

struct Page<'a> {
    driver: StubDriver,
    registry: &'a LocatorRegistry,
    variant: VariantTag,
}

impl Page<'_> {
    fn locate(&self, target: &LogicalTarget) -> Result<LocatorExpression, LocatorError> {
        self.registry.resolve(target, self.variant).cloned()
    }

    fn show(
        &self,
        context: &BrowsingContext,
        target: &LogicalTarget,
        element: StubElement,
    ) -> Result<(), LocatorError> {
        self.driver
            .insert(context.clone(), self.locate(target)?, element);
        Ok(())
    }

    fn reveal(
        &self,
        trigger_context: &BrowsingContext,
        trigger: &LogicalTarget,
        context: &BrowsingContext,
        target: &LogicalTarget,
        element: StubElement,
    ) -> Result<(), LocatorError> {
        self.driver.reveal_on_click(
            trigger_context.clone(),
            self.locate(trigger)?,
            context.clone(),
            self.locate(target)?,
            element,
        );
        Ok(())
    }
}
