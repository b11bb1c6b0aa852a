//! Checkout target catalog
//!
//! Every UI concept the checkout flow touches, and the built-in locator table
//! that maps each one to its desktop and mobile expressions.

use action_locator::{LocatorError, LocatorOverride, LocatorRegistry, TargetDef};
use checkout_core_types::{LocatorExpression as Loc, LogicalTarget};

/// Frame name of the embedded payment document (desktop layout)
pub const PAYMENT_FRAME: &str = "___tosspayments_iframe___";

// Initial steps
pub const INITIAL_BUTTON: LogicalTarget = LogicalTarget::from_static("initial-button");
pub const SECOND_BUTTON: LogicalTarget = LogicalTarget::from_static("second-button");

// Customer information
pub const CUSTOMER_NAME_FIELD: LogicalTarget = LogicalTarget::from_static("customer-name-field");
pub const PHONE_NUMBER_FIELD: LogicalTarget = LogicalTarget::from_static("phone-number-field");

// Request memo
pub const REQUEST_BUTTON: LogicalTarget = LogicalTarget::from_static("request-button");
pub const REQUEST_MEMO_FIELD: LogicalTarget = LogicalTarget::from_static("request-memo-field");
pub const REQUEST_SAVE_BUTTON: LogicalTarget = LogicalTarget::from_static("request-save-button");

// Payment method
pub const VIRTUAL_ACCOUNT_ICON: LogicalTarget = LogicalTarget::from_static("virtual-account-icon");
pub const PAYMENT_BUTTON: LogicalTarget = LogicalTarget::from_static("payment-button");
pub const BANK_SELECTION: LogicalTarget = LogicalTarget::from_static("bank-selection");

// Bank and refund account
pub const BANK_ICON_SHINHAN: LogicalTarget = LogicalTarget::from_static("bank-icon-shinhan");
pub const REFUND_HOLDER_FIELD: LogicalTarget =
    LogicalTarget::from_static("refund-account-holder-field");
pub const REFUND_ACCOUNT_NUMBER_FIELD: LogicalTarget =
    LogicalTarget::from_static("refund-account-number-field");
pub const BANK_SELECT_BUTTON: LogicalTarget = LogicalTarget::from_static("bank-select-button");
pub const BACK_BUTTON: LogicalTarget = LogicalTarget::from_static("back-button");

// Embedded payment document
pub const PAYMENT_IFRAME: LogicalTarget = LogicalTarget::from_static("payment-iframe");
pub const FINAL_BANK_SHINHAN: LogicalTarget = LogicalTarget::from_static("final-bank-shinhan");

// Confirmation sequence, in click order
pub const INCOME_DEDUCTION_OPTION: LogicalTarget =
    LogicalTarget::from_static("income-deduction-option");
pub const NO_ISSUANCE_OPTION: LogicalTarget = LogicalTarget::from_static("no-issuance-option");
pub const PRIVACY_AGREEMENT: LogicalTarget = LogicalTarget::from_static("privacy-agreement");
pub const CONFIRM_BUTTON: LogicalTarget = LogicalTarget::from_static("confirm-button");
pub const NO_USAGE_BUTTON: LogicalTarget = LogicalTarget::from_static("no-usage-button");

pub const PAYMENT_CONFIRMATION_TEXT: LogicalTarget =
    LogicalTarget::from_static("payment-confirmation-text");

// Outcome probes; callers assert on these
pub const COMPLETION_HEADING: LogicalTarget = LogicalTarget::from_static("completion-heading");
pub const PAYMENT_HEADING: LogicalTarget = LogicalTarget::from_static("payment-heading");
pub const CUSTOMER_INFO_ERROR: LogicalTarget = LogicalTarget::from_static("customer-info-error");
pub const REFUND_ACCOUNT_ERROR: LogicalTarget = LogicalTarget::from_static("refund-account-error");
pub const MEMO_SAVED_TOAST: LogicalTarget = LogicalTarget::from_static("memo-saved-toast");

/// Targets a caller may probe to decide a scenario's outcome
pub const OUTCOME_PROBES: [LogicalTarget; 5] = [
    COMPLETION_HEADING,
    PAYMENT_HEADING,
    CUSTOMER_INFO_ERROR,
    REFUND_ACCOUNT_ERROR,
    MEMO_SAVED_TOAST,
];

fn definitions() -> Vec<TargetDef> {
    vec![
        TargetDef::new(INITIAL_BUTTON).any(Loc::id("button-1")),
        TargetDef::new(SECOND_BUTTON)
            .any(Loc::css("form div:nth-child(2) button:nth-child(2)")),
        TargetDef::new(CUSTOMER_NAME_FIELD).any(Loc::xpath(
            "/html/body/div/div[1]/div/form/section[1]/div/div[1]/div/div/input",
        )),
        TargetDef::new(PHONE_NUMBER_FIELD).any(Loc::xpath(
            "/html/body/div/div[1]/div/form/section[1]/div/div[2]/div/div/input",
        )),
        TargetDef::new(REQUEST_BUTTON).any(Loc::xpath(
            "/html/body/div/div[1]/div/form/section[1]/div/div[3]/div/button/span[2]",
        )),
        TargetDef::new(REQUEST_MEMO_FIELD).any(Loc::css("textarea[name='memo']")),
        TargetDef::new(REQUEST_SAVE_BUTTON)
            .any(Loc::xpath("/html/body/div/div[3]/div/div[2]/button")),
        TargetDef::new(VIRTUAL_ACCOUNT_ICON).any(Loc::xpath(r#"//*[@id="icon-account-가상계좌"]"#)),
        TargetDef::new(PAYMENT_BUTTON)
            .any(Loc::xpath("/html/body/div/div[1]/div/form/div[2]/div[2]/button")),
        TargetDef::new(BANK_SELECTION).any(Loc::css("img[src*='icn-bank-']")),
        TargetDef::new(BANK_ICON_SHINHAN).any(Loc::css("img[src*='icn-bank-shinhan.svg']")),
        TargetDef::new(REFUND_HOLDER_FIELD)
            .any(Loc::xpath("/html/body/div/div[1]/div/form/div[2]/div/div/input")),
        TargetDef::new(REFUND_ACCOUNT_NUMBER_FIELD)
            .any(Loc::xpath("/html/body/div/div[1]/div/form/div[3]/div/div/input")),
        TargetDef::new(BANK_SELECT_BUTTON)
            .any(Loc::xpath("/html/body/div/div[2]/div/div[2]/button")),
        TargetDef::new(BACK_BUTTON)
            .any(Loc::xpath("/html/body/div/div[1]/div/nav/button[1]/span/span")),
        TargetDef::new(PAYMENT_IFRAME).desktop(Loc::id(PAYMENT_FRAME)),
        TargetDef::new(FINAL_BANK_SHINHAN)
            .desktop(Loc::xpath(
                r#"//*[@id="__next"]/div/main/section/section/ul/a[2]/li/span"#,
            ))
            .mobile(Loc::xpath("/html/body/div/div[1]/section/div[3]/ul/div[11]/li/div")),
        TargetDef::new(INCOME_DEDUCTION_OPTION)
            .desktop(Loc::xpath("//div[contains(text(), '소득공제용')]"))
            .mobile(Loc::xpath(
                "/html/body/div[1]/div[1]/form/div[4]/div[1]/div[2]/button",
            )),
        TargetDef::new(NO_ISSUANCE_OPTION)
            .desktop(Loc::xpath("//div[contains(text(), '발급안함')]"))
            .mobile(Loc::xpath(
                "/html/body/div[5]/div/div/div/div[3]/div/ul/label[4]/li",
            )),
        TargetDef::new(PRIVACY_AGREEMENT)
            .desktop(Loc::xpath(
                "//input[@aria-label='[필수] 서비스 이용 약관, 개인정보 처리 동의']",
            ))
            .mobile(Loc::xpath(
                "/html/body/div[1]/div[1]/form/div[5]/div[1]/div[2]/div/div/div[1]/div[2]/div/span",
            )),
        TargetDef::new(CONFIRM_BUTTON)
            .desktop(Loc::xpath("//button[text()='확인']"))
            .mobile(Loc::xpath("/html/body/div[1]/div[2]/div/div/div[2]/div/button")),
        TargetDef::new(NO_USAGE_BUTTON)
            .desktop(Loc::xpath(
                "/html/body/div/div/main/div/section/div[3]/span/button",
            ))
            .mobile(Loc::xpath("/html/body/div[1]/div[2]/div/div/div[2]/span/button")),
        TargetDef::new(PAYMENT_CONFIRMATION_TEXT)
            .any(Loc::xpath("//div[contains(text(), '신한은행으로 100원 무통장입금')]")),
        TargetDef::new(COMPLETION_HEADING).any(Loc::xpath("//h1[text()='가상계좌 발급완료']")),
        TargetDef::new(PAYMENT_HEADING).any(Loc::xpath("//h1[text()='결제하기']")),
        TargetDef::new(CUSTOMER_INFO_ERROR).any(Loc::xpath(
            r#"//*[@id="__next"]/div[1]/div/form/section[1]/div/div[2]/small"#,
        )),
        TargetDef::new(REFUND_ACCOUNT_ERROR).any(Loc::text("존재하지 않는 계좌이거나")),
        TargetDef::new(MEMO_SAVED_TOAST).any(Loc::text("요청사항을 저장했어요")),
    ]
}

/// Build the checkout locator table with configuration overrides applied
pub fn checkout_registry<I>(overrides: I) -> Result<LocatorRegistry, LocatorError>
where
    I: IntoIterator<Item = LocatorOverride>,
{
    definitions()
        .into_iter()
        .fold(LocatorRegistry::builder(), |builder, def| builder.define(def))
        .with_overrides(overrides)
        .build()
}
