use std::sync::Arc;

use action_flow::stages::confirmation_context;
use action_flow::targets::CONFIRM_BUTTON;
use action_flow::testing::{checkout_page, locate, CheckoutPage};
use action_flow::FailureKind;
use checkout_core_types::stub::{DriverCall, StubDriver};
use checkout_core_types::VariantTag;
use checkout_e2e::{build_registry, open_session, run_scenario, Config, Scenario, ScenarioOutcome};

const LAYOUTS: [VariantTag; 2] = [VariantTag::Desktop, VariantTag::Mobile];

async fn run_on(driver: Arc<StubDriver>, variant: VariantTag, scenario: Scenario) -> ScenarioOutcome {
    let config = Config::default();
    let registry = build_registry(&config).unwrap();
    let session = open_session(driver, registry, &config, variant).unwrap();
    run_scenario(session, scenario, &config.base_url, &config.data).await
}

#[tokio::test(start_paused = true)]
async fn test_virtual_account_payment_completes_on_both_layouts() {
    for variant in LAYOUTS {
        let driver = Arc::new(checkout_page(variant).unwrap());
        let outcome = run_on(driver.clone(), variant, Scenario::VirtualAccountPayment).await;

        assert!(outcome.passed, "{variant}: {}", outcome.detail);
        assert_eq!(outcome.variant, variant);
        assert!(outcome.failure.is_none());
        assert_eq!(driver.calls().last(), Some(&DriverCall::Quit));
    }
}

#[tokio::test(start_paused = true)]
async fn test_request_memo_saved() {
    for variant in LAYOUTS {
        let driver = Arc::new(checkout_page(variant).unwrap());
        let outcome = run_on(driver, variant, Scenario::RequestMemo).await;
        assert!(outcome.passed, "{variant}: {}", outcome.detail);
    }
}

#[tokio::test(start_paused = true)]
async fn test_back_to_payment_shows_payment_heading() {
    let driver = Arc::new(checkout_page(VariantTag::Mobile).unwrap());
    let outcome = run_on(driver, VariantTag::Mobile, Scenario::BackToPayment).await;
    assert!(outcome.passed, "{}", outcome.detail);
}

#[tokio::test(start_paused = true)]
async fn test_invalid_customer_info_flagged() {
    let driver = Arc::new(
        CheckoutPage::new(VariantTag::Desktop)
            .reject_customer_info()
            .build()
            .unwrap(),
    );
    let outcome = run_on(driver.clone(), VariantTag::Desktop, Scenario::InvalidCustomerInfo).await;

    assert!(outcome.passed, "{}", outcome.detail);
    assert!(driver.calls().iter().any(|call| matches!(
        call,
        DriverCall::Type { text, .. } if text == "123-1234-2454"
    )));
}

#[tokio::test(start_paused = true)]
async fn test_invalid_customer_info_fails_when_page_accepts_it() {
    let driver = Arc::new(checkout_page(VariantTag::Desktop).unwrap());
    let outcome = run_on(driver, VariantTag::Desktop, Scenario::InvalidCustomerInfo).await;

    assert!(!outcome.passed);
    assert!(outcome.failure.is_none());
    assert!(outcome.detail.contains("did not appear"));
}

#[tokio::test(start_paused = true)]
async fn test_invalid_refund_account_rejected() {
    for variant in LAYOUTS {
        let driver = Arc::new(
            CheckoutPage::new(variant)
                .reject_refund_account()
                .build()
                .unwrap(),
        );
        let outcome = run_on(driver, variant, Scenario::InvalidRefundAccount).await;
        assert!(outcome.passed, "{variant}: {}", outcome.detail);
    }
}

#[tokio::test(start_paused = true)]
async fn test_flow_failure_reported_with_kind() {
    let variant = VariantTag::Desktop;
    let driver = Arc::new(checkout_page(variant).unwrap());
    driver.remove(
        &confirmation_context(variant),
        &locate(&CONFIRM_BUTTON, variant).unwrap(),
    );

    let outcome = run_on(driver.clone(), variant, Scenario::VirtualAccountPayment).await;

    assert!(!outcome.passed);
    assert_eq!(outcome.failure, Some(FailureKind::ElementNotReady));
    assert!(outcome.detail.contains("confirm-button"), "{}", outcome.detail);
    assert_eq!(driver.calls().last(), Some(&DriverCall::Quit));
}
