use super::*;
use crate::targets::*;
use crate::testing::{self, checkout_page, locate, CheckoutPage};
use crate::{checkout_registry, FailureKind};
use action_primitives::ActionError;
use checkout_core_types::stub::{DriverCall, StubDriver, StubElement};
use std::time::Duration;

const URL: &str = "https://example.com/payment";

fn registry() -> Arc<LocatorRegistry> {
    Arc::new(checkout_registry([]).unwrap())
}

fn session(driver: &Arc<StubDriver>, variant: VariantTag) -> CheckoutSession {
    CheckoutSession::new(driver.clone(), registry(), variant).unwrap()
}

async fn up_to_refund(session: &mut CheckoutSession, account_number: &str) {
    session.navigate(URL).await.unwrap();
    session.complete_initial_steps().await.unwrap();
    session
        .fill_customer_info("김지훈", "010-4935-4537")
        .await
        .unwrap();
    session.select_virtual_account_payment().await.unwrap();
    session.select_bank(Bank::Shinhan).await.unwrap();
    session
        .fill_refund_account("박정웅", account_number)
        .await
        .unwrap();
}

#[test]
fn test_tablet_session_rejected_at_construction() {
    let driver = Arc::new(StubDriver::new());
    let err = CheckoutSession::new(driver, registry(), VariantTag::Tablet)
        .err()
        .unwrap();
    assert_eq!(err.kind(), FailureKind::UnresolvedLocator);
    match err {
        FlowError::Locator(LocatorError::Unresolved { variant, .. }) => {
            assert_eq!(variant, VariantTag::Tablet)
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_customer_info_reaches_payment_method_selected() {
    let driver = Arc::new(checkout_page(VariantTag::Desktop).unwrap());
    let mut session = session(&driver, VariantTag::Desktop);

    session.navigate(URL).await.unwrap();
    assert_eq!(session.stage(), CheckoutStage::Start);
    session.complete_initial_steps().await.unwrap();
    assert_eq!(session.stage(), CheckoutStage::InitialSteps);
    let report = session
        .fill_customer_info("김지훈", "010-4935-4537")
        .await
        .unwrap();
    assert_eq!(report.reached, CheckoutStage::CustomerInfo);
    let actions: Vec<StepAction> = report.steps.iter().map(|step| step.action).collect();
    assert_eq!(
        actions,
        vec![
            StepAction::Fill(Field::CustomerName),
            StepAction::Fill(Field::PhoneNumber)
        ]
    );

    let report = session.select_virtual_account_payment().await.unwrap();
    assert_eq!(report.reached, CheckoutStage::PaymentMethodSelected);
    assert!(session.is_visible(&BANK_SELECTION).await.unwrap());
    assert_eq!(
        driver
            .typed_value(
                &BrowsingContext::Top,
                &locate(&PHONE_NUMBER_FIELD, VariantTag::Desktop).unwrap()
            )
            .as_deref(),
        Some("010-4935-4537")
    );
}

#[tokio::test(start_paused = true)]
async fn test_invalid_customer_info_stays_in_customer_info() {
    let driver = Arc::new(
        CheckoutPage::new(VariantTag::Mobile)
            .reject_customer_info()
            .build()
            .unwrap(),
    );
    let mut session = session(&driver, VariantTag::Mobile);

    session.navigate(URL).await.unwrap();
    session.complete_initial_steps().await.unwrap();
    session
        .fill_customer_info("test", "123-1234-2454")
        .await
        .unwrap();
    let report = session.select_virtual_account_payment().await.unwrap();

    assert_eq!(report.reached, CheckoutStage::CustomerInfo);
    assert_eq!(session.stage(), CheckoutStage::CustomerInfo);
    assert!(session.is_visible(&CUSTOMER_INFO_ERROR).await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_malformed_refund_account_completes_fill() {
    let driver = Arc::new(
        CheckoutPage::new(VariantTag::Mobile)
            .reject_refund_account()
            .build()
            .unwrap(),
    );
    let mut session = session(&driver, VariantTag::Mobile);

    up_to_refund(&mut session, "2").await;

    assert_eq!(session.stage(), CheckoutStage::RefundAccountEntered);
    assert_eq!(
        session.read_text(&REFUND_ACCOUNT_ERROR).await.unwrap(),
        testing::REFUND_ACCOUNT_ERROR_TEXT
    );
}

#[tokio::test(start_paused = true)]
async fn test_desktop_switches_before_final_bank() {
    let driver = Arc::new(checkout_page(VariantTag::Desktop).unwrap());
    let mut session = session(&driver, VariantTag::Desktop);

    let report = session
        .complete_checkout(URL, &CheckoutInput::default())
        .await
        .unwrap();
    assert_eq!(report.final_stage, CheckoutStage::Confirmed);
    assert!(session.context().is_top());

    let frame = BrowsingContext::embedded(PAYMENT_FRAME);
    let final_bank = locate(&FINAL_BANK_SHINHAN, VariantTag::Desktop).unwrap();
    let calls = driver.calls();
    let switch_at = calls
        .iter()
        .position(|call| *call == DriverCall::SwitchContext(frame.clone()))
        .unwrap();
    let final_bank_at = calls
        .iter()
        .position(|call| {
            matches!(call, DriverCall::Click { context, locator }
                if *context == frame && *locator == final_bank)
        })
        .unwrap();
    assert!(switch_at < final_bank_at);
    assert!(session.is_visible(&COMPLETION_HEADING).await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_desktop_final_bank_without_switch_fails_loudly() {
    let driver = Arc::new(checkout_page(VariantTag::Desktop).unwrap());
    let mut session = session(&driver, VariantTag::Desktop);
    up_to_refund(&mut session, "110306197943").await;

    let err = session.select_final_bank(Bank::Shinhan).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::ContextSwitch);
    let final_bank = locate(&FINAL_BANK_SHINHAN, VariantTag::Desktop).unwrap();
    assert!(!driver.clicked(&final_bank));
    assert_eq!(session.stage(), CheckoutStage::RefundAccountEntered);
}

#[tokio::test(start_paused = true)]
async fn test_mobile_never_enters_embedded_context() {
    let driver = Arc::new(checkout_page(VariantTag::Mobile).unwrap());
    let mut session = session(&driver, VariantTag::Mobile);

    let report = session
        .complete_checkout(URL, &CheckoutInput::default())
        .await
        .unwrap();

    assert_eq!(report.final_stage, CheckoutStage::Confirmed);
    assert!(driver.context_switches().is_empty());
    assert!(report
        .stages
        .iter()
        .all(|stage| stage.context.is_top()));
    assert!(session.is_visible(&COMPLETION_HEADING).await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_mobile_has_no_payment_frame_to_enter() {
    let driver = Arc::new(checkout_page(VariantTag::Mobile).unwrap());
    let mut session = session(&driver, VariantTag::Mobile);
    session.navigate(URL).await.unwrap();

    let err = session.switch_into_payment_context().await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::UnresolvedLocator);
    assert!(driver.context_switches().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_context_round_trip_keeps_top_resolution() {
    let driver = Arc::new(checkout_page(VariantTag::Desktop).unwrap());
    let mut session = session(&driver, VariantTag::Desktop);
    session.navigate(URL).await.unwrap();

    let before = session.read_text(&PAYMENT_HEADING).await.unwrap();
    session.switch_into_payment_context().await.unwrap();
    session.switch_into_payment_context().await.unwrap();
    assert_eq!(session.stage(), CheckoutStage::EmbeddedContext);
    session.switch_to_top().await.unwrap();
    session.switch_to_top().await.unwrap();

    assert_eq!(session.read_text(&PAYMENT_HEADING).await.unwrap(), before);
    assert_eq!(
        driver.context_switches(),
        vec![
            BrowsingContext::embedded(PAYMENT_FRAME),
            BrowsingContext::Top
        ]
    );
    assert!(driver.active_context().is_top());
}

#[tokio::test(start_paused = true)]
async fn test_missing_payment_frame_is_context_switch_error() {
    let driver = Arc::new(StubDriver::new());
    let mut session = CheckoutSession::with_policy(
        driver.clone(),
        registry(),
        VariantTag::Desktop,
        WaitPolicy::default().with_timeout(Duration::from_secs(2)),
    )
    .unwrap();

    let err = session.switch_into_payment_context().await.unwrap_err();
    match &err {
        FlowError::ContextSwitch { context, reason } => {
            assert_eq!(*context, BrowsingContext::embedded(PAYMENT_FRAME));
            assert!(reason.contains("payment-iframe"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(session.context().is_top());
}

#[tokio::test(start_paused = true)]
async fn test_refused_frame_switch_is_context_switch_error() {
    // Host element is on the page but the driver has no such frame
    let driver = Arc::new(StubDriver::new());
    driver.insert(
        BrowsingContext::Top,
        locate(&PAYMENT_IFRAME, VariantTag::Desktop).unwrap(),
        StubElement::visible(),
    );
    let mut session = session(&driver, VariantTag::Desktop);
    let before = session.stage();

    let err = session.switch_into_payment_context().await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::ContextSwitch);
    match &err {
        FlowError::ContextSwitch { context, reason } => {
            assert_eq!(*context, BrowsingContext::embedded(PAYMENT_FRAME));
            assert!(
                reason.contains(&DriverError::NoSuchFrame(PAYMENT_FRAME.into()).to_string()),
                "{reason}"
            );
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(session.context().is_top());
    assert!(driver.active_context().is_top());
    assert_eq!(session.stage(), before);
    assert!(!driver
        .calls()
        .iter()
        .any(|call| matches!(call, DriverCall::SwitchContext(_))));
}

#[tokio::test(start_paused = true)]
async fn test_missing_confirmation_control_is_named() {
    let driver = Arc::new(checkout_page(VariantTag::Mobile).unwrap());
    driver.remove(
        &BrowsingContext::Top,
        &locate(&PRIVACY_AGREEMENT, VariantTag::Mobile).unwrap(),
    );
    let mut session = session(&driver, VariantTag::Mobile);
    up_to_refund(&mut session, "110306197943").await;
    session.select_final_bank(Bank::Shinhan).await.unwrap();

    let err = session.confirm_payment().await.unwrap_err();
    match err {
        FlowError::Action(ActionError::ElementNotReady { target, .. }) => {
            assert_eq!(target, PRIVACY_AGREEMENT)
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(session.stage(), CheckoutStage::Confirming);
    assert!(driver.clicked(&locate(&NO_ISSUANCE_OPTION, VariantTag::Mobile).unwrap()));
    assert!(!driver.clicked(&locate(&CONFIRM_BUTTON, VariantTag::Mobile).unwrap()));
}

#[tokio::test(start_paused = true)]
async fn test_go_back_keeps_stage() {
    let driver = Arc::new(checkout_page(VariantTag::Desktop).unwrap());
    let mut session = session(&driver, VariantTag::Desktop);
    session.navigate(URL).await.unwrap();
    session.complete_initial_steps().await.unwrap();
    session
        .fill_customer_info("김지훈", "010-4935-4537")
        .await
        .unwrap();
    session.select_virtual_account_payment().await.unwrap();
    session.select_bank(Bank::Shinhan).await.unwrap();

    let report = session.go_back().await.unwrap();
    assert_eq!(report.reached, CheckoutStage::PaymentMethodSelected);
    assert!(session.is_visible(&PAYMENT_HEADING).await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_request_memo_round() {
    let driver = Arc::new(checkout_page(VariantTag::Mobile).unwrap());
    let mut session = session(&driver, VariantTag::Mobile);
    session.navigate(URL).await.unwrap();
    session.complete_initial_steps().await.unwrap();

    session.open_request_memo().await.unwrap();
    session
        .fill_request_memo("요청사항 내용 입력 확인")
        .await
        .unwrap();
    session.save_request_memo().await.unwrap();

    assert_eq!(session.stage(), CheckoutStage::InitialSteps);
    assert_eq!(
        session.read_text(&MEMO_SAVED_TOAST).await.unwrap(),
        testing::MEMO_SAVED_TEXT
    );
}

#[tokio::test(start_paused = true)]
async fn test_custom_stage_without_input_fails_before_acting() {
    let driver = Arc::new(checkout_page(VariantTag::Desktop).unwrap());
    let mut session = session(&driver, VariantTag::Desktop);
    session.navigate(URL).await.unwrap();

    let stage = FlowStage::new("memo_only", BrowsingContext::Top)
        .step(FlowStep::click(REQUEST_BUTTON))
        .step(FlowStep::fill(REQUEST_MEMO_FIELD, Field::RequestMemo));
    let err = session.run(&stage, &StageInputs::new()).await.unwrap_err();

    assert_eq!(err, FlowError::MissingInput(Field::RequestMemo));
    assert!(!driver.clicked(&locate(&REQUEST_BUTTON, VariantTag::Desktop).unwrap()));
}

#[tokio::test(start_paused = true)]
async fn test_payment_confirmation_probe() {
    let driver = Arc::new(checkout_page(VariantTag::Mobile).unwrap());
    let mut session = session(&driver, VariantTag::Mobile);
    up_to_refund(&mut session, "110306197943").await;

    session.select_final_bank(Bank::Shinhan).await.unwrap();
    assert!(session.is_payment_confirmed().await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_close_quits_driver() {
    let driver = Arc::new(checkout_page(VariantTag::Mobile).unwrap());
    let session = session(&driver, VariantTag::Mobile);

    session.close().await.unwrap();
    assert_eq!(driver.calls().last(), Some(&DriverCall::Quit));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_parallel_sessions_share_registry() {
    let registry = registry();
    let mut handles = Vec::new();
    for variant in [VariantTag::Desktop, VariantTag::Mobile] {
        let registry = registry.clone();
        handles.push(tokio::spawn(async move {
            let driver = Arc::new(checkout_page(variant).unwrap());
            let mut session = CheckoutSession::new(driver.clone(), registry, variant).unwrap();
            let report = session
                .complete_checkout(URL, &CheckoutInput::default())
                .await
                .unwrap();
            (variant, report.final_stage, driver.context_switches().len())
        }));
    }

    for handle in handles {
        let (variant, stage, switches) = handle.await.unwrap();
        assert_eq!(stage, CheckoutStage::Confirmed);
        match variant {
            VariantTag::Desktop => assert_eq!(switches, 2),
            _ => assert_eq!(switches, 0),
        }
    }
}
