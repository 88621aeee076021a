//! End-to-end kiosk sessions against the in-memory backend

use std::sync::Arc;
use std::time::Duration;

use kiosk::events::{self, EventSink, KioskEvent};
use kiosk::session::SessionError;
use kiosk::{
    Kiosk, KioskConfig, KioskError, KioskState, NotificationKind, OrderSessionManager, PaymentStep,
    Submission, SurveyCapture, call_number,
};
use kiosk_client::mock::{ApiCall, Endpoint, MockKioskApi};
use kiosk_client::{Credentials, KioskApi};
use shared::{AgeGroup, Demographics, Gender, Item, ItemOption, OrderId, OrderStatus, PaymentMethod};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

// ============================================================================
// Fixtures
// ============================================================================

fn menu() -> Vec<Item> {
    vec![
        Item {
            id: 1,
            name: "Ramen".into(),
            price: 780,
            image_url: None,
            category: Some("Noodles".into()),
            stock: 10,
            options: vec![ItemOption {
                id: 101,
                name: "Extra chashu".into(),
                price_adjustment: 100,
            }],
        },
        Item {
            id: 2,
            name: "Gyoza".into(),
            price: 450,
            image_url: None,
            category: Some("Sides".into()),
            stock: 10,
            options: vec![],
        },
    ]
}

fn new_kiosk(api: &Arc<MockKioskApi>) -> Kiosk {
    let api: Arc<dyn KioskApi> = api.clone();
    let survey = SurveyCapture::new(Demographics::new(AgeGroup::Forties, Gender::Female));
    Kiosk::new(api, Credentials::new(), Arc::new(survey), KioskConfig::default())
}

async fn ordering_kiosk(api: &Arc<MockKioskApi>) -> Kiosk {
    let mut kiosk = new_kiosk(api);
    kiosk.login("kiosk-01", "secret").await.unwrap();
    assert_eq!(kiosk.state(), KioskState::Standby);
    kiosk.start().await.unwrap();
    assert_eq!(kiosk.state(), KioskState::Ordering);
    kiosk
}

async fn pay(kiosk: &mut Kiosk, method: PaymentMethod) {
    kiosk.open_payment().unwrap();
    kiosk.select_payment_method(method).unwrap();
    kiosk.confirm_payment_method().unwrap();
    kiosk.complete_payment_action().unwrap();
    let token = CancellationToken::new();
    kiosk
        .run_until(&token, |k| k.state() != KioskState::Ordering)
        .await
        .unwrap();
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_ramen_order_to_ticket_and_back_to_standby() {
    let api = Arc::new(MockKioskApi::new(menu()).with_next_order_id(123));
    let mut kiosk = ordering_kiosk(&api).await;

    kiosk.add_to_cart(1, &[101]).unwrap();
    assert_eq!(kiosk.cart_total(), 880);

    let submission = kiosk.send_order().await.unwrap();
    assert_eq!(submission, Submission::Created(OrderId(123)));
    assert!(kiosk.cart().is_empty());
    assert_eq!(kiosk.session_total(), 880);
    assert_eq!(kiosk.order().unwrap().items.len(), 1);
    assert_eq!(kiosk.notification().map(|n| n.kind), Some(NotificationKind::Success));

    pay(&mut kiosk, PaymentMethod::Cash).await;
    assert_eq!(kiosk.state(), KioskState::Ticket);
    let ticket = kiosk.ticket().unwrap();
    assert_eq!(ticket.call_number, "123");
    assert_eq!(ticket.total, 880);
    assert_eq!(ticket.payment_method, Some(PaymentMethod::Cash));
    assert!(kiosk.render_ticket().unwrap().contains("No. 123"));

    let checkout = api
        .calls()
        .into_iter()
        .find_map(|c| match c {
            ApiCall::Checkout(id, req) => Some((id, req.payment_method)),
            _ => None,
        })
        .unwrap();
    assert_eq!(checkout, (OrderId(123), PaymentMethod::Cash));

    // Ticket auto-dismisses and the session ends
    let shown_at = Instant::now();
    let token = CancellationToken::new();
    kiosk
        .run_until(&token, |k| k.state() == KioskState::Standby)
        .await
        .unwrap();
    assert!(shown_at.elapsed() >= Duration::from_secs(8));
    assert!(kiosk.order().is_none());
    assert!(kiosk.ticket().is_none());
    assert!(!kiosk.session().is_polling());
    assert_eq!(kiosk.session().demographics(), None);
}

#[tokio::test(start_paused = true)]
async fn test_second_submission_appends_to_same_order() {
    let api = Arc::new(MockKioskApi::new(menu()));
    let mut kiosk = ordering_kiosk(&api).await;

    kiosk.add_to_cart(2, &[]).unwrap();
    kiosk.add_to_cart(2, &[]).unwrap();
    assert_eq!(kiosk.cart().lines().len(), 1);
    assert_eq!(kiosk.cart().lines()[0].quantity, 2);
    let first = kiosk.send_order().await.unwrap();

    kiosk.add_to_cart(1, &[]).unwrap();
    let cart_total = kiosk.cart_total();
    let before = kiosk.session_total();
    let second = kiosk.send_order().await.unwrap();

    let Submission::Created(id) = first else {
        panic!("first submission should create, got {:?}", first);
    };
    assert_eq!(second, Submission::Appended(id));
    assert_eq!(kiosk.session_total(), before + cart_total);
    assert_eq!(api.count(Endpoint::CreateOrder), 1);
    assert!(api.calls().iter().any(|c| matches!(c, ApiCall::AddItems(order, _) if *order == id)));

    // Demographics only ride on the create call
    let create = api
        .calls()
        .into_iter()
        .find_map(|c| match c {
            ApiCall::CreateOrder(req) => Some(req),
            _ => None,
        })
        .unwrap();
    assert_eq!(create.age_group, Some(AgeGroup::Forties));
    assert_eq!(create.gender, Some(Gender::Female));
}

#[tokio::test(start_paused = true)]
async fn test_call_number_is_zero_padded() {
    let api = Arc::new(MockKioskApi::new(menu()).with_next_order_id(4));
    let mut kiosk = ordering_kiosk(&api).await;
    kiosk.add_to_cart(2, &[]).unwrap();
    kiosk.send_order().await.unwrap();
    pay(&mut kiosk, PaymentMethod::EMoney).await;

    assert_eq!(kiosk.ticket().unwrap().call_number, "004");
    assert_eq!(call_number(OrderId(123)), "123");
}

#[tokio::test(start_paused = true)]
async fn test_auth_loss_while_ordering_returns_to_login() {
    let api = Arc::new(MockKioskApi::new(menu()));
    let mut kiosk = ordering_kiosk(&api).await;
    kiosk.add_to_cart(1, &[]).unwrap();
    kiosk.send_order().await.unwrap();
    kiosk.add_to_cart(2, &[]).unwrap();
    kiosk.open_payment().unwrap();

    // Token revoked from outside the kiosk
    let credentials = kiosk.credentials().clone();
    credentials.clear();

    let token = CancellationToken::new();
    kiosk
        .run_until(&token, |k| k.state() == KioskState::Login)
        .await
        .unwrap();
    assert!(kiosk.cart().is_empty());
    assert!(kiosk.order().is_none());
    assert!(kiosk.payment().is_none());
    assert!(!kiosk.session().is_polling());

    let polls = api.count(Endpoint::FetchOrder);
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(api.count(Endpoint::FetchOrder), polls);
}

#[tokio::test(start_paused = true)]
async fn test_polling_reflects_kitchen_status() {
    let api = Arc::new(MockKioskApi::new(menu()));
    let mut kiosk = ordering_kiosk(&api).await;

    tokio::time::sleep(Duration::from_secs(20)).await;
    assert_eq!(api.count(Endpoint::FetchOrder), 0);

    kiosk.add_to_cart(1, &[]).unwrap();
    kiosk.send_order().await.unwrap();
    let order_id = kiosk.order().unwrap().id;
    api.set_status(order_id, OrderStatus::Completed);

    let started = Instant::now();
    let token = CancellationToken::new();
    let counter = Arc::clone(&api);
    kiosk
        .run_until(&token, |_| counter.count(Endpoint::FetchOrder) >= 2)
        .await
        .unwrap();
    assert!(started.elapsed() >= Duration::from_secs(10));
    assert!(kiosk.order().unwrap().is_completed());
}

#[tokio::test(start_paused = true)]
async fn test_slow_poll_cannot_revive_finished_session() {
    let api = Arc::new(MockKioskApi::new(menu()));
    let mut kiosk = ordering_kiosk(&api).await;
    kiosk.add_to_cart(2, &[]).unwrap();
    kiosk.send_order().await.unwrap();
    pay(&mut kiosk, PaymentMethod::CreditCard).await;

    // A poll is in flight when the customer closes the ticket
    api.set_fetch_delay(Some(Duration::from_secs(4)));
    tokio::time::sleep(Duration::from_secs(3)).await;
    kiosk.complete_ticket().unwrap();
    assert_eq!(kiosk.state(), KioskState::Standby);

    let token = CancellationToken::new();
    let _ = tokio::time::timeout(
        Duration::from_secs(20),
        kiosk.run_until(&token, |_| false),
    )
    .await;
    assert!(kiosk.order().is_none());
    assert_eq!(kiosk.state(), KioskState::Standby);
}

#[tokio::test(start_paused = true)]
async fn test_payment_confirms_exactly_once() {
    let api = Arc::new(MockKioskApi::new(menu()));
    let mut kiosk = ordering_kiosk(&api).await;
    kiosk.add_to_cart(1, &[101]).unwrap();
    kiosk.send_order().await.unwrap();

    kiosk.open_payment().unwrap();
    kiosk.confirm_payment_method().unwrap();
    kiosk.complete_payment_action().unwrap();
    assert_eq!(kiosk.payment().unwrap().step(), PaymentStep::Processing);

    // Re-opening mid-progress keeps the running flow
    assert_eq!(kiosk.open_payment().unwrap().step(), PaymentStep::Processing);
    assert!(kiosk.complete_payment_action().is_err());

    let token = CancellationToken::new();
    kiosk
        .run_until(&token, |k| k.state() == KioskState::Ticket)
        .await
        .unwrap();
    let _ = tokio::time::timeout(Duration::from_secs(5), kiosk.run_until(&token, |_| false)).await;
    assert_eq!(api.count(Endpoint::Checkout), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_payment_restarts_from_zero() {
    let api = Arc::new(MockKioskApi::new(menu()));
    let mut kiosk = ordering_kiosk(&api).await;
    kiosk.add_to_cart(2, &[]).unwrap();
    kiosk.send_order().await.unwrap();

    kiosk.open_payment().unwrap();
    kiosk.select_payment_method(PaymentMethod::QrCode).unwrap();
    kiosk.confirm_payment_method().unwrap();
    kiosk.payment_back().unwrap();
    kiosk.close_payment().unwrap();
    assert!(kiosk.payment().is_none());

    let flow = kiosk.open_payment().unwrap();
    assert_eq!(flow.step(), PaymentStep::Select);
    assert_eq!(flow.progress(), 0);
    assert_eq!(flow.method(), PaymentMethod::Cash);
}

#[tokio::test(start_paused = true)]
async fn test_checkout_without_order_never_calls_backend() {
    let api = Arc::new(MockKioskApi::new(menu()));
    let (tx, _rx) = events::channel();
    let dyn_api: Arc<dyn KioskApi> = api.clone();
    let mut session =
        OrderSessionManager::new(dyn_api, Duration::from_secs(5), EventSink::new(tx, KioskEvent::Session));

    let err = session.checkout(PaymentMethod::Cash).await.unwrap_err();
    assert!(matches!(err, SessionError::NoActiveOrder));
    assert!(KioskError::from(err).is_contract_violation());
    assert_eq!(api.count(Endpoint::Checkout), 0);

    // The kiosk never lets the customer get that far
    let mut kiosk = ordering_kiosk(&api).await;
    assert!(matches!(kiosk.open_payment(), Err(KioskError::NoActiveOrder)));
    assert_eq!(api.count(Endpoint::Checkout), 0);
}

#[tokio::test(start_paused = true)]
async fn test_notification_auto_hides() {
    let api = Arc::new(MockKioskApi::new(menu()));
    let mut kiosk = ordering_kiosk(&api).await;
    kiosk.add_to_cart(2, &[]).unwrap();
    kiosk.send_order().await.unwrap();
    assert!(kiosk.notification().is_some());

    let shown_at = Instant::now();
    let token = CancellationToken::new();
    kiosk
        .run_until(&token, |k| k.notification().is_none())
        .await
        .unwrap();
    assert!(shown_at.elapsed() >= Duration::from_secs(3));
    assert_eq!(kiosk.state(), KioskState::Ordering);
}
