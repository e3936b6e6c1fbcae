use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use payrail_api::handlers::{ChargeResponse, ErrorResponse, RefundResponse};
use payrail_api::{create_router, AppConfig, AppState, OrderBook};
use payrail_core::{
    Charger, Currency, GatewayError, LineItem, Order, PaymentError, PaymentResult, PaymentState,
    PreauthorizationResult, Preauthorizer, Provider, ProviderRegistry, Refunder, RequestContext,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// =============================================================================
// Fake provider
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum ChargeOutcome {
    Succeed,
    /// Succeeds after holding the charge open for a while
    SlowSucceed,
    Mismatch,
    CaptureFails,
}

#[derive(Debug)]
struct FakeGateway {
    outcome: ChargeOutcome,
    charges: Mutex<Vec<(u64, Currency, i64)>>,
    refunds: Mutex<Vec<(String, u64, Currency)>>,
    preauthorizations: Mutex<Vec<(u64, Currency, String, String)>>,
}

impl FakeGateway {
    fn new(outcome: ChargeOutcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            charges: Mutex::new(Vec::new()),
            refunds: Mutex::new(Vec::new()),
            preauthorizations: Mutex::new(Vec::new()),
        })
    }
}

struct FakeProvider(Arc<FakeGateway>);

struct FakeCharger {
    gateway: Arc<FakeGateway>,
    payment_id: String,
}

struct FakeRefunder(Arc<FakeGateway>);

struct FakePreauthorizer {
    gateway: Arc<FakeGateway>,
    return_url: String,
}

#[async_trait]
impl Provider for FakeProvider {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn new_charger(&self, request: &RequestContext) -> PaymentResult<Box<dyn Charger>> {
        let handles = request.charge_handles("fake")?;
        Ok(Box::new(FakeCharger {
            gateway: Arc::clone(&self.0),
            payment_id: handles.payment_id,
        }))
    }

    async fn new_refunder(&self, _request: &RequestContext) -> PaymentResult<Box<dyn Refunder>> {
        Ok(Box::new(FakeRefunder(Arc::clone(&self.0))))
    }

    async fn new_preauthorizer(
        &self,
        request: &RequestContext,
    ) -> PaymentResult<Box<dyn Preauthorizer>> {
        Ok(Box::new(FakePreauthorizer {
            gateway: Arc::clone(&self.0),
            return_url: request.site.callback_urls("fake").return_url,
        }))
    }
}

#[async_trait]
impl Charger for FakeCharger {
    async fn charge(
        &self,
        amount: u64,
        currency: Currency,
        _order: &Order,
        invoice_number: i64,
    ) -> PaymentResult<String> {
        self.gateway
            .charges
            .lock()
            .unwrap()
            .push((amount, currency, invoice_number));

        match self.gateway.outcome {
            ChargeOutcome::Succeed => Ok(format!("EXEC-{}", self.payment_id)),
            ChargeOutcome::SlowSucceed => {
                tokio::time::sleep(Duration::from_millis(100)).await;
                Ok(format!("EXEC-{}", self.payment_id))
            }
            ChargeOutcome::Mismatch => Err(PaymentError::AmountMismatch {
                expected_total: "49.99".into(),
                expected_currency: "USD".into(),
                actual_total: "1.00".into(),
                actual_currency: "USD".into(),
            }),
            ChargeOutcome::CaptureFails => Err(PaymentError::CaptureFailed {
                payment_id: self.payment_id.clone(),
                source: GatewayError::Network("connection reset".into()),
            }),
        }
    }
}

#[async_trait]
impl Refunder for FakeRefunder {
    async fn refund(
        &self,
        transaction_id: &str,
        amount: u64,
        currency: Currency,
    ) -> PaymentResult<String> {
        self.0
            .refunds
            .lock()
            .unwrap()
            .push((transaction_id.to_string(), amount, currency));
        Ok(format!("REF-{}", transaction_id))
    }
}

#[async_trait]
impl Preauthorizer for FakePreauthorizer {
    async fn preauthorize(
        &self,
        amount: u64,
        currency: Currency,
        description: &str,
    ) -> PaymentResult<PreauthorizationResult> {
        self.gateway.preauthorizations.lock().unwrap().push((
            amount,
            currency,
            description.to_string(),
            self.return_url.clone(),
        ));
        Ok(PreauthorizationResult {
            id: format!("PAY-{}", amount),
        })
    }
}

// =============================================================================
// Harness
// =============================================================================

fn config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        site_url: "https://shop.test".to_string(),
        environment: "test".to_string(),
        orders_path: "unused.toml".to_string(),
    }
}

fn order(id: &str) -> Order {
    Order::new(id, Currency::USD)
        .with_item(LineItem::new("mug-01", "Mug", 4999, 1))
        .with_invoice_number(1001)
}

fn harness(outcome: ChargeOutcome, orders: Vec<Order>) -> (TestServer, Arc<FakeGateway>, AppState) {
    let gateway = FakeGateway::new(outcome);
    let registry = ProviderRegistry::new().with_provider(Arc::new(FakeProvider(Arc::clone(&gateway))));
    let state = AppState::new(config(), registry, OrderBook::from_orders(orders));
    let server = TestServer::new(create_router(state.clone())).unwrap();
    (server, gateway, state)
}

fn charge_body() -> Value {
    json!({ "fake_payment_id": "P1", "fake_user_id": "U1" })
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_health_lists_providers() {
    let (server, _, _) = harness(ChargeOutcome::Succeed, vec![]);

    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["providers"], json!(["fake"]));
}

#[tokio::test]
async fn test_preauthorize() {
    let (server, gateway, _) = harness(ChargeOutcome::Succeed, vec![]);

    let response = server
        .post("/api/v1/fake/preauthorize")
        .json(&json!({ "amount": 2500, "currency": "USD", "description": "Order ord-1" }))
        .await;
    response.assert_status_ok();

    let result: PreauthorizationResult = response.json();
    assert_eq!(result.id, "PAY-2500");

    let calls = gateway.preauthorizations.lock().unwrap();
    assert_eq!(
        calls[0],
        (
            2500,
            Currency::USD,
            "Order ord-1".to_string(),
            "https://shop.test/gocommerce/fake".to_string()
        )
    );
}

#[tokio::test]
async fn test_unknown_provider_is_not_found() {
    let (server, _, _) = harness(ChargeOutcome::Succeed, vec![]);

    let response = server
        .post("/api/v1/stripe/preauthorize")
        .json(&json!({ "amount": 2500, "currency": "USD" }))
        .expect_failure()
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let error: ErrorResponse = response.json();
    assert_eq!(error.kind, "unknown_provider");
    assert_eq!(error.code, 404);
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let (server, _, _) = harness(ChargeOutcome::Succeed, vec![]);

    let response = server
        .post("/api/v1/fake/preauthorize")
        .text("not json")
        .expect_failure()
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let error: ErrorResponse = response.json();
    assert_eq!(error.kind, "invalid_request");
}

#[tokio::test]
async fn test_charge_uses_order_amount() {
    let (server, gateway, state) = harness(ChargeOutcome::Succeed, vec![order("ord-1")]);

    let mut body = charge_body();
    // Client-supplied amounts are ignored
    body["amount"] = json!(1);
    body["invoice_number"] = json!(2001);

    let response = server
        .post("/api/v1/fake/orders/ord-1/charge")
        .json(&body)
        .await;
    response.assert_status_ok();

    let charged: ChargeResponse = response.json();
    assert_eq!(charged.order_id, "ord-1");
    assert_eq!(charged.transaction_id, "EXEC-P1");
    assert_eq!(charged.payment_state, PaymentState::Paid);

    assert_eq!(
        gateway.charges.lock().unwrap().as_slice(),
        &[(4999, Currency::USD, 2001)]
    );
    assert_eq!(
        state.orders.get("ord-1").await.unwrap().payment_state,
        PaymentState::Paid
    );
}

#[tokio::test]
async fn test_charge_defaults_to_order_invoice_number() {
    let (server, gateway, _) = harness(ChargeOutcome::Succeed, vec![order("ord-1")]);

    server
        .post("/api/v1/fake/orders/ord-1/charge")
        .json(&charge_body())
        .await
        .assert_status_ok();

    assert_eq!(gateway.charges.lock().unwrap()[0].2, 1001);
}

#[tokio::test]
async fn test_paid_order_is_not_charged_again() {
    let (server, gateway, _) = harness(ChargeOutcome::Succeed, vec![order("ord-1")]);

    server
        .post("/api/v1/fake/orders/ord-1/charge")
        .json(&charge_body())
        .await
        .assert_status_ok();

    let response = server
        .post("/api/v1/fake/orders/ord-1/charge")
        .json(&charge_body())
        .expect_failure()
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let error: ErrorResponse = response.json();
    assert_eq!(error.kind, "invalid_request");
    assert_eq!(gateway.charges.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_charge_requires_handles() {
    let (server, gateway, _) = harness(ChargeOutcome::Succeed, vec![order("ord-1")]);

    let response = server
        .post("/api/v1/fake/orders/ord-1/charge")
        .json(&json!({ "fake_payment_id": "P1" }))
        .expect_failure()
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let error: ErrorResponse = response.json();
    assert!(error.error.contains("fake_user_id"));
    assert!(gateway.charges.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_charge_unknown_order() {
    let (server, _, _) = harness(ChargeOutcome::Succeed, vec![]);

    let response = server
        .post("/api/v1/fake/orders/ord-404/charge")
        .json(&charge_body())
        .expect_failure()
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let error: ErrorResponse = response.json();
    assert_eq!(error.kind, "order_not_found");
}

#[tokio::test]
async fn test_amount_mismatch_leaves_order_pending() {
    let (server, _, state) = harness(ChargeOutcome::Mismatch, vec![order("ord-1")]);

    let response = server
        .post("/api/v1/fake/orders/ord-1/charge")
        .json(&charge_body())
        .expect_failure()
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let error: ErrorResponse = response.json();
    assert_eq!(error.kind, "amount_mismatch");
    assert_eq!(
        state.orders.get("ord-1").await.unwrap().payment_state,
        PaymentState::Pending
    );
}

#[tokio::test]
async fn test_capture_failure_is_bad_gateway() {
    let (server, _, _) = harness(ChargeOutcome::CaptureFails, vec![order("ord-1")]);

    let response = server
        .post("/api/v1/fake/orders/ord-1/charge")
        .json(&charge_body())
        .expect_failure()
        .await;
    response.assert_status(StatusCode::BAD_GATEWAY);

    let error: ErrorResponse = response.json();
    assert_eq!(error.kind, "capture_failed");
    assert_eq!(error.code, 502);
}

#[tokio::test]
async fn test_concurrent_charges_capture_once() {
    let (server, gateway, state) = harness(ChargeOutcome::SlowSucceed, vec![order("ord-1")]);

    let (first, second) = tokio::join!(
        async {
            server
                .post("/api/v1/fake/orders/ord-1/charge")
                .json(&json!({ "fake_payment_id": "P1", "fake_user_id": "U1" }))
                .await
        },
        async {
            server
                .post("/api/v1/fake/orders/ord-1/charge")
                .json(&json!({ "fake_payment_id": "P2", "fake_user_id": "U2" }))
                .await
        },
    );

    let mut statuses = vec![first.status_code(), second.status_code()];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::OK, StatusCode::CONFLICT]);

    let rejected = if first.status_code() == StatusCode::CONFLICT {
        first
    } else {
        second
    };
    let error: ErrorResponse = rejected.json();
    assert_eq!(error.kind, "charge_in_progress");

    assert_eq!(gateway.charges.lock().unwrap().len(), 1);
    assert_eq!(
        state.orders.get("ord-1").await.unwrap().payment_state,
        PaymentState::Paid
    );
}

#[tokio::test]
async fn test_capture_failure_holds_order_in_processing() {
    let (server, gateway, state) = harness(ChargeOutcome::CaptureFails, vec![order("ord-1")]);

    server
        .post("/api/v1/fake/orders/ord-1/charge")
        .json(&charge_body())
        .expect_failure()
        .await
        .assert_status(StatusCode::BAD_GATEWAY);
    assert_eq!(
        state.orders.get("ord-1").await.unwrap().payment_state,
        PaymentState::Processing
    );

    // A retry must not capture again while the outcome is unknown
    let response = server
        .post("/api/v1/fake/orders/ord-1/charge")
        .json(&charge_body())
        .expect_failure()
        .await;
    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(gateway.charges.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_rejected_handles_release_the_order() {
    let (server, _, state) = harness(ChargeOutcome::Succeed, vec![order("ord-1")]);

    server
        .post("/api/v1/fake/orders/ord-1/charge")
        .json(&json!({ "fake_payment_id": "P1" }))
        .expect_failure()
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        state.orders.get("ord-1").await.unwrap().payment_state,
        PaymentState::Pending
    );

    server
        .post("/api/v1/fake/orders/ord-1/charge")
        .json(&charge_body())
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_refund() {
    let (server, gateway, _) = harness(ChargeOutcome::Succeed, vec![]);

    let response = server
        .post("/api/v1/fake/refunds")
        .json(&json!({ "transaction_id": "SALE-1", "amount": 1000, "currency": "EUR" }))
        .await;
    response.assert_status_ok();

    let refund: RefundResponse = response.json();
    assert_eq!(refund.refund_id, "REF-SALE-1");
    assert_eq!(
        gateway.refunds.lock().unwrap().as_slice(),
        &[("SALE-1".to_string(), 1000, Currency::EUR)]
    );
}

#[tokio::test]
async fn test_refund_requires_transaction_id() {
    let (server, gateway, _) = harness(ChargeOutcome::Succeed, vec![]);

    server
        .post("/api/v1/fake/refunds")
        .json(&json!({ "transaction_id": "", "amount": 1000, "currency": "EUR" }))
        .expect_failure()
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    assert!(gateway.refunds.lock().unwrap().is_empty());
}
