//! # Request Handlers
//!
//! Axum request handlers for the payment API. Each handler resolves the
//! provider named in the path, builds a per-request context from the raw
//! body and delegates to the provider's factories.

use crate::orders::ChargeClaim;
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use payrail_core::{Currency, FailureClass, PaymentError, PaymentState, PreauthorizationResult};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, instrument, warn};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Preauthorize request
#[derive(Debug, Deserialize)]
pub struct PreauthorizeRequest {
    /// Amount in minor units
    pub amount: u64,
    pub currency: Currency,
    #[serde(default)]
    pub description: String,
}

/// Charge request. The provider reads its own handles from the same body.
#[derive(Debug, Default, Deserialize)]
pub struct ChargeRequest {
    /// Overrides the invoice number recorded on the order
    #[serde(default)]
    pub invoice_number: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChargeResponse {
    pub order_id: String,
    /// Gateway execution id
    pub transaction_id: String,
    pub payment_state: PaymentState,
}

/// Refund request
#[derive(Debug, Deserialize)]
pub struct RefundRequest {
    pub transaction_id: String,
    /// Amount in minor units
    pub amount: u64,
    pub currency: Currency,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefundResponse {
    pub refund_id: String,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Stable machine-readable error kind
    pub kind: String,
    pub code: u16,
}

// =============================================================================
// Errors
// =============================================================================

/// Handler error, rendered as [`ErrorResponse`]
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("A charge for order {0} is already in progress")]
    ChargeInProgress(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::OrderNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::ChargeInProgress(_) => StatusCode::CONFLICT,
            ApiError::Payment(err) => match err {
                PaymentError::InvalidRequest(_) | PaymentError::AmountMismatch { .. } => {
                    StatusCode::BAD_REQUEST
                }
                PaymentError::UnknownProvider(_) => StatusCode::NOT_FOUND,
                PaymentError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_GATEWAY,
            },
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::OrderNotFound(_) => "order_not_found",
            ApiError::ChargeInProgress(_) => "charge_in_progress",
            ApiError::Payment(err) => err.kind(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(kind = self.kind(), "Request failed: {}", DisplayChain(&self));
        } else {
            warn!(kind = self.kind(), "Request rejected: {}", self);
        }

        let body = ErrorResponse {
            error: self.to_string(),
            kind: self.kind().to_string(),
            code: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}

/// Renders an error followed by its source chain
struct DisplayChain<'a>(&'a (dyn std::error::Error + 'static));

impl std::fmt::Display for DisplayChain<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)?;
        let mut source = self.0.source();
        while let Some(cause) = source {
            write!(f, ": {}", cause)?;
            source = cause.source();
        }
        Ok(())
    }
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        ApiError::Payment(PaymentError::InvalidRequest(format!(
            "invalid request body: {}",
            e
        )))
    })
}

fn request_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "payrail",
        "version": env!("CARGO_PKG_VERSION"),
        "providers": state.registry.providers(),
    }))
}

/// Create a pending payment the buyer approves with the provider
#[instrument(skip(state, body), fields(request_id = tracing::field::Empty))]
pub async fn preauthorize(
    State(state): State<AppState>,
    Path(provider_name): Path<String>,
    body: Bytes,
) -> Result<Json<PreauthorizationResult>, ApiError> {
    let request_id = request_id();
    tracing::Span::current().record("request_id", request_id.as_str());

    let provider = state.provider(&provider_name)?;
    let request: PreauthorizeRequest = parse_body(&body)?;

    let ctx = state.request_context(&request_id, &body);
    let preauthorizer = provider.new_preauthorizer(&ctx).await?;
    let result = preauthorizer
        .preauthorize(request.amount, request.currency, &request.description)
        .await?;

    info!("Preauthorized {} payment: id={}", provider_name, result.id);
    Ok(Json(result))
}

/// Verify and capture an approved payment for a recorded order
#[instrument(skip(state, body), fields(request_id = tracing::field::Empty))]
pub async fn charge(
    State(state): State<AppState>,
    Path((provider_name, order_id)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<ChargeResponse>, ApiError> {
    let request_id = request_id();
    tracing::Span::current().record("request_id", request_id.as_str());

    let provider = state.provider(&provider_name)?;
    let request: ChargeRequest = parse_body(&body)?;

    let order = match state.orders.begin_charge(&order_id).await {
        ChargeClaim::Claimed(order) => order,
        ChargeClaim::InProgress => return Err(ApiError::ChargeInProgress(order_id)),
        ChargeClaim::NotChargeable(payment_state) => {
            return Err(PaymentError::InvalidRequest(format!(
                "order {} is not chargeable (payment state {:?})",
                order_id, payment_state
            ))
            .into())
        }
        ChargeClaim::NotFound => return Err(ApiError::OrderNotFound(order_id)),
    };
    let invoice_number = request.invoice_number.unwrap_or(order.invoice_number);

    let ctx = state.request_context(&request_id, &body);
    let charged = match provider.new_charger(&ctx).await {
        // Amount and currency always come from the order record
        Ok(charger) => {
            charger
                .charge(order.total, order.currency, &order, invoice_number)
                .await
        }
        Err(err) => Err(err),
    };

    let transaction_id = match charged {
        Ok(transaction_id) => transaction_id,
        Err(err) if err.class() == FailureClass::Reconcile => {
            // Capture outcome unknown; the order stays in processing
            error!(
                "Order {} left in processing pending reconciliation: {}",
                order.id, err
            );
            return Err(err.into());
        }
        Err(err) => {
            state
                .orders
                .release_charge(&order.id, order.payment_state)
                .await;
            return Err(err.into());
        }
    };

    state
        .orders
        .set_payment_state(&order.id, PaymentState::Paid)
        .await;
    info!(
        "Charged order {} via {}: transaction_id={}",
        order.id, provider_name, transaction_id
    );

    Ok(Json(ChargeResponse {
        order_id: order.id,
        transaction_id,
        payment_state: PaymentState::Paid,
    }))
}

/// Refund a captured transaction
#[instrument(skip(state, body), fields(request_id = tracing::field::Empty))]
pub async fn refund(
    State(state): State<AppState>,
    Path(provider_name): Path<String>,
    body: Bytes,
) -> Result<Json<RefundResponse>, ApiError> {
    let request_id = request_id();
    tracing::Span::current().record("request_id", request_id.as_str());

    let provider = state.provider(&provider_name)?;
    let request: RefundRequest = parse_body(&body)?;
    if request.transaction_id.is_empty() {
        return Err(PaymentError::InvalidRequest("transaction_id is required".to_string()).into());
    }

    let ctx = state.request_context(&request_id, &body);
    let refunder = provider.new_refunder(&ctx).await?;
    let refund_id = refunder
        .refund(&request.transaction_id, request.amount, request.currency)
        .await?;

    Ok(Json(RefundResponse { refund_id }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use payrail_core::GatewayError;

    fn status_of(err: PaymentError) -> StatusCode {
        ApiError::from(err).status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_of(PaymentError::InvalidRequest("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(PaymentError::AmountMismatch {
                expected_total: "50.00".into(),
                expected_currency: "USD".into(),
                actual_total: "49.99".into(),
                actual_currency: "USD".into(),
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(PaymentError::UnknownProvider("x".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(PaymentError::Configuration("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(PaymentError::CaptureFailed {
                payment_id: "PAY-1".into(),
                source: GatewayError::Network("reset".into()),
            }),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::OrderNotFound("ord-1".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::ChargeInProgress("ord-1".into()).status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_display_chain_includes_source() {
        let err = ApiError::from(PaymentError::RefundFailed {
            transaction_id: "SALE-1".into(),
            source: GatewayError::Network("connection reset".into()),
        });
        let rendered = DisplayChain(&err).to_string();

        assert!(rendered.contains("SALE-1"));
        assert!(rendered.contains("connection reset"));
    }
}
