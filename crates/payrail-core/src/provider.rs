//! # Payment Provider Contract
//!
//! The capability set every gateway adapter implements. Callers hold an
//! `Arc<dyn Provider>` and never see a concrete adapter type.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Provider (trait)                       │
//! │  ├── name()                                                 │
//! │  ├── new_charger(request)        -> Box<dyn Charger>        │
//! │  ├── new_refunder(request)       -> Box<dyn Refunder>       │
//! │  └── new_preauthorizer(request)  -> Box<dyn Preauthorizer>  │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!                    ┌───────┴───────┐
//!                    │ PayPalProvider│
//!                    └───────────────┘
//! ```
//!
//! Factories are called once per inbound request. They parse whatever
//! request-scoped data the gateway needs and return a callable bound to it.

use crate::error::{PaymentError, PaymentResult};
use crate::money::Currency;
use crate::order::Order;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Site configuration the host supplies with every request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    /// Public base URL of the storefront (e.g. "https://shop.example.com")
    pub site_url: String,
}

impl SiteConfig {
    pub fn new(site_url: impl Into<String>) -> Self {
        let mut site_url: String = site_url.into();
        while site_url.ends_with('/') {
            site_url.pop();
        }
        Self { site_url }
    }

    /// Return and cancel URLs for a provider's interactive approval step
    pub fn callback_urls(&self, provider: &str) -> CallbackUrls {
        let return_url = format!("{}/gocommerce/{}", self.site_url, provider);
        let cancel_url = format!("{}/cancel", return_url);
        CallbackUrls {
            return_url,
            cancel_url,
        }
    }
}

/// Redirect targets after the buyer approves or cancels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackUrls {
    pub return_url: String,
    pub cancel_url: String,
}

/// Everything a factory may read from the inbound request
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Correlation id for logs
    pub request_id: String,
    /// Raw JSON body submitted by the client
    pub body: Vec<u8>,
    pub site: SiteConfig,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>, body: impl Into<Vec<u8>>, site: SiteConfig) -> Self {
        Self {
            request_id: request_id.into(),
            body: body.into(),
            site,
        }
    }

    /// Parse the gateway payment handle and payer handle from the body.
    ///
    /// Expects `{"<provider>_payment_id": "...", "<provider>_user_id": "..."}`.
    /// Both must be present and non-empty.
    pub fn charge_handles(&self, provider: &str) -> PaymentResult<ChargeHandles> {
        let body: serde_json::Value = serde_json::from_slice(&self.body).map_err(|e| {
            PaymentError::InvalidRequest(format!("request body is not valid JSON: {}", e))
        })?;

        let payment_key = format!("{}_payment_id", provider);
        let payer_key = format!("{}_user_id", provider);
        let field = |key: &str| {
            body.get(key)
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(String::from)
        };

        match (field(&payment_key), field(&payer_key)) {
            (Some(payment_id), Some(payer_id)) => Ok(ChargeHandles {
                payment_id,
                payer_id,
            }),
            _ => Err(PaymentError::InvalidRequest(format!(
                "payments require a {} and {} pair",
                payment_key, payer_key
            ))),
        }
    }
}

/// Gateway-issued handles captured when a charger is created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeHandles {
    pub payment_id: String,
    pub payer_id: String,
}

/// Result of a successful preauthorization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreauthorizationResult {
    /// Gateway payment id the client completes interactively
    pub id: String,
}

/// Charges an order against a pending gateway payment
#[async_trait]
pub trait Charger: Send + Sync {
    /// Verify and capture. Returns the gateway's execution id.
    ///
    /// `amount` and `currency` must come from the authoritative order record.
    async fn charge(
        &self,
        amount: u64,
        currency: Currency,
        order: &Order,
        invoice_number: i64,
    ) -> PaymentResult<String>;
}

/// Refunds a captured transaction
#[async_trait]
pub trait Refunder: Send + Sync {
    /// Returns the gateway refund id.
    ///
    /// The amount is not verified locally; the caller is trusted to pass the
    /// captured amount (or less).
    async fn refund(
        &self,
        transaction_id: &str,
        amount: u64,
        currency: Currency,
    ) -> PaymentResult<String>;
}

/// Creates a pending payment for the buyer to approve
#[async_trait]
pub trait Preauthorizer: Send + Sync {
    async fn preauthorize(
        &self,
        amount: u64,
        currency: Currency,
        description: &str,
    ) -> PaymentResult<PreauthorizationResult>;
}

/// Core trait for payment gateway adapters.
///
/// Adapters are long-lived and shared across concurrent requests.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider name (for logging, routing and request field prefixes)
    fn name(&self) -> &'static str;

    /// Bind a charger to this request. Fails with `InvalidRequest` if the
    /// request lacks the gateway handles; no network call is made.
    async fn new_charger(&self, request: &RequestContext) -> PaymentResult<Box<dyn Charger>>;

    async fn new_refunder(&self, request: &RequestContext) -> PaymentResult<Box<dyn Refunder>>;

    async fn new_preauthorizer(
        &self,
        request: &RequestContext,
    ) -> PaymentResult<Box<dyn Preauthorizer>>;
}

/// Type alias for a shared provider (dynamic dispatch)
pub type SharedProvider = Arc<dyn Provider>;

#[cfg(test)]
mod tests {
    use super::*;

    fn request(body: &str) -> RequestContext {
        RequestContext::new("req-1", body.as_bytes().to_vec(), SiteConfig::new("https://shop.test"))
    }

    #[test]
    fn test_callback_urls() {
        let site = SiteConfig::new("https://shop.test/");
        let urls = site.callback_urls("paypal");

        assert_eq!(urls.return_url, "https://shop.test/gocommerce/paypal");
        assert_eq!(urls.cancel_url, "https://shop.test/gocommerce/paypal/cancel");
    }

    #[test]
    fn test_charge_handles_parsed() {
        let handles = request(r#"{"paypal_payment_id": "PAY-1", "paypal_user_id": "PAYER-9"}"#)
            .charge_handles("paypal")
            .unwrap();

        assert_eq!(handles.payment_id, "PAY-1");
        assert_eq!(handles.payer_id, "PAYER-9");
    }

    #[test]
    fn test_charge_handles_require_both_fields() {
        for body in [
            r#"{"paypal_payment_id": "PAY-1"}"#,
            r#"{"paypal_user_id": "PAYER-9"}"#,
            r#"{"paypal_payment_id": "", "paypal_user_id": "PAYER-9"}"#,
            r#"{}"#,
        ] {
            let err = request(body).charge_handles("paypal").unwrap_err();
            assert!(matches!(err, PaymentError::InvalidRequest(_)), "{}", body);
        }
    }

    #[test]
    fn test_charge_handles_are_provider_prefixed() {
        let err = request(r#"{"stripe_payment_id": "x", "stripe_user_id": "y"}"#)
            .charge_handles("paypal")
            .unwrap_err();
        assert!(err.to_string().contains("paypal_payment_id"));
    }

    #[test]
    fn test_malformed_body() {
        let err = request("not json").charge_handles("paypal").unwrap_err();
        assert!(matches!(err, PaymentError::InvalidRequest(_)));
    }
}
