//! PayPal REST API (v1 payments) wire types.

use payrail_core::{OrderProjection, PendingAmount, ProjectedAddress, ProjectedItem};
use serde::{Deserialize, Serialize};

// =============================================================================
// OAuth
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct AccessTokenResponse {
    pub access_token: String,
    /// Lifetime in seconds
    pub expires_in: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OAuthErrorResponse {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

// =============================================================================
// Payments
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Amount {
    pub total: String,
    pub currency: String,
}

impl From<Amount> for PendingAmount {
    fn from(amount: Amount) -> Self {
        PendingAmount::new(amount.total, amount.currency)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub amount: Option<Amount>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub invoice_number: Option<String>,
}

/// A payment resource as returned by `GET /v1/payments/payment/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct Payment {
    pub id: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl Payment {
    /// Per-transaction amounts in the shape the reconciler expects
    pub fn pending_amounts(&self) -> Vec<Option<PendingAmount>> {
        self.transactions
            .iter()
            .map(|t| t.amount.clone().map(PendingAmount::from))
            .collect()
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CreatePaymentRequest {
    pub intent: &'static str,
    pub payer: Payer,
    pub experience_profile_id: String,
    pub transactions: Vec<NewTransaction>,
    pub redirect_urls: RedirectUrls,
}

#[derive(Debug, Serialize)]
pub(crate) struct Payer {
    pub payment_method: &'static str,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewTransaction {
    pub amount: Amount,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct RedirectUrls {
    pub return_url: String,
    pub cancel_url: String,
}

/// Minimal view of a created, executed or refunded resource
#[derive(Debug, Deserialize)]
pub(crate) struct ResourceRef {
    pub id: String,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExecutePaymentRequest<'a> {
    pub payer_id: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct RefundRequest {
    pub amount: Amount,
}

// =============================================================================
// Patch
// =============================================================================

/// One JSON Patch operation against a payment resource
#[derive(Debug, Clone, Serialize)]
pub struct PatchOperation {
    pub op: &'static str,
    pub path: String,
    pub value: serde_json::Value,
}

impl PatchOperation {
    pub fn add(path: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            op: "add",
            path: path.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemList {
    pub items: Vec<Item>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<ShippingAddress>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Item {
    pub quantity: String,
    pub name: String,
    pub price: String,
    pub currency: String,
    pub sku: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShippingAddress {
    pub recipient_name: String,
    pub line1: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub line2: String,
    pub city: String,
    pub country_code: String,
    pub postal_code: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub state: String,
}

impl From<&ProjectedItem> for Item {
    fn from(item: &ProjectedItem) -> Self {
        Self {
            quantity: item.quantity.to_string(),
            name: item.name.clone(),
            price: item.price.clone(),
            currency: item.currency.as_str().to_string(),
            sku: item.sku.clone(),
            description: item.description.clone(),
            tax: item.tax.clone(),
        }
    }
}

impl From<&ProjectedAddress> for ShippingAddress {
    fn from(addr: &ProjectedAddress) -> Self {
        Self {
            recipient_name: addr.recipient_name.clone(),
            line1: addr.line1.clone(),
            line2: addr.line2.clone(),
            city: addr.city.clone(),
            country_code: addr.country_code.to_string(),
            postal_code: addr.postal_code.clone(),
            state: addr.state.clone(),
        }
    }
}

impl From<&OrderProjection> for ItemList {
    fn from(projection: &OrderProjection) -> Self {
        Self {
            items: projection.items.iter().map(Item::from).collect(),
            shipping_address: projection.shipping_address.as_ref().map(ShippingAddress::from),
        }
    }
}

// =============================================================================
// Experience profiles
// =============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct WebProfileRequest {
    pub name: String,
    pub temporary: bool,
    pub input_fields: InputFields,
}

#[derive(Debug, Serialize)]
pub(crate) struct InputFields {
    pub no_shipping: u8,
}

/// Checkout experience profile created once per adapter
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct WebProfile {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    pub name: String,
    pub message: String,
    #[serde(default)]
    pub debug_id: Option<String>,
    #[serde(default)]
    pub details: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorDetail {
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub issue: Option<String>,
}

impl ErrorResponse {
    /// Message plus field-level details, one line
    pub fn describe(&self) -> String {
        let details: Vec<String> = self
            .details
            .iter()
            .map(|d| {
                format!(
                    "{}: {}",
                    d.field.as_deref().unwrap_or("-"),
                    d.issue.as_deref().unwrap_or("-")
                )
            })
            .collect();
        if details.is_empty() {
            self.message.clone()
        } else {
            format!("{} ({})", self.message, details.join("; "))
        }
    }
}
