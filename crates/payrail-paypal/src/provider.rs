//! # PayPal Provider
//!
//! Implements [`Provider`] over the PayPal v1 payments API.
//!
//! ## Flow
//!
//! 1. `preauthorize` creates a pending payment the buyer approves on PayPal
//! 2. The client posts back `paypal_payment_id` + `paypal_user_id`
//! 3. `charge` fetches the payment, reconciles its amount against the order,
//!    attaches the invoice number and item list, then executes it

use crate::client::PayPalClient;
use crate::config::PayPalConfig;
use crate::types::{
    Amount, CreatePaymentRequest, InputFields, ItemList, NewTransaction, Payer, PatchOperation,
    RedirectUrls, WebProfile, WebProfileRequest,
};
use async_trait::async_trait;
use payrail_core::{
    format_amount, reconcile, CallbackUrls, ChargeHandles, Charger, Currency, ExperienceCache,
    GatewayError, Money, Order, OrderProjection, PaymentError, PaymentResult,
    PreauthorizationResult, Preauthorizer, Provider, Refunder, RequestContext,
};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Registry name and request field prefix
pub const PAYPAL_PROVIDER: &str = "paypal";

/// PayPal gateway adapter.
///
/// Cheap to clone; clones share the HTTP client, token and checkout experience.
#[derive(Debug, Clone)]
pub struct PayPalProvider {
    client: Arc<PayPalClient>,
    experience: Arc<ExperienceCache<WebProfile>>,
}

impl PayPalProvider {
    /// Validate the configuration and authenticate once.
    ///
    /// Any failure, including a rejected token request, is a `Configuration`
    /// error: the adapter is never returned half-initialized.
    #[instrument(skip(config), fields(env = %config.env))]
    pub async fn connect(config: PayPalConfig) -> PaymentResult<Self> {
        let client = PayPalClient::new(config)?;

        client.authorize().await.map_err(|e| {
            error!("PayPal authentication failed: {}", e);
            PaymentError::Configuration(format!("error creating paypal client: {}", e))
        })?;

        info!("PayPal provider ready: base_url={}", client.base_url());
        Ok(Self {
            client: Arc::new(client),
            experience: Arc::new(ExperienceCache::new()),
        })
    }

    /// Connect using `PAYPAL_*` environment variables
    pub async fn from_env() -> PaymentResult<Self> {
        Self::connect(PayPalConfig::from_env()?).await
    }

    /// Checkout experience id, if one has been created
    pub fn experience_id(&self) -> Option<&str> {
        self.experience.get().map(|profile| profile.id.as_str())
    }
}

/// Gateway handles end up in URL paths; allow only id-shaped values.
fn ensure_handle(field: &str, value: &str) -> PaymentResult<()> {
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(PaymentError::InvalidRequest(format!(
            "{} contains invalid characters",
            field
        )))
    }
}

#[async_trait]
impl Provider for PayPalProvider {
    fn name(&self) -> &'static str {
        PAYPAL_PROVIDER
    }

    async fn new_charger(&self, request: &RequestContext) -> PaymentResult<Box<dyn Charger>> {
        let handles = request.charge_handles(PAYPAL_PROVIDER)?;
        ensure_handle("paypal_payment_id", &handles.payment_id)?;
        ensure_handle("paypal_user_id", &handles.payer_id)?;

        Ok(Box::new(PayPalCharger {
            client: Arc::clone(&self.client),
            handles,
        }))
    }

    async fn new_refunder(&self, _request: &RequestContext) -> PaymentResult<Box<dyn Refunder>> {
        Ok(Box::new(PayPalRefunder {
            client: Arc::clone(&self.client),
        }))
    }

    async fn new_preauthorizer(
        &self,
        request: &RequestContext,
    ) -> PaymentResult<Box<dyn Preauthorizer>> {
        Ok(Box::new(PayPalPreauthorizer {
            client: Arc::clone(&self.client),
            experience: Arc::clone(&self.experience),
            urls: request.site.callback_urls(PAYPAL_PROVIDER),
        }))
    }
}

/// Charger bound to one approved PayPal payment
struct PayPalCharger {
    client: Arc<PayPalClient>,
    handles: ChargeHandles,
}

#[async_trait]
impl Charger for PayPalCharger {
    #[instrument(
        skip(self, order),
        fields(order_id = %order.id, payment_id = %self.handles.payment_id)
    )]
    async fn charge(
        &self,
        amount: u64,
        currency: Currency,
        order: &Order,
        invoice_number: i64,
    ) -> PaymentResult<String> {
        let payment_id = self.handles.payment_id.as_str();

        let payment = self
            .client
            .get_payment(payment_id)
            .await
            .map_err(|source| {
                if source.is_not_found() {
                    PaymentError::UpstreamNotFound {
                        payment_id: payment_id.to_string(),
                        source,
                    }
                } else {
                    PaymentError::FetchFailed {
                        payment_id: payment_id.to_string(),
                        source,
                    }
                }
            })?;

        if let Err(e) = reconcile(
            payment_id,
            Money::new(amount, currency),
            payment.pending_amounts(),
        ) {
            warn!("Refusing to execute payment: {}", e);
            return Err(e);
        }

        let update_failed = |source: GatewayError| PaymentError::ReconciliationUpdateFailed {
            payment_id: payment_id.to_string(),
            source,
        };

        let item_list = serde_json::to_value(ItemList::from(&OrderProjection::from_order(order)))
            .map_err(|e| update_failed(GatewayError::Decode(e.to_string())))?;
        let patch = [
            PatchOperation::add(
                "/transactions/0/invoice_number",
                serde_json::Value::String(invoice_number.to_string()),
            ),
            PatchOperation::add("/transactions/0/item_list", item_list),
        ];
        self.client
            .patch_payment(payment_id, &patch)
            .await
            .map_err(update_failed)?;

        let execution_id = self
            .client
            .execute_payment(payment_id, &self.handles.payer_id)
            .await
            .map_err(|source| {
                error!("Execute failed after reconciliation; payment state is uncertain");
                PaymentError::CaptureFailed {
                    payment_id: payment_id.to_string(),
                    source,
                }
            })?;

        info!("Charged order {}: execution_id={}", order.id, execution_id);
        Ok(execution_id)
    }
}

struct PayPalRefunder {
    client: Arc<PayPalClient>,
}

#[async_trait]
impl Refunder for PayPalRefunder {
    #[instrument(skip(self))]
    async fn refund(
        &self,
        transaction_id: &str,
        amount: u64,
        currency: Currency,
    ) -> PaymentResult<String> {
        ensure_handle("transaction_id", transaction_id)?;

        let amount = Amount {
            total: format_amount(amount),
            currency: currency.as_str().to_string(),
        };

        let refund_id = self
            .client
            .refund_sale(transaction_id, amount)
            .await
            .map_err(|source| PaymentError::RefundFailed {
                transaction_id: transaction_id.to_string(),
                source,
            })?;

        info!("Refunded sale {}: refund_id={}", transaction_id, refund_id);
        Ok(refund_id)
    }
}

struct PayPalPreauthorizer {
    client: Arc<PayPalClient>,
    experience: Arc<ExperienceCache<WebProfile>>,
    urls: CallbackUrls,
}

#[async_trait]
impl Preauthorizer for PayPalPreauthorizer {
    #[instrument(skip(self, description))]
    async fn preauthorize(
        &self,
        amount: u64,
        currency: Currency,
        description: &str,
    ) -> PaymentResult<PreauthorizationResult> {
        let client = &self.client;
        let profile = self
            .experience
            .get_or_create(|| async move {
                let request = WebProfileRequest {
                    name: format!("payrail-{}", uuid::Uuid::new_v4()),
                    temporary: true,
                    input_fields: InputFields { no_shipping: 1 },
                };
                let profile = client.create_web_profile(&request).await?;
                info!("Created PayPal experience profile: id={}", profile.id);
                Ok::<_, GatewayError>(profile)
            })
            .await?;

        let request = CreatePaymentRequest {
            intent: "sale",
            payer: Payer {
                payment_method: "paypal",
            },
            experience_profile_id: profile.id.clone(),
            transactions: vec![NewTransaction {
                amount: Amount {
                    total: format_amount(amount),
                    currency: currency.as_str().to_string(),
                },
                description: description.to_string(),
            }],
            redirect_urls: RedirectUrls {
                return_url: self.urls.return_url.clone(),
                cancel_url: self.urls.cancel_url.clone(),
            },
        };

        let id = self
            .client
            .create_payment(&request)
            .await
            .map_err(PaymentError::PreauthorizationFailed)?;

        info!("Preauthorized payment: id={}", id);
        Ok(PreauthorizationResult { id })
    }
}
