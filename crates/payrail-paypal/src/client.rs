//! # PayPal REST Client
//!
//! Thin async client over the v1 payments API. Each method maps to one
//! gateway call and returns the raw [`GatewayError`] on failure; the provider
//! decides which taxonomy kind that failure becomes.

use crate::config::PayPalConfig;
use crate::types::{
    AccessTokenResponse, Amount, CreatePaymentRequest, ErrorResponse, ExecutePaymentRequest,
    OAuthErrorResponse, PatchOperation, Payment, RefundRequest, ResourceRef, WebProfile,
    WebProfileRequest,
};
use chrono::{DateTime, Duration, Utc};
use payrail_core::{GatewayError, PaymentError, PaymentResult};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument};

/// Refresh the token this long before PayPal says it expires
const TOKEN_EXPIRY_SKEW_SECS: i64 = 60;

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_fresh(&self) -> bool {
        Utc::now() + Duration::seconds(TOKEN_EXPIRY_SKEW_SECS) < self.expires_at
    }
}

/// PayPal REST client with a cached OAuth access token
pub struct PayPalClient {
    config: PayPalConfig,
    base_url: String,
    http: Client,
    token: Mutex<Option<AccessToken>>,
}

impl PayPalClient {
    /// Build the HTTP client. Makes no network call.
    pub fn new(config: PayPalConfig) -> PaymentResult<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| PaymentError::Configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.api_base_url(),
            config,
            http,
            token: Mutex::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Obtain a fresh access token, replacing any cached one
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn authorize(&self) -> Result<(), GatewayError> {
        let mut guard = self.token.lock().await;
        *guard = Some(self.fetch_token().await?);
        info!("Authorized with PayPal");
        Ok(())
    }

    /// Current access token, refreshed under the lock when stale
    async fn access_token(&self) -> Result<String, GatewayError> {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.value.clone());
        }

        debug!("Refreshing PayPal access token");
        let token = self.fetch_token().await?;
        let value = token.value.clone();
        *guard = Some(token);
        Ok(value)
    }

    async fn fetch_token(&self) -> Result<AccessToken, GatewayError> {
        let url = format!("{}/v1/oauth2/token", self.base_url);

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.config.client_id, Some(&self.config.secret))
            .header("Accept", "application/json")
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        if !status.is_success() {
            error!("PayPal token request failed: status={}", status);
            let message = match serde_json::from_str::<OAuthErrorResponse>(&body) {
                Ok(err) => format!(
                    "{}: {}",
                    err.error,
                    err.error_description.unwrap_or_default()
                ),
                Err(_) => format!("HTTP {}", status),
            };
            return Err(GatewayError::Auth(message));
        }

        let token: AccessTokenResponse = serde_json::from_str(&body)
            .map_err(|e| GatewayError::Decode(format!("token response: {}", e)))?;

        Ok(AccessToken {
            expires_at: token_expiry(Utc::now(), token.expires_in)?,
            value: token.access_token,
        })
    }

    /// Attach auth, send, and return the body of a successful response
    async fn send(&self, request: RequestBuilder) -> Result<String, GatewayError> {
        let token = self.access_token().await?;

        let response = request
            .bearer_auth(token)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        if status.is_success() {
            return Ok(body);
        }

        // Parse PayPal error
        if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&body) {
            error!(
                status = status.as_u16(),
                name = %error_response.name,
                debug_id = ?error_response.debug_id,
                "PayPal API error: {}",
                error_response.describe()
            );
            return Err(GatewayError::Status {
                status: status.as_u16(),
                message: error_response.describe(),
                name: Some(error_response.name),
                debug_id: error_response.debug_id,
            });
        }

        error!("PayPal API error: status={}, body={}", status, body);
        Err(GatewayError::Status {
            status: status.as_u16(),
            name: None,
            message: if body.is_empty() {
                format!("HTTP {}", status)
            } else {
                body
            },
            debug_id: None,
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, GatewayError> {
        let body = self.send(request).await?;
        serde_json::from_str(&body).map_err(|e| GatewayError::Decode(e.to_string()))
    }

    /// `GET /v1/payments/payment/{id}`
    pub async fn get_payment(&self, payment_id: &str) -> Result<Payment, GatewayError> {
        let url = format!("{}/v1/payments/payment/{}", self.base_url, payment_id);
        self.send_json(self.http.get(&url)).await
    }

    /// `PATCH /v1/payments/payment/{id}`
    pub async fn patch_payment(
        &self,
        payment_id: &str,
        operations: &[PatchOperation],
    ) -> Result<(), GatewayError> {
        let url = format!("{}/v1/payments/payment/{}", self.base_url, payment_id);
        self.send(self.http.patch(&url).json(operations)).await?;
        Ok(())
    }

    /// `POST /v1/payments/payment/{id}/execute`, returns the executed payment id
    pub async fn execute_payment(&self, payment_id: &str, payer_id: &str) -> Result<String, GatewayError> {
        let url = format!("{}/v1/payments/payment/{}/execute", self.base_url, payment_id);
        let executed: ResourceRef = self
            .send_json(self.http.post(&url).json(&ExecutePaymentRequest { payer_id }))
            .await?;
        debug!(state = ?executed.state, "Executed payment {}", executed.id);
        Ok(executed.id)
    }

    /// `POST /v1/payments/sale/{id}/refund`, returns the refund id
    pub async fn refund_sale(&self, sale_id: &str, amount: Amount) -> Result<String, GatewayError> {
        let url = format!("{}/v1/payments/sale/{}/refund", self.base_url, sale_id);
        let refund: ResourceRef = self
            .send_json(self.http.post(&url).json(&RefundRequest { amount }))
            .await?;
        debug!(state = ?refund.state, "Created refund {}", refund.id);
        Ok(refund.id)
    }

    /// `POST /v1/payment-experience/web-profiles`
    pub(crate) async fn create_web_profile(
        &self,
        profile: &WebProfileRequest,
    ) -> Result<WebProfile, GatewayError> {
        let url = format!("{}/v1/payment-experience/web-profiles", self.base_url);
        self.send_json(self.http.post(&url).json(profile)).await
    }

    /// `POST /v1/payments/payment`, returns the created payment id
    pub(crate) async fn create_payment(
        &self,
        payment: &CreatePaymentRequest,
    ) -> Result<String, GatewayError> {
        let url = format!("{}/v1/payments/payment", self.base_url);
        let created: ResourceRef = self.send_json(self.http.post(&url).json(payment)).await?;
        debug!(state = ?created.state, "Created payment {}", created.id);
        Ok(created.id)
    }
}

impl std::fmt::Debug for PayPalClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayPalClient")
            .field("base_url", &self.base_url)
            .field("config", &self.config)
            .finish()
    }
}

/// Absolute expiry for a token issued at `now` with a lifetime in seconds
fn token_expiry(now: DateTime<Utc>, expires_in: i64) -> Result<DateTime<Utc>, GatewayError> {
    Duration::try_seconds(expires_in)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or_else(|| GatewayError::Decode(format!("token expires_in out of range: {}", expires_in)))
}
