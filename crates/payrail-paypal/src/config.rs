//! # PayPal Configuration
//!
//! Configuration for the PayPal adapter. Credentials come from environment
//! variables or from a TOML/JSON section with the same field names.

use payrail_core::PaymentError;
use serde::Deserialize;
use std::env;

/// Live REST endpoint
pub const API_BASE_LIVE: &str = "https://api.paypal.com";
/// Sandbox REST endpoint
pub const API_BASE_SANDBOX: &str = "https://api.sandbox.paypal.com";

/// PayPal API configuration
#[derive(Clone, Deserialize)]
pub struct PayPalConfig {
    /// REST app client id
    pub client_id: String,

    /// REST app secret
    pub secret: String,

    /// `production`, `sandbox`, or a literal base URL (test servers)
    #[serde(default = "default_env")]
    pub env: String,
}

fn default_env() -> String {
    "sandbox".to_string()
}

impl PayPalConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `PAYPAL_CLIENT_ID`
    /// - `PAYPAL_SECRET`
    ///
    /// Optional: `PAYPAL_ENV` (defaults to `sandbox`)
    pub fn from_env() -> Result<Self, PaymentError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let client_id = env::var("PAYPAL_CLIENT_ID")
            .map_err(|_| PaymentError::Configuration("PAYPAL_CLIENT_ID not set".to_string()))?;

        let secret = env::var("PAYPAL_SECRET")
            .map_err(|_| PaymentError::Configuration("PAYPAL_SECRET not set".to_string()))?;

        let env = env::var("PAYPAL_ENV").unwrap_or_else(|_| default_env());

        let config = Self {
            client_id,
            secret,
            env,
        };
        config.validate()?;
        Ok(config)
    }

    /// Create config with explicit values
    pub fn new(client_id: impl Into<String>, secret: impl Into<String>, env: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            secret: secret.into(),
            env: env.into(),
        }
    }

    /// Reject configurations the adapter cannot start with
    pub fn validate(&self) -> Result<(), PaymentError> {
        if self.client_id.trim().is_empty() || self.secret.trim().is_empty() {
            return Err(PaymentError::Configuration(
                "missing PayPal client_id and/or secret".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve `env` to the REST base URL
    pub fn api_base_url(&self) -> String {
        match self.env.as_str() {
            "production" => API_BASE_LIVE.to_string(),
            "sandbox" | "" => API_BASE_SANDBOX.to_string(),
            url => url.trim_end_matches('/').to_string(),
        }
    }

    pub fn is_live_mode(&self) -> bool {
        self.env == "production"
    }
}

impl std::fmt::Debug for PayPalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayPalConfig")
            .field("client_id", &self.client_id)
            .field("secret", &"<redacted>")
            .field("env", &self.env)
            .finish()
    }
}
