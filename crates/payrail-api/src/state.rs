//! # Application State
//!
//! Shared state for the Axum application.
//! Contains the provider registry, order book and configuration.

use crate::orders::OrderBook;
use payrail_core::{ProviderRegistry, RequestContext, SharedProvider, SiteConfig};
use payrail_paypal::PayPalProvider;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Public storefront URL, base for provider callback URLs
    pub site_url: String,
    /// Environment (development, staging, production)
    pub environment: String,
    /// TOML file with `[[orders]]`
    pub orders_path: String,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            site_url: std::env::var("SITE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            orders_path: std::env::var("ORDERS_PATH")
                .unwrap_or_else(|_| "config/orders.toml".to_string()),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid socket address {}:{}: {}", self.host, self.port, e))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn site(&self) -> SiteConfig {
        SiteConfig::new(&self.site_url)
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Provider registry, built once at startup
    pub registry: Arc<ProviderRegistry>,
    /// Order records charges are validated against
    pub orders: Arc<OrderBook>,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig, registry: ProviderRegistry, orders: OrderBook) -> Self {
        Self {
            registry: Arc::new(registry),
            orders: Arc::new(orders),
            config,
        }
    }

    /// Build state from the environment.
    ///
    /// PayPal is registered when `PAYPAL_CLIENT_ID` is set; if it is set but
    /// the adapter cannot connect, startup fails.
    pub async fn from_env() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();
        let orders = OrderBook::load(&config.orders_path)?;

        let mut registry = ProviderRegistry::new();
        if std::env::var("PAYPAL_CLIENT_ID").is_ok() {
            let paypal = PayPalProvider::from_env()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to initialize PayPal: {}", e))?;
            registry.register(Arc::new(paypal));
        } else {
            warn!("PAYPAL_CLIENT_ID not set, PayPal provider disabled");
        }

        info!("Payment providers: {:?}", registry.providers());
        Ok(Self::new(config, registry, orders))
    }

    /// Look up a provider by its route name
    pub fn provider(&self, name: &str) -> payrail_core::PaymentResult<&SharedProvider> {
        self.registry.get(name)
    }

    /// Per-request context handed to provider factories
    pub fn request_context(&self, request_id: &str, body: &[u8]) -> RequestContext {
        RequestContext::new(request_id, body.to_vec(), self.config.site())
    }
}
