//! # payrail-core
//!
//! Provider contract and reconciliation logic for the payrail payment layer.
//!
//! This crate provides:
//! - `Provider`, `Charger`, `Refunder`, `Preauthorizer` traits for gateway adapters
//! - `ProviderRegistry` for selecting an adapter by name
//! - `format_amount`, the single minor-units → decimal string codec
//! - `OrderProjection` for the gateway-facing view of an order
//! - `reconcile` for verifying a pending gateway payment before capture
//! - `ExperienceCache` for create-once gateway artifacts
//! - `PaymentError` for typed, classified errors
//!
//! ## Example
//!
//! ```rust,ignore
//! use payrail_core::{ProviderRegistry, RequestContext, SiteConfig};
//!
//! let provider = registry.get("paypal")?;
//! let request = RequestContext::new(request_id, body, SiteConfig::new("https://shop.example.com"));
//!
//! let charger = provider.new_charger(&request).await?;
//! let execution_id = charger
//!     .charge(order.total, order.currency, &order, order.invoice_number)
//!     .await?;
//! ```

pub mod country;
pub mod error;
pub mod experience;
pub mod money;
pub mod order;
pub mod projection;
pub mod provider;
pub mod reconcile;
pub mod registry;

// Re-exports for convenience
pub use error::{FailureClass, GatewayError, PaymentError, PaymentResult};
pub use experience::ExperienceCache;
pub use money::{format_amount, Currency, Money};
pub use order::{Address, LineItem, Order, PaymentState};
pub use projection::{OrderProjection, ProjectedAddress, ProjectedItem};
pub use provider::{
    CallbackUrls, ChargeHandles, Charger, PreauthorizationResult, Preauthorizer, Provider,
    Refunder, RequestContext, SharedProvider, SiteConfig,
};
pub use reconcile::{reconcile, PendingAmount};
pub use registry::ProviderRegistry;
