//! # payrail-paypal
//!
//! PayPal gateway adapter for payrail.
//!
//! Provides [`PayPalProvider`], an implementation of
//! [`payrail_core::Provider`] over the PayPal v1 REST payments API:
//!
//! - **Preauthorize** - creates a pending `sale` payment with redirect URLs
//!   under a create-once checkout experience profile
//! - **Charge** - fetches the approved payment, verifies its amount against
//!   the order, attaches invoice number and item list, then executes it
//! - **Refund** - refunds a captured sale
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use payrail_core::ProviderRegistry;
//! use payrail_paypal::PayPalProvider;
//! use std::sync::Arc;
//!
//! // Reads PAYPAL_CLIENT_ID, PAYPAL_SECRET, PAYPAL_ENV and authenticates
//! let paypal = PayPalProvider::from_env().await?;
//!
//! let registry = ProviderRegistry::new().with_provider(Arc::new(paypal));
//! ```

pub mod client;
pub mod config;
pub mod provider;
pub mod types;

// Re-exports
pub use client::PayPalClient;
pub use config::{PayPalConfig, API_BASE_LIVE, API_BASE_SANDBOX};
pub use provider::{PayPalProvider, PAYPAL_PROVIDER};
pub use types::{Amount, Payment, WebProfile};
