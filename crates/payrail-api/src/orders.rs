//! # Order Book
//!
//! Authoritative order records the charge route reads amounts from.
//! Loaded from a TOML file of `[[orders]]` tables.

use payrail_core::{Order, PaymentState};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::RwLock;
use tracing::{info, warn};

#[derive(Debug, Default, Deserialize)]
struct OrderFile {
    #[serde(default)]
    orders: Vec<Order>,
}

/// Outcome of [`OrderBook::begin_charge`]
#[derive(Debug, Clone)]
pub enum ChargeClaim {
    /// The order moved to `processing`; carries the order as it was before
    Claimed(Order),
    /// Another charge holds the order, or its capture outcome is unknown
    InProgress,
    /// The order is in a state that cannot be charged
    NotChargeable(PaymentState),
    NotFound,
}

/// In-memory order store keyed by order id
#[derive(Debug, Default)]
pub struct OrderBook {
    orders: RwLock<HashMap<String, Order>>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_orders(orders: impl IntoIterator<Item = Order>) -> Self {
        let orders = orders.into_iter().map(|o| (o.id.clone(), o)).collect();
        Self {
            orders: RwLock::new(orders),
        }
    }

    /// Parse an order file
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let file: OrderFile = toml::from_str(content)?;
        Ok(Self::from_orders(file.orders))
    }

    /// Load orders from `path`. A missing file yields an empty book.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let file: OrderFile = toml::from_str(&content)
                    .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;
                info!("Loaded {} orders from {}", file.orders.len(), path.display());
                Ok(Self::from_orders(file.orders))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("No order file at {}, using empty order book", path.display());
                Ok(Self::new())
            }
            Err(e) => Err(anyhow::anyhow!("Failed to read {}: {}", path.display(), e)),
        }
    }

    pub async fn get(&self, order_id: &str) -> Option<Order> {
        self.orders.read().await.get(order_id).cloned()
    }

    pub async fn insert(&self, order: Order) {
        self.orders.write().await.insert(order.id.clone(), order);
    }

    /// Record the outcome of a charge. Returns false for unknown orders.
    pub async fn set_payment_state(&self, order_id: &str, state: PaymentState) -> bool {
        match self.orders.write().await.get_mut(order_id) {
            Some(order) => {
                order.payment_state = state;
                true
            }
            None => false,
        }
    }

    /// Claim an order for a charge. The check and the move to `processing`
    /// happen under one write lock, so at most one charge runs per order.
    pub async fn begin_charge(&self, order_id: &str) -> ChargeClaim {
        let mut orders = self.orders.write().await;
        let Some(order) = orders.get_mut(order_id) else {
            return ChargeClaim::NotFound;
        };

        match order.payment_state {
            PaymentState::Processing => ChargeClaim::InProgress,
            _ if order.is_chargeable() => {
                let claimed = order.clone();
                order.payment_state = PaymentState::Processing;
                ChargeClaim::Claimed(claimed)
            }
            state => ChargeClaim::NotChargeable(state),
        }
    }

    /// Hand a claimed order back in `previous` state after a charge that
    /// moved no money. Only an order still in `processing` is touched.
    pub async fn release_charge(&self, order_id: &str, previous: PaymentState) {
        if let Some(order) = self.orders.write().await.get_mut(order_id) {
            if order.payment_state == PaymentState::Processing {
                order.payment_state = previous;
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.orders.read().await.is_empty()
    }
}
