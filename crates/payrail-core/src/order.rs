//! # Order Types
//!
//! Read-only view of the order aggregate as the payment layer sees it.
//! Orders are owned by the order-management side (the host's order book);
//! providers only read them.

use crate::money::{Currency, Money};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Payment state of an order, as recorded upstream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentState {
    #[default]
    Pending,
    /// A charge is in flight, or its capture outcome is unknown
    Processing,
    Paid,
    Failed,
    Refunded,
}

/// A postal address attached to an order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Recipient name
    pub name: String,

    pub address1: String,

    #[serde(default)]
    pub address2: String,

    pub city: String,

    /// Region, state or province
    #[serde(default)]
    pub state: String,

    /// Postal code
    pub zip: String,

    /// Country name in plain English (e.g. "United States")
    pub country: String,
}

/// A line item in an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub sku: String,

    /// Display title
    pub title: String,

    #[serde(default)]
    pub description: String,

    pub quantity: u64,

    /// Unit price in minor units
    pub price: u64,

    /// Fixed tax rate in percent, 0 when the item has none
    #[serde(default)]
    pub vat: u32,
}

impl LineItem {
    pub fn new(sku: impl Into<String>, title: impl Into<String>, price: u64, quantity: u64) -> Self {
        Self {
            sku: sku.into(),
            title: title.into(),
            description: String::new(),
            quantity,
            price,
            vat: 0,
        }
    }

    /// Builder: set description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder: set a fixed tax rate in percent
    pub fn with_vat(mut self, vat: u32) -> Self {
        self.vat = vat;
        self
    }

    /// Fixed tax rate, if the item defines one
    pub fn fixed_vat(&self) -> Option<u32> {
        (self.vat > 0).then_some(self.vat)
    }

    /// Line total in minor units
    pub fn total(&self) -> u64 {
        self.price.saturating_mul(self.quantity)
    }
}

/// An order as handed to a charge flow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,

    pub currency: Currency,

    /// Amount to charge, in minor units (subtotal + taxes + shipping)
    pub total: u64,

    #[serde(default)]
    pub subtotal: u64,

    #[serde(default)]
    pub taxes: u64,

    /// Invoice number assigned upstream, 0 until assigned
    #[serde(default)]
    pub invoice_number: i64,

    #[serde(default)]
    pub line_items: Vec<LineItem>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<Address>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<Address>,

    #[serde(default)]
    pub payment_state: PaymentState,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Create an empty pending order
    pub fn new(id: impl Into<String>, currency: Currency) -> Self {
        Self {
            id: id.into(),
            currency,
            total: 0,
            subtotal: 0,
            taxes: 0,
            invoice_number: 0,
            line_items: Vec::new(),
            shipping_address: None,
            billing_address: None,
            payment_state: PaymentState::Pending,
            created_at: Utc::now(),
        }
    }

    /// Add a line item and fold it into subtotal and total
    pub fn add_item(&mut self, item: LineItem) {
        self.subtotal = self.subtotal.saturating_add(item.total());
        self.total = self.total.saturating_add(item.total());
        self.line_items.push(item);
    }

    /// Builder: add a line item
    pub fn with_item(mut self, item: LineItem) -> Self {
        self.add_item(item);
        self
    }

    /// Builder: add taxes on top of the current total
    pub fn with_taxes(mut self, taxes: u64) -> Self {
        self.taxes = self.taxes.saturating_add(taxes);
        self.total = self.total.saturating_add(taxes);
        self
    }

    /// Builder: set shipping address
    pub fn with_shipping_address(mut self, address: Address) -> Self {
        self.shipping_address = Some(address);
        self
    }

    /// Builder: set invoice number
    pub fn with_invoice_number(mut self, invoice_number: i64) -> Self {
        self.invoice_number = invoice_number;
        self
    }

    /// Amount due, as recorded on the order
    pub fn amount_due(&self) -> Money {
        Money::new(self.total, self.currency)
    }

    /// Whether a charge may still be attempted for this order
    pub fn is_chargeable(&self) -> bool {
        matches!(self.payment_state, PaymentState::Pending | PaymentState::Failed)
    }

    pub fn item_count(&self) -> u64 {
        self.line_items.iter().map(|i| i.quantity).sum()
    }
}
