//! # Order Projection
//!
//! Gateway-facing view of an order: the item list and structured shipping
//! address that adapters attach to a payment record before capture. The
//! projection is provider independent; adapters only rename fields.

use crate::country::alpha2_for_name;
use crate::money::{format_amount, Currency};
use crate::order::{Address, LineItem, Order};
use serde::Serialize;
use tracing::warn;

/// One line of the projected item list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectedItem {
    pub quantity: u64,
    pub name: String,
    /// Unit price as a two-decimal string
    pub price: String,
    pub currency: Currency,
    pub sku: String,
    pub description: String,
    /// Tax percentage, e.g. `"19%"`, when the item has a fixed rate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax: Option<String>,
}

/// Shipping address with the country resolved to an alpha-2 code
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectedAddress {
    pub recipient_name: String,
    pub line1: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub line2: String,
    pub city: String,
    pub country_code: &'static str,
    pub postal_code: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub state: String,
}

/// Item list plus optional shipping address
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderProjection {
    pub items: Vec<ProjectedItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<ProjectedAddress>,
}

impl OrderProjection {
    /// Project an order. Never fails: an unresolvable shipping country drops
    /// the address and keeps the items.
    pub fn from_order(order: &Order) -> Self {
        let items = order
            .line_items
            .iter()
            .map(|item| project_item(item, order.currency))
            .collect();

        let shipping_address = order.shipping_address.as_ref().and_then(|addr| {
            let projected = project_address(addr);
            if projected.is_none() {
                warn!(
                    order_id = %order.id,
                    country = %addr.country,
                    "Unknown shipping country, omitting address from projection"
                );
            }
            projected
        });

        Self {
            items,
            shipping_address,
        }
    }
}

fn project_item(item: &LineItem, currency: Currency) -> ProjectedItem {
    ProjectedItem {
        quantity: item.quantity,
        name: item.title.clone(),
        price: format_amount(item.price),
        currency,
        sku: item.sku.clone(),
        description: item.description.clone(),
        tax: item.fixed_vat().map(|vat| format!("{}%", vat)),
    }
}

/// Resolve an address into its gateway shape, `None` if the country is unknown
pub fn project_address(addr: &Address) -> Option<ProjectedAddress> {
    let country_code = alpha2_for_name(&addr.country)?;

    Some(ProjectedAddress {
        recipient_name: addr.name.clone(),
        line1: addr.address1.clone(),
        line2: addr.address2.clone(),
        city: addr.city.clone(),
        country_code,
        postal_code: addr.zip.clone(),
        state: addr.state.clone(),
    })
}
