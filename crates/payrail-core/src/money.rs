//! # Money Types
//!
//! Currency codes and the amount codec used on every gateway wire call.
//! Amounts are always carried as integer minor units (cents) and only turned
//! into decimal strings at the gateway boundary, through [`format_amount`].

use crate::error::PaymentError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Supported currencies (ISO 4217). All of them use two minor-unit digits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
    CHF,
    MXN,
}

impl Currency {
    /// Returns the ISO 4217 currency code as gateways expect it
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::CAD => "CAD",
            Currency::AUD => "AUD",
            Currency::CHF => "CHF",
            Currency::MXN => "MXN",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::USD),
            "EUR" => Ok(Currency::EUR),
            "GBP" => Ok(Currency::GBP),
            "CAD" => Ok(Currency::CAD),
            "AUD" => Ok(Currency::AUD),
            "CHF" => Ok(Currency::CHF),
            "MXN" => Ok(Currency::MXN),
            other => Err(PaymentError::InvalidRequest(format!(
                "unsupported currency: {}",
                other
            ))),
        }
    }
}

/// Format an amount in minor units as a fixed two-decimal string.
///
/// `12345` becomes `"123.45"`. Integer arithmetic only, so every value
/// round-trips exactly.
pub fn format_amount(minor_units: u64) -> String {
    format!("{}.{:02}", minor_units / 100, minor_units % 100)
}

/// An amount in minor units together with its currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub amount: u64,
    pub currency: Currency,
}

impl Money {
    pub fn new(amount: u64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Decimal string for gateway wire calls
    pub fn wire_total(&self) -> String {
        format_amount(self.amount)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.wire_total(), self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount_boundaries() {
        assert_eq!(format_amount(0), "0.00");
        assert_eq!(format_amount(1), "0.01");
        assert_eq!(format_amount(100), "1.00");
        assert_eq!(format_amount(99999), "999.99");
    }

    #[test]
    fn test_format_amount_values() {
        assert_eq!(format_amount(12345), "123.45");
        assert_eq!(format_amount(4999), "49.99");
        assert_eq!(format_amount(10), "0.10");
        assert_eq!(format_amount(u64::MAX), "184467440737095516.15");
    }

    #[test]
    fn test_currency_parsing() {
        assert_eq!("usd".parse::<Currency>().unwrap(), Currency::USD);
        assert_eq!("EUR".parse::<Currency>().unwrap(), Currency::EUR);
        assert!(matches!(
            "JPY".parse::<Currency>(),
            Err(PaymentError::InvalidRequest(_))
        ));
        assert_eq!(Currency::default(), Currency::USD);
    }

    #[test]
    fn test_currency_serde_uses_iso_codes() {
        let json = serde_json::to_string(&Currency::GBP).unwrap();
        assert_eq!(json, "\"GBP\"");
        let parsed: Currency = serde_json::from_str("\"CAD\"").unwrap();
        assert_eq!(parsed, Currency::CAD);
    }

    #[test]
    fn test_money_display() {
        let money = Money::new(4999, Currency::USD);
        assert_eq!(money.wire_total(), "49.99");
        assert_eq!(money.to_string(), "49.99 USD");
    }
}
