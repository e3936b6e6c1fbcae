//! # Reconciliation
//!
//! Verifies the gateway's pending payment record against the amount the
//! caller intends to charge. Adapters run this after fetching the record and
//! strictly before any call that can move money.

use crate::error::{PaymentError, PaymentResult};
use crate::money::Money;
use tracing::{debug, warn};

/// Amount recorded by the gateway on one pending transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAmount {
    /// Decimal string exactly as the gateway returned it
    pub total: String,
    /// Currency code exactly as the gateway returned it
    pub currency: String,
}

impl PendingAmount {
    pub fn new(total: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            total: total.into(),
            currency: currency.into(),
        }
    }
}

/// Require exactly one transaction on the gateway record, carrying an amount.
///
/// `transactions` holds one entry per gateway transaction; `None` marks a
/// transaction without an amount.
pub fn single_pending_amount(
    payment_id: &str,
    transactions: Vec<Option<PendingAmount>>,
) -> PaymentResult<PendingAmount> {
    let count = transactions.len();
    let mut iter = transactions.into_iter();
    match (iter.next(), iter.next()) {
        (Some(Some(amount)), None) => Ok(amount),
        (Some(None), None) => Err(PaymentError::UnexpectedGatewayState(format!(
            "payment {} has no amount on its transaction",
            payment_id
        ))),
        _ => Err(PaymentError::UnexpectedGatewayState(format!(
            "payment {} must have exactly 1 transaction, had {}",
            payment_id, count
        ))),
    }
}

/// Compare the requested charge with the gateway's pending amount.
///
/// Both sides are compared as strings: the requested amount goes through the
/// money codec, the gateway value is never parsed.
pub fn verify_amount(requested: Money, pending: &PendingAmount) -> PaymentResult<()> {
    let expected_total = requested.wire_total();
    let expected_currency = requested.currency.as_str();

    if expected_total != pending.total || expected_currency != pending.currency {
        warn!(
            expected = %requested,
            actual_total = %pending.total,
            actual_currency = %pending.currency,
            "Gateway amount does not match order"
        );
        return Err(PaymentError::AmountMismatch {
            expected_total,
            expected_currency: expected_currency.to_string(),
            actual_total: pending.total.clone(),
            actual_currency: pending.currency.clone(),
        });
    }

    debug!(amount = %requested, "Gateway amount reconciled");
    Ok(())
}

/// Shape check followed by amount check, in that order
pub fn reconcile(
    payment_id: &str,
    requested: Money,
    transactions: Vec<Option<PendingAmount>>,
) -> PaymentResult<PendingAmount> {
    let pending = single_pending_amount(payment_id, transactions)?;
    verify_amount(requested, &pending)?;
    Ok(pending)
}
