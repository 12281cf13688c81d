//! Core domain types for the charge flow.

use serde::{Deserialize, Serialize};

use crate::Money;

/// Status written on every retry record.
pub const RATE_LIMITED_STATUS: &str = "transaction rate limited";

/// Card details supplied with a charge.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CreditCard {
    pub number: String,
    pub cvv: i32,
    pub expiration_month: i32,
    pub expiration_year: i32,
}

/// A single payment attempt handed in by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChargeRequest {
    pub amount: Money,
    pub card: CreditCard,
}

impl ChargeRequest {
    pub fn new(amount: Money, card: CreditCard) -> Self {
        Self { amount, card }
    }
}

/// Snapshot of a charge that could not be confirmed synchronously.
///
/// Records are append-only: once saved they are never updated or removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub amount: f64,
    pub card_number: String,
    pub cvv: String,
    pub expiration_month: i32,
    pub expiration_year: i32,
    pub status: String,
}

impl PaymentRecord {
    /// Build a rate-limited retry record from a request and its composed amount.
    pub fn rate_limited(req: &ChargeRequest, amount: f64) -> Self {
        Self {
            amount,
            card_number: req.card.number.clone(),
            cvv: req.card.cvv.to_string(),
            expiration_month: req.card.expiration_month,
            expiration_year: req.card.expiration_year,
            status: RATE_LIMITED_STATUS.to_string(),
        }
    }

    /// Whether this record looks like the same charge as `req`.
    ///
    /// Only whole units take part in the comparison.
    pub fn matches(&self, req: &ChargeRequest) -> bool {
        self.card_number == req.card.number && self.amount == req.amount.units_as_f64()
    }
}
