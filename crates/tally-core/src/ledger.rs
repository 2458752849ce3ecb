//! # Payment Ledger
//!
//! The append-only record of partial payments against one payable.
//!
//! ## Ledger Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    One Payable, One Ledger                              │
//! │                                                                         │
//! │  Tender USD 10.00 (Card) ──► to_base ──► append PartialPayment         │
//! │  Tender Rs 500 (Cash)    ──► to_base ──► append PartialPayment         │
//! │                                                                         │
//! │  total_paid()            = Rs 1833.33                                  │
//! │  remaining_due(2000.00)  = Rs  166.67   (positive → still due)         │
//! │  remaining_due(1500.00)  = Rs -333.33   (negative → change owed)       │
//! │                                                                         │
//! │  The ledger never mutates the payable it is measured against, and      │
//! │  has no side effects beyond its own list.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::currency::{Currency, CurrencyConverter};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::PartialPayment;
use crate::validation::validate_payment_amount;
use rust_decimal::Decimal;

/// Accumulates partial payments for a single payable total.
///
/// Append-only until the payable is finalized; `remove_payment` exists
/// for pre-finalize corrections only. Finalization is enforced one level
/// up (a paid [`crate::split::Split`] refuses to hand out its ledger
/// mutably).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentLedger {
    payments: Vec<PartialPayment>,
}

impl PaymentLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        PaymentLedger {
            payments: Vec::new(),
        }
    }

    /// Converts a display-currency tender to base currency and appends
    /// it as a [`PartialPayment`].
    ///
    /// ## Errors
    /// `InvalidAmount` if the converted amount is not positive or is out
    /// of bounds. The ledger is unchanged on error.
    ///
    /// ## Example
    /// ```rust
    /// use rust_decimal::Decimal;
    /// use tally_core::currency::{ApplicationSettings, Currency, CurrencyConverter};
    /// use tally_core::ledger::PaymentLedger;
    ///
    /// let converter = CurrencyConverter::new(ApplicationSettings::default());
    /// let npr = Currency::base("NPR", "Rs");
    ///
    /// let mut ledger = PaymentLedger::new();
    /// ledger.add_payment("Cash", Decimal::new(50000, 2), &npr, &converter).unwrap();
    /// assert_eq!(ledger.total_paid().minor(), 50000);
    /// ```
    pub fn add_payment(
        &mut self,
        method: &str,
        amount: Decimal,
        currency: &Currency,
        converter: &CurrencyConverter,
    ) -> CoreResult<Money> {
        let base = converter.to_base(amount, currency)?;
        validate_payment_amount(base).map_err(|err| CoreError::InvalidAmount {
            reason: err.to_string(),
        })?;

        self.payments.push(PartialPayment::new(method, base));
        Ok(base)
    }

    /// Appends an already-converted base-currency payment (the QR
    /// confirmation path, which fixes the amount at request time).
    pub fn record(&mut self, payment: PartialPayment) -> CoreResult<()> {
        validate_payment_amount(payment.amount).map_err(|err| CoreError::InvalidAmount {
            reason: err.to_string(),
        })?;
        self.payments.push(payment);
        Ok(())
    }

    /// Removes one entry by index (pre-finalize correction only).
    pub fn remove_payment(&mut self, index: usize) -> CoreResult<PartialPayment> {
        if index >= self.payments.len() {
            return Err(CoreError::InvalidInput {
                reason: format!(
                    "payment index {} out of bounds (ledger has {})",
                    index,
                    self.payments.len()
                ),
            });
        }
        Ok(self.payments.remove(index))
    }

    /// Sum of all recorded payments' base amounts.
    pub fn total_paid(&self) -> Money {
        self.payments.iter().map(|p| p.amount).sum()
    }

    /// `payable - total_paid()`. Negative means the customer overpaid
    /// and is owed change.
    pub fn remaining_due(&self, payable: Money) -> Money {
        payable - self.total_paid()
    }

    /// Change owed to the customer (overpayment clamped at zero).
    pub fn change(&self, payable: Money) -> Money {
        (self.total_paid() - payable).max_zero()
    }

    /// The recorded payments, in tender order.
    pub fn payments(&self) -> &[PartialPayment] {
        &self.payments
    }

    /// Number of recorded payments.
    pub fn len(&self) -> usize {
        self.payments.len()
    }

    /// Whether nothing has been tendered yet.
    pub fn is_empty(&self) -> bool {
        self.payments.is_empty()
    }

    /// Consumes the ledger, yielding its payments (finalize path).
    pub fn into_payments(self) -> Vec<PartialPayment> {
        self.payments
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
