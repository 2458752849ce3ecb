//! # Settlement Resolution
//!
//! Decides what a tender attempt means for the sale.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Settlement States                                   │
//! │                                                                         │
//! │  Unsettled          nothing recorded yet                                │
//! │  PartiallySettled   something paid, balance outstanding                 │
//! │  Settled            paid in full (within one minor unit)                │
//! │                                                                         │
//! │  method == "Due" ALWAYS defers: the tendered amount is ignored and      │
//! │  the sale closes as Unsettled/PartiallySettled depending only on        │
//! │  whether anything was previously paid. Even a covering tender under     │
//! │  "Due" does not settle.                                                 │
//! │                                                                         │
//! │  PartiallySettled under any other method needs an explicit operator     │
//! │  confirmation before the sale may close with a balance outstanding.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::ledger::PaymentLedger;
use crate::money::Money;
use crate::split::Split;
use crate::types::PartialPayment;
use crate::MONEY_EPSILON;

/// The deferred-payment method. Always accepted regardless of the
/// configured method list.
pub const DUE_METHOD: &str = "Due";

// =============================================================================
// Settlement State
// =============================================================================

/// How much of a payable has been covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SettlementState {
    /// No payment recorded.
    Unsettled,
    /// Some payment recorded, balance still outstanding.
    PartiallySettled,
    /// Fully covered within one minor unit.
    Settled,
}

// =============================================================================
// Settlement Resolver
// =============================================================================

/// Pure settlement-state computation over a ledger.
pub struct SettlementResolver;

impl SettlementResolver {
    /// Classifies the ledger against `payable` for a closing attempt
    /// under `method`.
    ///
    /// "Due" short-circuits on prior-payment presence alone; for every
    /// other method the comparison is `total_paid ≥ payable − ε`, so
    /// overpayment is Settled too (the excess is change).
    pub fn resolve(payable: Money, ledger: &PaymentLedger, method: &str) -> SettlementState {
        if method == DUE_METHOD {
            return if ledger.total_paid().is_zero() {
                SettlementState::Unsettled
            } else {
                SettlementState::PartiallySettled
            };
        }

        if ledger.total_paid() >= payable - MONEY_EPSILON {
            SettlementState::Settled
        } else if ledger.total_paid().is_zero() {
            SettlementState::Unsettled
        } else {
            SettlementState::PartiallySettled
        }
    }

    /// Gate for finalizing a whole sale: resolves the state and enforces
    /// the partial-payment confirmation rule.
    ///
    /// ## Errors
    /// `PartialPaymentConfirmationRequired` when the resolution is
    /// [`SettlementState::PartiallySettled`] under a non-"Due" method and
    /// the operator has not confirmed closing with a balance outstanding.
    /// "Due" never needs confirmation; deferring is its whole point.
    ///
    /// An Unsettled resolution under a non-"Due" method is also refused:
    /// closing a sale with zero tendered needs the "Due" method, not a
    /// confirmation.
    pub fn authorize_finalize(
        payable: Money,
        ledger: &PaymentLedger,
        method: &str,
        partial_confirmed: bool,
    ) -> CoreResult<SettlementState> {
        let state = Self::resolve(payable, ledger, method);

        if method != DUE_METHOD {
            match state {
                SettlementState::Unsettled => {
                    return Err(CoreError::InvalidInput {
                        reason: format!(
                            "nothing tendered; use '{}' to defer the balance",
                            DUE_METHOD
                        ),
                    });
                }
                SettlementState::PartiallySettled if !partial_confirmed => {
                    return Err(CoreError::PartialPaymentConfirmationRequired {
                        remaining: ledger.remaining_due(payable),
                    });
                }
                _ => {}
            }
        }

        Ok(state)
    }
}

// =============================================================================
// Finalized Sale
// =============================================================================

/// The outcome of finalizing a sale, ready for receipt rendering and
/// persistence by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeSaleResult {
    /// Every recorded payment. For a split bill this is the
    /// concatenation of all splits' ledgers, in split order.
    pub payments: Vec<PartialPayment>,
    /// Total tip across the sale (summed over splits when split).
    pub tip: Money,
    /// The sale's final state.
    pub state: SettlementState,
    /// Whether the sale closed fully paid (`state == Settled`),
    /// pre-computed for the receipt layer.
    pub is_settled: bool,
    /// Per-split detail, present only for split-bill sales.
    pub splits: Option<Vec<Split>>,
}

// =============================================================================
// Unit Tests
// =============================================================================
