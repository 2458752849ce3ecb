//! # Tip Allocation
//!
//! Attaches an optional tip to a payable total.
//!
//! Two input styles, one storage model: the cashier either types a fixed
//! amount, or asks for a percentage of the subtotal - but the percentage
//! path is a CONVENIENCE CALCULATOR only. It returns a proposed fixed
//! amount that the caller still applies explicitly; no "10%" mode is
//! ever persisted, so a later subtotal change cannot silently move an
//! already-agreed tip.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::validation::validate_tip_amount;

/// Holds the tip attached to one payable (whole order or single split).
///
/// Defaults to zero; `tip_amount ≥ 0` always.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TipAllocator {
    amount: Money,
}

impl TipAllocator {
    /// Creates an allocator with no tip.
    pub fn new() -> Self {
        TipAllocator {
            amount: Money::zero(),
        }
    }

    /// Sets the tip directly.
    ///
    /// ## Errors
    /// `InvalidAmount` (via validation) if `amount` is negative. Zero is
    /// allowed and clears the tip.
    pub fn apply_fixed(&mut self, amount: Money) -> CoreResult<()> {
        validate_tip_amount(amount)?;
        self.amount = amount;
        Ok(())
    }

    /// Removes the tip.
    pub fn clear(&mut self) {
        self.amount = Money::zero();
    }

    /// The currently applied tip.
    #[inline]
    pub fn amount(&self) -> Money {
        self.amount
    }

    /// Computes `sub_total × pct / 100` rounded half-up, returned as a
    /// PROPOSED fixed amount. The caller applies it via
    /// [`TipAllocator::apply_fixed`]; nothing is stored here.
    ///
    /// ## Example
    /// ```rust
    /// use rust_decimal::Decimal;
    /// use tally_core::money::Money;
    /// use tally_core::tip::TipAllocator;
    ///
    /// let proposed =
    ///     TipAllocator::percentage_of(Decimal::from(10), Money::from_minor(12345)).unwrap();
    /// assert_eq!(proposed.minor(), 1235); // 123.45 → 12.345 → 12.35
    /// ```
    pub fn percentage_of(pct: Decimal, sub_total: Money) -> CoreResult<Money> {
        if pct.is_sign_negative() {
            return Err(CoreError::InvalidAmount {
                reason: format!("tip percentage must not be negative, got {}", pct),
            });
        }

        let minor = (Decimal::from(sub_total.minor()) * pct / Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .ok_or_else(|| CoreError::InvalidAmount {
                reason: format!("tip of {}% on {} overflows", pct, sub_total),
            })?;

        Ok(Money::from_minor(minor))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
