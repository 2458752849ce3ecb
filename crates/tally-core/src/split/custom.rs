//! # Custom Split Allocator
//!
//! Lets the operator carve arbitrary amounts out of a remaining pool
//! until it is exhausted.
//!
//! ```text
//! pool = 100.00
//!   add_split(40.00)  → pool = 60.00   Split A
//!   add_split(35.00)  → pool = 25.00   Split B
//!   add_split(30.00)  → ExceedsRemaining (pool unchanged)
//!   add_split(25.00)  → pool =  0.00   Split C - pool exhausted
//! ```
//!
//! There is no upper bound on the number of splits; the only bound is
//! the pool itself.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::MONEY_EPSILON;

use super::{Split, SplitKind};

/// The unallocated remainder of an order's grand total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RemainingPool {
    remaining: Money,
}

impl RemainingPool {
    /// Creates a pool holding the full grand total.
    pub fn new(grand_total: Money) -> Self {
        RemainingPool {
            remaining: grand_total,
        }
    }

    /// What is left to allocate.
    #[inline]
    pub fn remaining(&self) -> Money {
        self.remaining
    }

    /// Whether the pool is fully allocated (within one minor unit).
    pub fn is_exhausted(&self) -> bool {
        self.remaining.abs() <= MONEY_EPSILON
    }

    /// Carves `amount` out of the pool as a new custom split.
    ///
    /// ## Errors
    /// - `InvalidAmount` if `amount` is not positive
    /// - `ExceedsRemaining` if `amount > remaining + ε`; the pool is
    ///   left unchanged so the operator can retry with a smaller amount
    pub fn add_split(&mut self, amount: Money) -> CoreResult<Split> {
        if !amount.is_positive() {
            return Err(CoreError::InvalidAmount {
                reason: format!("split amount must be positive, got {}", amount),
            });
        }

        if amount > self.remaining + MONEY_EPSILON {
            return Err(CoreError::ExceedsRemaining {
                requested: amount,
                remaining: self.remaining,
            });
        }

        self.remaining -= amount;
        Ok(Split::new(
            SplitKind::Custom,
            vec![],
            amount,
            Money::zero(),
            amount,
        ))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::split::total_allocated;

    #[test]
    fn test_carving_reduces_pool() {
        let mut pool = RemainingPool::new(Money::from_minor(10000));

        let a = pool.add_split(Money::from_minor(4000)).unwrap();
        assert_eq!(a.total_amount().minor(), 4000);
        assert_eq!(pool.remaining().minor(), 6000);

        let b = pool.add_split(Money::from_minor(6000)).unwrap();
        assert_eq!(b.total_amount().minor(), 6000);
        assert!(pool.is_exhausted());
    }

    #[test]
    fn test_exceeding_pool_fails_and_leaves_pool_unchanged() {
        let mut pool = RemainingPool::new(Money::from_minor(5000));
        pool.add_split(Money::from_minor(3000)).unwrap();

        let err = pool.add_split(Money::from_minor(2500)).unwrap_err();
        assert!(matches!(err, CoreError::ExceedsRemaining { .. }));
        assert_eq!(pool.remaining().minor(), 2000);
    }

    #[test]
    fn test_one_minor_unit_tolerance() {
        // pool at 20.00: 20.01 is within ε, 20.02 is not
        let mut pool = RemainingPool::new(Money::from_minor(2000));
        assert!(pool.clone().add_split(Money::from_minor(2001)).is_ok());
        assert!(pool.add_split(Money::from_minor(2002)).is_err());
    }

    #[test]
    fn test_rejects_non_positive_amounts() {
        let mut pool = RemainingPool::new(Money::from_minor(5000));
        assert!(pool.add_split(Money::zero()).is_err());
        assert!(pool.add_split(Money::from_minor(-100)).is_err());
        assert_eq!(pool.remaining().minor(), 5000);
    }

    /// Allocation can never overshoot the grand total by more than ε.
    #[test]
    fn test_allocation_bound() {
        let grand = Money::from_minor(10000);
        let mut pool = RemainingPool::new(grand);
        let mut splits = Vec::new();

        for amount in [3333, 3333, 3333, 500, 100, 1] {
            if let Ok(split) = pool.add_split(Money::from_minor(amount)) {
                splits.push(split);
            }
        }

        assert!(total_allocated(&splits) <= grand + MONEY_EPSILON);
    }

    #[test]
    fn test_split_shape() {
        let mut pool = RemainingPool::new(Money::from_minor(5000));
        let split = pool.add_split(Money::from_minor(2000)).unwrap();

        assert_eq!(split.kind(), SplitKind::Custom);
        assert!(split.items().is_empty());
        assert_eq!(split.sub_total(), split.total_amount());
        assert_eq!(split.tax_amount(), Money::zero());
    }
}
