//! # Equal Split Generator
//!
//! Divides the grand total into n equal shares.
//!
//! The rounding policy lives in [`Money::split_evenly`]: any residual
//! minor units go to the FIRST share so the sum reproduces the grand
//! total exactly - a strictly stronger guarantee than the one-minor-unit
//! tolerance the other strategies reconcile under.
//!
//! Shares carry the whole amount as their subtotal with zero tax: tax is
//! treated as embedded in the equal share, and no proportional tax
//! recomputation is performed for this strategy.

use crate::error::{CoreError, CoreResult};
use crate::money::Money;

use super::{Split, SplitKind};

/// Generates `ways` equal shares of `grand_total`.
///
/// ## Errors
/// `InvalidInput` if `ways < 2` - one "share" is not a split, use
/// full-payment mode instead.
///
/// ## Example
/// ```rust
/// use tally_core::money::Money;
/// use tally_core::split::equal::generate_equal_splits;
///
/// let splits = generate_equal_splits(3, Money::from_minor(1000)).unwrap();
/// assert_eq!(splits[0].total_amount().minor(), 334);
/// assert_eq!(splits[1].total_amount().minor(), 333);
/// assert_eq!(splits[2].total_amount().minor(), 333);
/// ```
pub fn generate_equal_splits(ways: u32, grand_total: Money) -> CoreResult<Vec<Split>> {
    if ways < 2 {
        return Err(CoreError::InvalidInput {
            reason: format!("an equal split needs at least 2 ways, got {}", ways),
        });
    }

    let splits = grand_total
        .split_evenly(ways)
        .into_iter()
        .map(|share| Split::new(SplitKind::Equal, vec![], share, Money::zero(), share))
        .collect();

    Ok(splits)
}

// =============================================================================
// Unit Tests
// =============================================================================
