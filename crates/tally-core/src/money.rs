//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  In many retail systems:                                                │
//! │    Rs 10.00 / 3 = Rs 3.33 (×3 = Rs 9.99)  → Lost Rs 0.01!              │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Minor Units + Named Rounding Policies            │
//! │    1000 / 3 = [334, 333, 333]  → the residual goes to the FIRST share  │
//! │    so the sum is exact, not merely close                               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All base-currency values in the engine are `Money` (i64 minor units).
//! Display-currency values are `rust_decimal::Decimal` and only exist at
//! the [`crate::currency`] boundary.
//!
//! The two rounding policies that are easy to get subtly wrong live here
//! as named, independently tested functions:
//! - [`Money::split_evenly`] - equal shares, residual to the first share
//! - [`Money::ratio_share`] - proportional distribution (half-up), used
//!   for spreading an order's tax over item splits

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A base-currency monetary value in minor units (paisa for NPR).
///
/// ## Design Decisions
/// - **i64 (signed)**: `remaining_due` may legitimately go negative
///   (overpayment means change is owed to the customer)
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// let price = Money::from_minor(1099); // Rs 10.99
    /// assert_eq!(price.minor(), 1099);
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion (assumes 2 decimal places; display
    /// formatting for other precisions goes through `CurrencyConverter`).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99, absolute value).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Returns the larger of self and zero (clamps change/refund math).
    #[inline]
    pub const fn max_zero(&self) -> Self {
        if self.0 > 0 { Money(self.0) } else { Money(0) }
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// let unit_price = Money::from_minor(299); // Rs 2.99
    /// let line_total = unit_price.multiply_quantity(3);
    /// assert_eq!(line_total.minor(), 897); // Rs 8.97
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Divides this amount into `ways` shares whose sum is EXACTLY self.
    ///
    /// ## Rounding Policy: Residual To The First Share
    /// ```text
    /// Rs 10.00 / 3
    ///      │
    ///      ▼
    /// base = 1000 / 3 = 333, residual = 1000 - 3×333 = 1
    ///      │
    ///      ▼
    /// shares = [334, 333, 333]   (sum = 1000, exact)
    /// ```
    ///
    /// The whole residual goes to the first share (not spread across the
    /// first k shares). This is a required exactness guarantee: the sum
    /// of equal splits must reproduce the grand total with NO tolerance.
    ///
    /// Returns an empty vector for `ways == 0`; count validation belongs
    /// to the caller ([`crate::split::equal`] requires `ways >= 2`).
    pub fn split_evenly(&self, ways: u32) -> Vec<Money> {
        if ways == 0 {
            return Vec::new();
        }

        let ways = ways as i64;
        let base = self.0 / ways;
        let residual = self.0 - base * ways;

        let mut shares = vec![Money(base); ways as usize];
        shares[0].0 += residual;
        shares
    }

    /// Computes `self × numerator / denominator` with half-up rounding.
    ///
    /// ## Rounding Policy: Proportional Share
    /// Used to distribute an order's total tax over item splits at the
    /// order's overall effective tax rate:
    /// ```text
    /// split tax = split subtotal × (order tax total / order subtotal)
    /// ```
    ///
    /// ## Implementation
    /// Integer math widened to i128 to prevent overflow:
    /// `(self × num + den/2) / den`
    /// The `+ den/2` provides half-up rounding.
    ///
    /// A zero or negative denominator yields zero (a zero-subtotal order
    /// carries no tax to distribute).
    pub fn ratio_share(&self, numerator: Money, denominator: Money) -> Money {
        if denominator.0 <= 0 {
            return Money::zero();
        }

        let num = self.0 as i128 * numerator.0 as i128;
        let den = denominator.0 as i128;
        Money::from_minor(((num + den / 2) / den) as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for debugging and error messages (assumes 2 decimal places).
/// Use `CurrencyConverter::format` for actual UI display to honor the
/// outlet's symbol position and precision.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor_part())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by i64 (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

/// Summing an iterator of Money values (ledger totals, split totals).
impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_minor() {
        let money = Money::from_minor(1099);
        assert_eq!(money.minor(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_minor(1099)), "10.99");
        assert_eq!(format!("{}", Money::from_minor(500)), "5.00");
        assert_eq!(format!("{}", Money::from_minor(-550)), "-5.50");
        assert_eq!(format!("{}", Money::from_minor(0)), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_minor(1000);
        let b = Money::from_minor(500);

        assert_eq!((a + b).minor(), 1500);
        assert_eq!((a - b).minor(), 500);
        let result: Money = a * 3;
        assert_eq!(result.minor(), 3000);
    }

    #[test]
    fn test_sum() {
        let total: Money = [100, 250, 75]
            .iter()
            .map(|m| Money::from_minor(*m))
            .sum();
        assert_eq!(total.minor(), 425);
    }

    #[test]
    fn test_max_zero() {
        assert_eq!(Money::from_minor(-50).max_zero(), Money::zero());
        assert_eq!(Money::from_minor(50).max_zero(), Money::from_minor(50));
    }

    #[test]
    fn test_split_evenly_residual_to_first() {
        // Rs 10.00 / 3 => [3.34, 3.33, 3.33]
        let shares = Money::from_minor(1000).split_evenly(3);
        let minors: Vec<i64> = shares.iter().map(|s| s.minor()).collect();
        assert_eq!(minors, vec![334, 333, 333]);
    }

    #[test]
    fn test_split_evenly_larger_residual() {
        // Rs 11.00 / 3: base 366, residual 2 - ALL of it to the first share
        let shares = Money::from_minor(1100).split_evenly(3);
        let minors: Vec<i64> = shares.iter().map(|s| s.minor()).collect();
        assert_eq!(minors, vec![368, 366, 366]);
    }

    /// Critical property: for any total and way count, the shares sum
    /// back to the total exactly. No epsilon.
    #[test]
    fn test_split_evenly_exact_sum() {
        for total in [1, 99, 1000, 1001, 9999, 123_457] {
            for ways in 2..=9u32 {
                let money = Money::from_minor(total);
                let sum: Money = money.split_evenly(ways).into_iter().sum();
                assert_eq!(sum, money, "total={} ways={}", total, ways);
            }
        }
    }

    #[test]
    fn test_ratio_share_half_up() {
        // 1000 × 130 / 1000 = 130 exactly
        let share = Money::from_minor(1000)
            .ratio_share(Money::from_minor(130), Money::from_minor(1000));
        assert_eq!(share.minor(), 130);

        // 333 × 130 / 1000 = 43.29 → 43
        let share = Money::from_minor(333)
            .ratio_share(Money::from_minor(130), Money::from_minor(1000));
        assert_eq!(share.minor(), 43);

        // 500 × 13 / 1000 = 6.5 → 7 (half-up)
        let share =
            Money::from_minor(500).ratio_share(Money::from_minor(13), Money::from_minor(1000));
        assert_eq!(share.minor(), 7);
    }

    #[test]
    fn test_ratio_share_zero_denominator() {
        let share = Money::from_minor(500).ratio_share(Money::from_minor(13), Money::zero());
        assert_eq!(share, Money::zero());
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_minor(299);
        let line_total = unit_price.multiply_quantity(3);
        assert_eq!(line_total.minor(), 897);
    }
}
