//! # Currency Module
//!
//! Multi-currency conversion and display formatting.
//!
//! ## Conversion Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Currency Boundary                                  │
//! │                                                                         │
//! │  Customer tenders USD 10.00          Engine stores base minor units    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  to_base(10.00, USD{rate: 0.0075}) ──► Money(133333)  (Rs 1333.33)    │
//! │                                                                         │
//! │  from_base(Money(133333), USD) ──────► 10.00  (display only)           │
//! │                                                                         │
//! │  exchange_rate is relative to the single default currency (rate = 1).  │
//! │  Rounding: half-up at the configured decimal places. Lossy BY DESIGN:  │
//! │  a round trip may drift by one minor unit, never more.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `Decimal` values exist only on this boundary; everything past it is
//! integer [`Money`].

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::DEFAULT_DECIMAL_PLACES;

// =============================================================================
// Currency
// =============================================================================

/// A tenderable currency.
///
/// ## Invariant
/// Exactly one currency in an outlet's list has `is_default = true`, and
/// its `exchange_rate` is fixed at 1. All other rates are relative to it
/// (`base = amount / exchange_rate`). See
/// [`crate::validation::validate_currencies`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Currency {
    /// ISO-ish code shown on receipts ("NPR", "USD", "INR").
    pub code: String,

    /// Display symbol ("Rs", "$", "₹").
    pub symbol: String,

    /// Units of this currency per one unit of the base currency.
    #[ts(as = "String")]
    pub exchange_rate: Decimal,

    /// Whether this is the base currency (rate fixed at 1).
    pub is_default: bool,
}

impl Currency {
    /// Creates the base currency (rate 1, flagged default).
    pub fn base(code: impl Into<String>, symbol: impl Into<String>) -> Self {
        Currency {
            code: code.into(),
            symbol: symbol.into(),
            exchange_rate: Decimal::ONE,
            is_default: true,
        }
    }

    /// Creates a non-default currency with the given rate.
    pub fn with_rate(
        code: impl Into<String>,
        symbol: impl Into<String>,
        exchange_rate: Decimal,
    ) -> Self {
        Currency {
            code: code.into(),
            symbol: symbol.into(),
            exchange_rate,
            is_default: false,
        }
    }
}

// =============================================================================
// Application Settings
// =============================================================================

/// Where the currency symbol renders relative to the amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SymbolPosition {
    /// "Rs 120.00"
    Before,
    /// "120.00 Rs"
    After,
}

impl Default for SymbolPosition {
    fn default() -> Self {
        SymbolPosition::Before
    }
}

/// Outlet-level display and precision configuration, supplied read-only
/// per checkout session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSettings {
    /// Decimal places of the base currency (governs Money's minor unit).
    pub decimal_places: u32,

    /// Symbol placement for formatted amounts.
    pub currency_symbol_position: SymbolPosition,
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        ApplicationSettings {
            decimal_places: DEFAULT_DECIMAL_PLACES,
            currency_symbol_position: SymbolPosition::Before,
        }
    }
}

// =============================================================================
// Currency Converter
// =============================================================================

/// Converts amounts between a display currency and the base currency.
///
/// ## Example
/// ```rust
/// use rust_decimal::Decimal;
/// use tally_core::currency::{ApplicationSettings, Currency, CurrencyConverter};
///
/// let converter = CurrencyConverter::new(ApplicationSettings::default());
/// let usd = Currency::with_rate("USD", "$", Decimal::new(75, 4)); // 0.0075
///
/// let base = converter.to_base(Decimal::new(1000, 2), &usd).unwrap(); // $10.00
/// assert_eq!(base.minor(), 133333); // Rs 1333.33
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CurrencyConverter {
    settings: ApplicationSettings,
}

impl CurrencyConverter {
    /// Creates a converter for the outlet's configured precision.
    pub fn new(settings: ApplicationSettings) -> Self {
        CurrencyConverter { settings }
    }

    /// The configured decimal places.
    #[inline]
    pub fn decimal_places(&self) -> u32 {
        self.settings.decimal_places
    }

    /// Minor units per major unit (10^decimal_places).
    #[inline]
    fn minor_factor(&self) -> i64 {
        10_i64.pow(self.settings.decimal_places)
    }

    /// Converts a display-currency amount to base-currency Money.
    ///
    /// `amount / exchange_rate`, rounded half-up to the configured
    /// decimal places.
    ///
    /// ## Errors
    /// - `InvalidAmount` if `amount` is negative or overflows Money
    /// - `InvalidAmount` if the currency's rate is zero or negative
    pub fn to_base(&self, amount: Decimal, currency: &Currency) -> CoreResult<Money> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(CoreError::InvalidAmount {
                reason: format!("amount must not be negative, got {}", amount),
            });
        }
        if currency.exchange_rate <= Decimal::ZERO {
            return Err(CoreError::InvalidAmount {
                reason: format!(
                    "exchange rate for {} must be positive, got {}",
                    currency.code, currency.exchange_rate
                ),
            });
        }

        let base = amount / currency.exchange_rate;
        let minor = (base * Decimal::from(self.minor_factor()))
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .ok_or_else(|| CoreError::InvalidAmount {
                reason: format!("amount {} {} overflows", amount, currency.code),
            })?;

        Ok(Money::from_minor(minor))
    }

    /// Converts base-currency Money to a display-currency amount.
    ///
    /// `amount × exchange_rate`, rounded half-up to the configured
    /// decimal places. Lossy by design: `to_base(from_base(x)) == x`
    /// within one minor unit.
    pub fn from_base(&self, amount: Money, currency: &Currency) -> Decimal {
        let base = Decimal::from(amount.minor()) / Decimal::from(self.minor_factor());
        (base * currency.exchange_rate)
            .round_dp_with_strategy(
                self.settings.decimal_places,
                RoundingStrategy::MidpointAwayFromZero,
            )
    }

    /// Renders a base-currency amount in the given currency for display,
    /// honoring the configured symbol position.
    pub fn format(&self, amount: Money, currency: &Currency) -> String {
        let mut value = self.from_base(amount, currency);
        value.rescale(self.settings.decimal_places);

        match self.settings.currency_symbol_position {
            SymbolPosition::Before => format!("{} {}", currency.symbol, value),
            SymbolPosition::After => format!("{} {}", value, currency.symbol),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
