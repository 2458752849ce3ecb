//! # tally-core: Pure Settlement Logic for Tally
//!
//! This crate is the **heart** of Tally. It reconciles how a finalized
//! order's grand total is paid - in full, partially, or divided across
//! several splits - as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Tally Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      Checkout UI                                │   │
//! │  │    Order View ──► Split Picker ──► Tender UI ──► Done          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 tally-checkout (session layer)                  │   │
//! │  │    CheckoutSession, per-split tendering, QR boundary           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   money   │  │  currency │  │   split   │  │settlement │  │   │
//! │  │   │   Money   │  │ Converter │  │ Equal     │  │ Resolver  │  │   │
//! │  │   │  rounding │  │ formatting│  │ Custom    │  │ states    │  │   │
//! │  │   └───────────┘  └───────────┘  │ ByItem    │  └───────────┘  │   │
//! │  │                                 └───────────┘                  │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (OrderSnapshot, OrderItem, PartialPayment, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`currency`] - Multi-currency conversion and formatting
//! - [`ledger`] - Append-only payment ledger per payable
//! - [`tip`] - Tip allocation (fixed amount, percentage calculator)
//! - [`split`] - Equal / Custom / ByItem bill splitting
//! - [`settlement`] - Settled vs. partially-due resolution
//! - [`error`] - Domain error types
//! - [`validation`] - Input and invariant validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All base-currency values are in minor units (i64);
//!    `rust_decimal` only appears at the display-currency boundary
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use tally_core::money::Money;
//! use tally_core::split::equal::generate_equal_splits;
//!
//! // Rs 10.00 split three ways: the residual paisa goes to the first share
//! let splits = generate_equal_splits(3, Money::from_minor(1000)).unwrap();
//! let shares: Vec<i64> = splits.iter().map(|s| s.total_amount().minor()).collect();
//! assert_eq!(shares, vec![334, 333, 333]);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod currency;
pub mod error;
pub mod ledger;
pub mod money;
pub mod settlement;
pub mod split;
pub mod tip;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use tally_core::Money` instead of
// `use tally_core::money::Money`

pub use currency::{ApplicationSettings, Currency, CurrencyConverter, SymbolPosition};
pub use error::{CoreError, CoreResult, ValidationError};
pub use ledger::PaymentLedger;
pub use money::Money;
pub use settlement::{FinalizeSaleResult, SettlementResolver, SettlementState, DUE_METHOD};
pub use split::{Split, SplitKind};
pub use tip::TipAllocator;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default number of decimal places for the base currency.
///
/// ## Why a constant?
/// Outlets can configure precision via `ApplicationSettings`, but almost
/// every deployment runs at 2 (paisa/cents). This is the fallback used by
/// `ApplicationSettings::default()`.
pub const DEFAULT_DECIMAL_PLACES: u32 = 2;

/// Reconciliation tolerance: one minor unit at the configured precision.
///
/// ## Business Reason
/// Currency conversion and proportional tax distribution round half-up,
/// so independently rounded parts can drift from their whole by at most
/// one minor unit. Amount comparisons across split strategies use this
/// tolerance; the equal-split path is exact and does NOT rely on it.
pub const MONEY_EPSILON: Money = Money::from_minor(1);

/// Maximum accepted payment amount, in minor units (1,000,000.00 at 2 dp).
///
/// ## Business Reason
/// Prevents fat-finger tenders (e.g. scanning a barcode into the amount
/// field) from entering the ledger.
pub const MAX_PAYMENT_MINOR: i64 = 100_000_000;

/// Maximum configurable `decimal_places`.
///
/// ## Business Reason
/// The minor-unit factor is `10^decimal_places` in i64; at 9 places even
/// `MAX_PAYMENT_MINOR`-sized amounts scale without overflow. Checked by
/// [`validation::validate_settings`] before a session opens.
pub const MAX_DECIMAL_PLACES: u32 = 9;
