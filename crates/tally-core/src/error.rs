//! # Error Types
//!
//! Domain-specific error types for tally-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tally-core errors (this file)                                         │
//! │  ├── CoreError        - Settlement domain errors                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  tally-checkout errors (separate crate)                                │
//! │  └── CheckoutError    - Session-level errors (serialized for the UI)   │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CheckoutError → Frontend          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (amounts, item names, etc.)
//! 3. Errors are enum variants, never String
//! 4. Every error is recoverable: the caller corrects the input and retries;
//!    no operation mutates state before its validation passes

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Settlement domain errors.
///
/// These errors represent business rule violations in the settlement
/// engine. They are surfaced to the cashier for correction; none of them
/// is fatal and none leaves partial state behind.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A non-positive or out-of-bounds amount was supplied to a ledger
    /// or converter operation.
    #[error("Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    /// A custom split amount exceeds the unallocated pool.
    ///
    /// ## When This Occurs
    /// - Operator carves out Rs 60 when only Rs 50 remains unallocated
    ///
    /// The pool is left unchanged; the operator enters a smaller amount
    /// and retries.
    #[error("Split amount {requested} exceeds remaining pool {remaining}")]
    ExceedsRemaining {
        requested: Money,
        remaining: Money,
    },

    /// An item-split move requests more units than remain unassigned.
    ///
    /// ## User Workflow
    /// ```text
    /// Move "Momo x2" to Split B
    ///      │
    ///      ▼
    /// Unassigned pool has only 1 Momo left
    ///      │
    ///      ▼
    /// InsufficientQuantity { item: "Momo", available: 1, requested: 2 }
    /// ```
    #[error("Insufficient unassigned quantity for {item}: available {available}, requested {requested}")]
    InsufficientQuantity {
        item: String,
        available: i64,
        requested: i64,
    },

    /// A structurally invalid request: equal-split count below two, a
    /// finalize attempted while preconditions are unmet (unpaid splits,
    /// unassigned items), or mutation of an already-paid split.
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// Tendered amount is short of the payable and the chosen method is
    /// not "Due": the cashier must explicitly confirm a partial/due
    /// finalize before the engine proceeds. The ledger is left untouched
    /// so the tender can be corrected instead.
    #[error("Partial payment requires confirmation: {remaining} still due")]
    PartialPaymentConfirmationRequired { remaining: Money },

    /// Payment method is not in the outlet's enabled list ("Due" is
    /// always implicitly available).
    #[error("Payment method not enabled: {method}")]
    MethodNotEnabled { method: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when supplied data doesn't meet requirements.
/// Used for early validation before settlement logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., malformed currency code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Related amounts do not reconcile (e.g., a snapshot whose grand
    /// total is not subtotal + taxes within tolerance).
    #[error("{field} is inconsistent: {reason}")]
    Inconsistent { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::ExceedsRemaining {
            requested: Money::from_minor(6000),
            remaining: Money::from_minor(5000),
        };
        assert_eq!(
            err.to_string(),
            "Split amount 60.00 exceeds remaining pool 50.00"
        );

        let err = CoreError::InsufficientQuantity {
            item: "Momo".to_string(),
            available: 1,
            requested: 2,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient unassigned quantity for Momo: available 1, requested 2"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "method".to_string(),
        };
        assert_eq!(err.to_string(), "method is required");

        let err = ValidationError::MustBePositive {
            field: "amount".to_string(),
        };
        assert_eq!(err.to_string(), "amount must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "amount".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
