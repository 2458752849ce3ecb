//! # Checkout Error Type
//!
//! Unified error type for the session layer.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Tally                                  │
//! │                                                                         │
//! │  Frontend                     Session Layer            Core             │
//! │  ────────                     ─────────────            ────             │
//! │                                                                         │
//! │  invoke('pay_split')                                                    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  CheckoutResult<T>                                               │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Session problem? ── SplitNotFound / NoSession ────────────────► │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Core problem? ── CoreError (ExceedsRemaining, ...) ── wrapped ► │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  catch (e) { e.code = "EXCEEDS_REMAINING"; e.message = "..." }          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The UI boundary requires errors to be serializable; we serialize as a
//! machine-readable `code` plus a human-readable `message`.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use tally_core::CoreError;

/// Result type for session operations.
pub type CheckoutResult<T> = Result<T, CheckoutError>;

/// Errors raised by the checkout session layer.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    /// An operation needed an open session and none exists.
    #[error("no active checkout session")]
    NoSession,

    /// `open` was called while a session is already in progress.
    #[error("a checkout session is already open")]
    SessionActive,

    /// A split id did not match any split in the current plan.
    #[error("split not found: {id}")]
    SplitNotFound { id: String },

    /// A tender referenced a currency the outlet does not accept.
    #[error("unknown currency: {code}")]
    UnknownCurrency { code: String },

    /// A split operation was attempted in full-payment mode.
    #[error("session is not in split-bill mode")]
    NotSplitMode,

    /// A full-payment operation was attempted in split-bill mode.
    #[error("session is in split-bill mode")]
    NotFullPaymentMode,

    /// The split plan cannot be changed or torn down any more.
    #[error("cannot change split plan: {reason}")]
    SplitPlanLocked { reason: String },

    /// A QR payment was started while another is outstanding.
    #[error("a QR payment is already pending (reference {reference})")]
    QrPending { reference: String },

    /// A QR completion arrived with no matching pending request.
    #[error("no matching pending QR payment")]
    NoPendingQr,

    /// A domain error from the settlement engine.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Error codes for the UI boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NoSession,
    SessionActive,
    SplitNotFound,
    UnknownCurrency,
    WrongMode,
    SplitPlanLocked,
    QrPending,
    NoPendingQr,
    InvalidAmount,
    ExceedsRemaining,
    InsufficientQuantity,
    InvalidInput,
    ConfirmationRequired,
    MethodNotEnabled,
    ValidationError,
}

impl CheckoutError {
    /// Machine-readable code for programmatic handling in the frontend.
    pub fn code(&self) -> ErrorCode {
        match self {
            CheckoutError::NoSession => ErrorCode::NoSession,
            CheckoutError::SessionActive => ErrorCode::SessionActive,
            CheckoutError::SplitNotFound { .. } => ErrorCode::SplitNotFound,
            CheckoutError::UnknownCurrency { .. } => ErrorCode::UnknownCurrency,
            CheckoutError::NotSplitMode | CheckoutError::NotFullPaymentMode => ErrorCode::WrongMode,
            CheckoutError::SplitPlanLocked { .. } => ErrorCode::SplitPlanLocked,
            CheckoutError::QrPending { .. } => ErrorCode::QrPending,
            CheckoutError::NoPendingQr => ErrorCode::NoPendingQr,
            CheckoutError::Core(core) => match core {
                CoreError::InvalidAmount { .. } => ErrorCode::InvalidAmount,
                CoreError::ExceedsRemaining { .. } => ErrorCode::ExceedsRemaining,
                CoreError::InsufficientQuantity { .. } => ErrorCode::InsufficientQuantity,
                CoreError::InvalidInput { .. } => ErrorCode::InvalidInput,
                CoreError::PartialPaymentConfirmationRequired { .. } => {
                    ErrorCode::ConfirmationRequired
                }
                CoreError::MethodNotEnabled { .. } => ErrorCode::MethodNotEnabled,
                CoreError::Validation(_) => ErrorCode::ValidationError,
            },
        }
    }
}

/// Serializes as `{ "code": "...", "message": "..." }` for the frontend.
impl Serialize for CheckoutError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("CheckoutError", 2)?;
        state.serialize_field("code", &self.code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::Money;

    #[test]
    fn test_core_errors_map_to_codes() {
        let err: CheckoutError = CoreError::ExceedsRemaining {
            requested: Money::from_minor(5000),
            remaining: Money::from_minor(2000),
        }
        .into();
        assert_eq!(err.code(), ErrorCode::ExceedsRemaining);

        let err: CheckoutError = CoreError::PartialPaymentConfirmationRequired {
            remaining: Money::from_minor(1000),
        }
        .into();
        assert_eq!(err.code(), ErrorCode::ConfirmationRequired);
    }

    #[test]
    fn test_serializes_code_and_message() {
        let err = CheckoutError::SplitNotFound {
            id: "abc".to_string(),
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "SPLIT_NOT_FOUND");
        assert_eq!(json["message"], "split not found: abc");
    }
}
