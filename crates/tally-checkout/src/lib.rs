//! # tally-checkout: Checkout Session Layer
//!
//! Drives one checkout at a time on top of [`tally_core`]: session
//! lifecycle, full-payment vs. split-bill mode, per-split tendering, and
//! the async QR payment boundary.
//!
//! ## Layering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      tally-checkout Layering                            │
//! │                                                                         │
//! │  UI commands ──► SessionState (Arc<Mutex<Option<CheckoutSession>>>)    │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                  CheckoutSession ──► tally-core (pure settlement)      │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                  qr (tokio oneshot) - the only async edge              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust,ignore
//! let state = SessionState::new();
//! state.open(CheckoutSession::new(order, currencies, methods, settings)?)?;
//!
//! state.with_session_mut(|s| s.add_payment("Cash", dec!(50.00), "NPR"))?;
//! let result = state.with_session(|s| s.finalize("Cash", true))?;
//! state.close();
//! ```

pub mod error;
pub mod qr;
pub mod session;
pub mod state;

pub use error::{CheckoutError, CheckoutResult, ErrorCode};
pub use qr::{QrConfirmer, QrOutcome, QrPaymentRequest, QrTransaction, QR_METHOD};
pub use session::{CheckoutSession, SettlementMode, SplitPlan};
pub use state::SessionState;
