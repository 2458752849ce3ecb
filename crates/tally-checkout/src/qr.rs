//! # QR Payment Boundary
//!
//! The one genuinely asynchronous edge of checkout: a Fonepay QR tender
//! is requested, displayed, and later confirmed or abandoned by an
//! out-of-process event.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    QR Payment Lifecycle                                 │
//! │                                                                         │
//! │  Session                     UI Task                 Webhook/Poller     │
//! │  ───────                     ───────                 ──────────────     │
//! │                                                                         │
//! │  begin_qr_payment() ───────► QrTransaction           QrConfirmer        │
//! │  (amount FIXED here)         render QR, wait()       held elsewhere     │
//! │                                   │                       │             │
//! │                                   │◄── confirm()/abandon()┘             │
//! │                                   ▼                                     │
//! │  complete_qr_payment(outcome) ── Confirmed → ledger.record(...)        │
//! │                                  Abandoned → pending slot cleared       │
//! │                                                                         │
//! │  INVARIANT: at most one pending QR request per session. Dropping the   │
//! │  confirmer without answering counts as Abandoned, never Confirmed.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Note the amount is fixed when the request is created; the confirmation
//! carries no amount of its own, so a stale confirmation can never record
//! a different figure than the one shown in the QR.

use serde::{Deserialize, Serialize};
use tally_core::Money;
use tokio::sync::oneshot;

/// The QR payment method name as it appears in the ledger.
pub const QR_METHOD: &str = "Fonepay";

/// A QR tender awaiting confirmation, as handed to the UI for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrPaymentRequest {
    /// Unique reference (UUID v4) correlating request and confirmation.
    pub reference: String,

    /// Base-currency amount, fixed at request time.
    pub amount: Money,

    /// Code of the currency the amount is denominated in.
    pub currency_code: String,

    /// Formatted amount for the QR overlay ("Rs 1333.33").
    pub display: String,
}

/// How a pending QR request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QrOutcome {
    /// The payment gateway reported success.
    Confirmed,
    /// Cancelled, timed out, or the confirmer was dropped.
    Abandoned,
}

/// The waiting half: the UI task holds this and awaits the outcome.
#[derive(Debug)]
pub struct QrTransaction {
    request: QrPaymentRequest,
    rx: oneshot::Receiver<QrOutcome>,
}

impl QrTransaction {
    /// The request to render.
    pub fn request(&self) -> &QrPaymentRequest {
        &self.request
    }

    /// Waits for the gateway's answer. A dropped confirmer resolves to
    /// [`QrOutcome::Abandoned`].
    pub async fn wait(self) -> QrOutcome {
        self.rx.await.unwrap_or(QrOutcome::Abandoned)
    }
}

/// The answering half, held by whatever observes the gateway (webhook
/// handler, status poller, or the cashier's manual confirmation).
#[derive(Debug)]
pub struct QrConfirmer {
    tx: Option<oneshot::Sender<QrOutcome>>,
}

impl QrConfirmer {
    /// Reports a successful payment.
    pub fn confirm(mut self) {
        self.send(QrOutcome::Confirmed);
    }

    /// Reports cancellation.
    pub fn abandon(mut self) {
        self.send(QrOutcome::Abandoned);
    }

    fn send(&mut self, outcome: QrOutcome) {
        if let Some(tx) = self.tx.take() {
            // the transaction side may already have given up waiting
            let _ = tx.send(outcome);
        }
    }
}

impl Drop for QrConfirmer {
    fn drop(&mut self) {
        self.send(QrOutcome::Abandoned);
    }
}

/// Pairs a request with its confirmation channel.
pub fn begin(request: QrPaymentRequest) -> (QrTransaction, QrConfirmer) {
    let (tx, rx) = oneshot::channel();
    (QrTransaction { request, rx }, QrConfirmer { tx: Some(tx) })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> QrPaymentRequest {
        QrPaymentRequest {
            reference: "ref-1".to_string(),
            amount: Money::from_minor(5000),
            currency_code: "NPR".to_string(),
            display: "Rs 50.00".to_string(),
        }
    }

    #[tokio::test]
    async fn test_confirm_resolves_transaction() {
        let (tx, confirmer) = begin(request());
        confirmer.confirm();
        assert_eq!(tx.wait().await, QrOutcome::Confirmed);
    }

    #[tokio::test]
    async fn test_abandon_resolves_transaction() {
        let (tx, confirmer) = begin(request());
        confirmer.abandon();
        assert_eq!(tx.wait().await, QrOutcome::Abandoned);
    }

    #[tokio::test]
    async fn test_dropped_confirmer_counts_as_abandoned() {
        let (tx, confirmer) = begin(request());
        drop(confirmer);
        assert_eq!(tx.wait().await, QrOutcome::Abandoned);
    }

    #[tokio::test]
    async fn test_dropped_transaction_does_not_panic_confirmer() {
        let (tx, confirmer) = begin(request());
        drop(tx);
        confirmer.confirm();
    }
}
