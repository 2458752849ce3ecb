//! # Domain Types
//!
//! Core domain types consumed and produced by the settlement engine.
//!
//! ## Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Who Owns What                                    │
//! │                                                                         │
//! │  Order/outlet context (external, read-only per session):               │
//! │    OrderSnapshot { items, sub_total, taxes, grand_total }              │
//! │    Currency list + ApplicationSettings + enabled payment methods       │
//! │                                                                         │
//! │  Checkout session (owned, discarded if cancelled before finalize):     │
//! │    Split, PaymentLedger, PartialPayment, TipAllocator                  │
//! │                                                                         │
//! │  Caller (persistence layer) receives:                                  │
//! │    FinalizeSaleResult - the sole output contract                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine never fetches or persists any of this itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::money::Money;

// =============================================================================
// Order Snapshot
// =============================================================================

/// A line item in the finalized order.
///
/// Items with different `notes` are distinct allocation units even when
/// they share an `id` ("Momo" vs. "Momo - no chili" split to different
/// guests), so every pool operation keys on (id, notes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Menu item identifier.
    pub id: String,

    /// Display name shown to the cashier and on the split picker.
    pub name: String,

    /// Unit price at time of order (frozen).
    pub unit_price: Money,

    /// Quantity ordered (> 0).
    pub quantity: i64,

    /// Kitchen/preparation notes; part of the allocation identity.
    pub notes: Option<String>,
}

impl OrderItem {
    /// Line total (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }

    /// Whether `other` refers to the same allocation unit (same id AND
    /// same notes).
    #[inline]
    pub fn same_unit(&self, id: &str, notes: Option<&str>) -> bool {
        self.id == id && self.notes.as_deref() == notes
    }
}

/// One named tax line of the order's tax breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TaxLine {
    /// e.g. "VAT", "Service Charge".
    pub name: String,

    /// Tax amount in base currency.
    pub amount: Money,
}

/// The finalized order the engine settles, supplied read-only by the
/// order context.
///
/// ## Invariant
/// `grand_total == sub_total + Σ taxes` within one minor unit; verified
/// by [`crate::validation::validate_order_snapshot`] before a session
/// opens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderSnapshot {
    pub items: Vec<OrderItem>,
    pub sub_total: Money,
    pub taxes: Vec<TaxLine>,
    pub grand_total: Money,
}

impl OrderSnapshot {
    /// Sum of all tax lines.
    pub fn tax_total(&self) -> Money {
        self.taxes.iter().map(|t| t.amount).sum()
    }
}

// =============================================================================
// Partial Payment
// =============================================================================

/// One recorded payment towards a payable (whole order or single split).
///
/// Immutable once recorded; a ledger is an ordered, append-only sequence
/// of these until its payable is finalized. The amount is ALWAYS in base
/// currency - display-currency tenders are converted on the way in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PartialPayment {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Outlet-configured method name ("Cash", "Card", "Fonepay", "Due").
    pub method: String,

    /// Base-currency amount (> 0).
    pub amount: Money,

    /// When the payment was recorded.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl PartialPayment {
    /// Creates a new payment record with a fresh id.
    pub fn new(method: impl Into<String>, amount: Money) -> Self {
        PartialPayment {
            id: Uuid::new_v4().to_string(),
            method: method.into(),
            amount,
            created_at: Utc::now(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
