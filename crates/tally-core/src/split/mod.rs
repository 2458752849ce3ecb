//! # Bill Splitting
//!
//! Partitions one order's grand total into two or more independently
//! payable "splits".
//!
//! ## Strategy Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Split Strategies                                   │
//! │                                                                         │
//! │  Equal   [equal]   grand total / n, residual minor unit to share #1    │
//! │  Custom  [custom]  operator carves amounts out of a remaining pool     │
//! │  ByItem  [item]    item quantities move from an unassigned pool into   │
//! │                    per-split buckets; tax redistributed proportionally │
//! │                                                                         │
//! │  Shared invariant: Σ split.total_amount == order grand total (within   │
//! │  one minor unit; EXACT for the equal strategy) before the sale can be  │
//! │  finalized as complete.                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each split carries its own [`PaymentLedger`] and [`TipAllocator`] and
//! is settled independently; the whole sale only finalizes when every
//! split is paid.

pub mod custom;
pub mod equal;
pub mod item;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::ledger::PaymentLedger;
use crate::money::Money;
use crate::settlement::{SettlementResolver, SettlementState};
use crate::tip::TipAllocator;
use crate::types::OrderItem;
use crate::MONEY_EPSILON;

pub use custom::RemainingPool;
pub use item::ItemSplitAllocator;

// =============================================================================
// Split Kind
// =============================================================================

/// Which strategy produced a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SplitKind {
    /// One of n equal shares of the grand total.
    Equal,
    /// An operator-chosen amount carved from the remaining pool.
    Custom,
    /// A bucket of specific items with proportionally distributed tax.
    ByItem,
}

// =============================================================================
// Split
// =============================================================================

/// One independently payable portion of a divided bill.
///
/// ## Lifecycle
/// ```text
/// created by a strategy (is_paid = false)
///      │
///      ▼  tender into ledger / apply tip (any number of times)
///      │
///      ▼  settle() - single atomic transition, requires full coverage
///      │
/// is_paid = true  →  IMMUTABLE (ledger and tip are refused mutably)
/// ```
///
/// Re-opening a paid split to edit it is explicitly disallowed; the
/// engine enforces this by construction, not by convention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Split {
    id: String,
    kind: SplitKind,

    /// Assigned items (ByItem only; empty for Equal/Custom).
    pub(crate) items: Vec<OrderItem>,

    pub(crate) sub_total: Money,
    pub(crate) tax_amount: Money,
    pub(crate) total_amount: Money,

    pub(crate) tip: TipAllocator,
    pub(crate) ledger: PaymentLedger,
    pub(crate) is_paid: bool,
}

impl Split {
    /// Creates an unpaid split. Only strategies construct splits.
    pub(crate) fn new(
        kind: SplitKind,
        items: Vec<OrderItem>,
        sub_total: Money,
        tax_amount: Money,
        total_amount: Money,
    ) -> Self {
        Split {
            id: Uuid::new_v4().to_string(),
            kind,
            items,
            sub_total,
            tax_amount,
            total_amount,
            tip: TipAllocator::new(),
            ledger: PaymentLedger::new(),
            is_paid: false,
        }
    }

    /// Unique identifier (UUID v4).
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The strategy that produced this split.
    #[inline]
    pub fn kind(&self) -> SplitKind {
        self.kind
    }

    /// Items assigned to this split (ByItem only).
    #[inline]
    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    /// Subtotal share. Informational for Equal/Custom splits (the whole
    /// share is treated as subtotal there).
    #[inline]
    pub fn sub_total(&self) -> Money {
        self.sub_total
    }

    /// Tax share. Zero for Equal/Custom (tax is embedded in the share);
    /// proportionally distributed for ByItem.
    #[inline]
    pub fn tax_amount(&self) -> Money {
        self.tax_amount
    }

    /// What this split owes of the order (tip excluded).
    #[inline]
    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    /// The applied tip (≥ 0, default 0).
    #[inline]
    pub fn tip_amount(&self) -> Money {
        self.tip.amount()
    }

    /// What must actually be covered to settle: total + tip.
    #[inline]
    pub fn payable(&self) -> Money {
        self.total_amount + self.tip.amount()
    }

    /// Whether this split has been settled and frozen.
    #[inline]
    pub fn is_paid(&self) -> bool {
        self.is_paid
    }

    /// Read access to the split's ledger.
    pub fn ledger(&self) -> &PaymentLedger {
        &self.ledger
    }

    /// Mutable access to the ledger, refused once paid.
    pub fn ledger_mut(&mut self) -> CoreResult<&mut PaymentLedger> {
        self.ensure_unpaid()?;
        Ok(&mut self.ledger)
    }

    /// Applies a fixed tip, refused once paid.
    pub fn apply_tip(&mut self, amount: Money) -> CoreResult<()> {
        self.ensure_unpaid()?;
        self.tip.apply_fixed(amount)
    }

    /// Proposes a percentage tip on this split's subtotal share. The
    /// caller still applies the returned amount explicitly.
    pub fn suggest_tip(&self, pct: rust_decimal::Decimal) -> CoreResult<Money> {
        TipAllocator::percentage_of(pct, self.sub_total)
    }

    /// The single atomic "finalize this split's payment" transition.
    ///
    /// Requires the ledger to fully cover `payable()` under the chosen
    /// method ([`SettlementState::Settled`]); partial or deferred ("Due")
    /// tenders are refused - split-bill mode has no per-split due.
    pub fn settle(&mut self, method: &str) -> CoreResult<()> {
        self.ensure_unpaid()?;

        let state = SettlementResolver::resolve(self.payable(), &self.ledger, method);
        if state != SettlementState::Settled {
            return Err(CoreError::InvalidInput {
                reason: format!(
                    "split {} is not fully paid: {} of {} tendered",
                    self.id,
                    self.ledger.total_paid(),
                    self.payable()
                ),
            });
        }

        self.is_paid = true;
        Ok(())
    }

    fn ensure_unpaid(&self) -> CoreResult<()> {
        if self.is_paid {
            return Err(CoreError::InvalidInput {
                reason: format!("split {} is already paid and immutable", self.id),
            });
        }
        Ok(())
    }
}

// =============================================================================
// Cross-Split Helpers
// =============================================================================

/// Sum of all splits' total amounts (tip excluded).
pub fn total_allocated(splits: &[Split]) -> Money {
    splits.iter().map(|s| s.total_amount).sum()
}

/// Sum of all splits' tips.
pub fn total_tip(splits: &[Split]) -> Money {
    splits.iter().map(|s| s.tip_amount()).sum()
}

/// Whether the splits reconcile against the order grand total within one
/// minor unit (tip excluded). Required before a split-bill sale can be
/// finalized as complete.
pub fn covers_grand_total(splits: &[Split], grand_total: Money) -> bool {
    (total_allocated(splits) - grand_total).abs() <= MONEY_EPSILON
}

/// Whether every split has been settled.
pub fn all_paid(splits: &[Split]) -> bool {
    splits.iter().all(|s| s.is_paid)
}

// =============================================================================
// Unit Tests
// =============================================================================
