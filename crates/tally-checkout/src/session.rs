//! # Checkout Session
//!
//! Drives one checkout from opening an order snapshot to the finalized
//! sale.
//!
//! ## Session Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Checkout Session Lifecycle                           │
//! │                                                                         │
//! │  open(order snapshot) ── validated: consistent totals, sane currencies │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  FULL PAYMENT mode (default)          SPLIT BILL mode                   │
//! │  ─────────────────────────            ───────────────                   │
//! │  add_payment / apply_tip     ◄──────► split_equally / split_custom /   │
//! │  remaining_due / change       switch  split_by_item                     │
//! │         │                    (only while nothing tendered)              │
//! │         │                                    │                          │
//! │         ▼                                    ▼                          │
//! │  finalize(method, confirmed)          pay_split / settle_split each,   │
//! │  "Due" defers, partial needs          then finalize() - all-or-nothing │
//! │  confirmation                                                           │
//! │         │                                    │                          │
//! │         └──────────────► FinalizeSaleResult ◄┘                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The session is single-threaded by design; concurrency is handled one
//! level up by [`crate::state::SessionState`], and the only async edge is
//! the QR boundary in [`crate::qr`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info};
use uuid::Uuid;

use tally_core::split::{
    self, equal::generate_equal_splits, ItemSplitAllocator, RemainingPool, Split,
};
use tally_core::validation::{
    validate_currencies, validate_method_enabled, validate_order_snapshot, validate_settings,
};
use tally_core::{
    ApplicationSettings, CoreError, Currency, CurrencyConverter, FinalizeSaleResult, Money,
    OrderItem, OrderSnapshot, PartialPayment, PaymentLedger, SettlementResolver, SettlementState,
    TipAllocator, ValidationError, DUE_METHOD,
};

use crate::error::{CheckoutError, CheckoutResult};
use crate::qr::{self, QrConfirmer, QrOutcome, QrPaymentRequest, QrTransaction, QR_METHOD};

// =============================================================================
// Settlement Mode
// =============================================================================

/// The active split plan in split-bill mode.
#[derive(Debug, Clone)]
pub enum SplitPlan {
    /// n equal shares, fixed at creation.
    Equal(Vec<Split>),
    /// Operator-carved amounts against a remaining pool.
    Custom {
        pool: RemainingPool,
        splits: Vec<Split>,
    },
    /// Item-by-item allocation.
    ByItem(ItemSplitAllocator),
}

/// How the session collects payment.
///
/// A session starts in full-payment mode and may switch to (or between)
/// split plans only while nothing has been tendered anywhere.
#[derive(Debug, Clone)]
pub enum SettlementMode {
    /// One ledger and one tip against the whole order.
    FullPayment {
        ledger: PaymentLedger,
        tip: TipAllocator,
    },
    /// Independent per-split ledgers and tips.
    SplitBill(SplitPlan),
}

/// An outstanding QR request (at most one per session).
#[derive(Debug, Clone)]
struct PendingQr {
    reference: String,
    split_id: Option<String>,
    amount: Money,
}

// =============================================================================
// Checkout Session
// =============================================================================

/// One checkout in progress.
#[derive(Debug)]
pub struct CheckoutSession {
    id: String,
    order: OrderSnapshot,
    currencies: Vec<Currency>,
    enabled_methods: Vec<String>,
    converter: CurrencyConverter,
    mode: SettlementMode,
    pending_qr: Option<PendingQr>,
    opened_at: DateTime<Utc>,
}

impl CheckoutSession {
    /// Opens a session over a finalized order snapshot.
    ///
    /// ## Errors
    /// Validation failure for an inconsistent snapshot (grand total not
    /// subtotal + taxes) or a malformed currency list (no single default,
    /// non-positive rates).
    pub fn new(
        order: OrderSnapshot,
        currencies: Vec<Currency>,
        enabled_methods: Vec<String>,
        settings: ApplicationSettings,
    ) -> CheckoutResult<Self> {
        validate_order_snapshot(&order).map_err(CoreError::from)?;
        validate_currencies(&currencies).map_err(CoreError::from)?;
        validate_settings(&settings).map_err(CoreError::from)?;

        let session = CheckoutSession {
            id: Uuid::new_v4().to_string(),
            order,
            currencies,
            enabled_methods,
            converter: CurrencyConverter::new(settings),
            mode: SettlementMode::FullPayment {
                ledger: PaymentLedger::new(),
                tip: TipAllocator::new(),
            },
            pending_qr: None,
            opened_at: Utc::now(),
        };

        info!(
            session_id = %session.id,
            grand_total = %session.order.grand_total,
            "checkout session opened"
        );
        Ok(session)
    }

    /// Session identifier (UUID v4).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The order being settled.
    pub fn order(&self) -> &OrderSnapshot {
        &self.order
    }

    /// The order's grand total.
    pub fn grand_total(&self) -> Money {
        self.order.grand_total
    }

    /// When the session was opened.
    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    /// The session's currency converter.
    pub fn converter(&self) -> &CurrencyConverter {
        &self.converter
    }

    /// The current settlement mode.
    pub fn mode(&self) -> &SettlementMode {
        &self.mode
    }

    /// Whether the session is in split-bill mode.
    pub fn is_split(&self) -> bool {
        matches!(self.mode, SettlementMode::SplitBill(_))
    }

    /// Looks up an accepted currency by code.
    pub fn currency(&self, code: &str) -> CheckoutResult<&Currency> {
        self.currencies
            .iter()
            .find(|c| c.code == code)
            .ok_or_else(|| CheckoutError::UnknownCurrency {
                code: code.to_string(),
            })
    }

    fn default_currency(&self) -> CheckoutResult<&Currency> {
        // validate_currencies guarantees exactly one at open
        self.currencies
            .iter()
            .find(|c| c.is_default)
            .ok_or_else(|| {
                CoreError::InvalidInput {
                    reason: "no default currency configured".to_string(),
                }
                .into()
            })
    }

    /// Validates a method against the outlet's enabled list, with "Due"
    /// always implicitly available.
    fn check_method(&self, method: &str) -> CheckoutResult<()> {
        validate_method_enabled(method, &self.enabled_methods).map_err(|err| match err {
            ValidationError::NotAllowed { .. } => CoreError::MethodNotEnabled {
                method: method.to_string(),
            }
            .into(),
            other => CheckoutError::Core(other.into()),
        })
    }

    /// "Due" is a finalize-time method; it never enters a ledger.
    fn reject_due_tender(method: &str) -> CheckoutResult<()> {
        if method.trim() == DUE_METHOD {
            return Err(CoreError::InvalidInput {
                reason: format!(
                    "'{}' defers the balance at finalize time and cannot be tendered",
                    DUE_METHOD
                ),
            }
            .into());
        }
        Ok(())
    }

    // =========================================================================
    // Full-Payment Mode
    // =========================================================================

    fn full_ledger(&self) -> CheckoutResult<(&PaymentLedger, &TipAllocator)> {
        match &self.mode {
            SettlementMode::FullPayment { ledger, tip } => Ok((ledger, tip)),
            SettlementMode::SplitBill(_) => Err(CheckoutError::NotFullPaymentMode),
        }
    }

    /// Tenders a payment against the whole order.
    pub fn add_payment(
        &mut self,
        method: &str,
        amount: Decimal,
        currency_code: &str,
    ) -> CheckoutResult<Money> {
        self.check_method(method)?;
        Self::reject_due_tender(method)?;
        let currency = self.currency(currency_code)?.clone();
        let converter = self.converter;

        match &mut self.mode {
            SettlementMode::FullPayment { ledger, .. } => {
                let base = ledger.add_payment(method, amount, &currency, &converter)?;
                debug!(session_id = %self.id, method, amount = %base, "payment recorded");
                Ok(base)
            }
            SettlementMode::SplitBill(_) => Err(CheckoutError::NotFullPaymentMode),
        }
    }

    /// Removes a tendered payment by index (pre-finalize correction).
    pub fn remove_payment(&mut self, index: usize) -> CheckoutResult<PartialPayment> {
        match &mut self.mode {
            SettlementMode::FullPayment { ledger, .. } => Ok(ledger.remove_payment(index)?),
            SettlementMode::SplitBill(_) => Err(CheckoutError::NotFullPaymentMode),
        }
    }

    /// Applies a fixed tip to the whole order.
    pub fn apply_tip(&mut self, amount: Money) -> CheckoutResult<()> {
        match &mut self.mode {
            SettlementMode::FullPayment { tip, .. } => {
                tip.apply_fixed(amount).map_err(CheckoutError::from)
            }
            SettlementMode::SplitBill(_) => Err(CheckoutError::NotFullPaymentMode),
        }
    }

    /// Proposes a percentage tip on the order subtotal (not applied).
    pub fn suggest_tip(&self, pct: Decimal) -> CheckoutResult<Money> {
        Ok(TipAllocator::percentage_of(pct, self.order.sub_total)?)
    }

    /// Grand total plus the applied tip.
    pub fn payable(&self) -> CheckoutResult<Money> {
        let (_, tip) = self.full_ledger()?;
        Ok(self.order.grand_total + tip.amount())
    }

    /// Sum of tendered payments.
    pub fn total_paid(&self) -> CheckoutResult<Money> {
        Ok(self.full_ledger()?.0.total_paid())
    }

    /// Outstanding balance; negative when overpaid.
    pub fn remaining_due(&self) -> CheckoutResult<Money> {
        let payable = self.payable()?;
        Ok(self.full_ledger()?.0.remaining_due(payable))
    }

    /// Change owed to the customer (zero unless overpaid).
    pub fn change(&self) -> CheckoutResult<Money> {
        let payable = self.payable()?;
        Ok(self.full_ledger()?.0.change(payable))
    }

    // =========================================================================
    // Split Plan Lifecycle
    // =========================================================================

    /// The plan may only change while the session carries no money at
    /// all: no tendered payments anywhere and no pending QR request.
    fn ensure_plan_changeable(&self) -> CheckoutResult<()> {
        if let Some(pending) = &self.pending_qr {
            return Err(CheckoutError::SplitPlanLocked {
                reason: format!("QR payment {} is pending", pending.reference),
            });
        }

        let locked = match &self.mode {
            SettlementMode::FullPayment { ledger, .. } => !ledger.is_empty(),
            SettlementMode::SplitBill(plan) => plan_splits(plan)
                .iter()
                .any(|s| s.is_paid() || !s.ledger().is_empty()),
        };
        if locked {
            return Err(CheckoutError::SplitPlanLocked {
                reason: "payments have already been recorded".to_string(),
            });
        }
        Ok(())
    }

    /// Switches to an equal split of the grand total.
    pub fn split_equally(&mut self, ways: u32) -> CheckoutResult<()> {
        self.ensure_plan_changeable()?;
        let splits = generate_equal_splits(ways, self.order.grand_total)?;
        info!(session_id = %self.id, ways, "equal split plan created");
        self.mode = SettlementMode::SplitBill(SplitPlan::Equal(splits));
        Ok(())
    }

    /// Switches to a custom split with the full grand total unallocated.
    pub fn split_custom(&mut self) -> CheckoutResult<()> {
        self.ensure_plan_changeable()?;
        info!(session_id = %self.id, "custom split plan created");
        self.mode = SettlementMode::SplitBill(SplitPlan::Custom {
            pool: RemainingPool::new(self.order.grand_total),
            splits: Vec::new(),
        });
        Ok(())
    }

    /// Switches to an item split with every item unassigned.
    pub fn split_by_item(&mut self) -> CheckoutResult<()> {
        self.ensure_plan_changeable()?;
        info!(session_id = %self.id, "item split plan created");
        self.mode = SettlementMode::SplitBill(SplitPlan::ByItem(ItemSplitAllocator::new(
            &self.order,
        )));
        Ok(())
    }

    /// Abandons the split plan, returning to full-payment mode. Refused
    /// once any split carries money.
    pub fn clear_split_plan(&mut self) -> CheckoutResult<()> {
        if !self.is_split() {
            return Err(CheckoutError::NotSplitMode);
        }
        self.ensure_plan_changeable()?;
        info!(session_id = %self.id, "split plan cleared");
        self.mode = SettlementMode::FullPayment {
            ledger: PaymentLedger::new(),
            tip: TipAllocator::new(),
        };
        Ok(())
    }

    fn plan(&self) -> CheckoutResult<&SplitPlan> {
        match &self.mode {
            SettlementMode::SplitBill(plan) => Ok(plan),
            SettlementMode::FullPayment { .. } => Err(CheckoutError::NotSplitMode),
        }
    }

    fn plan_mut(&mut self) -> CheckoutResult<&mut SplitPlan> {
        match &mut self.mode {
            SettlementMode::SplitBill(plan) => Ok(plan),
            SettlementMode::FullPayment { .. } => Err(CheckoutError::NotSplitMode),
        }
    }

    /// The current splits, in creation order.
    pub fn splits(&self) -> CheckoutResult<&[Split]> {
        Ok(plan_splits(self.plan()?))
    }

    fn split_ref(&self, split_id: &str) -> CheckoutResult<&Split> {
        plan_splits(self.plan()?)
            .iter()
            .find(|s| s.id() == split_id)
            .ok_or_else(|| CheckoutError::SplitNotFound {
                id: split_id.to_string(),
            })
    }

    fn split_mut(&mut self, split_id: &str) -> CheckoutResult<&mut Split> {
        let found = match self.plan_mut()? {
            SplitPlan::Equal(splits) | SplitPlan::Custom { splits, .. } => {
                splits.iter_mut().find(|s| s.id() == split_id)
            }
            SplitPlan::ByItem(alloc) => alloc.split_mut(split_id),
        };
        found.ok_or_else(|| CheckoutError::SplitNotFound {
            id: split_id.to_string(),
        })
    }

    // =========================================================================
    // Custom Plan Operations
    // =========================================================================

    /// Carves a new custom split out of the remaining pool.
    pub fn add_custom_split(&mut self, amount: Money) -> CheckoutResult<String> {
        match self.plan_mut()? {
            SplitPlan::Custom { pool, splits } => {
                let split = pool.add_split(amount)?;
                let id = split.id().to_string();
                splits.push(split);
                Ok(id)
            }
            _ => Err(CheckoutError::NotSplitMode),
        }
    }

    /// The unallocated remainder of the custom pool.
    pub fn remaining_pool(&self) -> CheckoutResult<Money> {
        match self.plan()? {
            SplitPlan::Custom { pool, .. } => Ok(pool.remaining()),
            _ => Err(CheckoutError::NotSplitMode),
        }
    }

    // =========================================================================
    // Item Plan Operations
    // =========================================================================

    fn item_allocator(&self) -> CheckoutResult<&ItemSplitAllocator> {
        match self.plan()? {
            SplitPlan::ByItem(alloc) => Ok(alloc),
            _ => Err(CheckoutError::NotSplitMode),
        }
    }

    fn item_allocator_mut(&mut self) -> CheckoutResult<&mut ItemSplitAllocator> {
        match self.plan_mut()? {
            SplitPlan::ByItem(alloc) => Ok(alloc),
            _ => Err(CheckoutError::NotSplitMode),
        }
    }

    /// Adds an empty item-split bucket.
    pub fn add_item_split(&mut self) -> CheckoutResult<String> {
        Ok(self.item_allocator_mut()?.add_split())
    }

    /// Moves item quantity from the unassigned pool into a split.
    pub fn move_item(
        &mut self,
        item_id: &str,
        notes: Option<&str>,
        quantity: i64,
        split_id: &str,
    ) -> CheckoutResult<()> {
        Ok(self
            .item_allocator_mut()?
            .move_item(item_id, notes, quantity, split_id)?)
    }

    /// Moves item quantity back from a split into the unassigned pool.
    pub fn return_item(
        &mut self,
        split_id: &str,
        item_id: &str,
        notes: Option<&str>,
        quantity: i64,
    ) -> CheckoutResult<()> {
        Ok(self
            .item_allocator_mut()?
            .return_item(split_id, item_id, notes, quantity)?)
    }

    /// Items not yet assigned to any split.
    pub fn unassigned_items(&self) -> CheckoutResult<&[OrderItem]> {
        Ok(self.item_allocator()?.unassigned())
    }

    // =========================================================================
    // Per-Split Tendering
    // =========================================================================

    /// Tenders a payment against one split.
    pub fn pay_split(
        &mut self,
        split_id: &str,
        method: &str,
        amount: Decimal,
        currency_code: &str,
    ) -> CheckoutResult<Money> {
        self.check_method(method)?;
        Self::reject_due_tender(method)?;
        let currency = self.currency(currency_code)?.clone();
        let converter = self.converter;

        let split = self.split_mut(split_id)?;
        let base = split
            .ledger_mut()?
            .add_payment(method, amount, &currency, &converter)?;
        debug!(split_id, method, amount = %base, "split payment recorded");
        Ok(base)
    }

    /// Removes a split's tendered payment by index. Refused while a QR
    /// request targets the split; its amount was fixed against the
    /// current balance.
    pub fn remove_split_payment(
        &mut self,
        split_id: &str,
        index: usize,
    ) -> CheckoutResult<PartialPayment> {
        self.ensure_no_qr_against(split_id)?;
        Ok(self.split_mut(split_id)?.ledger_mut()?.remove_payment(index)?)
    }

    /// Applies a fixed tip to one split.
    pub fn tip_split(&mut self, split_id: &str, amount: Money) -> CheckoutResult<()> {
        Ok(self.split_mut(split_id)?.apply_tip(amount)?)
    }

    /// Proposes a percentage tip on one split's share (not applied).
    pub fn suggest_split_tip(&self, split_id: &str, pct: Decimal) -> CheckoutResult<Money> {
        Ok(self.split_ref(split_id)?.suggest_tip(pct)?)
    }

    /// Settles one split. Requires its ledger to fully cover share + tip;
    /// the split is immutable afterwards.
    ///
    /// Refused while a QR request targets the split: settling would
    /// freeze the ledger and a later gateway confirmation could not be
    /// recorded. Resolve the QR request first.
    pub fn settle_split(&mut self, split_id: &str, method: &str) -> CheckoutResult<()> {
        self.check_method(method)?;
        self.ensure_no_qr_against(split_id)?;
        let split = self.split_mut(split_id)?;
        split.settle(method)?;
        info!(split_id, method, "split settled");
        Ok(())
    }

    // =========================================================================
    // QR Boundary
    // =========================================================================

    /// A split with an outstanding QR request must stay open (and its
    /// ledger stable) until the request resolves.
    fn ensure_no_qr_against(&self, split_id: &str) -> CheckoutResult<()> {
        if let Some(pending) = &self.pending_qr {
            if pending.split_id.as_deref() == Some(split_id) {
                return Err(CheckoutError::QrPending {
                    reference: pending.reference.clone(),
                });
            }
        }
        Ok(())
    }

    /// Starts a QR payment for the outstanding balance of the whole
    /// order (`split_id = None`) or one split.
    ///
    /// The amount is fixed at the current remaining due. At most one QR
    /// request may be pending per session.
    pub fn begin_qr_payment(
        &mut self,
        split_id: Option<&str>,
    ) -> CheckoutResult<(QrTransaction, QrConfirmer)> {
        if let Some(pending) = &self.pending_qr {
            return Err(CheckoutError::QrPending {
                reference: pending.reference.clone(),
            });
        }

        let due = match split_id {
            Some(id) => {
                let split = self.split_ref(id)?;
                split.ledger().remaining_due(split.payable())
            }
            None => self.remaining_due()?,
        };
        if !due.is_positive() {
            return Err(CoreError::InvalidInput {
                reason: "nothing is due; a QR payment needs a positive balance".to_string(),
            }
            .into());
        }

        let default = self.default_currency()?.clone();
        let request = QrPaymentRequest {
            reference: Uuid::new_v4().to_string(),
            amount: due,
            currency_code: default.code.clone(),
            display: self.converter.format(due, &default),
        };
        self.pending_qr = Some(PendingQr {
            reference: request.reference.clone(),
            split_id: split_id.map(String::from),
            amount: due,
        });

        info!(
            session_id = %self.id,
            reference = %request.reference,
            amount = %due,
            "QR payment requested"
        );
        Ok(qr::begin(request))
    }

    /// The reference of the pending QR request, if any.
    pub fn pending_qr_reference(&self) -> Option<&str> {
        self.pending_qr.as_ref().map(|p| p.reference.as_str())
    }

    /// Completes the pending QR request. On [`QrOutcome::Confirmed`] the
    /// fixed amount is recorded in the target ledger and returned; an
    /// abandoned request records nothing.
    ///
    /// The reference must match the pending request; a stale webhook for
    /// an earlier request is refused.
    pub fn complete_qr_payment(
        &mut self,
        reference: &str,
        outcome: QrOutcome,
    ) -> CheckoutResult<Option<Money>> {
        let (split_id, amount) = match &self.pending_qr {
            Some(p) if p.reference == reference => (p.split_id.clone(), p.amount),
            _ => return Err(CheckoutError::NoPendingQr),
        };

        if outcome == QrOutcome::Abandoned {
            self.pending_qr = None;
            info!(reference, "QR payment abandoned");
            return Ok(None);
        }

        let payment = PartialPayment::new(QR_METHOD, amount);
        match split_id {
            Some(id) => {
                self.split_mut(&id)?.ledger_mut()?.record(payment)?;
            }
            None => match &mut self.mode {
                SettlementMode::FullPayment { ledger, .. } => ledger.record(payment)?,
                SettlementMode::SplitBill(_) => return Err(CheckoutError::NotFullPaymentMode),
            },
        }

        self.pending_qr = None;
        info!(reference, amount = %amount, "QR payment confirmed");
        Ok(Some(amount))
    }

    // =========================================================================
    // Finalize
    // =========================================================================

    /// Finalizes the sale.
    ///
    /// Full-payment mode: resolves the ledger against the payable under
    /// `method` - "Due" defers regardless of the amount tendered, and a
    /// partial balance under any other method needs `partial_confirmed`.
    ///
    /// Split-bill mode: all-or-nothing. Every split must be settled and
    /// the splits must reconcile with the grand total; `method` and
    /// `partial_confirmed` play no part, each split already settled under
    /// its own method.
    pub fn finalize(
        &self,
        method: &str,
        partial_confirmed: bool,
    ) -> CheckoutResult<FinalizeSaleResult> {
        if let Some(pending) = &self.pending_qr {
            return Err(CheckoutError::QrPending {
                reference: pending.reference.clone(),
            });
        }

        match &self.mode {
            SettlementMode::FullPayment { ledger, tip } => {
                self.check_method(method)?;
                let payable = self.order.grand_total + tip.amount();
                let state = SettlementResolver::authorize_finalize(
                    payable,
                    ledger,
                    method,
                    partial_confirmed,
                )?;

                info!(
                    session_id = %self.id,
                    method,
                    ?state,
                    paid = %ledger.total_paid(),
                    "sale finalized"
                );
                Ok(FinalizeSaleResult {
                    payments: ledger.payments().to_vec(),
                    tip: tip.amount(),
                    state,
                    is_settled: state == SettlementState::Settled,
                    splits: None,
                })
            }

            SettlementMode::SplitBill(plan) => {
                if let SplitPlan::ByItem(alloc) = plan {
                    alloc.ensure_ready()?;
                }
                let splits = plan_splits(plan);
                if splits.is_empty() {
                    return Err(CoreError::InvalidInput {
                        reason: "no splits have been created".to_string(),
                    }
                    .into());
                }
                let unpaid = splits.iter().filter(|s| !s.is_paid()).count();
                if unpaid > 0 {
                    return Err(CoreError::InvalidInput {
                        reason: format!("{} split(s) are not yet paid", unpaid),
                    }
                    .into());
                }
                if !split::covers_grand_total(splits, self.order.grand_total) {
                    return Err(CoreError::InvalidInput {
                        reason: format!(
                            "splits cover {} of grand total {}",
                            split::total_allocated(splits),
                            self.order.grand_total
                        ),
                    }
                    .into());
                }

                let payments: Vec<PartialPayment> = splits
                    .iter()
                    .flat_map(|s| s.ledger().payments().iter().cloned())
                    .collect();
                let tip = split::total_tip(splits);

                info!(
                    session_id = %self.id,
                    splits = splits.len(),
                    tip = %tip,
                    "split sale finalized"
                );
                Ok(FinalizeSaleResult {
                    payments,
                    tip,
                    state: SettlementState::Settled,
                    is_settled: true,
                    splits: Some(splits.to_vec()),
                })
            }
        }
    }
}

/// The splits of any plan variant, in creation order.
fn plan_splits(plan: &SplitPlan) -> &[Split] {
    match plan {
        SplitPlan::Equal(splits) | SplitPlan::Custom { splits, .. } => splits,
        SplitPlan::ByItem(alloc) => alloc.splits(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tally_core::{SymbolPosition, TaxLine};

    fn item(id: &str, price: i64, qty: i64) -> OrderItem {
        OrderItem {
            id: id.to_string(),
            name: id.to_string(),
            unit_price: Money::from_minor(price),
            quantity: qty,
            notes: None,
        }
    }

    /// Rs 100.00 + 13% VAT = Rs 113.00.
    fn order() -> OrderSnapshot {
        OrderSnapshot {
            items: vec![item("momo", 2000, 4), item("chowmein", 2000, 1)],
            sub_total: Money::from_minor(10000),
            taxes: vec![TaxLine {
                name: "VAT".to_string(),
                amount: Money::from_minor(1300),
            }],
            grand_total: Money::from_minor(11300),
        }
    }

    fn currencies() -> Vec<Currency> {
        vec![
            Currency::base("NPR", "Rs"),
            Currency::with_rate("USD", "$", dec!(0.0075)),
        ]
    }

    fn methods() -> Vec<String> {
        vec!["Cash".to_string(), "Card".to_string()]
    }

    fn session() -> CheckoutSession {
        CheckoutSession::new(
            order(),
            currencies(),
            methods(),
            ApplicationSettings::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_open_rejects_inconsistent_snapshot() {
        let mut bad = order();
        bad.grand_total = Money::from_minor(20000);
        let err = CheckoutSession::new(
            bad,
            currencies(),
            methods(),
            ApplicationSettings::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CheckoutError::Core(_)));
    }

    #[test]
    fn test_open_rejects_bad_currency_list() {
        let no_default = vec![Currency::with_rate("USD", "$", dec!(0.0075))];
        assert!(CheckoutSession::new(
            order(),
            no_default,
            methods(),
            ApplicationSettings::default()
        )
        .is_err());
    }

    #[test]
    fn test_full_payment_settles() {
        let mut s = session();
        s.add_payment("Cash", dec!(113.00), "NPR").unwrap();

        let result = s.finalize("Cash", false).unwrap();
        assert_eq!(result.state, SettlementState::Settled);
        assert!(result.is_settled);
        assert_eq!(result.payments.len(), 1);
        assert!(result.splits.is_none());
    }

    #[test]
    fn test_partial_needs_confirmation() {
        let mut s = session();
        s.add_payment("Cash", dec!(50.00), "NPR").unwrap();

        let err = s.finalize("Cash", false).unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Core(CoreError::PartialPaymentConfirmationRequired { .. })
        ));

        let result = s.finalize("Cash", true).unwrap();
        assert_eq!(result.state, SettlementState::PartiallySettled);
    }

    #[test]
    fn test_due_defers_even_when_covered() {
        let mut s = session();
        s.add_payment("Cash", dec!(113.00), "NPR").unwrap();

        // covered in full, but "Due" still closes as partially settled
        let result = s.finalize("Due", false).unwrap();
        assert_eq!(result.state, SettlementState::PartiallySettled);

        let untouched = session();
        let result = untouched.finalize("Due", false).unwrap();
        assert_eq!(result.state, SettlementState::Unsettled);
    }

    #[test]
    fn test_method_gating() {
        let mut s = session();
        let err = s.add_payment("Crypto", dec!(10.00), "NPR").unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Core(CoreError::MethodNotEnabled { .. })
        ));

        // "Due" cannot be tendered as a payment either
        assert!(s.add_payment("Due", dec!(10.00), "NPR").is_err());
    }

    #[test]
    fn test_foreign_currency_tender() {
        let mut s = session();
        // $1.00 at 0.0075 => Rs 133.33, overpays the Rs 113.00 order
        let base = s.add_payment("Card", dec!(1.00), "USD").unwrap();
        assert_eq!(base.minor(), 13333);
        assert_eq!(s.change().unwrap().minor(), 2033);

        assert!(s.add_payment("Cash", dec!(1.00), "EUR").is_err());
    }

    #[test]
    fn test_tip_extends_payable() {
        let mut s = session();
        s.apply_tip(Money::from_minor(700)).unwrap();
        assert_eq!(s.payable().unwrap().minor(), 12000);

        s.add_payment("Cash", dec!(113.00), "NPR").unwrap();
        // covers the order but not the tip
        assert!(s.finalize("Cash", false).is_err());

        s.add_payment("Cash", dec!(7.00), "NPR").unwrap();
        let result = s.finalize("Cash", false).unwrap();
        assert_eq!(result.state, SettlementState::Settled);
        assert_eq!(result.tip.minor(), 700);
    }

    #[test]
    fn test_equal_split_lifecycle() {
        let mut s = session();
        s.split_equally(3).unwrap();

        let ids: Vec<String> = s.splits().unwrap().iter().map(|x| x.id().to_string()).collect();
        let shares: Vec<i64> = s
            .splits()
            .unwrap()
            .iter()
            .map(|x| x.total_amount().minor())
            .collect();
        assert_eq!(shares, vec![3768, 3766, 3766]);

        s.pay_split(&ids[0], "Cash", dec!(37.68), "NPR").unwrap();
        s.settle_split(&ids[0], "Cash").unwrap();

        // all-or-nothing: two splits still unpaid
        assert!(s.finalize("Cash", false).is_err());

        s.pay_split(&ids[1], "Card", dec!(37.66), "NPR").unwrap();
        s.settle_split(&ids[1], "Card").unwrap();
        s.pay_split(&ids[2], "Cash", dec!(37.66), "NPR").unwrap();
        s.settle_split(&ids[2], "Cash").unwrap();

        let result = s.finalize("Cash", false).unwrap();
        assert_eq!(result.state, SettlementState::Settled);
        assert_eq!(result.payments.len(), 3);
        assert_eq!(result.splits.as_ref().map(Vec::len), Some(3));
    }

    #[test]
    fn test_custom_split_pool() {
        let mut s = session();
        s.split_custom().unwrap();

        let a = s.add_custom_split(Money::from_minor(5000)).unwrap();
        let err = s.add_custom_split(Money::from_minor(7000)).unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Core(CoreError::ExceedsRemaining { .. })
        ));
        assert_eq!(s.remaining_pool().unwrap().minor(), 6300);

        let b = s.add_custom_split(Money::from_minor(6300)).unwrap();

        s.pay_split(&a, "Cash", dec!(50.00), "NPR").unwrap();
        s.settle_split(&a, "Cash").unwrap();
        s.pay_split(&b, "Card", dec!(63.00), "NPR").unwrap();
        s.settle_split(&b, "Card").unwrap();

        let result = s.finalize("Cash", false).unwrap();
        assert_eq!(result.state, SettlementState::Settled);
    }

    #[test]
    fn test_item_split_blocks_finalize_until_assigned() {
        let mut s = session();
        s.split_by_item().unwrap();
        let a = s.add_item_split().unwrap();
        let b = s.add_item_split().unwrap();

        s.move_item("momo", None, 4, &a).unwrap();
        // chowmein still unassigned
        assert!(s.finalize("Cash", false).is_err());

        s.move_item("chowmein", None, 1, &b).unwrap();
        assert!(s.unassigned_items().unwrap().is_empty());

        // momo split: 80.00 + 10.40 tax; chowmein: 20.00 + 2.60
        s.pay_split(&a, "Cash", dec!(90.40), "NPR").unwrap();
        s.settle_split(&a, "Cash").unwrap();
        s.pay_split(&b, "Cash", dec!(22.60), "NPR").unwrap();
        s.settle_split(&b, "Cash").unwrap();

        let result = s.finalize("Cash", false).unwrap();
        assert_eq!(result.state, SettlementState::Settled);
        assert_eq!(result.payments.len(), 2);
    }

    #[test]
    fn test_split_tips_are_summed() {
        let mut s = session();
        s.split_equally(2).unwrap();
        let ids: Vec<String> = s.splits().unwrap().iter().map(|x| x.id().to_string()).collect();

        s.tip_split(&ids[0], Money::from_minor(200)).unwrap();
        s.tip_split(&ids[1], Money::from_minor(300)).unwrap();

        s.pay_split(&ids[0], "Cash", dec!(58.50), "NPR").unwrap();
        s.settle_split(&ids[0], "Cash").unwrap();
        s.pay_split(&ids[1], "Cash", dec!(59.50), "NPR").unwrap();
        s.settle_split(&ids[1], "Cash").unwrap();

        let result = s.finalize("Cash", false).unwrap();
        assert_eq!(result.tip.minor(), 500);
    }

    #[test]
    fn test_plan_changes_lock_after_tender() {
        let mut s = session();
        s.split_equally(2).unwrap();
        // nothing tendered: switching and clearing are fine
        s.split_custom().unwrap();
        s.clear_split_plan().unwrap();

        s.split_equally(2).unwrap();
        let id = s.splits().unwrap()[0].id().to_string();
        s.pay_split(&id, "Cash", dec!(10.00), "NPR").unwrap();

        assert!(matches!(
            s.clear_split_plan().unwrap_err(),
            CheckoutError::SplitPlanLocked { .. }
        ));
        assert!(s.split_by_item().is_err());
    }

    #[test]
    fn test_full_mode_lock_after_tender() {
        let mut s = session();
        s.add_payment("Cash", dec!(10.00), "NPR").unwrap();
        assert!(matches!(
            s.split_equally(2).unwrap_err(),
            CheckoutError::SplitPlanLocked { .. }
        ));

        // removing the tender unlocks the switch
        s.remove_payment(0).unwrap();
        s.split_equally(2).unwrap();
    }

    #[test]
    fn test_qr_payment_confirmed() {
        let mut s = session();
        let (tx, confirmer) = s.begin_qr_payment(None).unwrap();
        let reference = tx.request().reference.clone();
        assert_eq!(tx.request().amount.minor(), 11300);
        assert_eq!(tx.request().currency_code, "NPR");
        assert_eq!(tx.request().display, "Rs 113.00");

        // only one pending request at a time
        assert!(matches!(
            s.begin_qr_payment(None).unwrap_err(),
            CheckoutError::QrPending { .. }
        ));

        confirmer.confirm();
        let recorded = s
            .complete_qr_payment(&reference, QrOutcome::Confirmed)
            .unwrap();
        assert_eq!(recorded, Some(Money::from_minor(11300)));
        assert_eq!(s.total_paid().unwrap().minor(), 11300);
        assert_eq!(s.full_ledger().unwrap().0.payments()[0].method, QR_METHOD);

        let result = s.finalize("Fonepay", false);
        // Fonepay is not in the enabled list; Cash resolves the same state
        assert!(result.is_err());
        assert_eq!(
            s.finalize("Cash", false).unwrap().state,
            SettlementState::Settled
        );
    }

    #[test]
    fn test_qr_payment_abandoned_records_nothing() {
        let mut s = session();
        let (tx, confirmer) = s.begin_qr_payment(None).unwrap();
        let reference = tx.request().reference.clone();
        confirmer.abandon();

        let recorded = s
            .complete_qr_payment(&reference, QrOutcome::Abandoned)
            .unwrap();
        assert_eq!(recorded, None);
        assert!(s.total_paid().unwrap().is_zero());

        // a second completion has nothing to match
        assert!(matches!(
            s.complete_qr_payment(&reference, QrOutcome::Confirmed)
                .unwrap_err(),
            CheckoutError::NoPendingQr
        ));
    }

    #[test]
    fn test_qr_stale_reference_is_refused() {
        let mut s = session();
        let _ = s.begin_qr_payment(None).unwrap();
        assert!(matches!(
            s.complete_qr_payment("bogus", QrOutcome::Confirmed)
                .unwrap_err(),
            CheckoutError::NoPendingQr
        ));
    }

    #[test]
    fn test_qr_against_one_split() {
        let mut s = session();
        s.split_equally(2).unwrap();
        let id = s.splits().unwrap()[0].id().to_string();

        let (tx, confirmer) = s.begin_qr_payment(Some(&id)).unwrap();
        assert_eq!(tx.request().amount.minor(), 5650);
        let reference = tx.request().reference.clone();
        confirmer.confirm();

        s.complete_qr_payment(&reference, QrOutcome::Confirmed)
            .unwrap();
        s.settle_split(&id, "Card").unwrap();
        assert!(s.splits().unwrap()[0].is_paid());
    }

    /// The gateway may confirm a QR payment at any moment, so the target
    /// split must stay open until the request resolves. Settling it (or
    /// editing its ledger) underneath a pending request would leave a
    /// confirmed payment unrecordable.
    #[test]
    fn test_split_stays_open_while_its_qr_pending() {
        let mut s = session();
        s.split_equally(2).unwrap();
        let id = s.splits().unwrap()[0].id().to_string();

        let (tx, confirmer) = s.begin_qr_payment(Some(&id)).unwrap();
        let reference = tx.request().reference.clone();

        // cash arrives while the QR is still on screen
        s.pay_split(&id, "Cash", dec!(56.50), "NPR").unwrap();
        assert!(matches!(
            s.settle_split(&id, "Cash").unwrap_err(),
            CheckoutError::QrPending { .. }
        ));
        assert!(matches!(
            s.remove_split_payment(&id, 0).unwrap_err(),
            CheckoutError::QrPending { .. }
        ));
        assert!(!s.splits().unwrap()[0].is_paid());

        confirmer.abandon();
        s.complete_qr_payment(&reference, QrOutcome::Abandoned)
            .unwrap();
        s.settle_split(&id, "Cash").unwrap();
        assert!(s.splits().unwrap()[0].is_paid());
    }

    /// A pending request only pins its own target; other splits settle
    /// normally.
    #[test]
    fn test_qr_on_one_split_does_not_pin_others() {
        let mut s = session();
        s.split_equally(2).unwrap();
        let ids: Vec<String> = s.splits().unwrap().iter().map(|x| x.id().to_string()).collect();

        let _qr = s.begin_qr_payment(Some(&ids[0])).unwrap();

        s.pay_split(&ids[1], "Cash", dec!(56.50), "NPR").unwrap();
        s.settle_split(&ids[1], "Cash").unwrap();
        assert!(s.splits().unwrap()[1].is_paid());
    }

    #[test]
    fn test_open_rejects_oversized_precision() {
        let settings = ApplicationSettings {
            decimal_places: 12,
            currency_symbol_position: SymbolPosition::Before,
        };
        let err =
            CheckoutSession::new(order(), currencies(), methods(), settings).unwrap_err();
        assert!(matches!(err, CheckoutError::Core(_)));
    }

    #[test]
    fn test_finalize_blocked_while_qr_pending() {
        let mut s = session();
        s.add_payment("Cash", dec!(50.00), "NPR").unwrap();
        let _qr = s.begin_qr_payment(None).unwrap();

        assert!(matches!(
            s.finalize("Cash", true).unwrap_err(),
            CheckoutError::QrPending { .. }
        ));
    }
}
