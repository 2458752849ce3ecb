//! # Item Split Allocator
//!
//! Splits a bill by moving item quantities from an "unassigned" pool
//! into per-split buckets.
//!
//! ## Allocation Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Item Split Allocation                               │
//! │                                                                         │
//! │  Unassigned Pool              Split A             Split B               │
//! │  ───────────────              ───────             ───────               │
//! │  Momo      ×3   ──move 2──►   Momo ×2                                  │
//! │  Chowmein  ×1   ──move 1──────────────────────►   Chowmein ×1          │
//! │  Momo      ×1   ──move 1──────────────────────►   Momo ×1              │
//! │                                                                         │
//! │  CONSERVATION: unassigned + Σ assigned == original, per item, always   │
//! │                                                                         │
//! │  After every move the target's totals are recomputed:                  │
//! │    sub_total  = Σ (unit_price × quantity)                              │
//! │    tax_amount = sub_total × (order tax total / order subtotal)         │
//! │    - tax at the order's OVERALL effective rate, not per-item rules     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Items with different notes are distinct allocation units; moving
//! "Momo" does not move "Momo - no chili".

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{OrderItem, OrderSnapshot};

use super::{Split, SplitKind};

/// Allocates an order's items across splits, preserving quantity
/// conservation and redistributing tax proportionally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ItemSplitAllocator {
    unassigned: Vec<OrderItem>,
    splits: Vec<Split>,
    order_sub_total: Money,
    order_tax_total: Money,
}

impl ItemSplitAllocator {
    /// Seeds the unassigned pool from the full order.
    pub fn new(order: &OrderSnapshot) -> Self {
        ItemSplitAllocator {
            unassigned: order.items.clone(),
            splits: Vec::new(),
            order_sub_total: order.sub_total,
            order_tax_total: order.tax_total(),
        }
    }

    /// Adds a new empty split bucket and returns its id.
    pub fn add_split(&mut self) -> String {
        let split = Split::new(
            SplitKind::ByItem,
            vec![],
            Money::zero(),
            Money::zero(),
            Money::zero(),
        );
        let id = split.id().to_string();
        self.splits.push(split);
        id
    }

    /// The unassigned pool.
    pub fn unassigned(&self) -> &[OrderItem] {
        &self.unassigned
    }

    /// Unassigned quantity of one allocation unit (0 if absent).
    pub fn unassigned_quantity(&self, item_id: &str, notes: Option<&str>) -> i64 {
        self.unassigned
            .iter()
            .find(|i| i.same_unit(item_id, notes))
            .map(|i| i.quantity)
            .unwrap_or(0)
    }

    /// All split buckets, in creation order.
    pub fn splits(&self) -> &[Split] {
        &self.splits
    }

    /// Looks up a split by id.
    pub fn split(&self, split_id: &str) -> Option<&Split> {
        self.splits.iter().find(|s| s.id() == split_id)
    }

    /// Mutable lookup (tendering into a split's ledger; the split itself
    /// refuses mutation once paid).
    pub fn split_mut(&mut self, split_id: &str) -> Option<&mut Split> {
        self.splits.iter_mut().find(|s| s.id() == split_id)
    }

    /// Moves `quantity` units of an item from the unassigned pool into
    /// the target split, merging with an existing entry for the same
    /// item+notes combination.
    ///
    /// ## Errors
    /// - `InsufficientQuantity` unless `1 ≤ quantity ≤ unassigned`
    /// - `InvalidInput` if the target split is unknown or already paid
    ///
    /// All checks run before any mutation; a failed move changes nothing.
    pub fn move_item(
        &mut self,
        item_id: &str,
        notes: Option<&str>,
        quantity: i64,
        split_id: &str,
    ) -> CoreResult<()> {
        let available = self.unassigned_quantity(item_id, notes);
        if quantity < 1 || quantity > available {
            return Err(CoreError::InsufficientQuantity {
                item: item_id.to_string(),
                available,
                requested: quantity,
            });
        }

        let split_idx = self.unpaid_split_index(split_id)?;

        // Take the moved portion out of the pool (drop the entry when
        // exhausted).
        let pool_idx = self
            .unassigned
            .iter()
            .position(|i| i.same_unit(item_id, notes))
            .ok_or_else(|| CoreError::InsufficientQuantity {
                item: item_id.to_string(),
                available: 0,
                requested: quantity,
            })?;

        let mut moved = self.unassigned[pool_idx].clone();
        moved.quantity = quantity;

        self.unassigned[pool_idx].quantity -= quantity;
        if self.unassigned[pool_idx].quantity == 0 {
            self.unassigned.remove(pool_idx);
        }

        Self::merge_into(&mut self.splits[split_idx].items, moved);
        self.recompute(split_idx);
        Ok(())
    }

    /// Moves `quantity` units back from a split into the unassigned pool
    /// (the inverse of [`ItemSplitAllocator::move_item`], for correcting
    /// mis-assignments before the split is paid).
    pub fn return_item(
        &mut self,
        split_id: &str,
        item_id: &str,
        notes: Option<&str>,
        quantity: i64,
    ) -> CoreResult<()> {
        let split_idx = self.unpaid_split_index(split_id)?;

        let assigned = self.splits[split_idx]
            .items
            .iter()
            .find(|i| i.same_unit(item_id, notes))
            .map(|i| i.quantity)
            .unwrap_or(0);
        if quantity < 1 || quantity > assigned {
            return Err(CoreError::InsufficientQuantity {
                item: item_id.to_string(),
                available: assigned,
                requested: quantity,
            });
        }

        let items = &mut self.splits[split_idx].items;
        let idx = items
            .iter()
            .position(|i| i.same_unit(item_id, notes))
            .ok_or_else(|| CoreError::InsufficientQuantity {
                item: item_id.to_string(),
                available: 0,
                requested: quantity,
            })?;

        let mut returned = items[idx].clone();
        returned.quantity = quantity;

        items[idx].quantity -= quantity;
        if items[idx].quantity == 0 {
            items.remove(idx);
        }

        Self::merge_into(&mut self.unassigned, returned);
        self.recompute(split_idx);
        Ok(())
    }

    /// Finalization precondition: nothing left unassigned AND every
    /// split settled.
    pub fn can_finalize(&self) -> bool {
        self.unassigned.is_empty()
            && !self.splits.is_empty()
            && self.splits.iter().all(|s| s.is_paid())
    }

    /// Like [`ItemSplitAllocator::can_finalize`] but reports WHY not.
    pub fn ensure_ready(&self) -> CoreResult<()> {
        if !self.unassigned.is_empty() {
            return Err(CoreError::InvalidInput {
                reason: format!(
                    "{} item(s) are still unassigned",
                    self.unassigned.iter().map(|i| i.quantity).sum::<i64>()
                ),
            });
        }
        if self.splits.is_empty() {
            return Err(CoreError::InvalidInput {
                reason: "no splits have been created".to_string(),
            });
        }
        let unpaid = self.splits.iter().filter(|s| !s.is_paid()).count();
        if unpaid > 0 {
            return Err(CoreError::InvalidInput {
                reason: format!("{} split(s) are not yet paid", unpaid),
            });
        }
        Ok(())
    }

    fn unpaid_split_index(&self, split_id: &str) -> CoreResult<usize> {
        let idx = self
            .splits
            .iter()
            .position(|s| s.id() == split_id)
            .ok_or_else(|| CoreError::InvalidInput {
                reason: format!("unknown split: {}", split_id),
            })?;
        if self.splits[idx].is_paid() {
            return Err(CoreError::InvalidInput {
                reason: format!("split {} is already paid and immutable", split_id),
            });
        }
        Ok(idx)
    }

    /// Merges an item into a bucket, summing quantities when the same
    /// item+notes combination already exists there.
    fn merge_into(bucket: &mut Vec<OrderItem>, item: OrderItem) {
        if let Some(existing) = bucket
            .iter_mut()
            .find(|i| i.same_unit(&item.id, item.notes.as_deref()))
        {
            existing.quantity += item.quantity;
        } else {
            bucket.push(item);
        }
    }

    /// Recomputes a split's totals after a move:
    /// subtotal from its items, tax at the order's overall effective
    /// rate ([`Money::ratio_share`]), total as their sum.
    fn recompute(&mut self, split_idx: usize) {
        let split = &mut self.splits[split_idx];

        let sub_total: Money = split.items.iter().map(|i| i.line_total()).sum();
        let tax_amount = sub_total.ratio_share(self.order_tax_total, self.order_sub_total);

        split.sub_total = sub_total;
        split.tax_amount = tax_amount;
        split.total_amount = sub_total + tax_amount;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaxLine;

    fn item(id: &str, price: i64, qty: i64, notes: Option<&str>) -> OrderItem {
        OrderItem {
            id: id.to_string(),
            name: id.to_string(),
            unit_price: Money::from_minor(price),
            quantity: qty,
            notes: notes.map(String::from),
        }
    }

    /// Rs 100.00 subtotal, Rs 13.00 VAT => effective rate 13%.
    fn order() -> OrderSnapshot {
        OrderSnapshot {
            items: vec![
                item("momo", 2000, 3, None),
                item("momo", 2000, 1, Some("no chili")),
                item("chowmein", 2000, 1, None),
            ],
            sub_total: Money::from_minor(10000),
            taxes: vec![TaxLine {
                name: "VAT".to_string(),
                amount: Money::from_minor(1300),
            }],
            grand_total: Money::from_minor(11300),
        }
    }

    #[test]
    fn test_move_item_decrements_pool_and_merges() {
        let mut alloc = ItemSplitAllocator::new(&order());
        let split_id = alloc.add_split();

        alloc.move_item("momo", None, 2, &split_id).unwrap();
        assert_eq!(alloc.unassigned_quantity("momo", None), 1);

        // second move of the same unit merges, not duplicates
        alloc.move_item("momo", None, 1, &split_id).unwrap();
        assert_eq!(alloc.unassigned_quantity("momo", None), 0);

        let split = alloc.split(&split_id).unwrap();
        assert_eq!(split.items().len(), 1);
        assert_eq!(split.items()[0].quantity, 3);
    }

    #[test]
    fn test_notes_are_distinct_allocation_units() {
        let mut alloc = ItemSplitAllocator::new(&order());
        let split_id = alloc.add_split();

        alloc.move_item("momo", None, 3, &split_id).unwrap();
        // the "no chili" momo is untouched
        assert_eq!(alloc.unassigned_quantity("momo", Some("no chili")), 1);

        alloc
            .move_item("momo", Some("no chili"), 1, &split_id)
            .unwrap();
        let split = alloc.split(&split_id).unwrap();
        assert_eq!(split.items().len(), 2);
    }

    #[test]
    fn test_move_rejects_excess_quantity() {
        let mut alloc = ItemSplitAllocator::new(&order());
        let split_id = alloc.add_split();

        let err = alloc.move_item("momo", None, 4, &split_id).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientQuantity {
                available: 3,
                requested: 4,
                ..
            }
        ));
        // nothing changed
        assert_eq!(alloc.unassigned_quantity("momo", None), 3);
        assert!(alloc.split(&split_id).unwrap().items().is_empty());

        assert!(alloc.move_item("momo", None, 0, &split_id).is_err());
    }

    #[test]
    fn test_proportional_tax_recompute() {
        let mut alloc = ItemSplitAllocator::new(&order());
        let split_id = alloc.add_split();

        // Rs 40.00 of items at 13% effective rate => Rs 5.20 tax
        alloc.move_item("momo", None, 2, &split_id).unwrap();
        let split = alloc.split(&split_id).unwrap();
        assert_eq!(split.sub_total().minor(), 4000);
        assert_eq!(split.tax_amount().minor(), 520);
        assert_eq!(split.total_amount().minor(), 4520);
    }

    #[test]
    fn test_return_item_restores_pool() {
        let mut alloc = ItemSplitAllocator::new(&order());
        let split_id = alloc.add_split();

        alloc.move_item("chowmein", None, 1, &split_id).unwrap();
        alloc.return_item(&split_id, "chowmein", None, 1).unwrap();

        assert_eq!(alloc.unassigned_quantity("chowmein", None), 1);
        let split = alloc.split(&split_id).unwrap();
        assert!(split.items().is_empty());
        assert_eq!(split.total_amount(), Money::zero());

        // returning more than assigned fails
        assert!(alloc.return_item(&split_id, "chowmein", None, 1).is_err());
    }

    /// Conservation: for every allocation unit, unassigned + assigned
    /// quantities always reproduce the original order.
    #[test]
    fn test_quantity_conservation() {
        let order = order();
        let mut alloc = ItemSplitAllocator::new(&order);
        let a = alloc.add_split();
        let b = alloc.add_split();

        alloc.move_item("momo", None, 2, &a).unwrap();
        alloc.move_item("momo", None, 1, &b).unwrap();
        alloc.move_item("chowmein", None, 1, &b).unwrap();
        alloc.return_item(&b, "momo", None, 1).unwrap();

        for original in &order.items {
            let notes = original.notes.as_deref();
            let in_pool = alloc.unassigned_quantity(&original.id, notes);
            let in_splits: i64 = alloc
                .splits()
                .iter()
                .flat_map(|s| s.items())
                .filter(|i| i.same_unit(&original.id, notes))
                .map(|i| i.quantity)
                .sum();
            assert_eq!(
                in_pool + in_splits,
                original.quantity,
                "conservation broken for {:?}/{:?}",
                original.id,
                notes
            );
        }
    }

    #[test]
    fn test_ensure_ready_reports_blockers() {
        let mut alloc = ItemSplitAllocator::new(&order());
        assert!(alloc.ensure_ready().is_err()); // everything unassigned

        let split_id = alloc.add_split();
        alloc.move_item("momo", None, 3, &split_id).unwrap();
        alloc
            .move_item("momo", Some("no chili"), 1, &split_id)
            .unwrap();
        alloc.move_item("chowmein", None, 1, &split_id).unwrap();

        // pool is empty but the split is unpaid
        assert!(!alloc.can_finalize());
        assert!(alloc.ensure_ready().is_err());
    }

    #[test]
    fn test_splits_sum_to_grand_total_when_pool_empty() {
        let order = order();
        let mut alloc = ItemSplitAllocator::new(&order);
        let a = alloc.add_split();
        let b = alloc.add_split();

        alloc.move_item("momo", None, 3, &a).unwrap();
        alloc.move_item("momo", Some("no chili"), 1, &b).unwrap();
        alloc.move_item("chowmein", None, 1, &b).unwrap();

        let allocated = crate::split::total_allocated(alloc.splits());
        assert!(crate::split::covers_grand_total(
            alloc.splits(),
            order.grand_total
        ));
        // 60.00+7.80 and 40.00+5.20 - exact here, tolerance is for the
        // general case
        assert_eq!(allocated, order.grand_total);
    }
}
