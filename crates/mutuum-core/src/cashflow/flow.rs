//! Ordered collections of cash-flow items.

use std::sync::Arc;

use crate::cashflow::{CashFlowEntry, CashFlowItem, CashFlowQuery};
use crate::time::{DateTime, TimeContext};
use crate::types::Money;

/// An ordered collection of cash-flow items representing a financial stream.
///
/// Public iteration resolves each item at the current time of its shared
/// context and yields only live (non-deleted) entries.
#[derive(Debug, Clone, Default)]
pub struct CashFlow {
    items: Vec<CashFlowItem>,
}

impl CashFlow {
    /// Creates a cash flow from a list of items.
    #[must_use]
    pub fn new(items: Vec<CashFlowItem>) -> Self {
        Self { items }
    }

    /// Creates an empty cash flow.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a flow of plain entries sharing a single time context.
    #[must_use]
    pub fn from_entries(entries: Vec<CashFlowEntry>, ctx: Arc<TimeContext>) -> Self {
        Self {
            items: entries
                .into_iter()
                .map(|entry| CashFlowItem::new(entry, Arc::clone(&ctx)))
                .collect(),
        }
    }

    /// Appends an item.
    pub fn push(&mut self, item: CashFlowItem) {
        self.items.push(item);
    }

    /// The underlying items, timelines included.
    #[must_use]
    pub fn items(&self) -> &[CashFlowItem] {
        &self.items
    }

    /// Mutable access to the underlying items.
    pub fn items_mut(&mut self) -> &mut [CashFlowItem] {
        &mut self.items
    }

    /// Resolves every item at its context's current time, yielding live
    /// entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> Vec<CashFlowEntry> {
        self.items
            .iter()
            .filter_map(|item| item.resolve().cloned())
            .collect()
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.iter().filter(|item| item.resolve().is_some()).count()
    }

    /// Whether no live entries remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of all live entry amounts (no discounting).
    #[must_use]
    pub fn sum(&self) -> Money {
        self.entries().iter().map(CashFlowEntry::amount).sum()
    }

    /// Sum of all positive live amounts.
    #[must_use]
    pub fn total_inflows(&self) -> Money {
        self.entries()
            .iter()
            .filter(|entry| entry.is_inflow())
            .map(CashFlowEntry::amount)
            .sum()
    }

    /// Sum of all negative live amounts, returned as a positive value.
    #[must_use]
    pub fn total_outflows(&self) -> Money {
        self.entries()
            .iter()
            .filter(|entry| entry.is_outflow())
            .map(|entry| entry.amount().abs())
            .sum()
    }

    /// Earliest live entry datetime, or `None` when empty.
    #[must_use]
    pub fn earliest_datetime(&self) -> Option<DateTime> {
        self.entries().iter().map(CashFlowEntry::datetime).min()
    }

    /// Latest live entry datetime, or `None` when empty.
    #[must_use]
    pub fn latest_datetime(&self) -> Option<DateTime> {
        self.entries().iter().map(CashFlowEntry::datetime).max()
    }

    /// Starts a query over the live entries.
    #[must_use]
    pub fn query(&self) -> CashFlowQuery {
        CashFlowQuery::new(self.entries())
    }
}

impl FromIterator<CashFlowItem> for CashFlow {
    fn from_iter<I: IntoIterator<Item = CashFlowItem>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
